use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{CoreError, EmailContent};

/// Stable command identifiers shared by every UI surface.
///
/// These tags are the wire vocabulary between surfaces and the coordinator
/// and must not be renamed silently.
pub mod ids {
    pub const SHOW_REPLY_UI: &str = "showReplyUI";
    pub const SHOW_SUMMARY_UI: &str = "showSummaryUI";
    pub const GET_MESSAGE_CONTENT: &str = "getMessageContent";
    pub const GENERATE_REPLY: &str = "generateReply";
    pub const GENERATE_SUMMARY: &str = "generateSummary";
    pub const GENERATE_COMPOSE_REPLY: &str = "generateComposeReply";
    pub const SHOW_POST_INSERTION_PANEL: &str = "showPostInsertionPanel";
    pub const HANDLE_POST_INSERTION_ACTION: &str = "handlePostInsertionAction";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateArgs {
    pub prompt: String,
    #[serde(default)]
    pub email_content: Option<EmailContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeArgs {
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInsertionPanelArgs {
    pub generated_text: String,
    pub original_prompt: String,
}

/// Secondary actions the post-insertion overlay can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostInsertionAction {
    Keep,
    Discard,
    Regenerate,
    Shorten,
    Lengthen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInsertionActionArgs {
    pub action: PostInsertionAction,
    pub generated_text: String,
    pub original_prompt: String,
}

/// Closed set of recognized commands. Unknown tags never reach this type;
/// the registry reports them so the router can yield its unhandled sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ShowReplyUi,
    ShowSummaryUi,
    GetMessageContent,
    GenerateReply(GenerateArgs),
    GenerateSummary(GenerateArgs),
    GenerateComposeReply(ComposeArgs),
    ShowPostInsertionPanel(PostInsertionPanelArgs),
    HandlePostInsertionAction(PostInsertionActionArgs),
}

impl Command {
    pub fn id(&self) -> &'static str {
        match self {
            Command::ShowReplyUi => ids::SHOW_REPLY_UI,
            Command::ShowSummaryUi => ids::SHOW_SUMMARY_UI,
            Command::GetMessageContent => ids::GET_MESSAGE_CONTENT,
            Command::GenerateReply(_) => ids::GENERATE_REPLY,
            Command::GenerateSummary(_) => ids::GENERATE_SUMMARY,
            Command::GenerateComposeReply(_) => ids::GENERATE_COMPOSE_REPLY,
            Command::ShowPostInsertionPanel(_) => ids::SHOW_POST_INSERTION_PANEL,
            Command::HandlePostInsertionAction(_) => ids::HANDLE_POST_INSERTION_ACTION,
        }
    }
}

/// Wire form of a command: the tag plus whatever fields ride alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UntypedCommandInvocation {
    pub cmd: String,
    #[serde(flatten)]
    pub args: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandMetadata {
    pub id: &'static str,
    pub description: &'static str,
}

#[derive(Clone)]
struct CommandDefinition {
    metadata: CommandMetadata,
    parse: fn(&Map<String, Value>) -> Result<Command, CoreError>,
}

/// Lookup table from command id to metadata and argument parser.
pub struct CommandRegistry {
    definitions: BTreeMap<&'static str, CommandDefinition>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new().expect("canonical command registry should not contain duplicates")
    }
}

impl CommandRegistry {
    pub fn new() -> Result<Self, CoreError> {
        let mut definitions = BTreeMap::new();
        for definition in canonical_definitions() {
            let id = definition.metadata.id;
            if definitions.insert(id, definition).is_some() {
                return Err(CoreError::DuplicateCommandId {
                    command_id: id.to_owned(),
                });
            }
        }
        Ok(Self { definitions })
    }

    pub fn lookup(&self, command_id: &str) -> Result<&CommandMetadata, CoreError> {
        self.definitions
            .get(command_id)
            .map(|definition| &definition.metadata)
            .ok_or_else(|| CoreError::UnknownCommand {
                command_id: command_id.to_owned(),
            })
    }

    pub fn list(&self) -> Vec<&CommandMetadata> {
        self.definitions
            .values()
            .map(|definition| &definition.metadata)
            .collect()
    }

    pub fn parse_invocation(
        &self,
        invocation: &UntypedCommandInvocation,
    ) -> Result<Command, CoreError> {
        let definition = self
            .definitions
            .get(invocation.cmd.as_str())
            .ok_or_else(|| CoreError::UnknownCommand {
                command_id: invocation.cmd.clone(),
            })?;
        (definition.parse)(&invocation.args)
    }
}

fn parse_args<T: for<'de> Deserialize<'de>>(
    command_id: &'static str,
    args: &Map<String, Value>,
) -> Result<T, CoreError> {
    serde_json::from_value(Value::Object(args.clone())).map_err(|err| {
        CoreError::InvalidCommandArgs {
            command_id: command_id.to_owned(),
            reason: err.to_string(),
        }
    })
}

fn canonical_definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition {
            metadata: CommandMetadata {
                id: ids::SHOW_REPLY_UI,
                description: "Show the reply prompt panel in the target surface.",
            },
            parse: |_| Ok(Command::ShowReplyUi),
        },
        CommandDefinition {
            metadata: CommandMetadata {
                id: ids::SHOW_SUMMARY_UI,
                description: "Show the summary prompt panel in the target surface.",
            },
            parse: |_| Ok(Command::ShowSummaryUi),
        },
        CommandDefinition {
            metadata: CommandMetadata {
                id: ids::GET_MESSAGE_CONTENT,
                description: "Extract the currently displayed message's content.",
            },
            parse: |_| Ok(Command::GetMessageContent),
        },
        CommandDefinition {
            metadata: CommandMetadata {
                id: ids::GENERATE_REPLY,
                description: "Generate a reply from a prompt and email content.",
            },
            parse: |args| Ok(Command::GenerateReply(parse_args(ids::GENERATE_REPLY, args)?)),
        },
        CommandDefinition {
            metadata: CommandMetadata {
                id: ids::GENERATE_SUMMARY,
                description: "Generate a summary from a prompt and email content.",
            },
            parse: |args| {
                Ok(Command::GenerateSummary(parse_args(
                    ids::GENERATE_SUMMARY,
                    args,
                )?))
            },
        },
        CommandDefinition {
            metadata: CommandMetadata {
                id: ids::GENERATE_COMPOSE_REPLY,
                description: "Generate an email body for a compose window from a prompt alone.",
            },
            parse: |args| {
                Ok(Command::GenerateComposeReply(parse_args(
                    ids::GENERATE_COMPOSE_REPLY,
                    args,
                )?))
            },
        },
        CommandDefinition {
            metadata: CommandMetadata {
                id: ids::SHOW_POST_INSERTION_PANEL,
                description: "Show the post-insertion control overlay in the compose window.",
            },
            parse: |args| {
                Ok(Command::ShowPostInsertionPanel(parse_args(
                    ids::SHOW_POST_INSERTION_PANEL,
                    args,
                )?))
            },
        },
        CommandDefinition {
            metadata: CommandMetadata {
                id: ids::HANDLE_POST_INSERTION_ACTION,
                description: "Apply a keep/discard/regenerate action to inserted text.",
            },
            parse: |args| {
                Ok(Command::HandlePostInsertionAction(parse_args(
                    ids::HANDLE_POST_INSERTION_ACTION,
                    args,
                )?))
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn invocation(value: Value) -> UntypedCommandInvocation {
        serde_json::from_value(value).expect("parse invocation")
    }

    #[test]
    fn registry_lists_every_command_exactly_once() {
        let registry = CommandRegistry::default();
        let ids: Vec<&str> = registry.list().iter().map(|meta| meta.id).collect();
        assert_eq!(ids.len(), 8);
        for id in [
            ids::SHOW_REPLY_UI,
            ids::SHOW_SUMMARY_UI,
            ids::GET_MESSAGE_CONTENT,
            ids::GENERATE_REPLY,
            ids::GENERATE_SUMMARY,
            ids::GENERATE_COMPOSE_REPLY,
            ids::SHOW_POST_INSERTION_PANEL,
            ids::HANDLE_POST_INSERTION_ACTION,
        ] {
            assert!(registry.lookup(id).is_ok(), "missing {id}");
        }
    }

    #[test]
    fn zero_arg_commands_ignore_extra_fields() {
        let registry = CommandRegistry::default();
        let command = registry
            .parse_invocation(&invocation(json!({"cmd": "showReplyUI", "noise": 1})))
            .expect("parse showReplyUI");
        assert_eq!(command, Command::ShowReplyUi);
    }

    #[test]
    fn generate_reply_parses_prompt_and_optional_content() {
        let registry = CommandRegistry::default();
        let command = registry
            .parse_invocation(&invocation(json!({
                "cmd": "generateReply",
                "prompt": "keep it short",
                "emailContent": {
                    "textContent": "hello",
                    "headers": {"Subject": "hi"},
                    "source": "api"
                }
            })))
            .expect("parse generateReply");

        let Command::GenerateReply(args) = command else {
            panic!("expected GenerateReply");
        };
        assert_eq!(args.prompt, "keep it short");
        let email = args.email_content.expect("email content");
        assert_eq!(email.text_content, "hello");
        assert_eq!(email.headers.get("Subject"), Some("hi"));
    }

    #[test]
    fn generate_reply_without_content_parses_to_none() {
        let registry = CommandRegistry::default();
        let command = registry
            .parse_invocation(&invocation(json!({"cmd": "generateReply", "prompt": "p"})))
            .expect("parse generateReply");
        let Command::GenerateReply(args) = command else {
            panic!("expected GenerateReply");
        };
        assert!(args.email_content.is_none());
    }

    #[test]
    fn unknown_command_id_is_reported_as_unknown() {
        let registry = CommandRegistry::default();
        let err = registry
            .parse_invocation(&invocation(json!({"cmd": "openSettings"})))
            .expect_err("unknown command");
        assert!(matches!(err, CoreError::UnknownCommand { command_id } if command_id == "openSettings"));
    }

    #[test]
    fn recognized_command_with_bad_args_is_invalid_not_unknown() {
        let registry = CommandRegistry::default();
        let err = registry
            .parse_invocation(&invocation(json!({"cmd": "generateComposeReply"})))
            .expect_err("missing prompt");
        assert!(matches!(
            err,
            CoreError::InvalidCommandArgs { command_id, .. } if command_id == "generateComposeReply"
        ));
    }

    #[test]
    fn post_insertion_action_rejects_unknown_action() {
        let registry = CommandRegistry::default();
        let err = registry
            .parse_invocation(&invocation(json!({
                "cmd": "handlePostInsertionAction",
                "action": "duplicate",
                "generatedText": "t",
                "originalPrompt": "p"
            })))
            .expect_err("unknown action");
        assert!(matches!(err, CoreError::InvalidCommandArgs { .. }));
    }

    #[test]
    fn post_insertion_actions_use_lowercase_wire_names() {
        let json = serde_json::to_string(&PostInsertionAction::Regenerate).expect("serialize");
        assert_eq!(json, "\"regenerate\"");
        let parsed: PostInsertionAction =
            serde_json::from_str("\"lengthen\"").expect("deserialize");
        assert_eq!(parsed, PostInsertionAction::Lengthen);
    }
}
