use serde_json::{json, Value};

use mailpilot_core::{
    assemble_context, content_from_message, find_message_tab, ids, now_timestamp, resolve_target,
    Command, CommandRegistry, ComposeArgs, CoreError, EmailContent, GenerateArgs, GenerateRequest,
    GenerationMode, Generator, MailHost, PostInsertionActionArgs, PostInsertionOverlay,
    PostInsertionPanelArgs, Resolution, TabId, TabKind, UntypedCommandInvocation,
};

const SHORTEN_DIRECTIVE: &str = " (make it shorter and more concise)";
const LENGTHEN_DIRECTIVE: &str = " (make it more detailed and comprehensive)";

/// What the router tells the host's message plumbing after seeing a message.
///
/// `Unhandled` is the signal that another listener may claim the message;
/// every recognized command resolves to `Response`, even when the handler
/// failed internally.
#[derive(Debug, Clone, PartialEq)]
pub enum RouterOutcome {
    Unhandled,
    Response(Value),
}

impl RouterOutcome {
    pub fn is_unhandled(&self) -> bool {
        matches!(self, RouterOutcome::Unhandled)
    }

    pub fn into_response(self) -> Option<Value> {
        match self {
            RouterOutcome::Unhandled => None,
            RouterOutcome::Response(value) => Some(value),
        }
    }
}

/// Where a command came from. A populated `tab` marks the exact surface the
/// user is interacting with and short-circuits tab resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SenderContext {
    pub tab: Option<TabId>,
}

impl SenderContext {
    pub fn from_tab(tab: TabId) -> Self {
        Self { tab: Some(tab) }
    }
}

/// Context menu entries registered against message surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    GenerateReply,
    GenerateSummary,
}

/// Command router for the background coordinator.
///
/// Owns the registry plus the host and generator seams. Handlers never
/// propagate errors out of [`Router::handle`]; failures become error-shaped
/// response values so the requesting surface always hears back.
pub struct Router<H, G> {
    host: H,
    generator: G,
    registry: CommandRegistry,
}

impl<H: MailHost, G: Generator> Router<H, G> {
    pub fn new(host: H, generator: G) -> Result<Self, CoreError> {
        Ok(Self {
            host,
            generator,
            registry: CommandRegistry::new()?,
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Route one incoming message.
    ///
    /// Messages without an object shape or a `cmd` tag, and tags the registry
    /// does not know, yield [`RouterOutcome::Unhandled`].
    pub async fn handle(&self, message: Value, sender: SenderContext) -> RouterOutcome {
        let invocation: UntypedCommandInvocation = match serde_json::from_value(message) {
            Ok(invocation) => invocation,
            Err(_) => return RouterOutcome::Unhandled,
        };

        let command = match self.registry.parse_invocation(&invocation) {
            Ok(command) => command,
            Err(CoreError::UnknownCommand { command_id }) => {
                tracing::warn!(command = command_id.as_str(), "unrecognized command tag");
                return RouterOutcome::Unhandled;
            }
            Err(err) => return RouterOutcome::Response(json!({"error": err.to_string()})),
        };

        tracing::debug!(command = command.id(), "dispatching command");
        let response = match command {
            Command::ShowReplyUi => self.forward_to_surface(ids::SHOW_REPLY_UI, sender.tab).await,
            Command::ShowSummaryUi => {
                self.forward_to_surface(ids::SHOW_SUMMARY_UI, sender.tab).await
            }
            Command::GetMessageContent => self.message_content(sender.tab).await,
            Command::GenerateReply(args) => {
                self.generate_with_content(GenerationMode::Reply, args).await
            }
            Command::GenerateSummary(args) => {
                self.generate_with_content(GenerationMode::Summary, args)
                    .await
            }
            Command::GenerateComposeReply(args) => self.generate_compose(args).await,
            Command::ShowPostInsertionPanel(args) => self.show_post_insertion(args).await,
            Command::HandlePostInsertionAction(args) => self.post_insertion_action(args).await,
        };
        RouterOutcome::Response(response)
    }

    /// Route a context menu click. The clicked tab acts as the sender so the
    /// command lands in the surface the user invoked the menu from.
    pub async fn handle_menu_click(&self, item: MenuItem, tab: Option<TabId>) -> RouterOutcome {
        let command_id = match item {
            MenuItem::GenerateReply => ids::SHOW_REPLY_UI,
            MenuItem::GenerateSummary => ids::SHOW_SUMMARY_UI,
        };
        self.handle(json!({"cmd": command_id}), SenderContext { tab })
            .await
    }

    async fn resolve(&self, sender_tab: Option<TabId>) -> Result<Resolution, CoreError> {
        let tabs = self.host.list_tabs().await?;
        let active = self.host.active_tab().await?;
        resolve_target(sender_tab, &tabs, active.as_ref())
    }

    async fn forward_to_surface(&self, command_id: &'static str, sender_tab: Option<TabId>) -> Value {
        let resolution = match self.resolve(sender_tab).await {
            Ok(resolution) => resolution,
            Err(err) => return json!({"error": err.to_string()}),
        };

        if resolution.needs_injection {
            // A failure here usually means the overlay script is already
            // loaded in the tab, so forwarding proceeds either way.
            if let Err(err) = self.host.inject_overlay(resolution.tab).await {
                tracing::debug!(
                    tab = resolution.tab.value(),
                    error = %err,
                    "overlay injection failed, script likely already loaded"
                );
            }
        }

        match self
            .host
            .send_to_tab(resolution.tab, json!({"cmd": command_id}))
            .await
        {
            Ok(response) => response,
            Err(err) => json!({"error": err.to_string()}),
        }
    }

    async fn message_content(&self, sender_tab: Option<TabId>) -> Value {
        let content = match self.extract_displayed(sender_tab).await {
            Ok(content) => content,
            Err(err) => EmailContent::failed(err.to_string(), now_timestamp()),
        };
        match serde_json::to_value(&content) {
            Ok(value) => value,
            Err(err) => json!({"error": err.to_string()}),
        }
    }

    async fn extract_displayed(&self, sender_tab: Option<TabId>) -> Result<EmailContent, CoreError> {
        let tab = match sender_tab {
            Some(tab) => tab,
            None => {
                let tabs = self.host.list_tabs().await?;
                find_message_tab(&tabs)
                    .map(|tab| tab.id)
                    .ok_or(CoreError::NoSuitableTab)?
            }
        };

        let message = self
            .host
            .displayed_message(tab)
            .await?
            .ok_or(CoreError::NoMessageDisplayed)?;
        Ok(content_from_message(&message, now_timestamp()))
    }

    async fn generate_with_content(&self, mode: GenerationMode, args: GenerateArgs) -> Value {
        let context = assemble_context(&args.prompt, args.email_content.as_ref(), mode);
        let request = GenerateRequest {
            prompt: args.prompt.clone(),
            email: args.email_content.clone(),
            mode,
        };

        match self.generator.generate(request).await {
            Ok(result) => {
                let field = match mode {
                    GenerationMode::Summary => "summary",
                    GenerationMode::Reply | GenerationMode::Compose => "reply",
                };
                json!({
                    "success": true,
                    field: result.output,
                    "prompt": result.prompt,
                    "emailContent": args.email_content,
                    "contextLength": context.chars().count(),
                })
            }
            Err(err) => json!({
                "success": false,
                "error": err.to_string(),
                "prompt": args.prompt,
            }),
        }
    }

    async fn generate_compose(&self, args: ComposeArgs) -> Value {
        match self.compose_text(&args.prompt).await {
            Ok(output) => json!({
                "success": true,
                "reply": output,
                "prompt": args.prompt,
            }),
            Err(err) => json!({
                "success": false,
                "error": err.to_string(),
                "prompt": args.prompt,
            }),
        }
    }

    async fn compose_text(&self, prompt: &str) -> Result<String, CoreError> {
        let result = self
            .generator
            .generate(GenerateRequest {
                prompt: prompt.to_owned(),
                email: None,
                mode: GenerationMode::Compose,
            })
            .await?;
        if !result.success {
            return Err(CoreError::Generation(
                result
                    .error
                    .unwrap_or_else(|| "generation did not produce output".to_owned()),
            ));
        }
        Ok(result.output)
    }

    async fn first_compose_tab(&self) -> Result<TabId, CoreError> {
        let tabs = self.host.list_tabs().await?;
        tabs.iter()
            .find(|tab| tab.kind == TabKind::MessageCompose)
            .map(|tab| tab.id)
            .ok_or(CoreError::NoComposeWindow)
    }

    async fn show_post_insertion(&self, args: PostInsertionPanelArgs) -> Value {
        let tab = match self.first_compose_tab().await {
            Ok(tab) => tab,
            Err(err) => return json!({"success": false, "error": err.to_string()}),
        };
        let overlay = PostInsertionOverlay {
            generated_text: args.generated_text,
            original_prompt: args.original_prompt,
        };
        match self.host.show_post_insertion_overlay(tab, &overlay).await {
            Ok(()) => json!({"success": true}),
            Err(err) => json!({"success": false, "error": err.to_string()}),
        }
    }

    async fn post_insertion_action(&self, args: PostInsertionActionArgs) -> Value {
        use mailpilot_core::PostInsertionAction::*;

        let tab = match self.first_compose_tab().await {
            Ok(tab) => tab,
            Err(err) => return json!({"success": false, "error": err.to_string()}),
        };

        match args.action {
            Keep => json!({"success": true, "message": "Text kept"}),
            Discard => match self.host.set_compose_body(tab, "").await {
                Ok(()) => json!({"success": true, "message": "Text discarded"}),
                Err(err) => json!({"success": false, "error": err.to_string()}),
            },
            Regenerate => {
                self.rewrite_inserted_text(
                    tab,
                    &args.original_prompt,
                    "",
                    "regenerate",
                    "Text regenerated",
                )
                .await
            }
            Shorten => {
                self.rewrite_inserted_text(
                    tab,
                    &args.original_prompt,
                    SHORTEN_DIRECTIVE,
                    "shorten",
                    "Text shortened",
                )
                .await
            }
            Lengthen => {
                self.rewrite_inserted_text(
                    tab,
                    &args.original_prompt,
                    LENGTHEN_DIRECTIVE,
                    "lengthen",
                    "Text lengthened",
                )
                .await
            }
        }
    }

    /// Re-run compose generation with the original prompt plus an optional
    /// directive suffix and replace the compose body with the result.
    async fn rewrite_inserted_text(
        &self,
        tab: TabId,
        original_prompt: &str,
        directive: &str,
        verb: &str,
        success_message: &str,
    ) -> Value {
        let prompt = format!("{original_prompt}{directive}");
        let output = match self.compose_text(&prompt).await {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(error = %err, "compose regeneration failed");
                return json!({"success": false, "error": format!("Failed to {verb} text")});
            }
        };

        match self.host.set_compose_body(tab, &output).await {
            Ok(()) => json!({"success": true, "message": success_message}),
            Err(err) => {
                tracing::warn!(error = %err, "failed to update compose body");
                json!({"success": false, "error": format!("Failed to {verb} text")})
            }
        }
    }
}
