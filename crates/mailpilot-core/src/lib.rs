//! Core data model and adapter seams for the mailpilot coordinator.
//!
//! UI surfaces of the mail client (toolbar popup, compose popup, in-message
//! overlay, context menu) send tagged commands to a background coordinator.
//! This crate defines the command vocabulary, the email content model, the
//! tab resolution rules, the context assembly step handed to generation, and
//! the traits through which the coordinator reaches the host mail client and
//! the generation backend.

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

mod adapters;
mod commands;
mod context;
mod error;
mod extract;
mod headers;
mod resolver;
pub mod test_support;

pub use adapters::{
    BackgroundPort, Generator, MailHost, MessagePart, MessageRecord, PostInsertionOverlay,
    TabInfo, TabKind,
};
pub use commands::{
    ids, Command, CommandMetadata, CommandRegistry, ComposeArgs, GenerateArgs,
    PostInsertionAction, PostInsertionActionArgs, PostInsertionPanelArgs,
    UntypedCommandInvocation,
};
pub use context::assemble_context;
pub use error::CoreError;
pub use extract::{content_from_message, merge_with_dom, DomExtraction};
pub use headers::Headers;
pub use resolver::{find_message_tab, resolve_target, Resolution};

/// Identifier of a live tab in the host mail client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabId(u32);

impl TabId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

/// Identifier the host assigns to a stored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(u64);

impl MessageId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Where an [`EmailContent`] was obtained from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentSource {
    #[serde(rename = "api")]
    Api,
    #[serde(rename = "dom")]
    Dom,
    #[serde(rename = "api+dom")]
    ApiDom,
    #[serde(rename = "error")]
    Error,
}

/// Extracted email data assembled once per generation request.
///
/// Immutable after construction. `headers` preserves insertion order so the
/// assembled context is reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailContent {
    #[serde(default)]
    pub text_content: String,
    #[serde(default)]
    pub html_content: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<MessageId>,
    #[serde(default)]
    pub extracted_at: String,
    pub source: ContentSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EmailContent {
    /// Empty content carrying only provenance. Extraction failures degrade to
    /// this rather than failing the surrounding request.
    pub fn failed(error: impl Into<String>, extracted_at: String) -> Self {
        Self {
            text_content: String::new(),
            html_content: String::new(),
            headers: Headers::new(),
            message_id: None,
            extracted_at,
            source: ContentSource::Error,
            error: Some(error.into()),
        }
    }
}

/// The mode a generation request runs in. Reply and summary carry email
/// context; compose works from the user prompt alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    Reply,
    Summary,
    Compose,
}

/// Input to the generation backend. The contract is deliberately narrow so
/// the placeholder backend can be swapped for a real one without touching
/// any caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub prompt: String,
    pub email: Option<EmailContent>,
    pub mode: GenerationMode,
}

/// Outcome of one generation request. No identity beyond the response it
/// represents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    pub output: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// RFC 3339 timestamp for extraction provenance.
pub fn now_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
