use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{CoreError, GenerateRequest, GenerationResult, MessageId, TabId};

/// The kind of UI surface a tab represents, mirroring the host's tab types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TabKind {
    MessageDisplay,
    Mail,
    MessageCompose,
    #[serde(untagged)]
    Other(String),
}

/// A live UI surface enumerated from the host. Read and ranked, never
/// mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: TabId,
    pub kind: TabKind,
    pub url: Option<String>,
    pub active: bool,
    pub title: Option<String>,
}

/// One MIME part of a retrieved message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePart {
    pub content_type: String,
    pub body: Option<String>,
}

/// The host's view of a displayed message: envelope fields plus full headers
/// and body parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: MessageId,
    pub subject: String,
    pub author: String,
    pub recipients: Vec<String>,
    pub date: String,
    pub headers: Vec<(String, String)>,
    pub parts: Vec<MessagePart>,
}

/// Payload for the statically defined post-insertion overlay shown in a
/// compose window after generated text was inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInsertionOverlay {
    pub generated_text: String,
    pub original_prompt: String,
}

/// Capabilities of the host mail client the coordinator calls through.
///
/// Every method is a suspension point; the caller awaits completion before
/// proceeding. Implementations bridge to the actual extension APIs; the
/// in-memory implementation in [`crate::test_support`] stands in until the
/// native bridge lands.
#[async_trait]
pub trait MailHost: Send + Sync {
    /// Enumerate all live tabs.
    async fn list_tabs(&self) -> Result<Vec<TabInfo>, CoreError>;

    /// The active tab of the current window, if any.
    async fn active_tab(&self) -> Result<Option<TabInfo>, CoreError>;

    /// Deliver a command message to the surface running in `tab` and return
    /// its response.
    async fn send_to_tab(&self, tab: TabId, message: Value) -> Result<Value, CoreError>;

    /// Load the interactive overlay script and stylesheet into `tab`.
    async fn inject_overlay(&self, tab: TabId) -> Result<(), CoreError>;

    /// The message currently displayed in `tab`, if one is shown.
    async fn displayed_message(&self, tab: TabId) -> Result<Option<MessageRecord>, CoreError>;

    /// Replace the body of the compose window in `tab`.
    async fn set_compose_body(&self, tab: TabId, body: &str) -> Result<(), CoreError>;

    /// Show the post-insertion control overlay in the compose window `tab`.
    async fn show_post_insertion_overlay(
        &self,
        tab: TabId,
        overlay: &PostInsertionOverlay,
    ) -> Result<(), CoreError>;
}

/// The generation backend seam. The current implementation is a deterministic
/// placeholder; a real model backend replaces it without any caller changes.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerationResult, CoreError>;
}

/// Channel a surface uses to reach the background coordinator.
#[async_trait]
pub trait BackgroundPort: Send + Sync {
    async fn send(&self, message: Value) -> Result<Value, CoreError>;
}
