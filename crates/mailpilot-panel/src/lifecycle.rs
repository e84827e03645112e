use serde::{Deserialize, Serialize};

/// Untouched post-insertion panels disappear on their own after this long.
pub const POST_INSERTION_AUTO_DISMISS_MS: u64 = 30_000;

/// Which prompt panel variant is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelMode {
    Reply,
    Summary,
}

/// Contents of the panel's result region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelOutput {
    Empty,
    Loading,
    Result(String),
    Error(String),
}

/// The prompt-input panel shown over a displayed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPanel {
    pub mode: PanelMode,
    pub input: String,
    pub output: PanelOutput,
}

/// The control panel shown in a compose window after generated text was
/// inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostInsertionPanel {
    pub generated_text: String,
    pub original_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelKind {
    Prompt(PromptPanel),
    PostInsertion(PostInsertionPanel),
}

/// Why a panel went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    CloseControl,
    OutsideClick,
    EscapeKey,
    ActionResolved,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelInstance {
    pub kind: PanelKind,
    pub shown_at_ms: u64,
    pub auto_dismiss_at_ms: Option<u64>,
}

/// Per-document owner of the single overlay slot.
///
/// Create/replace/destroy are the only mutations; replacement always removes
/// the old instance before the new one exists. Time is injected as
/// milliseconds so expiry is deterministic under test.
#[derive(Debug, Default)]
pub struct OverlayManager {
    current: Option<PanelInstance>,
}

impl OverlayManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&PanelInstance> {
        self.current.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.current.is_some()
    }

    pub fn prompt_panel(&self) -> Option<&PromptPanel> {
        match &self.current {
            Some(PanelInstance {
                kind: PanelKind::Prompt(panel),
                ..
            }) => Some(panel),
            _ => None,
        }
    }

    pub fn prompt_panel_mut(&mut self) -> Option<&mut PromptPanel> {
        match &mut self.current {
            Some(PanelInstance {
                kind: PanelKind::Prompt(panel),
                ..
            }) => Some(panel),
            _ => None,
        }
    }

    /// Show a fresh prompt panel. Returns true when an existing panel was
    /// replaced.
    pub fn show_prompt(&mut self, mode: PanelMode, now_ms: u64) -> bool {
        let replaced = self.current.take().is_some();
        self.current = Some(PanelInstance {
            kind: PanelKind::Prompt(PromptPanel {
                mode,
                input: String::new(),
                output: PanelOutput::Empty,
            }),
            shown_at_ms: now_ms,
            auto_dismiss_at_ms: None,
        });
        replaced
    }

    /// Show the post-insertion control panel with its auto-dismiss deadline.
    pub fn show_post_insertion(
        &mut self,
        generated_text: impl Into<String>,
        original_prompt: impl Into<String>,
        now_ms: u64,
    ) -> bool {
        let replaced = self.current.take().is_some();
        self.current = Some(PanelInstance {
            kind: PanelKind::PostInsertion(PostInsertionPanel {
                generated_text: generated_text.into(),
                original_prompt: original_prompt.into(),
            }),
            shown_at_ms: now_ms,
            auto_dismiss_at_ms: Some(now_ms + POST_INSERTION_AUTO_DISMISS_MS),
        });
        replaced
    }

    /// Destroy the current panel. Returns true when one was visible.
    pub fn dismiss(&mut self, reason: DismissReason) -> bool {
        let dismissed = self.current.take().is_some();
        if dismissed {
            tracing::debug!(?reason, "panel dismissed");
        }
        dismissed
    }

    /// Expire a panel whose auto-dismiss deadline has passed. Returns true
    /// when the panel was removed by this call.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let expired = matches!(
            &self.current,
            Some(PanelInstance {
                auto_dismiss_at_ms: Some(deadline),
                ..
            }) if now_ms >= *deadline
        );
        if expired {
            self.dismiss(DismissReason::TimedOut);
        }
        expired
    }
}
