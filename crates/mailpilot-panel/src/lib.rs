//! Overlay panel lifecycle and the in-message surface component.
//!
//! A document hosts at most one panel at a time. Showing a new panel always
//! destroys the existing one first; dismissal happens through the close
//! control, a click outside the panel, the escape key, a resolved action, or
//! (post-insertion panels only) a 30 second timeout.

mod lifecycle;
mod surface;

pub use lifecycle::{
    DismissReason, OverlayManager, PanelInstance, PanelKind, PanelMode, PanelOutput,
    PostInsertionPanel, PromptPanel, POST_INSERTION_AUTO_DISMISS_MS,
};
pub use surface::MessageSurface;
