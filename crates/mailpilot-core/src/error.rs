use thiserror::Error;

/// Error taxonomy for the coordinator. Handler failures are always resolved
/// to a response value at the router boundary; a thrown error in a message
/// listener would make the host treat the command as unhandled and lose the
/// response.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("dependency unavailable: {0}")]
    DependencyUnavailable(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("No suitable tab available")]
    NoSuitableTab,
    #[error("No message currently displayed")]
    NoMessageDisplayed,
    #[error("No compose window found")]
    NoComposeWindow,
    #[error("unknown command '{command_id}'")]
    UnknownCommand { command_id: String },
    #[error("duplicate command id '{command_id}'")]
    DuplicateCommandId { command_id: String },
    #[error("invalid arguments for '{command_id}': {reason}")]
    InvalidCommandArgs { command_id: String, reason: String },
    #[error("generation failed: {0}")]
    Generation(String),
}
