//! The background coordinator: receives tagged commands from UI surfaces,
//! routes them through the command registry, and drives the host and the
//! generation backend to produce each response.

mod dispatch;

pub use dispatch::{MenuItem, Router, RouterOutcome, SenderContext};
