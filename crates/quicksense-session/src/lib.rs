//! Panel session — owns the chat transcript and drives the gateway.
//!
//! Independent of any view layer: views subscribe to state changes and
//! call the session's operations in response to user input.

pub mod prompts;
pub mod session;
pub mod state;
pub mod summary;

pub use session::PanelSession;
pub use state::*;
pub use summary::{parse_summary, KeyPoint, SummaryResult};
