//! Messaging router — one-shot typed messages between the background,
//! content and panel contexts, plus per-window panel state.
//!
//! The browser itself is abstracted behind [`ExtensionHost`]; the
//! in-process [`ContentHub`] delivers tab messages to content scripts
//! running as independent tasks.

pub mod content;
pub mod host;
pub mod router;
pub mod types;

pub use content::{ContentHub, ContentRequest, ContentScript};
pub use host::ExtensionHost;
pub use router::MessageRouter;
pub use types::*;
