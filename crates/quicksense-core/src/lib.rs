//! QuickSense Core — shared types, error taxonomy, configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::{DataPaths, QuickSenseConfig};
pub use error::{Error, ErrorKind, Result};
pub use types::*;
