//! Content extraction — turns a page's DOM into a plain-text snapshot.
//!
//! Prefers `<article>`, then `<main>`, then the body minus navigation
//! landmarks. Output is always whitespace-normalized.

pub mod extractor;
pub mod guard;

pub use extractor::{collapse_whitespace, extract, extract_document};
pub use guard::is_extension_page;
