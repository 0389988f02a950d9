//! Output formatting for sampler runs and Savage–Dickey results.
//!
//! Terminal output uses ANSI colors and box drawing. Machine-readable output
//! is available through the `serde` feature on the result types themselves.

mod terminal;

pub use terminal::{format_sddr, format_summary};
