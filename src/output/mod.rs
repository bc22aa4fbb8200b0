pub mod formatter;

pub use formatter::{format_assessment, format_breakdown, should_use_colors};
