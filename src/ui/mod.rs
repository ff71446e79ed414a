//! Terminal output for status updates

pub mod formatter;

pub use formatter::{display_details, display_error, display_status, display_success};
