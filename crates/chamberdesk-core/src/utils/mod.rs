//! Utility functions for string formatting and manipulation.

pub mod format;

pub use format::{contains_ignore_case, date_part, format_date, format_number, truncate_string};
