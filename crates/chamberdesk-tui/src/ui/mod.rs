//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Main frame rendering, layout and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Color scheme and text styling
//! - `tabs`: Tab-specific content rendering (dashboard, companies, news, notices)

pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
