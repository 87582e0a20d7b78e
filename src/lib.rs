//! Markdown Preview
//!
//! An edit-to-render pipeline for live markdown preview.
//!
//! This library provides:
//! - A debounced, toggleable edit session with in-memory checkpoints
//! - A single-flight render stage that never shows stale content
//! - A memoizing preview renderer with failure fallback
//! - An async driver, file input and configuration for the `mdpv` binary

pub mod app;
pub mod config;
pub mod driver;
pub mod modeline;
pub mod preview;
pub mod render;
pub mod session;
pub mod watch;

// Re-exports for clean public API
pub use config::{Config, LivePreviewResume, SessionSettings};
pub use driver::{SessionCommand, SessionHandle, Snapshot, spawn_session};
pub use preview::{DisplayState, PreviewRenderer};
pub use render::{ComrakRenderer, DocumentTree, Render, RenderError};
pub use session::{EditSession, StatusLine};
