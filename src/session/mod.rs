//! Edit Session Core
//!
//! The edit-to-render pipeline: a debouncer in front of the text buffer and a
//! single-flight render stage behind it, both owned by [`EditSession`].
//! Everything here is synchronous and clocked by the caller; the async event
//! loop lives in [`crate::driver`].

pub mod debounce;
pub mod editor;
pub mod render_stage;
pub mod status;
pub mod types;

pub use debounce::{Debouncer, Fired};
pub use editor::EditSession;
pub use render_stage::RenderStage;
pub use status::StatusLine;
pub use types::{Generation, InputRoute, Submission, TickOutcome};
