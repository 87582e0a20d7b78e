//! Session Driver
//!
//! Async event loop around [`crate::session::EditSession`]: commands come in
//! over a channel, timers are slept on, and each change is published as a
//! [`Snapshot`].

pub mod command;
pub mod event_loop;
pub mod handle;

pub use command::{SessionCommand, Snapshot};
pub use event_loop::spawn_session;
pub use handle::{SessionHandle, SessionSender};
