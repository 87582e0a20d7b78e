use crate::preview::DisplayState;
use crate::session::{Generation, StatusLine};

/// A user action delivered to a running session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Whole-buffer replacement from the input surface
    Input(String),
    SetLivePreview(bool),
    SetAutoSave(bool),
    Save,
    UpdatePreview,
    Shutdown,
}

/// Everything the display surface needs, published after each transition
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub display: DisplayState,
    pub status: StatusLine,
    pub checkpoint: String,
    /// Generation of the render behind `display`
    pub render_generation: Generation,
}
