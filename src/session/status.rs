use serde::Serialize;

/// Read-only summary of an edit session for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusLine {
    /// Unicode scalar values in the text buffer
    pub chars: usize,
    pub lines: usize,
    /// Buffer size in KiB, rounded to two decimals
    pub size_kib: f64,
    pub live_preview: bool,
    pub auto_save: bool,
    /// A render is in flight
    pub rendering: bool,
    /// The text buffer differs from the checkpoint
    pub unsaved: bool,
}

impl StatusLine {
    pub fn describe(
        text: &str,
        checkpoint: &str,
        live_preview: bool,
        auto_save: bool,
        rendering: bool,
    ) -> Self {
        Self {
            chars: text.chars().count(),
            lines: text.split('\n').count(),
            size_kib: (text.len() as f64 / 1024.0 * 100.0).round() / 100.0,
            live_preview,
            auto_save,
            rendering,
            unsaved: text != checkpoint,
        }
    }
}

impl std::fmt::Display for StatusLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let on_off = |flag: bool| if flag { "on" } else { "off" };
        write!(
            f,
            "{} chars | {} lines | {:.2} KiB | live preview {} | autosave {} | {}",
            self.chars,
            self.lines,
            self.size_kib,
            on_off(self.live_preview),
            on_off(self.auto_save),
            if self.rendering { "rendering" } else { "rendered" }
        )?;
        if self.unsaved {
            write!(f, " | unsaved")?;
        }
        Ok(())
    }
}
