//! Modeline Detection
//!
//! Documents can carry their own toggle defaults in an HTML comment near the
//! top or bottom of the file:
//!
//! ```text
//! <!-- mdpv: live-preview=off autosave=on -->
//! ```

use regex::Regex;

use crate::config::SessionSettings;

const MODELINE_PATTERN: &str = r"<!--\s*mdpv:(.*?)-->";
const SETTING_PATTERN: &str = r"([A-Za-z_-]+)\s*=\s*([A-Za-z]+)";

/// Toggle overrides found in a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelineSettings {
    pub live_preview: Option<bool>,
    pub auto_save: Option<bool>,
}

impl ModelineSettings {
    pub fn is_empty(&self) -> bool {
        self.live_preview.is_none() && self.auto_save.is_none()
    }

    /// Override the toggles in `settings` that the modeline sets
    pub fn apply(&self, settings: &mut SessionSettings) {
        if let Some(live_preview) = self.live_preview {
            settings.live_preview = live_preview;
        }
        if let Some(auto_save) = self.auto_save {
            settings.auto_save = auto_save;
        }
    }
}

/// Detect a modeline in the first or last five lines of `content`
pub fn detect_modeline(content: &str) -> ModelineSettings {
    let lines: Vec<&str> = content.lines().collect();
    let check_lines: Vec<&str> = if lines.len() <= 10 {
        lines
    } else {
        let mut check = Vec::with_capacity(10);
        check.extend_from_slice(&lines[..5]);
        check.extend_from_slice(&lines[lines.len() - 5..]);
        check
    };

    let mut settings = ModelineSettings::default();
    let (Ok(modeline_re), Ok(setting_re)) =
        (Regex::new(MODELINE_PATTERN), Regex::new(SETTING_PATTERN))
    else {
        return settings;
    };

    for line in check_lines {
        let Some(captures) = modeline_re.captures(line) else {
            continue;
        };
        let Some(body) = captures.get(1) else {
            continue;
        };

        for setting in setting_re.captures_iter(body.as_str()) {
            let (_, [key, value]) = setting.extract();
            let Some(flag) = parse_flag(value) else {
                log::debug!("modeline: ignoring '{}={}'", key, value);
                continue;
            };
            match key.to_ascii_lowercase().replace('_', "-").as_str() {
                "live-preview" | "live" => settings.live_preview = Some(flag),
                "autosave" | "auto-save" => settings.auto_save = Some(flag),
                other => log::debug!("modeline: unknown setting '{}'", other),
            }
        }
    }

    settings
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}
