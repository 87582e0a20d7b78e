//! Configuration management for the markdown preview.
//!
//! Handles:
//! - Command-line argument parsing
//! - The optional TOML config file
//! - Session timing and toggle defaults
//!
//! Precedence: built-in defaults < config file < command line.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

/// Default quiet period before a live edit is committed
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);
/// Default simulated render latency
pub const DEFAULT_RENDER_DELAY: Duration = Duration::from_millis(100);

/// Command-line arguments for the markdown preview
#[derive(Debug, Parser)]
#[command(name = "mdpv")]
#[command(about = "Live markdown preview with debounced rendering")]
#[command(version)]
pub struct Args {
    /// Markdown file to open and watch
    pub file: Option<PathBuf>,

    /// Write rendered HTML here instead of stdout
    #[arg(long, help = "File receiving the rendered HTML")]
    pub out: Option<PathBuf>,

    /// Explicit config file
    #[arg(long, help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Quiet period in milliseconds before a live edit commits")]
    pub quiet_period_ms: Option<u64>,

    #[arg(long, help = "Simulated render latency in milliseconds")]
    pub render_delay_ms: Option<u64>,

    #[arg(long, help = "Start with live preview disabled")]
    pub no_live_preview: bool,

    #[arg(long, help = "Start with autosave disabled")]
    pub no_auto_save: bool,

    #[arg(long, help = "Render immediately when live preview is switched back on")]
    pub render_on_resume: bool,

    #[arg(long, help = "Refuse to render documents larger than this many bytes")]
    pub max_render_bytes: Option<usize>,

    /// Log level for the preview
    #[arg(long, help = "Log level (trace, debug, info, warn, error)")]
    pub log_level: Option<String>,
}

/// What toggling live preview back on does with the current buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LivePreviewResume {
    /// Nothing happens until the next edit commits.
    #[default]
    WaitForEdit,
    /// The buffer is submitted for rendering right away.
    RenderNow,
}

/// Timing and initial toggles for one edit session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub quiet_period: Duration,
    pub render_delay: Duration,
    pub live_preview: bool,
    pub auto_save: bool,
    pub live_preview_resume: LivePreviewResume,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            quiet_period: DEFAULT_QUIET_PERIOD,
            render_delay: DEFAULT_RENDER_DELAY,
            live_preview: true,
            auto_save: true,
            live_preview_resume: LivePreviewResume::default(),
        }
    }
}

/// Settings as they appear in the config file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub quiet_period_ms: Option<u64>,
    pub render_delay_ms: Option<u64>,
    pub live_preview: Option<bool>,
    pub auto_save: Option<bool>,
    pub live_preview_resume: Option<LivePreviewResume>,
    pub max_render_bytes: Option<usize>,
    pub log_level: Option<String>,
}

impl FileConfig {
    /// Load and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content, Some(path))
    }

    fn parse(content: &str, source_path: Option<&Path>) -> Result<Self> {
        toml::from_str(content).with_context(|| match source_path {
            Some(path) => format!("Failed to parse config TOML: {}", path.display()),
            None => "Failed to parse config TOML".to_string(),
        })
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub session: SessionSettings,
    /// Document to open
    pub file: Option<PathBuf>,
    /// HTML output destination
    pub out: Option<PathBuf>,
    pub max_render_bytes: Option<usize>,
    pub log_level: String,
    /// Config file that was loaded, if any
    pub config_path: Option<PathBuf>,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        // An explicit --config must exist; the default location is optional
        let config_path = match &args.config {
            Some(path) => Some(path.clone()),
            None => default_config_path().filter(|path| path.exists()),
        };

        let file_config = match &config_path {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let mut config = Self::resolve(args, file_config);
        config.config_path = config_path;
        Ok(config)
    }

    /// Layer command-line arguments over file settings over defaults
    pub fn resolve(args: Args, file: FileConfig) -> Self {
        let defaults = SessionSettings::default();

        let quiet_period = args
            .quiet_period_ms
            .or(file.quiet_period_ms)
            .map(Duration::from_millis)
            .unwrap_or(defaults.quiet_period);
        let render_delay = args
            .render_delay_ms
            .or(file.render_delay_ms)
            .map(Duration::from_millis)
            .unwrap_or(defaults.render_delay);

        let live_preview =
            !args.no_live_preview && file.live_preview.unwrap_or(defaults.live_preview);
        let auto_save = !args.no_auto_save && file.auto_save.unwrap_or(defaults.auto_save);

        let live_preview_resume = if args.render_on_resume {
            LivePreviewResume::RenderNow
        } else {
            file.live_preview_resume.unwrap_or(defaults.live_preview_resume)
        };

        Config {
            session: SessionSettings {
                quiet_period,
                render_delay,
                live_preview,
                auto_save,
                live_preview_resume,
            },
            file: args.file,
            out: args.out,
            max_render_bytes: args.max_render_bytes.or(file.max_render_bytes),
            log_level: args
                .log_level
                .or(file.log_level)
                .unwrap_or_else(|| "info".to_string()),
            config_path: None,
        }
    }
}

/// `$CONFIG_DIR/mdpv/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mdpv").join("config.toml"))
}
