//! Application wiring for the `mdpv` binary.
//!
//! Connects the input surfaces (watched file, stdin) to a spawned edit
//! session and writes every newly displayed document out as HTML.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::watch;

use crate::Config;
use crate::driver::{SessionCommand, SessionHandle, Snapshot, spawn_session};
use crate::modeline::detect_modeline;
use crate::preview::{DisplayState, PreviewRenderer};
use crate::render::{ComrakRenderer, DocumentTree};
use crate::session::EditSession;
use crate::watch::watch_file;

/// Document opened when no file is given
pub const WELCOME_TEXT: &str = "# Welcome to mdpv\n\nType some markdown to try it out...\n";

/// A line typed on the control channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Session(SessionCommand),
    Status,
    Checkpoint,
    Quit,
    /// Plain text, appended to the buffer when no file is being edited
    Text(String),
}

/// Parse one line of stdin input
pub fn parse_control(line: &str) -> Result<Control, String> {
    let Some(command) = line.trim_end().strip_prefix(':') else {
        return Ok(Control::Text(line.to_string()));
    };

    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default();
    let arg = words.next();

    let flag = |arg: Option<&str>| match arg {
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        _ => Err(format!("usage: :{} on|off", name)),
    };

    match name {
        "live" => Ok(Control::Session(SessionCommand::SetLivePreview(flag(arg)?))),
        "autosave" => Ok(Control::Session(SessionCommand::SetAutoSave(flag(arg)?))),
        "save" => Ok(Control::Session(SessionCommand::Save)),
        "update" => Ok(Control::Session(SessionCommand::UpdatePreview)),
        "status" => Ok(Control::Status),
        "checkpoint" => Ok(Control::Checkpoint),
        "quit" | "q" => Ok(Control::Quit),
        other => Err(format!("unknown command ':{}'", other)),
    }
}

/// Initialize env_logger from the configured level; `RUST_LOG` wins
pub fn init_logging(config: &Config) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.log_level),
    )
    .init();
}

/// Run the preview until `:quit` or the end of stdin
pub async fn run(config: Config) -> Result<()> {
    let initial = match &config.file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read document: {}", path.display()))?,
        None => WELCOME_TEXT.to_string(),
    };

    let mut settings = config.session.clone();
    let modeline = detect_modeline(&initial);
    if !modeline.is_empty() {
        log::info!("applying document modeline: {:?}", modeline);
        modeline.apply(&mut settings);
    }

    let renderer = ComrakRenderer::new().with_max_input_bytes(config.max_render_bytes);
    let handle = spawn_session(
        EditSession::new(initial.clone(), &settings),
        PreviewRenderer::new(renderer),
    );

    let file_input = match &config.file {
        Some(path) => Some(watch_file(path, initial.clone(), handle.sender())?),
        None => None,
    };

    let output = tokio::spawn(write_output(handle.subscribe(), config.out.clone()));

    let stdin_buffer = file_input.is_none().then_some(initial);
    read_controls(&handle, stdin_buffer).await?;

    drop(file_input);
    let session = handle.shutdown().await?;
    output.await.context("output task failed")??;

    if session.text() != session.checkpoint() {
        log::warn!("exiting with edits newer than the last checkpoint");
    }
    Ok(())
}

/// Process stdin lines until `:quit` or EOF.
///
/// `buffer` is the editable text when stdin is the input surface; plain lines
/// are appended to it and sent as a whole-buffer edit.
async fn read_controls(handle: &SessionHandle, mut buffer: Option<String>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let control = match parse_control(&line) {
            Ok(control) => control,
            Err(message) => {
                log::warn!("{}", message);
                continue;
            }
        };

        match control {
            Control::Session(command) => handle.send(command)?,
            Control::Status => {
                let status = serde_json::to_string(&handle.snapshot().status)?;
                stdout.write_all(format!("{}\n", status).as_bytes()).await?;
            }
            Control::Checkpoint => {
                let checkpoint = handle.snapshot().checkpoint;
                stdout.write_all(checkpoint.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
            }
            Control::Quit => break,
            Control::Text(text) => match buffer.as_mut() {
                Some(buffer) => {
                    buffer.push_str(&text);
                    buffer.push('\n');
                    handle.send(SessionCommand::Input(buffer.clone()))?;
                }
                None => log::warn!("editing a file; plain input is ignored"),
            },
        }
        stdout.flush().await?;
    }

    Ok(())
}

/// Write each newly displayed document until the session goes away
async fn write_output(
    mut snapshots: watch::Receiver<Snapshot>,
    out: Option<PathBuf>,
) -> Result<()> {
    let mut last_written: Option<Arc<DocumentTree>> = None;

    loop {
        let display = {
            let snapshot = snapshots.borrow_and_update();
            log::debug!("{}", snapshot.status);
            snapshot.display.clone()
        };

        match display {
            DisplayState::Pending => log::debug!("rendering..."),
            DisplayState::Document(document) => {
                let unchanged = last_written
                    .as_ref()
                    .is_some_and(|last| Arc::ptr_eq(last, &document));
                if !unchanged {
                    emit(&document, out.as_ref()).await?;
                    last_written = Some(document);
                }
            }
        }

        if snapshots.changed().await.is_err() {
            break;
        }
    }

    Ok(())
}

async fn emit(document: &DocumentTree, out: Option<&PathBuf>) -> Result<()> {
    match out {
        Some(path) => tokio::fs::write(path, document.html())
            .await
            .with_context(|| format!("Failed to write preview: {}", path.display())),
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(document.html().as_bytes()).await?;
            stdout.flush().await?;
            Ok(())
        }
    }
}
