//! Interactive curation driver.
//!
//! Prepares a session directory for the input, then reads line commands
//! and redraws the frame after each one until the operator quits.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{info, warn};

use crate::adapters::{CommandFinder, NameFinder};
use crate::config::paths;
use crate::config::{FinderConfig, ResolvedConfig};
use crate::domain::{compute_checksum, FinderOutput, RunMetadata, TOOL_VERSION};
use crate::engine::{
    prepare_finder_output, Command, CurationSession, Document, OccurrenceCollection, Outcome,
    StoreError,
};
use crate::persist::{PersistError, SessionStore};
use crate::render::{self, RenderOptions};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Where the text comes from and how to get its names
#[derive(Debug, Clone, Default)]
pub struct CurateRequest {
    /// Input text file; stdin when `None`
    pub input: Option<PathBuf>,

    /// Pre-computed finder output to use instead of running the finder
    pub names: Option<PathBuf>,
}

/// A session ready for the command loop
pub struct Prepared {
    pub session: CurationSession,
    pub store: SessionStore,
    pub meta: RunMetadata,
}

/// Run a curation session to completion
pub async fn run(request: CurateRequest, cfg: ResolvedConfig) -> Result<()> {
    let Some(mut prepared) = prepare(&request, &cfg).await? else {
        return Ok(());
    };
    let options = RenderOptions {
        pane_height: cfg.view.height,
        width: cfg.view.width,
        color: cfg.view.color,
    };

    let reader = command_reader(request.input.is_none()).await?;
    drive(
        &mut prepared.session,
        &prepared.store,
        &mut prepared.meta,
        reader,
        &options,
    )
    .await?;
    report(&prepared.session, &prepared.store);
    Ok(())
}

/// Lock the session directory, then resume it or import fresh finder output.
///
/// Stale data is moved aside before importing. Returns `None` when there is
/// nothing to curate.
pub async fn prepare(request: &CurateRequest, cfg: &ResolvedConfig) -> Result<Option<Prepared>> {
    let raw = read_input(request.input.as_deref()).await?;
    let text = String::from_utf8(raw.clone()).context("Input text is not valid UTF-8")?;

    let dir = paths::session_dir_for(request.input.as_deref());
    let mut store = SessionStore::open(&dir)?;
    store.lock()?;

    let checksum = compute_checksum(&raw);
    let staleness = store.check_staleness(&checksum, TOOL_VERSION)?;
    if let Some(warning) = staleness.warning() {
        eprintln!("{}", warning);
    }
    if let (true, Some(previous)) = (staleness.is_stale(), staleness.previous()) {
        for moved in store.backup_previous(&previous.save_timestamp)? {
            eprintln!("Previous data kept as {}", moved.display());
        }
    }

    let (collection, text, meta) = if store.has_session() {
        let collection = match store.load_collection() {
            Ok(c) => c,
            Err(PersistError::Invalid(StoreError::Empty)) => {
                println!("Nothing to curate in {}", dir.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let stored_text = store.load_text()?;
        let meta = match store.load_metadata()? {
            Some(m) => m,
            None => RunMetadata::new(stored_text.as_bytes()),
        };
        (collection, stored_text, meta)
    } else {
        let found = find_names(&cfg.finder, request.names.as_deref(), &text).await?;
        let output = prepare_finder_output(found, &cfg.policy);
        let meta = RunMetadata::new(&raw);
        store.save_text(&text)?;
        store.save_names(&output)?;
        store.save_metadata(&meta)?;
        if output.names.is_empty() {
            println!("Nothing to curate in {}", dir.display());
            return Ok(None);
        }
        (OccurrenceCollection::new(output)?, text, meta)
    };

    let document = Document::from_text(&text);
    collection.validate_spans(document.len())?;
    info!(
        dir = %dir.display(),
        total = collection.len(),
        current = collection.current_index(),
        "Session ready"
    );

    let session = CurationSession::new(collection, document, cfg.policy.clone());
    Ok(Some(Prepared {
        session,
        store,
        meta,
    }))
}

/// Read the raw input bytes from a file or stdin
async fn read_input(input: Option<&Path>) -> Result<Vec<u8>> {
    match input {
        Some(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        None => {
            if std::io::stdin().is_terminal() {
                anyhow::bail!("No input provided. Pass a file or pipe text to stdin");
            }
            let mut buffer = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buffer)
                .await
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

/// Finder output from a names file, or from the configured finder
async fn find_names(finder: &FinderConfig, names: Option<&Path>, text: &str) -> Result<FinderOutput> {
    if let Some(path) = names {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read names file: {}", path.display()))?;
        return serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse names file: {}", path.display()));
    }

    let command = CommandFinder::new(finder.command.clone(), finder.args.clone());
    let finder_ref: &dyn NameFinder = &command;
    info!(finder = finder_ref.name(), "Finding names");
    finder_ref
        .find(text, Duration::from_secs(finder.timeout_seconds))
        .await
}

/// Source of operator commands.
///
/// When the text itself was piped in, stdin is exhausted and commands come
/// from the controlling terminal instead.
async fn command_reader(input_from_stdin: bool) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    if input_from_stdin {
        let tty = tokio::fs::File::open("/dev/tty")
            .await
            .context("Text was read from stdin and no terminal is available for commands")?;
        Ok(Box::new(BufReader::new(tty)))
    } else {
        Ok(Box::new(BufReader::new(tokio::io::stdin())))
    }
}

/// Command loop: one command per line, EOF quits
pub async fn drive<R>(
    session: &mut CurationSession,
    store: &SessionStore,
    meta: &mut RunMetadata,
    reader: R,
    options: &RenderOptions,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    draw(session, options, None);

    loop {
        let command = match lines.next_line().await.context("Failed to read command")? {
            Some(line) => match line.parse::<Command>() {
                Ok(command) => command,
                Err(e) => {
                    draw(session, options, Some(&e.to_string()));
                    continue;
                }
            },
            None => Command::Quit,
        };

        let outcome = match session.apply(command) {
            Ok(outcome) => outcome,
            Err(e) => {
                draw(session, options, Some(&e.to_string()));
                continue;
            }
        };

        if outcome.save_requested || outcome.autosave_due {
            save(session, store, meta);
        }
        if outcome.quit {
            break;
        }
        draw(session, options, status_message(session, &outcome).as_deref());
    }
    Ok(())
}

/// Save, turning a failure into a session diagnostic
fn save(session: &mut CurationSession, store: &SessionStore, meta: &mut RunMetadata) {
    match store.save(session.output(), meta) {
        Ok(()) => session.mark_saved(),
        Err(e) => {
            warn!(error = %e, "Save failed");
            session.mark_save_failed();
            session.record_diagnostic(format!("Save failed: {}", e));
        }
    }
}

fn status_message(session: &CurationSession, outcome: &Outcome) -> Option<String> {
    if outcome.save_requested || outcome.autosave_due {
        if session.unsaved_changes() == 0 {
            return Some("Saved".to_string());
        }
        return Some(format!(
            "Save failed, {} changes not on disk yet",
            session.unsaved_changes()
        ));
    }
    let p = outcome.propagation;
    if p.touched() > 0 {
        return Some(format!(
            "{}: {} later occurrences updated, {} reverted",
            session.collection().current().name,
            p.updated,
            p.reverted
        ));
    }
    None
}

fn draw(session: &CurationSession, options: &RenderOptions, message: Option<&str>) {
    if std::io::stdout().is_terminal() {
        print!("{}", CLEAR_SCREEN);
    }
    print!("{}", render::frame(session, options));
    if let Some(message) = message {
        println!("{}", message);
    }
    print!("> ");
    let _ = std::io::Write::flush(&mut std::io::stdout());
}

/// End-of-session report
fn report(session: &CurationSession, store: &SessionStore) {
    println!();
    println!("{}", render::stats_line(&session.stats(), false));
    println!("Session directory: {}", store.dir().display());
    if session.diagnostics().is_empty() {
        return;
    }
    println!("Problems during this session:");
    for diagnostic in session.diagnostics() {
        println!("  - {}", diagnostic);
    }
}
