//! Command-line interface for the curator.
//!
//! Provides commands for curating a text interactively, printing the
//! statistics of a saved session, inspecting its progress, and showing the
//! resolved configuration.

use std::collections::HashMap;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::adapters::{CommandFinder, NameFinder};
use crate::config::{self, ResolvedConfig};
use crate::domain::Annotation;
use crate::engine::Stats;
use crate::persist::SessionStore;
use crate::render;

pub mod curate;

/// curator - Interactive curation of scientific-name occurrences
#[derive(Parser, Debug)]
#[command(name = "curator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Curate the names found in a text
    Curate {
        /// Input text file (reads from stdin if not provided)
        input: Option<PathBuf>,

        /// Use this finder output instead of running the finder
        #[arg(long)]
        names: Option<PathBuf>,

        /// Pane height in rows
        #[arg(long)]
        height: Option<usize>,

        /// Terminal width in columns
        #[arg(long)]
        width: Option<usize>,

        /// Skip over already decided occurrences when moving forward
        #[arg(long, overrides_with = "no_express")]
        express: bool,

        /// Stop at every occurrence when moving forward
        #[arg(long)]
        no_express: bool,

        /// Disable ANSI colours
        #[arg(long)]
        no_color: bool,

        /// Scored candidates below this are doubtful
        #[arg(long)]
        odds_high: Option<f64>,

        /// Scored candidates below this are dropped
        #[arg(long)]
        odds_low: Option<f64>,
    },

    /// Print precision, recall and percentages of a saved session
    Stats {
        /// Session directory (e.g. book.txt_curator)
        session_dir: PathBuf,
    },

    /// Show metadata and progress of a saved session
    Status {
        /// Session directory (e.g. book.txt_curator)
        session_dir: PathBuf,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Command-line overrides for the `curate` command
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overrides {
    pub height: Option<usize>,
    pub width: Option<usize>,
    pub express: Option<bool>,
    pub no_color: bool,
    pub odds_high: Option<f64>,
    pub odds_low: Option<f64>,
}

impl Overrides {
    /// Layer the flags on top of the file and environment configuration
    pub fn apply(&self, mut cfg: ResolvedConfig) -> ResolvedConfig {
        if let Some(height) = self.height {
            cfg.view.height = height;
        }
        if let Some(width) = self.width {
            cfg.view.width = width;
        }
        if let Some(express) = self.express {
            cfg.policy.express = express;
        }
        if self.no_color {
            cfg.view.color = false;
        }
        if let Some(odds_high) = self.odds_high {
            cfg.policy.odds_high = odds_high;
        }
        if let Some(odds_low) = self.odds_low {
            cfg.policy.odds_low = odds_low;
        }
        cfg
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Curate {
                input,
                names,
                height,
                width,
                express,
                no_express,
                no_color,
                odds_high,
                odds_low,
            } => {
                let overrides = Overrides {
                    height,
                    width,
                    express: match (express, no_express) {
                        (true, _) => Some(true),
                        (_, true) => Some(false),
                        _ => None,
                    },
                    no_color: no_color || !std::io::stdout().is_terminal(),
                    odds_high,
                    odds_low,
                };
                let cfg = overrides.apply(config::config()?.clone());
                curate::run(curate::CurateRequest { input, names }, cfg).await
            }
            Commands::Stats { session_dir } => show_stats(&session_dir),
            Commands::Status { session_dir } => show_status(&session_dir),
            Commands::Config => show_config().await,
        }
    }
}

fn open_existing(session_dir: &Path) -> Result<SessionStore> {
    if !session_dir.is_dir() {
        anyhow::bail!("Session directory not found: {}", session_dir.display());
    }
    Ok(SessionStore::open(session_dir)?)
}

/// Print the stats line of a saved session
fn show_stats(session_dir: &Path) -> Result<()> {
    let cfg = config::config()?;
    let store = open_existing(session_dir)?;
    let coll = store.load_collection()?;

    let stats = Stats::compute(&coll, &cfg.policy);
    let color = cfg.view.color && std::io::stdout().is_terminal();
    println!("{}", render::stats_line(&stats, color));
    Ok(())
}

/// Show metadata, progress and annotation histogram of a saved session
fn show_status(session_dir: &Path) -> Result<()> {
    let store = open_existing(session_dir)?;
    let coll = store.load_collection()?;

    println!("Session: {}", store.dir().display());
    match store.load_metadata()? {
        Some(meta) => {
            println!("Checksum: {}", meta.text_checksum);
            println!("Curator version: {}", meta.tool_version);
            println!("Last saved: {}", meta.save_timestamp);
        }
        None => println!("Metadata: (missing)"),
    }
    println!(
        "Progress: {}/{}",
        coll.current_index() + 1,
        coll.len()
    );

    let histogram = annotation_histogram(coll.occurrences().iter().map(|o| o.annotation));
    println!("\nAnnotations:");
    for annotation in Annotation::ALL {
        let count = histogram.get(&annotation).copied().unwrap_or(0);
        println!("  {:<12} {}", annotation.label(), count);
    }

    Ok(())
}

fn annotation_histogram(annotations: impl Iterator<Item = Annotation>) -> HashMap<Annotation, usize> {
    let mut counts = HashMap::new();
    for annotation in annotations {
        *counts.entry(annotation).or_insert(0) += 1;
    }
    counts
}

/// Show the resolved configuration (for debugging)
async fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("Curator Configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Curation:");
    println!("  Odds high:        {}", cfg.policy.odds_high);
    println!("  Odds low:         {}", cfg.policy.odds_low);
    println!("  Express:          {}", cfg.policy.express);
    println!("  Lookback:         {}", cfg.policy.lookback);
    println!("  Autosave every:   {}", cfg.policy.autosave_every);
    println!("  Hold on doubtful: {}", cfg.policy.hold_on_doubtful);
    println!();

    let finder = CommandFinder::new(cfg.finder.command.clone(), cfg.finder.args.clone());
    let available = match finder.health_check().await {
        Ok(()) => "available".to_string(),
        Err(e) => format!("unavailable ({})", e),
    };
    println!("Finder:");
    println!("  Command: {} {}", finder.binary_path(), cfg.finder.args.join(" "));
    println!("  Timeout: {}s", cfg.finder.timeout_seconds);
    println!("  Status:  {}", available);
    println!();
    println!("View:");
    println!("  Height: {}", cfg.view.height);
    println!("  Width:  {}", cfg.view.width);
    println!("  Color:  {}", cfg.view.color);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_curate_flags() {
        let cli = Cli::try_parse_from([
            "curator", "curate", "book.txt", "--height", "30", "--no-express", "--no-color",
        ])
        .unwrap();

        match cli.command {
            Commands::Curate {
                input,
                height,
                express,
                no_express,
                no_color,
                ..
            } => {
                assert_eq!(input, Some(PathBuf::from("book.txt")));
                assert_eq!(height, Some(30));
                assert!(!express);
                assert!(no_express);
                assert!(no_color);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_stats_requires_dir() {
        assert!(Cli::try_parse_from(["curator", "stats"]).is_err());
        assert!(Cli::try_parse_from(["curator", "stats", "book.txt_curator"]).is_ok());
    }

    #[test]
    fn test_overrides_win() {
        let overrides = Overrides {
            height: Some(20),
            express: Some(false),
            no_color: true,
            odds_low: Some(3.0),
            ..Default::default()
        };
        let cfg = overrides.apply(ResolvedConfig::default());

        assert_eq!(cfg.view.height, 20);
        assert_eq!(cfg.view.width, 120);
        assert!(!cfg.policy.express);
        assert!(!cfg.view.color);
        assert_eq!(cfg.policy.odds_low, 3.0);
        assert_eq!(cfg.policy.odds_high, 100.0);
    }

    #[test]
    fn test_annotation_histogram() {
        let counts = annotation_histogram(
            [Annotation::Accepted, Annotation::NotName, Annotation::Accepted].into_iter(),
        );
        assert_eq!(counts.get(&Annotation::Accepted), Some(&2));
        assert_eq!(counts.get(&Annotation::NotName), Some(&1));
        assert_eq!(counts.get(&Annotation::Doubtful), None);
    }
}
