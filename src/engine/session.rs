//! Curation session: the explicit context object owned by the driver.
//!
//! Holds the occurrence collection, the text, and the policy, and turns
//! operator commands into state transitions. Every transition runs to
//! completion before the next command is read. Persistence stays with the
//! driver; the session only reports when a save is due.

use std::str::FromStr;

use anyhow::Result;
use tracing::debug;

use crate::domain::{Annotation, FinderOutput};

use super::annotate::{set_annotation, AnnotateError, CurationPolicy, Propagation};
use super::stats::Stats;
use super::store::OccurrenceCollection;
use super::viewport::{Document, Viewport};

/// Operator commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    Annotate(Annotation),
    Save,
    Quit,
    ToggleExpress,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let cmd = match s.trim() {
            "" | "n" | "next" => Command::Next,
            "p" | "prev" | "back" => Command::Previous,
            "x" | "reject" => Command::Annotate(Annotation::NotName),
            "y" | "accept" => Command::Annotate(Annotation::Accepted),
            "u" | "uninomial" => Command::Annotate(Annotation::Uninomial),
            "g" | "genus" => Command::Annotate(Annotation::Genus),
            "s" | "species" => Command::Annotate(Annotation::Species),
            "d" | "doubtful" => Command::Annotate(Annotation::Doubtful),
            "w" | "save" => Command::Save,
            "q" | "quit" => Command::Quit,
            "e" | "express" => Command::ToggleExpress,
            other => anyhow::bail!("Unknown command: {}", other),
        };
        Ok(cmd)
    }
}

/// Result of one command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    /// The cursor moved
    pub moved: bool,

    /// At least one annotation changed
    pub changed: bool,

    /// Propagation performed by this command
    pub propagation: Propagation,

    /// Enough changes accumulated for an autosave
    pub autosave_due: bool,

    /// The operator asked for a save
    pub save_requested: bool,

    /// The operator asked to end the session
    pub quit: bool,
}

/// Session context for one curation run
#[derive(Debug, Clone)]
pub struct CurationSession {
    collection: OccurrenceCollection,
    document: Document,
    policy: CurationPolicy,
    express: bool,
    unsaved_changes: usize,
    /// Changes since the last save attempt, successful or not
    changes_since_attempt: usize,
    diagnostics: Vec<String>,
}

impl CurationSession {
    pub fn new(collection: OccurrenceCollection, document: Document, policy: CurationPolicy) -> Self {
        let express = policy.express;
        Self {
            collection,
            document,
            policy,
            express,
            unsaved_changes: 0,
            changes_since_attempt: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn collection(&self) -> &OccurrenceCollection {
        &self.collection
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn policy(&self) -> &CurationPolicy {
        &self.policy
    }

    pub fn is_express(&self) -> bool {
        self.express
    }

    /// Annotation-changing actions since the last successful save
    pub fn unsaved_changes(&self) -> usize {
        self.unsaved_changes
    }

    /// Dispatch one operator command
    pub fn apply(&mut self, command: Command) -> Result<Outcome, AnnotateError> {
        let outcome = match command {
            Command::Next => self.move_forward(),
            Command::Previous => self.move_backward(),
            Command::Annotate(annotation) => self.annotate(annotation)?,
            Command::Save => Outcome {
                save_requested: true,
                ..Default::default()
            },
            Command::Quit => Outcome {
                save_requested: true,
                quit: true,
                ..Default::default()
            },
            Command::ToggleExpress => {
                self.toggle_express();
                Outcome::default()
            }
        };
        debug!(?command, index = self.collection.current_index(), "Applied command");
        Ok(outcome)
    }

    /// Set the current occurrence's annotation (with propagation)
    pub fn annotate(&mut self, annotation: Annotation) -> Result<Outcome, AnnotateError> {
        let before = self.collection.current().annotation;
        let propagation = set_annotation(&mut self.collection, annotation, &self.policy)?;
        let changed = before != annotation || propagation.touched() > 0;
        Ok(self.finish(Outcome {
            changed,
            propagation,
            ..Default::default()
        }))
    }

    /// Accept an unreviewed occurrence and move on
    ///
    /// In express mode the cursor keeps going past occurrences that are
    /// already decided and stops at the next undecided one or the last one.
    pub fn move_forward(&mut self) -> Outcome {
        let mut outcome = Outcome::default();
        let current = self.collection.current().annotation;

        if current == Annotation::NotAssigned {
            let propagation =
                set_annotation(&mut self.collection, Annotation::Accepted, &self.policy)
                    .unwrap_or_default();
            outcome.changed = true;
            outcome.propagation = propagation;
        }

        let held = self.policy.hold_on_doubtful && current == Annotation::Doubtful;
        if !held {
            outcome.moved = self.collection.advance();
            if self.express && outcome.moved {
                while !self.collection.current().annotation.is_undecided()
                    && self.collection.advance()
                {}
            }
        }

        self.finish(outcome)
    }

    /// Step back one occurrence; annotations are never touched
    pub fn move_backward(&mut self) -> Outcome {
        Outcome {
            moved: self.collection.retreat(),
            ..Default::default()
        }
    }

    /// Flip express mode, returning the new state
    pub fn toggle_express(&mut self) -> bool {
        self.express = !self.express;
        self.express
    }

    /// Statistics over the reviewed prefix
    pub fn stats(&self) -> Stats {
        Stats::compute(&self.collection, &self.policy)
    }

    /// Pane windows for a pane of `pane_height` rows
    pub fn viewport(&self, pane_height: usize) -> Viewport {
        Viewport::compute(&self.collection, &self.document, pane_height)
    }

    /// Record a successful save
    pub fn mark_saved(&mut self) {
        self.unsaved_changes = 0;
        self.changes_since_attempt = 0;
    }

    /// Record a failed save; the next autosave waits a full interval
    pub fn mark_save_failed(&mut self) {
        self.changes_since_attempt = 0;
    }

    /// Keep a message for the end-of-session report (deduplicated)
    pub fn record_diagnostic(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !self.diagnostics.contains(&message) {
            self.diagnostics.push(message);
        }
    }

    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// The finder document to persist
    pub fn output(&self) -> &FinderOutput {
        self.collection.as_output()
    }

    fn finish(&mut self, mut outcome: Outcome) -> Outcome {
        if outcome.changed {
            self.unsaved_changes += 1;
            self.changes_since_attempt += 1;
        }
        outcome.autosave_due = self.policy.autosave_every > 0
            && self.changes_since_attempt >= self.policy.autosave_every;
        outcome
    }
}
