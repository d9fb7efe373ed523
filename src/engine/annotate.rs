//! Annotation state machine.
//!
//! Applies the operator's verdict to the current occurrence and, near the
//! review edge, cascades accept/reject decisions to later occurrences of the
//! same name. Re-deciding an already accepted or rejected occurrence undoes
//! that cascade instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::{Annotation, FinderOutput, Occurrence};

use super::store::OccurrenceCollection;

/// Default propagation look-back tolerance (positions behind the edge)
pub const DEFAULT_LOOKBACK: usize = 3;

/// Default number of annotation-changing actions between autosaves
pub const DEFAULT_AUTOSAVE_EVERY: usize = 30;

fn default_odds_high() -> f64 {
    100.0
}
fn default_odds_low() -> f64 {
    1.0
}
fn default_true() -> bool {
    true
}
fn default_lookback() -> usize {
    DEFAULT_LOOKBACK
}
fn default_autosave_every() -> usize {
    DEFAULT_AUTOSAVE_EVERY
}

/// Thresholds and heuristics governing a curation session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurationPolicy {
    /// Scored candidates below this are doubtful
    #[serde(default = "default_odds_high")]
    pub odds_high: f64,

    /// Scored candidates below this are dropped at import
    #[serde(default = "default_odds_low")]
    pub odds_low: f64,

    /// Start sessions with express navigation on
    #[serde(default = "default_true")]
    pub express: bool,

    /// How far behind the edge propagation is still allowed
    #[serde(default = "default_lookback")]
    pub lookback: usize,

    /// Annotation-changing actions between autosaves (0 disables)
    #[serde(default = "default_autosave_every")]
    pub autosave_every: usize,

    /// Refuse to move forward from a Doubtful occurrence
    #[serde(default)]
    pub hold_on_doubtful: bool,
}

impl Default for CurationPolicy {
    fn default() -> Self {
        Self {
            odds_high: default_odds_high(),
            odds_low: default_odds_low(),
            express: true,
            lookback: DEFAULT_LOOKBACK,
            autosave_every: DEFAULT_AUTOSAVE_EVERY,
            hold_on_doubtful: false,
        }
    }
}

impl CurationPolicy {
    /// A scored candidate whose score stays below `odds_high`
    pub fn is_doubtful(&self, occ: &Occurrence) -> bool {
        occ.is_scored() && occ.score < self.odds_high
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotateError {
    #[error("NotAssigned cannot be set by the operator")]
    NotAssignedTarget,
}

/// What a single annotation did to later duplicates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Propagation {
    /// Duplicates that inherited the new verdict
    pub updated: usize,

    /// Duplicates returned to their pre-propagation state
    pub reverted: usize,
}

impl Propagation {
    pub fn touched(&self) -> usize {
        self.updated + self.reverted
    }
}

/// Annotate the current occurrence using the collection's own review edge
pub fn set_annotation(
    coll: &mut OccurrenceCollection,
    annotation: Annotation,
    policy: &CurationPolicy,
) -> Result<Propagation, AnnotateError> {
    let edge = coll.last_reviewed_index();
    set_annotation_with_edge(coll, annotation, edge, policy)
}

/// Annotate the current occurrence against an explicit review edge
pub fn set_annotation_with_edge(
    coll: &mut OccurrenceCollection,
    annotation: Annotation,
    edge: usize,
    policy: &CurationPolicy,
) -> Result<Propagation, AnnotateError> {
    if annotation == Annotation::NotAssigned {
        return Err(AnnotateError::NotAssignedTarget);
    }

    let index = coll.current_index();
    let old = coll.current().annotation;
    coll.set_annotation_at(index, annotation);

    let near_edge = index + policy.lookback >= edge;
    if !near_edge || !annotation.is_binary_verdict() {
        return Ok(Propagation::default());
    }

    let name = coll.current().name.clone();
    let mut report = Propagation::default();
    for dup in coll.duplicate_indices_after(index, &name) {
        if old.is_undecided() {
            coll.set_annotation_at(dup, annotation);
            report.updated += 1;
        } else {
            let restored = match coll.get(dup) {
                Some(occ) if policy.is_doubtful(occ) => Annotation::Doubtful,
                _ => Annotation::NotAssigned,
            };
            coll.set_annotation_at(dup, restored);
            report.reverted += 1;
        }
    }

    if report.touched() > 0 {
        debug!(
            name = %name,
            index,
            updated = report.updated,
            reverted = report.reverted,
            "Propagated annotation to duplicates"
        );
    }
    Ok(report)
}

/// Prepare fresh finder output for a new session
///
/// Drops scored candidates under `odds_low`, marks the remaining doubtful
/// ones, and resets the cursor.
pub fn prepare_finder_output(mut output: FinderOutput, policy: &CurationPolicy) -> FinderOutput {
    output
        .names
        .retain(|occ| !(occ.is_scored() && occ.score < policy.odds_low));

    for occ in output.names.iter_mut() {
        if occ.annotation == Annotation::NotAssigned && policy.is_doubtful(occ) {
            occ.annotation = Annotation::Doubtful;
        }
    }

    output.meta.total_names = output.names.len();
    output.meta.current_name = 0;
    output
}
