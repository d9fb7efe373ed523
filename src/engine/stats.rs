//! Review statistics over the reviewed prefix of a session.
//!
//! Occurrences are grouped by name so that duplicates of one name count
//! once per verdict kind. Percentages are apportioned with the largest
//! remainder method so the four buckets always add up to 100.

use std::collections::HashMap;

use crate::domain::{Annotation, Occurrence};

use super::annotate::CurationPolicy;
use super::store::OccurrenceCollection;

/// Verdict flags collected for one unique name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WordState {
    pub accepted: bool,
    pub rejected: bool,
    pub modified: bool,
    pub doubtful: bool,
}

impl WordState {
    fn record(&mut self, occ: &Occurrence, policy: &CurationPolicy) {
        match occ.annotation {
            Annotation::Accepted => self.accepted = true,
            Annotation::NotName => self.rejected = true,
            a if a.is_modification() => self.modified = true,
            _ => {}
        }
        if policy.is_doubtful(occ) {
            self.doubtful = true;
        }
    }
}

/// Aggregate counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub accepted: usize,
    pub rejected: usize,
    pub modified: usize,
    pub added: usize,
    pub total: usize,
}

/// Integer percentages that sum to exactly 100
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Percentages {
    pub accepted: u32,
    pub rejected: u32,
    pub modified: u32,
    pub added: u32,
}

impl Percentages {
    pub fn sum(&self) -> u32 {
        self.accepted + self.rejected + self.modified + self.added
    }
}

impl Stats {
    /// Statistics over `[0, lastReviewedIndex]` of a collection
    pub fn compute(coll: &OccurrenceCollection, policy: &CurationPolicy) -> Self {
        let reviewed = &coll.occurrences()[..=coll.last_reviewed_index()];
        Self::from_occurrences(reviewed, policy)
    }

    /// Statistics over an arbitrary run of occurrences
    pub fn from_occurrences(occurrences: &[Occurrence], policy: &CurationPolicy) -> Self {
        let mut words: HashMap<&str, WordState> = HashMap::new();
        for occ in occurrences {
            words.entry(occ.name.as_str()).or_default().record(occ, policy);
        }
        Self::from_word_states(words.values())
    }

    /// Aggregate per-name flags into counters
    pub fn from_word_states<'a>(states: impl IntoIterator<Item = &'a WordState>) -> Self {
        let mut stats = Self::default();
        for ws in states {
            if ws.doubtful {
                if ws.accepted || ws.modified {
                    stats.added += 1;
                    stats.total += 1;
                }
                continue;
            }
            if ws.accepted {
                stats.accepted += 1;
                stats.total += 1;
            }
            if ws.rejected {
                stats.rejected += 1;
                stats.total += 1;
            }
            if ws.modified {
                stats.modified += 1;
                stats.total += 1;
            }
        }
        stats
    }

    /// accepted / (accepted + rejected + modified)
    pub fn precision(&self) -> Option<f64> {
        let denom = self.accepted + self.rejected + self.modified;
        (denom > 0).then(|| self.accepted as f64 / denom as f64)
    }

    /// accepted / (accepted + added)
    pub fn recall(&self) -> Option<f64> {
        let denom = self.accepted + self.added;
        (denom > 0).then(|| self.accepted as f64 / denom as f64)
    }

    /// Bucket percentages, or None when nothing has been counted
    pub fn percentages(&self) -> Option<Percentages> {
        if self.total == 0 {
            return None;
        }
        let counts = [self.accepted, self.rejected, self.modified, self.added];
        let shares = apportion(&counts, self.total);
        Some(Percentages {
            accepted: shares[0],
            rejected: shares[1],
            modified: shares[2],
            added: shares[3],
        })
    }
}

/// Largest remainder apportionment of 100 points; ties go to the earlier bucket
fn apportion(counts: &[usize; 4], total: usize) -> [u32; 4] {
    let mut shares = [0u32; 4];
    let mut remainders = [0usize; 4];
    for (i, &count) in counts.iter().enumerate() {
        let scaled = count * 100;
        shares[i] = (scaled / total) as u32;
        remainders[i] = scaled % total;
    }

    let assigned: u32 = shares.iter().sum();
    let missing = 100u32.saturating_sub(assigned) as usize;

    let mut order = [0usize, 1, 2, 3];
    // stable sort keeps evaluation order among equal remainders
    order.sort_by(|a, b| remainders[*b].cmp(&remainders[*a]));
    for &i in order.iter().take(missing) {
        shares[i] += 1;
    }
    shares
}
