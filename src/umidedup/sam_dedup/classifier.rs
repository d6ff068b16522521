use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::errors::RecordError;
use crate::sam_dedup::dedup_key::*;
use crate::sam_dedup::stats::RunCounters;
use crate::sam_dedup::umi_set::UmiSet;
use crate::sam_record::SamRecord;

/// Fate of a single SAM record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// First read seen with its key in the current reference sequence.
    Original,
    /// Repeats the key of an earlier original read.
    Duplicate,
    /// UMI missing from the known UMI list.
    UmiError,
    /// Not aligned; written nowhere.
    Unmapped,
    /// Opened a new reference sequence under `BoundaryMode::Drop`;
    /// written nowhere.
    SessionBoundary,
}

/// Treatment of the first mapped read on each reference sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryMode {
    /// The read only resets duplicate tracking and is left out of every
    /// output.
    #[default]
    Drop,
    /// The read is classified against the freshly reset key set.
    Classify,
}

impl FromStr for BoundaryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drop" => Ok(BoundaryMode::Drop),
            "classify" => Ok(BoundaryMode::Classify),
            _ => Err(format!("Unknown boundary mode \"{}\"", s)),
        }
    }
}

impl fmt::Display for BoundaryMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BoundaryMode::Drop => write!(f, "drop"),
            BoundaryMode::Classify => write!(f, "classify"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassifierOptions {
    pub boundary: BoundaryMode,
    pub clip: ClipMode,
}

/// Duplicate tracking for one reference sequence. Keys never carry
/// over from one session to the next.
#[derive(Debug)]
struct Session {
    reference_name: String,
    seen: HashSet<DedupKey>,
}

impl Session {
    fn new(reference_name: &str) -> Self {
        Session {
            reference_name: reference_name.to_string(),
            seen: HashSet::new(),
        }
    }
}

/// Streaming duplicate classifier for chromosome-sorted single-end
/// SAM records. Records must be presented in file order; duplicate
/// keys are tracked only within a run of records on the same
/// reference sequence.
pub struct Classifier<'a> {
    umis: &'a UmiSet,
    options: ClassifierOptions,
    session: Option<Session>,
}

impl<'a> Classifier<'a> {
    pub fn new(umis: &'a UmiSet, options: ClassifierOptions) -> Self {
        Classifier {
            umis,
            options,
            session: None,
        }
    }

    /// Reference sequence of the active session, if any.
    pub fn current_reference(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.reference_name.as_str())
    }

    /// Classifies the next record and updates `counters`.
    ///
    /// # Errors
    ///
    /// An error variant is returned when the CIGAR of a mapped read with
    /// a known UMI cannot be parsed. In that case neither `counters` nor
    /// the session state are modified. A read dropped at a session
    /// boundary never has its CIGAR parsed.
    pub fn classify(
        &mut self,
        record: &SamRecord,
        counters: &mut RunCounters,
    ) -> Result<Classification, RecordError> {
        if record.is_unmapped() {
            counters.tally_unmapped();
            return Ok(Classification::Unmapped);
        }

        let new_session = self.current_reference() != Some(record.reference_name());
        let dropped = new_session && self.options.boundary == BoundaryMode::Drop;

        let keyed = if !dropped && self.umis.contains(record.umi()) {
            Some(DedupKey::derive(record, self.options.clip)?)
        } else {
            None
        };

        counters.tally_mapped(record.reference_name());

        if new_session {
            debug!(
                "Starting reference {} after {}",
                record.reference_name(),
                self.current_reference().unwrap_or("(none)")
            );
            self.session = None;
        }
        let session = self
            .session
            .get_or_insert_with(|| Session::new(record.reference_name()));

        if dropped {
            counters.tally_boundary_dropped();
            return Ok(Classification::SessionBoundary);
        }

        let (key, soft_clipped) = match keyed {
            Some(keyed) => keyed,
            None => {
                counters.tally_umi_error();
                return Ok(Classification::UmiError);
            }
        };

        if soft_clipped {
            counters.tally_soft_clipped();
        }

        if session.seen.insert(key) {
            counters.tally_original();
            Ok(Classification::Original)
        } else {
            counters.tally_duplicate();
            Ok(Classification::Duplicate)
        }
    }
}
