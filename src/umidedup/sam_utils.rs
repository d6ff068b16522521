use std::sync::LazyLock;

use regex::Regex;
use rust_htslib::bam::record::{Cigar, CigarString};

use crate::errors::RecordError;

static SOFT_CLIP_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\dS").expect("soft-clip pattern"));
static LEADING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+").expect("digit-run pattern"));

/// Parses a SAM text CIGAR. The unavailable CIGAR `*` yields no
/// operations.
pub fn parse_cigar(cigar: &str) -> Result<CigarString, RecordError> {
    if cigar == "*" {
        return Ok(CigarString(Vec::new()));
    }

    CigarString::try_from(cigar).map_err(|e| RecordError::InvalidCigar {
        cigar: cigar.to_string(),
        reason: e.to_string(),
    })
}

/// Length of the soft clip at the start of the alignment, or 0 when
/// the first operation is not a soft clip.
pub fn leading_soft_clip(cigar: &CigarString) -> u32 {
    match cigar.0.first() {
        Some(Cigar::SoftClip(len)) => *len,
        _ => 0,
    }
}

pub fn has_soft_clip(cigar: &CigarString) -> bool {
    cigar.0.iter().any(|op| matches!(op, Cigar::SoftClip(_)))
}

/// Text-level soft-clip heuristic. Returns `None` when no digit is
/// directly followed by `S` anywhere in the CIGAR. Otherwise returns
/// the first run of digits in the CIGAR, regardless of which operation
/// it belongs to.
///
/// # Errors
///
/// An error variant is returned when a soft clip is indicated but the
/// CIGAR does not begin with a run of digits.
pub fn legacy_soft_clip(cigar: &str) -> Result<Option<u32>, RecordError> {
    if !SOFT_CLIP_TEXT.is_match(cigar) {
        return Ok(None);
    }

    let invalid = |reason: &str| RecordError::InvalidCigar {
        cigar: cigar.to_string(),
        reason: reason.to_string(),
    };

    let digits = LEADING_DIGITS
        .find(cigar)
        .ok_or_else(|| invalid("no leading operation length"))?;
    let clip = digits
        .as_str()
        .parse()
        .map_err(|_| invalid("operation length out of range"))?;
    Ok(Some(clip))
}
