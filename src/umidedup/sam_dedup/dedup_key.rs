use std::fmt;
use std::str::FromStr;

use bio_types::strand::ReqStrand;

use crate::errors::RecordError;
use crate::sam_record::SamRecord;
use crate::sam_utils::*;

/// How a soft clip in the CIGAR adjusts the alignment start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipMode {
    /// Subtract the length of a soft clip that is the first CIGAR
    /// operation. Any `S` operation marks the read as soft-clipped.
    #[default]
    Leading,
    /// Whenever a digit is followed by `S` anywhere in the CIGAR,
    /// subtract the first digit run of the CIGAR text.
    Legacy,
}

impl FromStr for ClipMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leading" => Ok(ClipMode::Leading),
            "legacy" => Ok(ClipMode::Legacy),
            _ => Err(format!("Unknown clip mode \"{}\"", s)),
        }
    }
}

impl fmt::Display for ClipMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClipMode::Leading => write!(f, "leading"),
            ClipMode::Legacy => write!(f, "legacy"),
        }
    }
}

/// Identity of a read for duplicate detection within one reference
/// sequence. Records with equal keys came from the same molecule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    umi: String,
    position: i64,
    strand: ReqStrand,
}

impl DedupKey {
    pub fn new(umi: &str, position: i64, strand: ReqStrand) -> Self {
        DedupKey {
            umi: umi.to_string(),
            position,
            strand,
        }
    }

    /// Computes the key for a mapped record, correcting the position
    /// for soft clipping according to `clip_mode`. Also returns
    /// whether the CIGAR shows soft clipping at all.
    ///
    /// # Errors
    ///
    /// An error variant is returned when the CIGAR cannot be parsed.
    pub fn derive(record: &SamRecord, clip_mode: ClipMode) -> Result<(Self, bool), RecordError> {
        let (clip, soft_clipped) = match clip_mode {
            ClipMode::Leading => {
                let cigar = parse_cigar(record.cigar())?;
                (leading_soft_clip(&cigar), has_soft_clip(&cigar))
            }
            ClipMode::Legacy => match legacy_soft_clip(record.cigar())? {
                Some(clip) => (clip, true),
                None => (0, false),
            },
        };

        let position = i64::from(record.position()) - i64::from(clip);
        Ok((
            DedupKey::new(record.umi(), position, record.strand()),
            soft_clipped,
        ))
    }

    pub fn umi(&self) -> &str {
        &self.umi
    }

    /// Alignment start after soft-clip correction.
    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn strand(&self) -> ReqStrand {
        self.strand
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(flag: u16, pos: u32, cigar: &str, umi: &str) -> String {
        format!("r:1:fc:1:1101:{}:99:{}\t{}\tchr1\t{}\t255\t{}\t*\t0\t0\n", pos, umi, flag, pos, cigar)
    }

    fn key(l: &str, mode: ClipMode) -> (DedupKey, bool) {
        DedupKey::derive(&SamRecord::parse(l).unwrap(), mode).unwrap()
    }

    #[test]
    fn soft_clip_correction() {
        let clipped = line(0, 100, "5S95M", "AACGCCAT");
        let plain = line(0, 95, "100M", "AACGCCAT");

        for mode in [ClipMode::Leading, ClipMode::Legacy] {
            let (k1, sc1) = key(&clipped, mode);
            let (k2, sc2) = key(&plain, mode);
            assert_eq!(k1, k2);
            assert_eq!(k1.position(), 95);
            assert!(sc1);
            assert!(!sc2);
        }
    }

    #[test]
    fn strand_and_umi_distinguish() {
        let fwd = key(&line(0, 100, "100M", "AACGCCAT"), ClipMode::Leading).0;
        let rev = key(&line(16, 100, "100M", "AACGCCAT"), ClipMode::Leading).0;
        let other = key(&line(0, 100, "100M", "AAGGTACG"), ClipMode::Leading).0;
        assert_eq!(fwd.strand(), ReqStrand::Forward);
        assert_eq!(rev.strand(), ReqStrand::Reverse);
        assert!(fwd != rev);
        assert!(fwd != other);
        assert_eq!(other.umi(), "AAGGTACG");
    }

    #[test]
    fn trailing_clip() {
        let trailing = line(0, 100, "95M5S", "AACGCCAT");

        let (leading, sc) = key(&trailing, ClipMode::Leading);
        assert_eq!(leading.position(), 100);
        assert!(sc);

        let (legacy, sc) = key(&trailing, ClipMode::Legacy);
        assert_eq!(legacy.position(), 5);
        assert!(sc);
    }

    #[test]
    fn clip_past_start() {
        let (k, _) = key(&line(0, 3, "10S40M", "AACGCCAT"), ClipMode::Leading);
        assert_eq!(k.position(), -7);
    }

    #[test]
    fn invalid_cigar() {
        let rec_line = line(0, 100, "10Q", "AACGCCAT");
        let rec = SamRecord::parse(&rec_line).unwrap();
        assert!(DedupKey::derive(&rec, ClipMode::Leading).is_err());

        let rec_line = line(0, 100, "M5S", "AACGCCAT");
        let rec = SamRecord::parse(&rec_line).unwrap();
        assert!(DedupKey::derive(&rec, ClipMode::Legacy).is_err());
    }

    #[test]
    fn parse_mode() {
        assert_eq!("leading".parse::<ClipMode>(), Ok(ClipMode::Leading));
        assert_eq!("legacy".parse::<ClipMode>(), Ok(ClipMode::Legacy));
        assert!("both".parse::<ClipMode>().is_err());
    }
}
