use bio_types::strand::ReqStrand;

use crate::errors::RecordError;

/// Minimum number of tab-delimited fields through CIGAR.
pub const MIN_FIELDS: usize = 6;

/// Index of the UMI among the colon-delimited segments of the read name.
pub const UMI_SEGMENT: usize = 7;

const FLAG_UNMAPPED: u16 = 0x4;
const FLAG_REVERSE: u16 = 0x10;

/// Returns true for SAM header lines.
pub fn is_header(line: &str) -> bool {
    line.starts_with('@')
}

/// One single-end SAM alignment line, with the fields needed for
/// duplicate detection borrowed from the line itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamRecord<'a> {
    flag: u16,
    reference_name: &'a str,
    position: u32,
    cigar: &'a str,
    umi: &'a str,
    line: &'a str,
}

impl<'a> SamRecord<'a> {
    /// Parses a non-header SAM line.
    ///
    /// # Arguments
    ///
    /// * `line` is the raw line, optionally including its line
    /// terminator, which is kept in `line()` but ignored for parsing.
    ///
    /// # Errors
    ///
    /// An error variant is returned when the line has fewer than six
    /// tab-delimited fields, when FLAG or POS is not numeric, or when
    /// the read name does not carry a UMI segment.
    pub fn parse(line: &'a str) -> Result<Self, RecordError> {
        let body = line.trim_end_matches(['\n', '\r']);
        let fields: Vec<&str> = body.split('\t').collect();
        if fields.len() < MIN_FIELDS {
            return Err(RecordError::TooFewFields {
                expected: MIN_FIELDS,
                found: fields.len(),
            });
        }

        let flag = fields[1].parse().map_err(|_| RecordError::InvalidNumber {
            field: "FLAG",
            value: fields[1].to_string(),
        })?;
        let position = fields[3].parse().map_err(|_| RecordError::InvalidNumber {
            field: "POS",
            value: fields[3].to_string(),
        })?;

        Ok(SamRecord {
            flag,
            reference_name: fields[2],
            position,
            cigar: fields[5],
            umi: umi_from_qname(fields[0])?,
            line,
        })
    }

    pub fn flag(&self) -> u16 {
        self.flag
    }

    pub fn reference_name(&self) -> &'a str {
        self.reference_name
    }

    /// 1-based leftmost mapping position.
    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn cigar(&self) -> &'a str {
        self.cigar
    }

    pub fn umi(&self) -> &'a str {
        self.umi
    }

    /// The raw line, exactly as it was read.
    pub fn line(&self) -> &'a str {
        self.line
    }

    pub fn is_unmapped(&self) -> bool {
        self.flag & FLAG_UNMAPPED != 0
    }

    pub fn is_reverse(&self) -> bool {
        self.flag & FLAG_REVERSE != 0
    }

    pub fn strand(&self) -> ReqStrand {
        if self.is_reverse() {
            ReqStrand::Reverse
        } else {
            ReqStrand::Forward
        }
    }
}

/// Extracts the UMI from the first whitespace-delimited token of a
/// read name such as `NS500451:154:HWKTMBGXX:1:11101:24260:1121:CTGTTCAC`.
fn umi_from_qname(qname: &str) -> Result<&str, RecordError> {
    let token = qname.split_whitespace().next().unwrap_or("");
    token
        .split(':')
        .nth(UMI_SEGMENT)
        .ok_or_else(|| RecordError::MissingUmi(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "NS500451:154:HWKTMBGXX:1:11101:24260:1121:CTGTTCAC\t0\t2\t76814284\t36\t71M\t*\t0\t0\tTCCACCACAATCTTACCATCCTTCCTCCAGACCACATCGCGTTCTTTGTTCAACTCACAGCTCAAGTACAA\t6AEEEEEEAEEAEEEEAAEEEEEEEEEAEEAEEAAEE<EEEEEEEEEAEEEEEEEAAEEAAAEAEEAEAE\tMD:Z:71\tNH:i:1\n";

    #[test]
    fn parse_fields() {
        let rec = SamRecord::parse(LINE).unwrap();
        assert_eq!(rec.flag(), 0);
        assert_eq!(rec.reference_name(), "2");
        assert_eq!(rec.position(), 76814284);
        assert_eq!(rec.cigar(), "71M");
        assert_eq!(rec.umi(), "CTGTTCAC");
        assert_eq!(rec.line(), LINE);
        assert!(!rec.is_unmapped());
        assert_eq!(rec.strand(), ReqStrand::Forward);
    }

    #[test]
    fn flag_bits() {
        let rev = "a:b:c:d:e:f:g:AAAA\t16\tchr1\t10\t0\t5M\n";
        let rec = SamRecord::parse(rev).unwrap();
        assert!(rec.is_reverse());
        assert_eq!(rec.strand(), ReqStrand::Reverse);

        let unmapped = "a:b:c:d:e:f:g:AAAA\t4\t*\t0\t0\t*\n";
        assert!(SamRecord::parse(unmapped).unwrap().is_unmapped());
    }

    #[test]
    fn crlf_terminator() {
        let rec = SamRecord::parse("a:b:c:d:e:f:g:ACGT\t0\tchr1\t10\t0\t5M\r\n").unwrap();
        assert_eq!(rec.cigar(), "5M");
        assert_eq!(rec.line(), "a:b:c:d:e:f:g:ACGT\t0\tchr1\t10\t0\t5M\r\n");
    }

    #[test]
    fn qname_comment_ignored() {
        let rec = SamRecord::parse("a:b:c:d:e:f:g:ACGT 1:N:0\t0\tchr1\t10\t0\t5M\n").unwrap();
        assert_eq!(rec.umi(), "ACGT");
    }

    #[test]
    fn malformed_lines() {
        assert_eq!(
            SamRecord::parse("a:b:c:d:e:f:g:ACGT\t0\tchr1\t10\n"),
            Err(RecordError::TooFewFields {
                expected: 6,
                found: 4
            })
        );
        assert_eq!(
            SamRecord::parse("a:b:c:d:e:f:g:ACGT\tzero\tchr1\t10\t0\t5M\n"),
            Err(RecordError::InvalidNumber {
                field: "FLAG",
                value: "zero".to_string()
            })
        );
        assert_eq!(
            SamRecord::parse("a:b:c:d:e:f:g:ACGT\t0\tchr1\t-3\t0\t5M\n"),
            Err(RecordError::InvalidNumber {
                field: "POS",
                value: "-3".to_string()
            })
        );
        assert_eq!(
            SamRecord::parse("a:b:c:ACGT\t0\tchr1\t10\t0\t5M\n"),
            Err(RecordError::MissingUmi("a:b:c:ACGT".to_string()))
        );
    }

    #[test]
    fn header_lines() {
        assert!(is_header("@HD\tVN:1.0\tSO:coordinate\n"));
        assert!(!is_header("a:b:c:d:e:f:g:ACGT\t0\tchr1\t10\t0\t5M\n"));
    }
}
