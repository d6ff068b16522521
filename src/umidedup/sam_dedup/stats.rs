use std::collections::BTreeMap;

use anyhow::Result;

/// Counts accumulated over one deduplication run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunCounters {
    total: u64,
    mapped: u64,
    unmapped: u64,
    soft_clipped: u64,
    original: u64,
    duplicate: u64,
    umi_error: u64,
    boundary_dropped: u64,
    malformed: u64,
    reads_per_reference: BTreeMap<String, u64>,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// All non-header lines, including unmapped and malformed ones.
    pub fn total(&self) -> u64 {
        self.total
    }
    pub fn mapped(&self) -> u64 {
        self.mapped
    }
    pub fn unmapped(&self) -> u64 {
        self.unmapped
    }
    pub fn soft_clipped(&self) -> u64 {
        self.soft_clipped
    }
    pub fn original(&self) -> u64 {
        self.original
    }
    pub fn duplicate(&self) -> u64 {
        self.duplicate
    }
    pub fn umi_error(&self) -> u64 {
        self.umi_error
    }
    pub fn boundary_dropped(&self) -> u64 {
        self.boundary_dropped
    }
    pub fn malformed(&self) -> u64 {
        self.malformed
    }
    pub fn reads_per_reference(&self) -> &BTreeMap<String, u64> {
        &self.reads_per_reference
    }

    /// Mapped reads that are not duplicates and carry a known UMI.
    pub fn deduplicated(&self) -> u64 {
        self.mapped - self.duplicate - self.umi_error
    }

    pub fn tally_record(&mut self) {
        self.total += 1
    }
    pub fn tally_malformed(&mut self) {
        self.malformed += 1
    }
    pub fn tally_unmapped(&mut self) {
        self.unmapped += 1
    }
    pub fn tally_soft_clipped(&mut self) {
        self.soft_clipped += 1
    }
    pub fn tally_original(&mut self) {
        self.original += 1
    }
    pub fn tally_duplicate(&mut self) {
        self.duplicate += 1
    }
    pub fn tally_umi_error(&mut self) {
        self.umi_error += 1
    }
    pub fn tally_boundary_dropped(&mut self) {
        self.boundary_dropped += 1
    }

    /// Counts one mapped read on `reference_name`.
    pub fn tally_mapped(&mut self, reference_name: &str) {
        self.mapped += 1;
        match self.reads_per_reference.get_mut(reference_name) {
            Some(count) => *count += 1,
            None => {
                self.reads_per_reference.insert(reference_name.to_string(), 1);
            }
        }
    }

    /// Summary table, tab-delimited. The first section gives read
    /// counts with percentages of all reads and of mapped reads; the
    /// second lists mapped reads per reference sequence in
    /// lexicographic order.
    pub fn report(&self) -> Result<String> {
        let mut summary = tsv_writer();
        summary.write_record(["Read type", "Num. reads", "% total", "% mapped"])?;

        let mapped = Some(self.mapped);
        let rows = [
            ("Total reads", self.total, None),
            ("Mapped", self.mapped, mapped),
            ("Deduplicated", self.deduplicated(), mapped),
            ("PCR Duplicates", self.duplicate, mapped),
            ("Errors", self.umi_error, mapped),
            ("Soft-clipped", self.soft_clipped, mapped),
            ("Unmapped", self.unmapped, None),
            ("Session boundary", self.boundary_dropped, mapped),
            ("Malformed", self.malformed, None),
        ];
        // Rows without a mapped denominator are not subsets of mapped reads
        for (name, count, of_mapped) in rows {
            summary.write_record([
                name.to_string(),
                count.to_string(),
                format_percent(percent(count, self.total)),
                format_percent(of_mapped.and_then(|whole| percent(count, whole))),
            ])?;
        }

        let mut per_reference = tsv_writer();
        per_reference.write_record(["Reference", "Number of reads"])?;
        for (reference_name, count) in self.reads_per_reference.iter() {
            per_reference.write_record([reference_name.as_str(), count.to_string().as_str()])?;
        }

        let mut table = String::from_utf8(summary.into_inner().map_err(|e| e.into_error())?)?;
        table.push('\n');
        table.push_str(&String::from_utf8(per_reference.into_inner().map_err(|e| e.into_error())?)?);
        Ok(table)
    }
}

fn tsv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(Vec::new())
}

/// Percentage of `count` in `whole`, or `None` when `whole` is zero
/// and the ratio is undefined.
pub fn percent(count: u64, whole: u64) -> Option<f64> {
    if whole == 0 {
        None
    } else {
        Some(100.0 * count as f64 / whole as f64)
    }
}

pub fn format_percent(pct: Option<f64>) -> String {
    pct.map_or_else(|| "NA".to_string(), |p| format!("{:.2}", p))
}
