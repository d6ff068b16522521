use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};

pub mod classifier;
pub mod dedup_key;
pub mod outputs;
pub mod stats;
pub mod umi_set;

use crate::errors::DedupError;
use crate::input::*;
use crate::sam_dedup::classifier::*;
use crate::sam_dedup::dedup_key::ClipMode;
use crate::sam_dedup::outputs::*;
use crate::sam_dedup::stats::*;
use crate::sam_dedup::umi_set::UmiSet;
use crate::sam_record::*;

pub struct CLI {
    pub sam_file: String,
    pub umi_file: String,
    pub directory: String,
    pub which_end: u8,
    pub stats: Option<String>,
    pub boundary: BoundaryMode,
    pub clip: ClipMode,
    pub strict: bool,
    pub progress: usize,
}

/// Settings for one pass over the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DedupOptions {
    pub boundary: BoundaryMode,
    pub clip: ClipMode,
    /// Abort on the first malformed record instead of skipping it.
    pub strict: bool,
    /// Log progress every so many records.
    pub progress: Option<u64>,
}

impl DedupOptions {
    pub fn classifier_options(&self) -> ClassifierOptions {
        ClassifierOptions {
            boundary: self.boundary,
            clip: self.clip,
        }
    }
}

pub struct Config {
    input: Box<dyn BufRead>,
    input_format: InputFormat,
    input_name: String,
    umis: UmiSet,
    output_paths: OutputPaths,
    stats: PathBuf,
    options: DedupOptions,
}

impl Config {
    pub fn new(cli: &CLI) -> Result<Self> {
        if cli.which_end != 1 {
            return Err(DedupError::UnsupportedLayout(cli.which_end).into());
        }

        let umis = UmiSet::from_path(&cli.umi_file)?;
        if umis.is_empty() {
            warn!("No UMIs in {}, every mapped read will be an error", cli.umi_file);
        }

        let input_name = Self::input_name(&cli.sam_file);
        let (input, input_format) = open_sam(&cli.sam_file)?;

        let output_dir = Path::new(&cli.directory).to_path_buf();
        fs::DirBuilder::new()
            .recursive(true)
            .create(output_dir.as_path())
            .with_context(|| format!("Creating output directory {}", output_dir.display()))?;

        let stats = match cli.stats {
            Some(ref stats) => PathBuf::from(stats),
            None => output_dir.join("outputs.txt"),
        };

        Ok(Config {
            input,
            input_format,
            output_paths: OutputPaths::new(&output_dir, &input_name),
            input_name,
            umis,
            stats,
            options: DedupOptions {
                boundary: cli.boundary,
                clip: cli.clip,
                strict: cli.strict,
                progress: if cli.progress > 0 {
                    Some(cli.progress as u64)
                } else {
                    None
                },
            },
        })
    }

    fn input_name(sam_file: &str) -> String {
        if sam_file == "-" {
            return "stdin".to_string();
        }
        Path::new(sam_file)
            .file_name()
            .map_or_else(|| sam_file.to_string(), |name| name.to_string_lossy().into_owned())
    }
}

/// Runs duplicate classification over a stream of SAM lines, writing
/// headers and classified records to `sinks`.
///
/// # Arguments
///
/// * `input` yields SAM text lines, sorted by reference sequence
///
/// * `umis` is the set of UMIs used in the run
///
/// * `options` selects boundary, soft-clip and malformed-record handling
///
/// * `sinks` receives the error, duplicate and original streams
///
/// # Errors
///
/// An error variant is returned when reading or writing fails, or when
/// `options.strict` is set and a record cannot be parsed. The sinks are
/// flushed before any error is returned.
pub fn dedup_stream<R: BufRead, W: Write>(
    input: R,
    umis: &UmiSet,
    options: &DedupOptions,
    sinks: &mut OutputSinks<W>,
) -> Result<RunCounters, DedupError> {
    let result = classify_lines(input, umis, options, sinks);
    let flushed = sinks.flush();
    let counters = result?;
    flushed?;
    Ok(counters)
}

fn classify_lines<R: BufRead, W: Write>(
    mut input: R,
    umis: &UmiSet,
    options: &DedupOptions,
    sinks: &mut OutputSinks<W>,
) -> Result<RunCounters, DedupError> {
    let mut classifier = Classifier::new(umis, options.classifier_options());
    let mut counters = RunCounters::new();

    let mut line = String::new();
    let mut line_no = 0;

    loop {
        line.clear();
        let nread = input
            .read_line(&mut line)
            .map_err(|source| DedupError::Read {
                line: line_no + 1,
                source,
            })?;
        if nread == 0 {
            break;
        }
        line_no += 1;

        if is_header(&line) {
            sinks.write_header(&line)?;
            continue;
        }

        counters.tally_record();

        match SamRecord::parse(&line).and_then(|rec| classifier.classify(&rec, &mut counters)) {
            Ok(class) => sinks.route(class, &line)?,
            Err(source) if options.strict => {
                return Err(DedupError::MalformedRecord {
                    line: line_no,
                    source,
                });
            }
            Err(source) => {
                warn!("Skipping malformed record at line {}: {}", line_no, source);
                counters.tally_malformed();
            }
        }

        if options
            .progress
            .map_or(false, |nprog| counters.total() % nprog == 0)
        {
            info!(
                "{:9} reads, {} duplicates, reference {}",
                counters.total(),
                counters.duplicate(),
                classifier.current_reference().unwrap_or("*")
            );
        }
    }

    Ok(counters)
}

pub fn sam_dedup(config: Config) -> Result<()> {
    let Config {
        input,
        input_format,
        input_name,
        umis,
        output_paths,
        stats,
        options,
    } = config;

    info!(
        "Deduplicating {} SAM file {} with {} known UMIs",
        input_format,
        input_name,
        umis.len()
    );

    let mut sinks = output_paths
        .create()
        .with_context(|| format!("Creating output files for {}", input_name))?;
    let counters = dedup_stream(input, &umis, &options, &mut sinks)?;

    fs::write(&stats, counters.report()?)
        .with_context(|| format!("Writing statistics to {}", stats.display()))?;

    info!(
        "{} reads: {} original, {} duplicate, {} UMI errors, {} unmapped, {} malformed",
        counters.total(),
        counters.original(),
        counters.duplicate(),
        counters.umi_error(),
        counters.unmapped(),
        counters.malformed()
    );
    info!(
        "Duplicate rate {}% of mapped reads",
        format_percent(percent(counters.duplicate(), counters.mapped()))
    );

    Ok(())
}
