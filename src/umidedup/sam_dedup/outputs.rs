use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::sam_dedup::classifier::Classification;

/// The three classified record streams. Header lines go to all of
/// them; each record goes to at most one.
pub struct OutputSinks<W: Write> {
    errors: W,
    duplicates: W,
    originals: W,
}

impl<W: Write> OutputSinks<W> {
    pub fn new(errors: W, duplicates: W, originals: W) -> Self {
        OutputSinks {
            errors,
            duplicates,
            originals,
        }
    }

    pub fn write_header(&mut self, line: &str) -> io::Result<()> {
        for sink in [&mut self.errors, &mut self.duplicates, &mut self.originals] {
            write_line(sink, line)?;
        }
        Ok(())
    }

    /// Writes a record line to the stream for its classification.
    /// Unmapped and session-boundary records are not written.
    pub fn route(&mut self, class: Classification, line: &str) -> io::Result<()> {
        match class {
            Classification::Original => write_line(&mut self.originals, line),
            Classification::Duplicate => write_line(&mut self.duplicates, line),
            Classification::UmiError => write_line(&mut self.errors, line),
            Classification::Unmapped | Classification::SessionBoundary => Ok(()),
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.errors.flush()?;
        self.duplicates.flush()?;
        self.originals.flush()
    }

    pub fn into_inner(self) -> (W, W, W) {
        (self.errors, self.duplicates, self.originals)
    }
}

fn write_line<W: Write>(sink: &mut W, line: &str) -> io::Result<()> {
    sink.write_all(line.as_bytes())?;
    if !line.ends_with('\n') {
        sink.write_all(b"\n")?;
    }
    Ok(())
}

/// File names for the three streams, derived from the input name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub errors: PathBuf,
    pub duplicates: PathBuf,
    pub originals: PathBuf,
}

impl OutputPaths {
    pub fn new(output_dir: &Path, input_name: &str) -> Self {
        OutputPaths {
            errors: output_dir.join(format!("{}_err", input_name)),
            duplicates: output_dir.join(format!("{}_duplicates", input_name)),
            originals: output_dir.join(format!("{}_deduped", input_name)),
        }
    }

    pub fn create(&self) -> io::Result<OutputSinks<BufWriter<fs::File>>> {
        Ok(OutputSinks::new(
            BufWriter::new(fs::File::create(&self.errors)?),
            BufWriter::new(fs::File::create(&self.duplicates)?),
            BufWriter::new(fs::File::create(&self.originals)?),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_everywhere() {
        let mut sinks = OutputSinks::new(Vec::new(), Vec::new(), Vec::new());
        sinks.write_header("@HD\tVN:1.0\n").unwrap();
        sinks.write_header("@SQ\tSN:1\tLN:248956422").unwrap();
        let (err, dup, orig) = sinks.into_inner();
        let exp = b"@HD\tVN:1.0\n@SQ\tSN:1\tLN:248956422\n".to_vec();
        assert!(err == exp);
        assert!(dup == exp);
        assert!(orig == exp);
    }

    #[test]
    fn routing() {
        let mut sinks = OutputSinks::new(Vec::new(), Vec::new(), Vec::new());
        sinks.route(Classification::Original, "orig\n").unwrap();
        sinks.route(Classification::Duplicate, "dup\n").unwrap();
        sinks.route(Classification::UmiError, "err\n").unwrap();
        sinks.route(Classification::Unmapped, "unmapped\n").unwrap();
        sinks.route(Classification::SessionBoundary, "boundary\n").unwrap();
        let (err, dup, orig) = sinks.into_inner();
        assert_eq!(err, b"err\n");
        assert_eq!(dup, b"dup\n");
        assert_eq!(orig, b"orig\n");
    }

    #[test]
    fn paths() {
        let paths = OutputPaths::new(Path::new("/tmp/out"), "test.sam");
        assert_eq!(paths.errors, PathBuf::from("/tmp/out/test.sam_err"));
        assert_eq!(paths.duplicates, PathBuf::from("/tmp/out/test.sam_duplicates"));
        assert_eq!(paths.originals, PathBuf::from("/tmp/out/test.sam_deduped"));
    }
}
