use std::fmt;
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const BUF_SIZE: usize = 256 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Plain,
    Gzip,
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InputFormat::Plain => write!(f, "uncompressed"),
            InputFormat::Gzip => write!(f, "compressed"),
        }
    }
}

/// Looks at the first bytes of a buffered stream, without consuming
/// them, to tell gzip from plain text.
pub fn sniff_format<R: BufRead>(reader: &mut R) -> io::Result<InputFormat> {
    let buf = reader.fill_buf()?;
    if buf.starts_with(&GZIP_MAGIC) {
        Ok(InputFormat::Gzip)
    } else {
        Ok(InputFormat::Plain)
    }
}

/// Wraps a reader in a line-oriented stream, decompressing it when
/// it holds gzip (or BGZF) data.
pub fn text_reader<R: io::Read + 'static>(reader: R) -> io::Result<(Box<dyn BufRead>, InputFormat)> {
    let mut buffered = BufReader::with_capacity(BUF_SIZE, reader);
    let format = sniff_format(&mut buffered)?;
    let text: Box<dyn BufRead> = match format {
        InputFormat::Plain => Box::new(buffered),
        InputFormat::Gzip => Box::new(BufReader::with_capacity(
            BUF_SIZE,
            MultiGzDecoder::new(buffered),
        )),
    };
    Ok((text, format))
}

/// Opens a SAM file, or standard input for `-`, as a text stream.
pub fn open_sam<P: AsRef<Path>>(path: P) -> Result<(Box<dyn BufRead>, InputFormat)> {
    let path = path.as_ref();
    if path == Path::new("-") {
        Ok(text_reader(io::stdin())?)
    } else {
        let file = fs::File::open(path).with_context(|| format!("Opening {}", path.display()))?;
        text_reader(file).with_context(|| format!("Reading {}", path.display()))
    }
}
