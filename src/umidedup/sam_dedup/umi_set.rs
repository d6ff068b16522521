use std::collections::HashSet;
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::errors::DedupError;

/// The set of UMI sequences used in the sequencing run. Built once
/// and then only read.
#[derive(Debug, Clone, Default)]
pub struct UmiSet {
    umis: HashSet<String>,
}

impl UmiSet {
    /// Reads one UMI per line. Surrounding whitespace is trimmed and
    /// blank lines are ignored.
    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut umis = HashSet::new();
        for line in reader.lines() {
            let line = line?;
            let umi = line.trim();
            if !umi.is_empty() {
                umis.insert(umi.to_string());
            }
        }
        Ok(UmiSet { umis })
    }

    /// Loads the UMI list from a file.
    ///
    /// # Errors
    ///
    /// `DedupError::Config` when the file cannot be opened or read.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DedupError> {
        let path = path.as_ref();
        let config_error = |source| DedupError::Config {
            path: path.to_path_buf(),
            source,
        };
        let file = fs::File::open(path).map_err(config_error)?;
        Self::from_reader(BufReader::new(file)).map_err(config_error)
    }

    pub fn contains(&self, umi: &str) -> bool {
        self.umis.contains(umi)
    }

    pub fn len(&self) -> usize {
        self.umis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.umis.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for UmiSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        UmiSet {
            umis: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn trimmed_unique_umis() {
        let list = "CTGTTCAC\n  ACGACTTG \n\nATCCATGG\r\nCTGTTCAC\n\n";
        let umis = UmiSet::from_reader(list.as_bytes()).unwrap();
        assert_eq!(umis.len(), 3);
        assert!(umis.contains("CTGTTCAC"));
        assert!(umis.contains("ACGACTTG"));
        assert!(umis.contains("ATCCATGG"));
        assert!(!umis.contains(""));
        assert!(!umis.contains("GGGGGGGG"));
    }

    #[test]
    fn from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "AACGCCAT\nAAGGTACG\n").unwrap();
        let umis = UmiSet::from_path(file.path()).unwrap();
        assert_eq!(umis.len(), 2);
        assert!(umis.contains("AAGGTACG"));
    }

    #[test]
    fn unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no_such_umis.txt");
        match UmiSet::from_path(&missing) {
            Err(DedupError::Config { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected config error, got {:?}", other),
        }
    }
}
