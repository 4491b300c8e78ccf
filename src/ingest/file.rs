//! JSON Lines pose record source.
//!
//! `JsonlSource` reads one `PoseRecord` per line from a local file, or from
//! stdin when the path is `-`. Blank lines are skipped. A malformed line yields
//! an error carrying its line number; reading continues with the next line.
//! A read error (for example the path is a directory) is reported once and
//! ends the source.

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use anyhow::{anyhow, Context, Result};

use super::PoseRecord;

/// Path meaning "read from stdin".
pub const STDIN_PATH: &str = "-";

/// Configuration for a JSONL source.
#[derive(Clone, Debug)]
pub struct FileConfig {
    /// Local file path, or `-` for stdin.
    pub path: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: STDIN_PATH.to_string(),
        }
    }
}

/// Line-oriented record reader.
pub struct JsonlSource {
    path: String,
    reader: Box<dyn BufRead + Send>,
    line_number: usize,
    records_read: u64,
    records_rejected: u64,
    finished: bool,
}

impl JsonlSource {
    pub fn open(config: FileConfig) -> Result<Self> {
        if !is_local_file_path(&config.path) {
            return Err(anyhow!(
                "pose ingestion only supports local paths or '-' (no URL schemes)"
            ));
        }
        let reader: Box<dyn BufRead + Send> = if config.path == STDIN_PATH {
            Box::new(BufReader::new(io::stdin()))
        } else {
            let file = File::open(&config.path)
                .with_context(|| format!("failed to open pose records {}", config.path))?;
            Box::new(BufReader::new(file))
        };
        log::info!("JsonlSource: reading pose records from {}", config.path);
        Ok(Self::from_reader(config.path, reader))
    }

    pub fn from_reader(path: impl Into<String>, reader: Box<dyn BufRead + Send>) -> Self {
        Self {
            path: path.into(),
            reader,
            line_number: 0,
            records_read: 0,
            records_rejected: 0,
            finished: false,
        }
    }

    /// Next record, `None` at end of input.
    ///
    /// An I/O error is returned once and ends the source; a malformed line
    /// does not.
    pub fn next_record(&mut self) -> Option<Result<PoseRecord>> {
        if self.finished {
            return None;
        }
        let mut line = String::new();
        loop {
            line.clear();
            self.line_number += 1;
            match self.reader.read_line(&mut line) {
                Ok(0) => {
                    self.finished = true;
                    return None;
                }
                Ok(_) if line.trim().is_empty() => continue,
                Ok(_) => break,
                Err(e) => {
                    self.finished = true;
                    self.records_rejected += 1;
                    return Some(Err(anyhow!(
                        "{}:{}: read failed: {}",
                        self.path,
                        self.line_number,
                        e
                    )));
                }
            }
        }

        match serde_json::from_str::<PoseRecord>(line.trim()) {
            Ok(record) => {
                self.records_read += 1;
                Some(Ok(record))
            }
            Err(e) => {
                self.records_rejected += 1;
                Some(Err(anyhow!(
                    "{}:{}: invalid pose record: {}",
                    self.path,
                    self.line_number,
                    e
                )))
            }
        }
    }

    /// Line number of the most recently read line (1-based).
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn stats(&self) -> FileStats {
        FileStats {
            records_read: self.records_read,
            records_rejected: self.records_rejected,
            path: self.path.clone(),
        }
    }
}

impl Iterator for JsonlSource {
    type Item = Result<PoseRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record()
    }
}

/// Statistics for a JSONL source.
#[derive(Clone, Debug, PartialEq)]
pub struct FileStats {
    pub records_read: u64,
    pub records_rejected: u64,
    pub path: String,
}

fn is_local_file_path(path: &str) -> bool {
    if path.trim().is_empty() {
        return false;
    }
    !path.contains("://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn source(text: &str) -> JsonlSource {
        JsonlSource::from_reader("mem", Box::new(Cursor::new(text.to_string())))
    }

    #[test]
    fn blank_lines_are_skipped() {
        let mut src = source("{\"stream\":\"a\"}\n\n   \n{\"stream\":\"b\"}\n");
        assert_eq!(src.next().unwrap().unwrap().stream_id(), "a");
        assert_eq!(src.next().unwrap().unwrap().stream_id(), "b");
        assert_eq!(src.line_number(), 4);
        assert!(src.next().is_none());
        assert_eq!(src.stats().records_read, 2);
    }

    #[test]
    fn malformed_line_reports_line_number_and_continues() {
        let mut src = source("{}\n{not json\n{\"stream\":\"c\"}\n");
        assert!(src.next().unwrap().is_ok());
        let err = src.next().unwrap().unwrap_err();
        assert!(err.to_string().starts_with("mem:2:"), "{}", err);
        assert_eq!(src.next().unwrap().unwrap().stream_id(), "c");
        let stats = src.stats();
        assert_eq!((stats.records_read, stats.records_rejected), (2, 1));
    }

    #[test]
    fn reads_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{\"persons\":[]}}").unwrap();
        let src = JsonlSource::open(FileConfig {
            path: file.path().to_string_lossy().into_owned(),
        })
        .unwrap();
        assert_eq!(src.filter_map(Result::ok).count(), 1);
    }

    #[test]
    fn read_error_ends_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut src = JsonlSource::open(FileConfig {
            path: dir.path().to_string_lossy().into_owned(),
        })
        .unwrap();
        let pulled: Vec<_> = src.by_ref().take(10).collect();
        assert_eq!(pulled.len(), 1);
        let err = pulled.into_iter().next().unwrap().unwrap_err();
        assert!(err.to_string().contains("read failed"), "{}", err);
        assert!(src.next().is_none());
        assert_eq!(src.stats().records_rejected, 1);
    }

    #[test]
    fn urls_and_missing_files_are_rejected() {
        assert!(JsonlSource::open(FileConfig {
            path: "http://camera/poses.jsonl".into()
        })
        .is_err());
        assert!(JsonlSource::open(FileConfig {
            path: "/nonexistent/poses.jsonl".into()
        })
        .is_err());
        assert!(JsonlSource::open(FileConfig { path: "  ".into() }).is_err());
    }
}
