//! Sequential record line sources.
//!
//! One capability, a finite non-restartable provider of raw record lines,
//! with two constructors: a plain line file and a zip archive whose matching
//! entries are chained into a single stream. Consumers never branch on the
//! source kind.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::error::Result;

/// A sequential provider of raw record lines. Finite; not restartable.
pub trait LineSource {
    /// Next raw line, or `None` once the source has run dry.
    fn next_line(&mut self) -> Result<Option<String>>;
}

impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn next_line(&mut self) -> Result<Option<String>> {
        (**self).next_line()
    }
}

/// Plain file: one comma-separated record per line.
pub struct PlainLineSource {
    lines: std::io::Lines<BufReader<File>>,
}

impl PlainLineSource {
    /// Open `path` for sequential line reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
        })
    }
}

impl LineSource for PlainLineSource {
    fn next_line(&mut self) -> Result<Option<String>> {
        match self.lines.next() {
            Some(line) => Ok(Some(line?)),
            None => Ok(None),
        }
    }
}

/// Zip archive: every entry named `agency-<client_id>*`, read in name order
/// as one continuous line stream.
pub struct ArchiveLineSource {
    archive: zip::ZipArchive<File>,
    /// Matching entry names still to read, reversed so `pop` walks them in
    /// name order.
    pending: Vec<String>,
    current: std::vec::IntoIter<String>,
}

impl ArchiveLineSource {
    /// Open `path` and select the entries for `client_id`.
    pub fn open(path: impl AsRef<Path>, client_id: &str) -> Result<Self> {
        let archive = zip::ZipArchive::new(File::open(path)?)?;
        let prefix = format!("agency-{client_id}");

        let mut pending: Vec<String> = archive
            .file_names()
            .filter(|name| name.starts_with(&prefix))
            .map(str::to_string)
            .collect();
        pending.sort();
        pending.reverse();

        debug!(action = "open_archive", entries = pending.len());

        Ok(Self {
            archive,
            pending,
            current: Vec::new().into_iter(),
        })
    }

    /// Load the next matching entry. Returns `false` when none remain.
    fn advance_entry(&mut self) -> Result<bool> {
        let Some(name) = self.pending.pop() else {
            return Ok(false);
        };

        let mut entry = self.archive.by_name(&name)?;
        let mut text = String::new();
        entry.read_to_string(&mut text)?;

        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        debug!(action = "open_archive_entry", entry = %name, lines = lines.len());
        self.current = lines.into_iter();
        Ok(true)
    }
}

impl LineSource for ArchiveLineSource {
    fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(line) = self.current.next() {
                return Ok(Some(line));
            }
            if !self.advance_entry()? {
                return Ok(None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    use super::*;

    fn drain(source: &mut impl LineSource) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = source.next_line().unwrap() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_plain_source_yields_lines_in_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a,b,1,2000-01-01,10").unwrap();
        writeln!(file, "c,d,2,2000-01-02,20").unwrap();
        file.flush().unwrap();

        let mut source = PlainLineSource::open(file.path()).unwrap();
        assert_eq!(
            drain(&mut source),
            vec!["a,b,1,2000-01-01,10", "c,d,2,2000-01-02,20"]
        );
    }

    #[test]
    fn test_plain_source_empty_file_runs_dry_immediately() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut source = PlainLineSource::open(file.path()).unwrap();
        assert!(source.next_line().unwrap().is_none());
        // Stays dry.
        assert!(source.next_line().unwrap().is_none());
    }

    fn write_archive(entries: &[(&str, &str)]) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut writer = zip::ZipWriter::new(file.reopen().unwrap());
        for (name, body) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        file
    }

    #[test]
    fn test_archive_source_chains_matching_entries_in_name_order() {
        let file = write_archive(&[
            ("agency-1-b.csv", "third\nfourth\n"),
            ("agency-2.csv", "other agency\n"),
            ("agency-1-a.csv", "first\nsecond\n"),
        ]);

        let mut source = ArchiveLineSource::open(file.path(), "1").unwrap();
        assert_eq!(
            drain(&mut source),
            vec!["first", "second", "third", "fourth"]
        );
    }

    #[test]
    fn test_archive_source_no_matching_entries_runs_dry() {
        let file = write_archive(&[("agency-2.csv", "x\n")]);
        let mut source = ArchiveLineSource::open(file.path(), "1").unwrap();
        assert!(source.next_line().unwrap().is_none());
    }
}
