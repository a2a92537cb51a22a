//! CSV export of one vocabulary.
//!
//! # Responsibility
//! - Render words as `headword,meanings` lines.
//! - Write `<vocabulary name>.csv` into the export root atomically.
//!
//! # Invariants
//! - Rows follow insertion order; every line ends with `\n`.
//! - Fields are written unquoted. A meanings field with several meanings
//!   therefore spans several CSV columns; existing consumers read it that way.
//! - A failed export leaves no partial file at the target path.

use crate::model::vocabulary::Vocabulary;
use crate::model::word::Word;
use crate::repo::word_repo::{WordOrder, WordRepository};
use crate::repo::RepoError;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;

const CSV_EXTENSION: &str = "csv";

/// Export failure. Callers surface it as a single "export failed" signal.
#[derive(Debug)]
pub enum ExportError {
    Repo(RepoError),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "export failed: {err}"),
            Self::Io { path, source } => {
                write!(f, "export failed writing `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<RepoError> for ExportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result of a successful export, used to hand the file to a share target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub path: PathBuf,
    pub word_count: usize,
}

/// Writes vocabularies to CSV files under one export root.
pub struct ExportService<R: WordRepository> {
    repo: R,
    export_dir: PathBuf,
}

impl<R: WordRepository> ExportService<R> {
    pub fn new(repo: R, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo,
            export_dir: export_dir.into(),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Exports every word of `vocabulary`, replacing an earlier export file.
    pub fn export(&self, vocabulary: &Vocabulary) -> Result<CsvExport, ExportError> {
        let started_at = Instant::now();
        let result = self.export_inner(vocabulary);
        match &result {
            Ok(export) => info!(
                "event=vocabulary_export module=export status=ok vocabulary_id={} words={} duration_ms={}",
                vocabulary.id,
                export.word_count,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=vocabulary_export module=export status=error vocabulary_id={} duration_ms={} error={}",
                vocabulary.id,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn export_inner(&self, vocabulary: &Vocabulary) -> Result<CsvExport, ExportError> {
        let words = self.repo.list_words(&vocabulary.table, WordOrder::Insertion)?;
        let path = self.export_dir.join(export_file_name(&vocabulary.name));
        write_atomically(&self.export_dir, &path, render_csv(&words).as_bytes())?;
        Ok(CsvExport {
            path,
            word_count: words.len(),
        })
    }
}

/// Renders words as unquoted `headword,meanings\n` lines.
pub fn render_csv(words: &[Word]) -> String {
    let mut text = String::new();
    for word in words {
        text.push_str(&word.headword);
        text.push(',');
        text.push_str(&word.meanings);
        text.push('\n');
    }
    text
}

/// File name for a vocabulary export: `<name>.csv`, with path separators
/// replaced so the file stays inside the export root.
pub fn export_file_name(vocabulary_name: &str) -> String {
    let stem: String = vocabulary_name
        .trim()
        .chars()
        .map(|ch| if matches!(ch, '/' | '\\') { '_' } else { ch })
        .collect();
    let stem = match stem.as_str() {
        "" | "." | ".." => "vocabulary".to_string(),
        _ => stem,
    };
    format!("{stem}.{CSV_EXTENSION}")
}

fn write_atomically(dir: &Path, path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    let io_error = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(io_error)?;
    let temp_file = NamedTempFile::new_in(dir).map_err(io_error)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        writer.write_all(contents).map_err(io_error)?;
        writer.flush().map_err(io_error)?;
    }
    temp_file
        .persist(path)
        .map_err(|err| io_error(err.error))?;
    Ok(())
}
