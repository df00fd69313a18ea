use std::path::{Path, PathBuf};

use crate::error::{QueryError, Result};
use crate::statements::BUILT_IN;

/// One statement to submit, plus where it came from for log lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub label: String,
    pub text: String,
    /// Values substituted into `text`; masked wherever the text is logged.
    pub(crate) substituted: Vec<String>,
}

impl Statement {
    pub fn new(label: impl Into<String>, text: &str) -> Self {
        Self {
            label: label.into(),
            text: text.trim().to_string(),
            substituted: Vec::new(),
        }
    }

    /// Mask every substituted value in `text` (a log line, an error body).
    pub fn redact(&self, text: &str) -> String {
        // Longest first, so a value containing another is masked whole.
        let mut values: Vec<&str> = self
            .substituted
            .iter()
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .collect();
        values.sort_by_key(|v| std::cmp::Reverse(v.len()));

        values
            .into_iter()
            .fold(text.to_string(), |acc, v| acc.replace(v, "***"))
    }
}

#[derive(Debug, Clone)]
pub enum QuerySource {
    BuiltIn,
    /// One statement per file, in the order given.
    Files(Vec<PathBuf>),
    /// Every `*.sql` file in the directory, in lexical order.
    Dir(PathBuf),
}

pub struct QueryLoader;

impl QueryLoader {
    pub fn load(source: &QuerySource) -> Result<Vec<Statement>> {
        let statements = match source {
            QuerySource::BuiltIn => Self::built_in(),
            QuerySource::Files(paths) => Self::from_files(paths)?,
            QuerySource::Dir(dir) => Self::from_dir(dir)?,
        };

        let (kept, blank): (Vec<_>, Vec<_>) =
            statements.into_iter().partition(|s| !s.text.is_empty());
        for s in &blank {
            tracing::warn!(label = %s.label, "Skipping empty statement");
        }
        Ok(kept)
    }

    pub fn built_in() -> Vec<Statement> {
        BUILT_IN
            .iter()
            .enumerate()
            .map(|(i, text)| Statement::new(format!("built-in #{}", i + 1), text))
            .collect()
    }

    pub fn from_files(paths: &[PathBuf]) -> Result<Vec<Statement>> {
        paths
            .iter()
            .map(|path| {
                let text = read(path)?;
                Ok(Statement::new(path.display().to_string(), &text))
            })
            .collect()
    }

    pub fn from_dir(dir: &Path) -> Result<Vec<Statement>> {
        let entries = std::fs::read_dir(dir).map_err(|e| io_error(dir, e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| io_error(dir, e))?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            return Err(QueryError::Empty(dir.to_path_buf()));
        }
        paths.sort();

        Self::from_files(&paths)
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, err: std::io::Error) -> QueryError {
    QueryError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_starts_by_terminating_queries() {
        let statements = QueryLoader::load(&QuerySource::BuiltIn).unwrap();
        assert_eq!(statements.len(), 7);
        assert_eq!(statements[0].text, "TERMINATE ALL;");
        assert_eq!(statements[0].label, "built-in #1");
        assert!(statements[4].text.starts_with("CREATE STREAM IF NOT EXISTS netflix_activity"));
        assert!(statements[4].text.contains("${KAFKA_TOPIC}"));
    }

    #[test]
    fn files_are_read_verbatim_and_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.sql");
        std::fs::write(&a, "\n  SHOW STREAMS;\n\n").unwrap();

        let statements = QueryLoader::from_files(&[a.clone()]).unwrap();
        assert_eq!(statements, vec![Statement::new(a.display().to_string(), "SHOW STREAMS;")]);
    }

    #[test]
    fn dir_reads_sql_files_in_lexical_order_and_skips_blank_ones() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("20_tables.sql"), "CREATE TABLE t AS SELECT 1;").unwrap();
        std::fs::write(dir.path().join("10_stream.sql"), "CREATE STREAM s;").unwrap();
        std::fs::write(dir.path().join("15_blank.sql"), "   \n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a statement").unwrap();

        let statements =
            QueryLoader::load(&QuerySource::Dir(dir.path().to_path_buf())).unwrap();
        let texts: Vec<_> = statements.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["CREATE STREAM s;", "CREATE TABLE t AS SELECT 1;"]);
    }

    #[test]
    fn redact_masks_longest_values_first() {
        let mut stmt = Statement::new("s", "user=ABC pass=ABC123");
        stmt.substituted = vec!["ABC".into(), "ABC123".into(), String::new()];
        assert_eq!(stmt.redact(&stmt.text), "user=*** pass=***");
    }

    #[test]
    fn dir_without_sql_files_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = QueryLoader::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, QueryError::Empty(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = QueryLoader::from_files(&[PathBuf::from("/nonexistent/x.sql")]).unwrap_err();
        assert!(matches!(err, QueryError::Io { .. }));
    }
}
