use crate::{LoaderError, Result};
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::SystemTime,
};

/// A located template, able to report its age and produce its content
pub trait TemplateSource: std::fmt::Debug {
    /// When the template was last modified
    ///
    /// [CacheStrategy::Verify](crate::CacheStrategy::Verify) compares this
    /// against the cached bytecode's generation timestamp.
    fn last_modified(&self) -> io::Result<SystemTime>;

    /// The template's content
    fn read(&self) -> io::Result<String>;
}

/// Resolves a template key to a [TemplateSource]
pub trait TemplateFetcher {
    /// Fetches the template for `key`
    fn fetch(&self, key: &str) -> Result<Box<dyn TemplateSource>>;
}

/// A template backed by a file on disk
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Makes a source for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file's path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TemplateSource for FileSource {
    fn last_modified(&self) -> io::Result<SystemTime> {
        fs::metadata(&self.path)?.modified()
    }

    fn read(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }
}

/// An in-memory template with a fixed modification time
///
/// Useful for embedders that keep templates away from the filesystem, and
/// for tests that need control over the timestamp the verify strategy sees.
#[derive(Debug)]
pub struct StringSource {
    content: String,
    last_modified: SystemTime,
}

impl StringSource {
    /// Makes a source with the current time as its modification time
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            last_modified: SystemTime::now(),
        }
    }

    /// Overrides the source's modification time
    #[must_use]
    pub fn with_last_modified(mut self, last_modified: SystemTime) -> Self {
        self.last_modified = last_modified;
        self
    }
}

impl TemplateSource for StringSource {
    fn last_modified(&self) -> io::Result<SystemTime> {
        Ok(self.last_modified)
    }

    fn read(&self) -> io::Result<String> {
        Ok(self.content.clone())
    }
}

/// Fetches templates from an ordered list of search roots
///
/// The first root containing the key wins.
pub struct FileFetcher {
    roots: Vec<PathBuf>,
}

impl FileFetcher {
    /// Makes a fetcher over the given search roots
    pub fn new(roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }
}

impl TemplateFetcher for FileFetcher {
    fn fetch(&self, key: &str) -> Result<Box<dyn TemplateSource>> {
        for root in &self.roots {
            let candidate = root.join(key);
            if candidate.is_file() {
                return Ok(Box::new(FileSource::new(candidate)));
            }
        }
        Err(LoaderError::TemplateNotFound(key.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_fetcher_searches_roots_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(second.path().join("index.tx"), "from second").unwrap();

        let fetcher = FileFetcher::new([first.path(), second.path()]);
        let source = fetcher.fetch("index.tx").unwrap();
        assert_eq!(source.read().unwrap(), "from second");

        fs::write(first.path().join("index.tx"), "from first").unwrap();
        let source = fetcher.fetch("index.tx").unwrap();
        assert_eq!(source.read().unwrap(), "from first");
    }

    #[test]
    fn a_missing_template_is_a_typed_error() {
        let root = tempfile::tempdir().unwrap();
        let fetcher = FileFetcher::new([root.path()]);

        let error = fetcher.fetch("absent.tx").unwrap_err();
        assert!(matches!(error, LoaderError::TemplateNotFound(key) if key == "absent.tx"));
    }

    #[test]
    fn string_sources_report_their_fixed_timestamp() {
        let stamp = SystemTime::UNIX_EPOCH;
        let source = StringSource::new("hello").with_last_modified(stamp);
        assert_eq!(source.last_modified().unwrap(), stamp);
        assert_eq!(source.read().unwrap(), "hello");
    }
}
