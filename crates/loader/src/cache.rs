use crate::{LoaderError, Result};
use rustc_hash::FxHashMap;
use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};
use washi_bytecode::ByteCode;

/// How the cached loader treats its caches
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheStrategy {
    /// Bypass the cache entirely: always fetch, parse, and compile
    None,
    /// Use a hit only when the template source is older than the cached
    /// bytecode's generation timestamp
    #[default]
    Verify,
    /// Use a hit unconditionally
    NoVerify,
}

/// A bytecode cache backend
///
/// Backends are fallible, but the cached loader treats every failure as a
/// miss: a broken cache costs a recompile, never a failed render.
pub trait Cache {
    /// The cached bytecode for `key`, `None` on a miss
    ///
    /// An entry that can't be decoded (truncated, corrupted, or written by
    /// an incompatible format version) is reported as a miss.
    fn get(&mut self, key: &str) -> Result<Option<ByteCode>>;

    /// Stores bytecode under `key`
    fn set(&mut self, key: &str, bytecode: &ByteCode) -> Result<()>;

    /// Removes the entry for `key`, a no-op when it's absent
    fn delete(&mut self, key: &str) -> Result<()>;
}

/// An in-process cache, consulted before any persistent backend
#[derive(Default)]
pub struct MemoryCache {
    entries: FxHashMap<String, ByteCode>,
}

impl MemoryCache {
    /// Makes an empty cache
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cache for MemoryCache {
    fn get(&mut self, key: &str) -> Result<Option<ByteCode>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, bytecode: &ByteCode) -> Result<()> {
        self.entries.insert(key.into(), bytecode.clone());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A cache that persists encoded bytecode underneath a root directory
///
/// Each key maps to one file holding the bytecode's portable encoding.
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Makes a cache rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Where a given template key is cached in the filesystem
    ///
    /// The key is reduced to a relative path: root and drive prefixes are
    /// stripped, and keys with parent-directory components are rejected so
    /// entries can't escape the cache root.
    pub fn cache_path(&self, key: &str) -> Result<PathBuf> {
        let mut relative = PathBuf::new();
        for component in Path::new(key).components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
                Component::ParentDir => {
                    return Err(LoaderError::UncacheableKey(key.into()));
                }
            }
        }
        if relative.as_os_str().is_empty() {
            return Err(LoaderError::UncacheableKey(key.into()));
        }
        Ok(self.dir.join(relative))
    }
}

impl Cache for FileCache {
    fn get(&mut self, key: &str) -> Result<Option<ByteCode>> {
        let path = self.cache_path(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        // Undecodable entries behave as misses; the loader recompiles and
        // overwrites them.
        Ok(ByteCode::from_bytes(&bytes).ok())
    }

    fn set(&mut self, key: &str, bytecode: &ByteCode) -> Result<()> {
        let path = self.cache_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytecode.to_bytes()?)?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        let path = self.cache_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use washi_bytecode::Op;

    fn sample() -> ByteCode {
        let mut bc = ByteCode::new();
        bc.append_with_arg(Op::Literal, "cached");
        bc.append(Op::Print);
        bc.append(Op::End);
        bc
    }

    #[test]
    fn memory_cache_round_trips() {
        let mut cache = MemoryCache::new();
        assert!(cache.get("a.tx").unwrap().is_none());

        let bc = sample();
        cache.set("a.tx", &bc).unwrap();
        assert_eq!(cache.get("a.tx").unwrap(), Some(bc));

        cache.delete("a.tx").unwrap();
        assert!(cache.get("a.tx").unwrap().is_none());
    }

    #[test]
    fn file_cache_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = FileCache::new(dir.path()).unwrap();

        let bc = sample();
        cache.set("pages/index.tx", &bc).unwrap();
        assert_eq!(cache.get("pages/index.tx").unwrap(), Some(bc));

        cache.delete("pages/index.tx").unwrap();
        assert!(cache.get("pages/index.tx").unwrap().is_none());
    }

    #[test]
    fn deleting_a_missing_entry_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = FileCache::new(dir.path()).unwrap();
        cache.delete("never-stored.tx").unwrap();
    }

    #[test]
    fn corrupted_entries_behave_as_misses() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = FileCache::new(dir.path()).unwrap();

        cache.set("a.tx", &sample()).unwrap();
        fs::write(cache.cache_path("a.tx").unwrap(), b"not bytecode").unwrap();
        assert!(cache.get("a.tx").unwrap().is_none());
    }

    #[test]
    fn absolute_keys_are_stored_relative_to_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();

        let path = cache.cache_path("/pages/index.tx").unwrap();
        assert_eq!(path, dir.path().join("pages/index.tx"));
    }

    #[test]
    fn keys_cannot_escape_the_cache_root() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();

        assert!(matches!(
            cache.cache_path("../outside.tx"),
            Err(LoaderError::UncacheableKey(_))
        ));
        assert!(matches!(
            cache.cache_path(""),
            Err(LoaderError::UncacheableKey(_))
        ));
    }
}
