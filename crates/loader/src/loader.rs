use crate::{Cache, CacheStrategy, MemoryCache, Result, TemplateFetcher, TemplateSource};
use washi_bytecode::ByteCode;

/// Compiles template source into bytecode
///
/// The template parser and the AST-to-bytecode compiler live outside this
/// repository; embedders hand the loader an implementation of this contract.
pub trait TemplateCompiler {
    /// Compiles `source`, fetched for `key`, into bytecode
    ///
    /// Failures should be reported via
    /// [LoaderError::compile](crate::LoaderError::compile).
    fn compile(&self, key: &str, source: &str) -> Result<ByteCode>;
}

impl<T: TemplateCompiler + ?Sized> TemplateCompiler for std::rc::Rc<T> {
    fn compile(&self, key: &str, source: &str) -> Result<ByteCode> {
        (**self).compile(key, source)
    }
}

impl<T: TemplateCompiler + ?Sized> TemplateCompiler for Box<T> {
    fn compile(&self, key: &str, source: &str) -> Result<ByteCode> {
        (**self).compile(key, source)
    }
}

/// Loads the bytecode for a template key
pub trait ByteCodeLoader {
    /// Loads the bytecode for the template named by `key`
    fn load(&mut self, key: &str) -> Result<ByteCode>;
}

/// Compiles template source handed to it directly, with no fetching or
/// caching involved
pub struct StringByteCodeLoader<C> {
    compiler: C,
}

impl<C: TemplateCompiler> StringByteCodeLoader<C> {
    /// Makes a loader around the given compiler
    pub fn new(compiler: C) -> Self {
        Self { compiler }
    }

    /// Compiles the given source, using `key` in diagnostics
    pub fn load_string(&self, key: &str, source: &str) -> Result<ByteCode> {
        self.compiler.compile(key, source)
    }
}

/// The caching loader pipeline
///
/// Loading probes a small stack of caches: an in-process [MemoryCache]
/// first, then an optional persistent backend. A miss (or a failed
/// verification) falls through to fetch-and-compile, and the fresh bytecode
/// is written through to every layer. Cache failures are never fatal: the
/// worst a broken cache can cause is a recompile.
pub struct CachedByteCodeLoader<F, C> {
    fetcher: F,
    compiler: C,
    memory: MemoryCache,
    backend: Option<Box<dyn Cache>>,
    strategy: CacheStrategy,
    dump_bytecode: bool,
}

impl<F: TemplateFetcher, C: TemplateCompiler> CachedByteCodeLoader<F, C> {
    /// Makes a loader with the given collaborators
    pub fn new(
        fetcher: F,
        compiler: C,
        backend: Option<Box<dyn Cache>>,
        strategy: CacheStrategy,
    ) -> Self {
        Self {
            fetcher,
            compiler,
            memory: MemoryCache::new(),
            backend,
            strategy,
            dump_bytecode: false,
        }
    }

    /// Enables or disables dumping freshly compiled bytecode to stderr
    pub fn dump_bytecode(&mut self, enabled: bool) {
        self.dump_bytecode = enabled;
    }

    /// Drops the in-process cache layer
    ///
    /// Persistent backend entries are unaffected.
    pub fn clear_memory_cache(&mut self) {
        self.memory = MemoryCache::new();
    }

    fn probe(&mut self, key: &str) -> Option<ByteCode> {
        if let Ok(Some(cached)) = self.memory.get(key) {
            return Some(cached);
        }
        if let Some(backend) = &mut self.backend {
            if let Ok(Some(cached)) = backend.get(key) {
                return Some(cached);
            }
        }
        None
    }

    fn store(&mut self, key: &str, bytecode: &ByteCode) {
        // Write-through failures cost a future recompile, nothing more.
        let _ = self.memory.set(key, bytecode);
        if let Some(backend) = &mut self.backend {
            let _ = backend.set(key, bytecode);
        }
    }
}

impl<F: TemplateFetcher, C: TemplateCompiler> ByteCodeLoader for CachedByteCodeLoader<F, C> {
    fn load(&mut self, key: &str) -> Result<ByteCode> {
        let mut source: Option<Box<dyn TemplateSource>> = None;

        if self.strategy != CacheStrategy::None {
            if let Some(cached) = self.probe(key) {
                if self.strategy == CacheStrategy::NoVerify {
                    return Ok(cached);
                }
                // Verify: the cached bytecode is good while the source
                // hasn't been touched since it was generated.
                let fetched = self.fetcher.fetch(key)?;
                if fetched.last_modified()? < cached.generated_on {
                    return Ok(cached);
                }
                // Stale bytecode, but the fetched source is still usable.
                source = Some(fetched);
            }
        }

        let source = match source {
            Some(source) => source,
            None => self.fetcher.fetch(key)?,
        };
        let content = source.read()?;
        let bytecode = self.compiler.compile(key, &content)?;

        if self.dump_bytecode {
            eprintln!("{bytecode}");
        }

        self.store(key, &bytecode);
        Ok(bytecode)
    }
}
