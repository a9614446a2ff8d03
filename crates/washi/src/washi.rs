use crate::Result;
use std::{path::PathBuf, rc::Rc};
use washi_bytecode::ByteCode;
use washi_loader::{
    ByteCodeLoader, Cache, CachedByteCodeLoader, CacheStrategy, FileCache, FileFetcher,
    StringByteCodeLoader, TemplateCompiler,
};
use washi_runtime::{Stash, Vm, VmSettings};

/// The main interface for the washi template engine
///
/// Ties the loader pipeline and the VM together: [render](Washi::render)
/// turns a template key into output, going through the cache stack and the
/// embedder-supplied compiler as needed.
///
/// See the [crate docs](crate) for an example.
pub struct Washi {
    loader: CachedByteCodeLoader<FileFetcher, Rc<dyn TemplateCompiler>>,
    string_loader: StringByteCodeLoader<Rc<dyn TemplateCompiler>>,
    vm: Vm,
}

impl Washi {
    /// Makes an engine around the given compiler, with default settings
    pub fn new(compiler: impl TemplateCompiler + 'static) -> Result<Self> {
        Self::with_settings(WashiSettings::default(), compiler)
    }

    /// Makes an engine with the given settings
    pub fn with_settings(
        settings: WashiSettings,
        compiler: impl TemplateCompiler + 'static,
    ) -> Result<Self> {
        let compiler: Rc<dyn TemplateCompiler> = Rc::new(compiler);

        let backend = match settings.cache_dir {
            Some(dir) => Some(Box::new(FileCache::new(dir)?) as Box<dyn Cache>),
            None => None,
        };
        let mut loader = CachedByteCodeLoader::new(
            FileFetcher::new(settings.search_roots),
            compiler.clone(),
            backend,
            settings.cache_strategy,
        );
        loader.dump_bytecode(settings.dump_bytecode);

        Ok(Self {
            loader,
            string_loader: StringByteCodeLoader::new(compiler),
            vm: Vm::with_settings(settings.vm_settings),
        })
    }

    /// Renders the template named by `key` against the given variables
    pub fn render(&mut self, key: &str, vars: &Stash) -> Result<String> {
        let bytecode = self.loader.load(key)?;
        Ok(self.vm.render(&bytecode, vars)?)
    }

    /// Compiles and renders template source handed in directly
    ///
    /// String renders skip the cache stack.
    pub fn render_string(&mut self, source: &str, vars: &Stash) -> Result<String> {
        let bytecode = self.string_loader.load_string("<string>", source)?;
        Ok(self.vm.render(&bytecode, vars)?)
    }

    /// Renders already-compiled bytecode
    pub fn render_bytecode(&mut self, bytecode: &ByteCode, vars: &Stash) -> Result<String> {
        Ok(self.vm.render(bytecode, vars)?)
    }

    /// The warnings recorded by the most recent render
    pub fn warnings(&self) -> &[String] {
        self.vm.warnings()
    }

    /// Drops the loader's in-process cache layer
    ///
    /// Useful when templates on disk may have changed underneath a
    /// [NoVerify](CacheStrategy::NoVerify) engine.
    pub fn clear_memory_cache(&mut self) {
        self.loader.clear_memory_cache();
    }
}

/// Settings used to control the behaviour of the [Washi] engine
pub struct WashiSettings {
    /// Directories searched for templates, in order
    pub search_roots: Vec<PathBuf>,
    /// How cache hits are treated
    pub cache_strategy: CacheStrategy,
    /// Where compiled bytecode is persisted; `None` keeps caching in memory
    /// only
    pub cache_dir: Option<PathBuf>,
    /// Dump freshly compiled bytecode to stderr
    pub dump_bytecode: bool,
    /// Settings passed through to the VM
    pub vm_settings: VmSettings,
}

impl Default for WashiSettings {
    fn default() -> Self {
        Self {
            search_roots: vec![PathBuf::from(".")],
            cache_strategy: CacheStrategy::default(),
            cache_dir: None,
            dump_bytecode: false,
            vm_settings: VmSettings::default(),
        }
    }
}
