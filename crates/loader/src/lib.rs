//! Contains template fetching and bytecode caching for the washi template
//! engine
//!
//! The loader pipeline turns a template key into a ready-to-run
//! [ByteCode](washi_bytecode::ByteCode): a [TemplateFetcher] locates the
//! template source, a [TemplateCompiler] (supplied by the embedder) compiles
//! it, and a stack of [Cache] backends keeps compiled bytecode around so the
//! parse-and-compile step can be skipped on later loads.

#![warn(missing_docs)]

mod cache;
mod error;
mod fetcher;
mod loader;

pub use crate::{
    cache::{Cache, CacheStrategy, FileCache, MemoryCache},
    error::{LoaderError, Result},
    fetcher::{FileFetcher, FileSource, StringSource, TemplateFetcher, TemplateSource},
    loader::{ByteCodeLoader, CachedByteCodeLoader, StringByteCodeLoader, TemplateCompiler},
};
