use thiserror::Error;

/// The different error types that can result from [Washi](crate::Washi)
/// operations
#[derive(Debug, Error)]
pub enum Error {
    /// Fetching, caching, or compiling a template failed
    #[error(transparent)]
    Loader(#[from] washi_loader::LoaderError),

    /// The render aborted on structurally broken bytecode
    #[error(transparent)]
    Render(#[from] washi_runtime::Error),
}

/// The Result type returned by [Washi](crate::Washi) operations
pub type Result<T> = std::result::Result<T, Error>;
