use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("failed to open the library {name}: {reason}")]
    LibraryNotFound { name: String, reason: String },
    #[error("failed to find the symbol {symbol}: {reason}")]
    SymbolNotFound { symbol: String, reason: String },
    #[error("invalid name {0:?}: contains an interior NUL byte")]
    InvalidName(String),
    #[error("dynamic library loading is not supported on this platform")]
    Unsupported,
    #[error("engine entry point {0} is still running")]
    EngineRunning(String),
    #[error("failed to spawn the engine thread: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type Result<T, E = LaunchError> = std::result::Result<T, E>;
