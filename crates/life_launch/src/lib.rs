//! Launch shim for the lifeEngine native library.
//!
//! Loads the engine library once per process and calls its `AndroidMain` entry point on every
//! host start transition. Everything past that call belongs to the engine.

pub mod config;
pub mod entry;
pub mod error;
pub mod launcher;
pub mod library;

pub use config::{DEFAULT_CONFIG_PATH, EntryMode, LaunchConfig};
pub use entry::{ENGINE_LIBRARY, ENTRY_SYMBOL, EngineMainFn, EntryPoint, NativeEntryPoint};
pub use error::LaunchError;
pub use launcher::{Launcher, engine, initialize_engine};
