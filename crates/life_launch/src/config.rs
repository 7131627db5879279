use anyhow::Context;
use log::info;
use serde::Deserialize;
use std::{
    io,
    path::{Path, PathBuf},
};

use crate::{
    entry::{ENGINE_LIBRARY, ENTRY_SYMBOL},
    library::LibrarySource,
};

pub const DEFAULT_CONFIG_PATH: &str = "Config/Launch.json";

/// How the entry point is called on a start transition.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryMode {
    /// Call synchronously on the thread that delivered the start.
    #[default]
    Inline,
    /// Call on a dedicated `engine-main` thread, for engines that own their main loop.
    ///
    /// A start delivered while the previous run is still alive makes no call at all, so the
    /// one-call-per-start rule only holds for starts that find the engine thread finished.
    DedicatedThread,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LaunchConfig {
    pub library: String,
    pub library_path: Option<PathBuf>,
    pub entry_symbol: String,
    pub search_paths: Vec<PathBuf>,
    pub entry_mode: EntryMode,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            library: ENGINE_LIBRARY.to_string(),
            library_path: None,
            entry_symbol: ENTRY_SYMBOL.to_string(),
            search_paths: Vec::new(),
            entry_mode: EntryMode::default(),
        }
    }
}

impl LaunchConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read launch config {}", path.display()))?;
        Self::parse(path, &text)
    }

    /// Like [`LaunchConfig::load`], but a file that does not exist means defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(path, &text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No launch config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read launch config {}", path.display())),
        }
    }

    fn parse(path: &Path, text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text)
            .with_context(|| format!("Failed to parse launch config {}", path.display()))
    }

    pub fn source(&self) -> LibrarySource {
        match &self.library_path {
            Some(path) => LibrarySource::Path(path.clone()),
            None => LibrarySource::Name(self.library.clone()),
        }
    }
}
