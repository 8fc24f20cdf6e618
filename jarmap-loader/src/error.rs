use std::path::PathBuf;

use thiserror::Error;

/// The archive as a whole could not be used.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("failed to open archive: {0}")]
    Container(#[from] zip::result::ZipError),

    #[error("archive contains no loadable class entries")]
    NoClassEntries,
}

/// A single archive member could not be decompressed. Recovered by skipping
/// the member.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to extract {name}: {reason}")]
pub struct EntryDecodeError {
    pub name: String,
    pub reason: String,
}

/// A parsed unit that could not be admitted to the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("descriptor has an empty class name")]
    EmptyName,

    #[error("duplicate class {0}, keeping the first definition")]
    Duplicate(String),
}

/// Failure reported by the host runtime. Any pending host-side fault has
/// already been drained by the time one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("host rejected definition of {name}: {reason}")]
    Definition { name: String, reason: String },

    #[error("{what} not found: {name} ({reason})")]
    NotFound {
        what: &'static str,
        name: String,
        reason: String,
    },

    #[error("{target} raised: {reason}")]
    Invocation { target: String, reason: String },

    #[error("host environment unavailable: {0}")]
    Environment(String),
}

/// Hard stops of a load or entry-point invocation.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("dependency cycle: {}", .chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("entry point requested before a successful load")]
    NotLoaded,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
