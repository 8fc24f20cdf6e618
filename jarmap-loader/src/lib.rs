//! Loads the classes of an in-memory ZIP/JAR archive into a host runtime.
//!
//! The archive is decompressed ([`archive`]), each class unit's header is
//! parsed into a descriptor held by a [`ClassRegistry`], and every class is
//! handed to a [`RuntimeBridge`] only after its in-archive superclass and
//! interfaces ([`graph`]). A static `()V` entry point can then be run
//! ([`entry`]). [`MemoryClassLoader`] ties the steps together.

pub mod archive;
pub mod bridge;
pub mod config;
pub mod entry;
pub mod error;
pub mod graph;
pub mod loader;
pub mod registry;

pub use archive::{is_class_entry, read_class_entries, ArchiveEntry};
pub use bridge::{RecordedMethod, RecordingBridge, RuntimeBridge};
pub use config::{LoaderConfig, CONFIG_ENV};
pub use entry::{invoke_entry_point, ENTRY_SIGNATURE};
pub use error::{
    ArchiveError, BridgeError, ConfigError, EntryDecodeError, LoadError, RegistryError,
};
pub use graph::DependencyGraphLoader;
pub use loader::{build_registry, LoadSummary, MemoryClassLoader, SkippedUnit};
pub use registry::{ClassRegistry, DefinitionState};
