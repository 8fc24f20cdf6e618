//! The load facade: archive bytes in, defined classes out

use jarmap_classfile::ClassDescriptor;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::archive::{read_class_entries, ArchiveEntry};
use crate::bridge::RuntimeBridge;
use crate::entry;
use crate::error::{ArchiveError, LoadError};
use crate::graph::DependencyGraphLoader;
use crate::registry::ClassRegistry;

/// An archive member that never made it into the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedUnit {
    pub entry: String,
    pub reason: String,
}

/// Outcome of a successful [`MemoryClassLoader::load`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    /// Class members extracted from the archive
    pub entries: usize,
    /// Descriptors admitted to the registry
    pub classes: usize,
    pub skipped: Vec<SkippedUnit>,
    /// Qualified names in definition order
    pub defined: Vec<String>,
}

/// Parse every extracted entry and admit it to a fresh registry.
///
/// Malformed units and later duplicates of an already admitted name are
/// reported as skipped; nothing here is fatal.
pub fn build_registry(entries: Vec<ArchiveEntry>) -> (ClassRegistry, Vec<SkippedUnit>) {
    let mut registry = ClassRegistry::new();
    let mut skipped = Vec::new();

    for ArchiveEntry { name, bytes } in entries {
        let reason = match ClassDescriptor::parse(bytes) {
            Ok(descriptor) => match registry.insert(descriptor) {
                Ok(_) => continue,
                Err(err) => err.to_string(),
            },
            Err(err) => err.to_string(),
        };
        warn!(entry = %name, "skipping class unit: {reason}");
        skipped.push(SkippedUnit { entry: name, reason });
    }

    (registry, skipped)
}

/// Loads class archives into a host runtime and runs their entry point.
pub struct MemoryClassLoader<B: RuntimeBridge> {
    bridge: B,
    loaded: bool,
}

impl<B: RuntimeBridge> MemoryClassLoader<B> {
    pub fn new(bridge: B) -> Self {
        Self {
            bridge,
            loaded: false,
        }
    }

    /// Extract, parse and define every class in `archive`.
    ///
    /// Fails if the container is unreadable, no class survives parsing, the
    /// class graph has a cycle or the host rejects a definition. Classes
    /// defined before a failure stay defined in the host.
    pub fn load(&mut self, archive: &[u8]) -> Result<LoadSummary, LoadError> {
        self.loaded = false;
        let entries = read_class_entries(archive).inspect_err(|err| error!("{err}"))?;
        let entry_count = entries.len();

        let (mut registry, skipped) = build_registry(entries);
        if registry.is_empty() {
            let err = ArchiveError::NoClassEntries;
            error!("{err}");
            return Err(err.into());
        }

        let defined = self.load_registry(&mut registry)?;
        info!(
            defined = defined.len(),
            skipped = skipped.len(),
            "archive loaded"
        );

        Ok(LoadSummary {
            entries: entry_count,
            classes: registry.len(),
            skipped,
            defined,
        })
    }

    /// Define every pending slot of an already populated registry.
    pub fn load_registry(
        &mut self,
        registry: &mut ClassRegistry,
    ) -> Result<Vec<String>, LoadError> {
        self.loaded = false;
        let defined = DependencyGraphLoader::new(registry, &mut self.bridge).define_all()?;
        self.loaded = true;
        Ok(defined)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Run `class_name.method_name()V`. Only allowed after a load succeeded.
    pub fn invoke_entry_point(
        &mut self,
        class_name: &str,
        method_name: &str,
    ) -> Result<(), LoadError> {
        if !self.loaded {
            error!(class = %class_name, method = %method_name, "entry point requested before load");
            return Err(LoadError::NotLoaded);
        }

        entry::invoke_entry_point(&mut self.bridge, class_name, method_name).map_err(|err| {
            error!(class = %class_name, method = %method_name, error = %err, "entry point failed");
            LoadError::from(err)
        })
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn into_bridge(self) -> B {
        self.bridge
    }
}
