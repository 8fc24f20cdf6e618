//! Class entry extraction from an in-memory ZIP/JAR container

use std::io::{Cursor, Read};

use jarmap_classfile::CLASS_FILE_SUFFIX;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::error::{ArchiveError, EntryDecodeError};

/// Entries whose name contains this are never loaded, whatever their suffix.
pub const MODULE_DESCRIPTOR_MARKER: &str = "module-info";

/// Upper bound on the buffer reserved up front for one entry. The declared
/// size comes from the archive and is only a hint.
const MAX_PREALLOCATION: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Whether an archive member name denotes a loadable class unit.
pub fn is_class_entry(name: &str) -> bool {
    name.ends_with(CLASS_FILE_SUFFIX) && !name.contains(MODULE_DESCRIPTOR_MARKER)
}

/// Decompress every class member of `data`, in archive order.
///
/// Members that fail to decompress are skipped with a warning. Fails if the
/// container itself is unreadable or no class member survives.
pub fn read_class_entries(data: &[u8]) -> Result<Vec<ArchiveEntry>, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    info!(
        files = archive.len(),
        bytes = data.len(),
        "opened archive"
    );

    let mut entries = Vec::new();
    for index in 0..archive.len() {
        let Some(name) = archive.name_for_index(index).map(str::to_owned) else {
            continue;
        };
        if !is_class_entry(&name) {
            debug!(entry = %name, "skipping non-class entry");
            continue;
        }

        match extract(&mut archive, index, name) {
            Ok(Some(entry)) => entries.push(entry),
            Ok(None) => {}
            Err(err) => warn!("{err}"),
        }
    }

    if entries.is_empty() {
        return Err(ArchiveError::NoClassEntries);
    }
    info!(classes = entries.len(), "extracted class entries");
    Ok(entries)
}

fn extract(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    index: usize,
    name: String,
) -> Result<Option<ArchiveEntry>, EntryDecodeError> {
    let decode_error = |name: &str, reason: String| EntryDecodeError {
        name: name.to_string(),
        reason,
    };

    let mut file = archive
        .by_index(index)
        .map_err(|err| decode_error(&name, err.to_string()))?;
    if file.is_dir() {
        return Ok(None);
    }

    let capacity = usize::try_from(file.size())
        .unwrap_or(usize::MAX)
        .min(MAX_PREALLOCATION);
    let mut bytes = Vec::with_capacity(capacity);
    file.read_to_end(&mut bytes)
        .map_err(|err| decode_error(&name, err.to_string()))?;

    Ok(Some(ArchiveEntry { name, bytes }))
}
