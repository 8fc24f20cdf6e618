//! Error types for class file parsing

use thiserror::Error;

/// Reasons a compiled class unit is rejected.
///
/// None of these are fatal to an archive load: the offending unit is skipped
/// and the rest of the archive is still processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassFormatError {
    #[error("class file too short: {len} bytes, header needs {required}")]
    TooShort { len: usize, required: usize },

    #[error("bad magic: expected {expected:#010x}, found {found:#010x}")]
    BadMagic { expected: u32, found: u32 },

    #[error("unexpected end of data at offset {offset:#x}: need {needed} bytes, buffer is {len}")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        len: usize,
    },

    #[error("unknown constant pool tag {tag} at slot {slot} (offset {offset:#x})")]
    UnknownConstantTag { tag: u8, slot: u16, offset: usize },

    #[error("this-class index {index} does not name a class")]
    MissingThisClass { index: u16 },
}

/// Convenient Result type
pub type Result<T> = std::result::Result<T, ClassFormatError>;
