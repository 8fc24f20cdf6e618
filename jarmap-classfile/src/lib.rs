//! JVM class file header parsing
//!
//! Reads just enough of a compiled class unit to learn its identity: the
//! class name, its superclass and the interfaces it implements. Input is
//! treated as untrusted; every read is bounds-checked and a malformed unit
//! is reported as a [`ClassFormatError`] instead of panicking.

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod constants;
pub mod core;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use crate::constants::{ConstantEntry, ConstantPool};
pub use crate::core::{
    ClassAccess, ClassDescriptor, ClassFileWriter, ClassHeader, ClassVersion, ConstantTag,
};
pub use crate::error::{ClassFormatError, Result};
pub use crate::types::{to_binary_name, to_internal_name};

/// Suffix of compiled class units inside an archive
pub const CLASS_FILE_SUFFIX: &str = ".class";
