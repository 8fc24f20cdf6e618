//! Class identity extracted from a compiled unit's header

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::constants::ConstantPool;
use crate::core::access::ClassAccess;
use crate::core::reader::ByteReader;
use crate::error::{ClassFormatError, Result};

/// Magic number at offset 0 of every class file
pub const CLASS_MAGIC: u32 = 0xCAFE_BABE;

/// Fixed prefix every class file must have: magic, minor, major, pool count.
pub const MIN_CLASS_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassVersion {
    pub major: u16,
    pub minor: u16,
}

impl fmt::Display for ClassVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Names and flags read from the fixed fields after the constant pool.
///
/// Names are dotted. `super_name` is empty when the class has no superclass
/// (or its index cannot be resolved); interface names keep declaration
/// order and an unresolvable interface index yields an empty name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassHeader {
    pub version: ClassVersion,
    pub access: ClassAccess,
    pub this_name: String,
    pub super_name: String,
    pub interface_names: Vec<String>,
}

impl ClassHeader {
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < MIN_CLASS_LEN {
            return Err(ClassFormatError::TooShort {
                len: data.len(),
                required: MIN_CLASS_LEN,
            });
        }

        let mut reader = ByteReader::new(data);
        let magic = reader.u4()?;
        if magic != CLASS_MAGIC {
            return Err(ClassFormatError::BadMagic {
                expected: CLASS_MAGIC,
                found: magic,
            });
        }
        let minor = reader.u2()?;
        let major = reader.u2()?;

        let pool = ConstantPool::parse(&mut reader)?;
        if let Some(stop) = pool.stop() {
            // The fixed fields sit after the pool, which we could not finish.
            return Err(ClassFormatError::UnknownConstantTag {
                tag: stop.tag,
                slot: stop.slot,
                offset: stop.offset,
            });
        }

        let access = ClassAccess::from_bits_retain(reader.u2()?);
        let this_index = reader.u2()?;
        let super_index = reader.u2()?;
        let interface_count = reader.u2()?;

        let mut interface_names =
            Vec::with_capacity(usize::from(interface_count).min(reader.remaining() / 2));
        for _ in 0..interface_count {
            let index = reader.u2()?;
            interface_names.push(pool.resolve_class_name(index));
        }

        let this_name = pool.resolve_class_name(this_index);
        if this_name.is_empty() {
            return Err(ClassFormatError::MissingThisClass { index: this_index });
        }
        let super_name = pool.resolve_class_name(super_index);

        trace!(
            class = %this_name,
            super_class = %super_name,
            interfaces = interface_names.len(),
            pool_slots = pool.len(),
            "parsed class header"
        );

        Ok(Self {
            version: ClassVersion { major, minor },
            access,
            this_name,
            super_name,
            interface_names,
        })
    }
}

/// A parsed class unit ready for definition: identity plus the untouched
/// bytes it was parsed from.
#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    qualified_name: String,
    super_name: String,
    interface_names: Vec<String>,
    access: ClassAccess,
    version: ClassVersion,
    bytecode: Arc<[u8]>,
}

impl ClassDescriptor {
    /// Parse the header of `bytecode` and keep the buffer alongside it.
    pub fn parse(bytecode: impl Into<Arc<[u8]>>) -> Result<Self> {
        let bytecode = bytecode.into();
        let header = ClassHeader::parse(&bytecode)?;
        Ok(Self {
            qualified_name: header.this_name,
            super_name: header.super_name,
            interface_names: header.interface_names,
            access: header.access,
            version: header.version,
            bytecode,
        })
    }

    /// Build a descriptor without parsing, for callers that already know the
    /// class identity.
    pub fn from_parts(
        qualified_name: impl Into<String>,
        super_name: impl Into<String>,
        interface_names: Vec<String>,
        bytecode: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            super_name: super_name.into(),
            interface_names,
            access: ClassAccess::empty(),
            version: ClassVersion { major: 0, minor: 0 },
            bytecode: bytecode.into(),
        }
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn super_name(&self) -> &str {
        &self.super_name
    }

    pub fn interface_names(&self) -> &[String] {
        &self.interface_names
    }

    pub fn access(&self) -> ClassAccess {
        self.access
    }

    pub fn version(&self) -> ClassVersion {
        self.version
    }

    pub fn bytecode(&self) -> &[u8] {
        &self.bytecode
    }

    /// Names this class must see defined first: the superclass, then each
    /// interface in declaration order. Empty names are skipped.
    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.super_name.as_str())
            .chain(self.interface_names.iter().map(String::as_str))
            .filter(|name| !name.is_empty())
    }
}
