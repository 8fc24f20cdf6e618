//! Minimal class file emitter
//!
//! Produces structurally valid class files with no fields, methods or
//! attributes. Such classes pass host verification, which makes them useful
//! as fixtures wherever a real compiled unit is needed.

use crate::core::access::ClassAccess;
use crate::core::descriptor::CLASS_MAGIC;
use crate::core::tags::ConstantTag;

/// Extra pool records placed ahead of the class references
#[derive(Debug, Clone, PartialEq)]
enum ExtraConstant {
    Utf8(String),
    Integer(i32),
    Long(i64),
    Double(f64),
}

#[derive(Debug, Clone)]
pub struct ClassFileWriter {
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    access: ClassAccess,
    major: u16,
    minor: u16,
    extra: Vec<ExtraConstant>,
}

impl ClassFileWriter {
    /// Start a class with internal name `name` (e.g. `com/example/App`),
    /// extending `java/lang/Object`, class file version 52.0.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_name: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            access: ClassAccess::PUBLIC | ClassAccess::SUPER,
            major: 52,
            minor: 0,
            extra: Vec::new(),
        }
    }

    pub fn super_class(mut self, name: impl Into<String>) -> Self {
        self.super_name = Some(name.into());
        self
    }

    /// Emit a super-class index of 0
    pub fn without_super(mut self) -> Self {
        self.super_name = None;
        self
    }

    pub fn interface(mut self, name: impl Into<String>) -> Self {
        self.interfaces.push(name.into());
        self
    }

    pub fn access(mut self, access: ClassAccess) -> Self {
        self.access = access;
        self
    }

    pub fn version(mut self, major: u16, minor: u16) -> Self {
        self.major = major;
        self.minor = minor;
        self
    }

    pub fn utf8_constant(mut self, text: impl Into<String>) -> Self {
        self.extra.push(ExtraConstant::Utf8(text.into()));
        self
    }

    pub fn integer_constant(mut self, value: i32) -> Self {
        self.extra.push(ExtraConstant::Integer(value));
        self
    }

    pub fn long_constant(mut self, value: i64) -> Self {
        self.extra.push(ExtraConstant::Long(value));
        self
    }

    pub fn double_constant(mut self, value: f64) -> Self {
        self.extra.push(ExtraConstant::Double(value));
        self
    }

    /// Serialize the class file.
    ///
    /// # Panics
    ///
    /// Panics if the constant pool would exceed 65535 slots.
    pub fn build(&self) -> Vec<u8> {
        let mut pool = PoolWriter::default();
        for constant in &self.extra {
            match constant {
                ExtraConstant::Utf8(text) => pool.utf8(text),
                ExtraConstant::Integer(value) => {
                    pool.record(ConstantTag::Integer, &value.to_be_bytes())
                }
                ExtraConstant::Long(value) => pool.record(ConstantTag::Long, &value.to_be_bytes()),
                ExtraConstant::Double(value) => {
                    pool.record(ConstantTag::Double, &value.to_be_bytes())
                }
            };
        }

        let this_index = pool.class(&self.name);
        let super_index = self
            .super_name
            .as_deref()
            .map_or(0, |name| pool.class(name));
        let interface_indices: Vec<u16> = self
            .interfaces
            .iter()
            .map(|name| pool.class(name))
            .collect();

        let mut out = Vec::with_capacity(pool.bytes.len() + 32);
        out.extend_from_slice(&CLASS_MAGIC.to_be_bytes());
        out.extend_from_slice(&self.minor.to_be_bytes());
        out.extend_from_slice(&self.major.to_be_bytes());
        out.extend_from_slice(&pool.next.to_be_bytes());
        out.extend_from_slice(&pool.bytes);
        out.extend_from_slice(&self.access.bits().to_be_bytes());
        out.extend_from_slice(&this_index.to_be_bytes());
        out.extend_from_slice(&super_index.to_be_bytes());
        out.extend_from_slice(&count_u16(interface_indices.len()).to_be_bytes());
        for index in interface_indices {
            out.extend_from_slice(&index.to_be_bytes());
        }
        // fields, methods, attributes
        out.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
        out
    }
}

struct PoolWriter {
    bytes: Vec<u8>,
    next: u16,
}

impl Default for PoolWriter {
    fn default() -> Self {
        Self {
            bytes: Vec::new(),
            next: 1,
        }
    }
}

impl PoolWriter {
    fn record(&mut self, tag: ConstantTag, payload: &[u8]) -> u16 {
        let index = self.next;
        self.bytes.push(tag.to_byte());
        self.bytes.extend_from_slice(payload);
        self.next = self
            .next
            .checked_add(tag.layout().slots)
            .expect("constant pool overflow");
        index
    }

    fn utf8(&mut self, text: &str) -> u16 {
        let mut payload = count_u16(text.len()).to_be_bytes().to_vec();
        payload.extend_from_slice(text.as_bytes());
        self.record(ConstantTag::Utf8, &payload)
    }

    fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.record(ConstantTag::Class, &name_index.to_be_bytes())
    }
}

fn count_u16(len: usize) -> u16 {
    u16::try_from(len).expect("class file count exceeds u16")
}
