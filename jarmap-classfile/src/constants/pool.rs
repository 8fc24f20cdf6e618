use byteorder::{BigEndian, ByteOrder};
use std::borrow::Cow;

use crate::core::reader::ByteReader;
use crate::core::tags::{ConstantTag, PayloadShape};
use crate::error::Result;
use crate::types::name::{decode_modified_utf8, to_binary_name};

/// One decoded constant pool record, borrowing text from the class buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstantEntry<'a> {
    /// Raw modified UTF-8 bytes
    Utf8(&'a [u8]),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class {
        name_index: u16,
    },
    String {
        string_index: u16,
    },
    Fieldref {
        class_index: u16,
        name_and_type_index: u16,
    },
    Methodref {
        class_index: u16,
        name_and_type_index: u16,
    },
    InterfaceMethodref {
        class_index: u16,
        name_and_type_index: u16,
    },
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    MethodHandle {
        reference_kind: u8,
        reference_index: u16,
    },
    MethodType {
        descriptor_index: u16,
    },
    Dynamic {
        bootstrap_method_attr_index: u16,
        name_and_type_index: u16,
    },
    InvokeDynamic {
        bootstrap_method_attr_index: u16,
        name_and_type_index: u16,
    },
    Module {
        name_index: u16,
    },
    Package {
        name_index: u16,
    },
}

impl<'a> ConstantEntry<'a> {
    /// Build a record from a payload already sized by `ConstantTag::layout`.
    fn decode(tag: ConstantTag, payload: &'a [u8]) -> Self {
        let u2 = |at: usize| BigEndian::read_u16(&payload[at..at + 2]);
        let pair = || (u2(0), u2(2));

        match tag {
            ConstantTag::Utf8 => ConstantEntry::Utf8(payload),
            ConstantTag::Integer => ConstantEntry::Integer(BigEndian::read_i32(payload)),
            ConstantTag::Float => ConstantEntry::Float(BigEndian::read_f32(payload)),
            ConstantTag::Long => ConstantEntry::Long(BigEndian::read_i64(payload)),
            ConstantTag::Double => ConstantEntry::Double(BigEndian::read_f64(payload)),
            ConstantTag::Class => ConstantEntry::Class { name_index: u2(0) },
            ConstantTag::String => ConstantEntry::String {
                string_index: u2(0),
            },
            ConstantTag::MethodType => ConstantEntry::MethodType {
                descriptor_index: u2(0),
            },
            ConstantTag::Module => ConstantEntry::Module { name_index: u2(0) },
            ConstantTag::Package => ConstantEntry::Package { name_index: u2(0) },
            ConstantTag::Fieldref => {
                let (class_index, name_and_type_index) = pair();
                ConstantEntry::Fieldref {
                    class_index,
                    name_and_type_index,
                }
            }
            ConstantTag::Methodref => {
                let (class_index, name_and_type_index) = pair();
                ConstantEntry::Methodref {
                    class_index,
                    name_and_type_index,
                }
            }
            ConstantTag::InterfaceMethodref => {
                let (class_index, name_and_type_index) = pair();
                ConstantEntry::InterfaceMethodref {
                    class_index,
                    name_and_type_index,
                }
            }
            ConstantTag::NameAndType => {
                let (name_index, descriptor_index) = pair();
                ConstantEntry::NameAndType {
                    name_index,
                    descriptor_index,
                }
            }
            ConstantTag::Dynamic => {
                let (bootstrap_method_attr_index, name_and_type_index) = pair();
                ConstantEntry::Dynamic {
                    bootstrap_method_attr_index,
                    name_and_type_index,
                }
            }
            ConstantTag::InvokeDynamic => {
                let (bootstrap_method_attr_index, name_and_type_index) = pair();
                ConstantEntry::InvokeDynamic {
                    bootstrap_method_attr_index,
                    name_and_type_index,
                }
            }
            ConstantTag::MethodHandle => ConstantEntry::MethodHandle {
                reference_kind: payload[0],
                reference_index: BigEndian::read_u16(&payload[1..3]),
            },
        }
    }

    pub fn tag(&self) -> ConstantTag {
        match self {
            ConstantEntry::Utf8(_) => ConstantTag::Utf8,
            ConstantEntry::Integer(_) => ConstantTag::Integer,
            ConstantEntry::Float(_) => ConstantTag::Float,
            ConstantEntry::Long(_) => ConstantTag::Long,
            ConstantEntry::Double(_) => ConstantTag::Double,
            ConstantEntry::Class { .. } => ConstantTag::Class,
            ConstantEntry::String { .. } => ConstantTag::String,
            ConstantEntry::Fieldref { .. } => ConstantTag::Fieldref,
            ConstantEntry::Methodref { .. } => ConstantTag::Methodref,
            ConstantEntry::InterfaceMethodref { .. } => ConstantTag::InterfaceMethodref,
            ConstantEntry::NameAndType { .. } => ConstantTag::NameAndType,
            ConstantEntry::MethodHandle { .. } => ConstantTag::MethodHandle,
            ConstantEntry::MethodType { .. } => ConstantTag::MethodType,
            ConstantEntry::Dynamic { .. } => ConstantTag::Dynamic,
            ConstantEntry::InvokeDynamic { .. } => ConstantTag::InvokeDynamic,
            ConstantEntry::Module { .. } => ConstantTag::Module,
            ConstantEntry::Package { .. } => ConstantTag::Package,
        }
    }
}

/// Where traversal stopped on a tag it does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStop {
    pub tag: u8,
    pub slot: u16,
    pub offset: usize,
}

/// Constant pool indexed in a single linear pass.
///
/// Slot 0 and the second slot of every Long/Double are empty. Slots at or
/// after an unknown tag are never populated.
#[derive(Debug, Clone)]
pub struct ConstantPool<'a> {
    slots: Vec<Option<ConstantEntry<'a>>>,
    declared_count: u16,
    stop: Option<PoolStop>,
}

impl<'a> ConstantPool<'a> {
    /// Read the u2 pool count and the records that follow it.
    ///
    /// Truncated records are an error. An unknown tag ends traversal early
    /// and is recorded in [`ConstantPool::stop`]; the reader is then left
    /// just after the offending tag byte.
    pub fn parse(reader: &mut ByteReader<'a>) -> Result<Self> {
        let declared_count = reader.u2()?;
        let mut slots = Vec::with_capacity(usize::from(declared_count).max(1));
        slots.push(None);

        let mut stop = None;
        let mut slot: u16 = 1;
        while slot < declared_count {
            let offset = reader.position();
            let byte = reader.u1()?;
            let Some(tag) = ConstantTag::from_byte(byte) else {
                stop = Some(PoolStop {
                    tag: byte,
                    slot,
                    offset,
                });
                break;
            };

            let layout = tag.layout();
            let payload = match layout.shape {
                PayloadShape::LengthPrefixed => {
                    let len = reader.u2()?;
                    reader.bytes(usize::from(len))?
                }
                PayloadShape::Fixed(len) => reader.bytes(len)?,
            };

            slots.push(Some(ConstantEntry::decode(tag, payload)));
            if layout.slots == 2 {
                slots.push(None);
            }
            slot = slot.saturating_add(layout.slots);
        }

        Ok(Self {
            slots,
            declared_count,
            stop,
        })
    }

    /// Number of slots actually indexed, including slot 0.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.len() <= 1
    }

    pub fn stop(&self) -> Option<PoolStop> {
        self.stop
    }

    pub fn is_complete(&self) -> bool {
        self.stop.is_none()
    }

    /// Look up a slot. Index 0, indices past the declared count, phantom
    /// wide slots and slots beyond an unknown tag are all `None`.
    pub fn get(&self, index: u16) -> Option<&ConstantEntry<'a>> {
        if index == 0 || index >= self.declared_count {
            return None;
        }
        self.slots.get(usize::from(index)).and_then(Option::as_ref)
    }

    /// Decoded text of a Utf8 slot.
    pub fn utf8(&self, index: u16) -> Option<Cow<'a, str>> {
        match self.get(index)? {
            ConstantEntry::Utf8(bytes) => Some(decode_modified_utf8(bytes)),
            _ => None,
        }
    }

    /// Internal (slash separated) name of a Class slot.
    pub fn class_name(&self, index: u16) -> Option<Cow<'a, str>> {
        match *self.get(index)? {
            ConstantEntry::Class { name_index } => self.utf8(name_index),
            _ => None,
        }
    }

    /// Dotted class name for a Class slot, or an empty string when the index
    /// is 0, out of range, or does not lead through Class to Utf8.
    pub fn resolve_class_name(&self, index: u16) -> String {
        self.class_name(index)
            .map(|name| to_binary_name(&name))
            .unwrap_or_default()
    }

    /// Iterate populated slots with their indices.
    pub fn entries(&self) -> impl Iterator<Item = (u16, &ConstantEntry<'a>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| Some((u16::try_from(index).ok()?, slot.as_ref()?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_bytes(count: u16, records: &[&[u8]]) -> Vec<u8> {
        let mut data = count.to_be_bytes().to_vec();
        for record in records {
            data.extend_from_slice(record);
        }
        data
    }

    fn parse(data: &[u8]) -> ConstantPool<'_> {
        ConstantPool::parse(&mut ByteReader::new(data)).unwrap()
    }

    #[test]
    fn test_class_name_resolution() {
        let data = pool_bytes(
            3,
            &[&[1, 0, 5, b'a', b'/', b'b', b'/', b'C'], &[7, 0, 1]],
        );
        let pool = parse(&data);

        assert_eq!(pool.class_name(2).as_deref(), Some("a/b/C"));
        assert_eq!(pool.resolve_class_name(2), "a.b.C");
    }

    #[test]
    fn test_wrong_tag_resolves_empty() {
        // slot 1: Utf8 "X", slot 2: String -> 1
        let data = pool_bytes(3, &[&[1, 0, 1, b'X'], &[8, 0, 1]]);
        let pool = parse(&data);

        assert_eq!(pool.resolve_class_name(2), "");
        assert_eq!(pool.resolve_class_name(1), "");
        assert_eq!(pool.resolve_class_name(0), "");
        assert_eq!(pool.resolve_class_name(99), "");
    }

    #[test]
    fn test_long_consumes_two_slots() {
        // slot 1-2: Long, slot 3: Utf8 "Y", slot 4: Class -> 3
        let data = pool_bytes(
            5,
            &[&[5, 0, 0, 0, 0, 0, 0, 0, 42], &[1, 0, 1, b'Y'], &[7, 0, 3]],
        );
        let pool = parse(&data);

        assert_eq!(pool.get(1), Some(&ConstantEntry::Long(42)));
        assert_eq!(pool.get(2), None);
        assert_eq!(pool.resolve_class_name(4), "Y");
        assert!(pool.is_complete());
    }

    #[test]
    fn test_double_consumes_two_slots() {
        let mut double = vec![6];
        double.extend_from_slice(&1.5f64.to_be_bytes());
        let data = pool_bytes(4, &[&double, &[1, 0, 1, b'Z']]);
        let pool = parse(&data);

        assert_eq!(pool.get(1), Some(&ConstantEntry::Double(1.5)));
        assert_eq!(pool.utf8(3).as_deref(), Some("Z"));
    }

    #[test]
    fn test_unknown_tag_stops_traversal() {
        // slot 1: Utf8 "A", slot 2: unknown tag 99, trailing junk
        let data = pool_bytes(4, &[&[1, 0, 1, b'A'], &[99, 7, 0, 1]]);
        let mut reader = ByteReader::new(&data);
        let pool = ConstantPool::parse(&mut reader).unwrap();

        assert_eq!(
            pool.stop(),
            Some(PoolStop {
                tag: 99,
                slot: 2,
                offset: 6
            })
        );
        assert_eq!(pool.utf8(1).as_deref(), Some("A"));
        assert_eq!(pool.get(2), None);
        assert_eq!(pool.get(3), None);
        assert_eq!(reader.position(), 7);
    }

    #[test]
    fn test_truncated_record_is_error() {
        let data = pool_bytes(2, &[&[1, 0, 10, b'A']]);
        assert!(ConstantPool::parse(&mut ByteReader::new(&data)).is_err());
    }

    #[test]
    fn test_member_refs_and_handles() {
        let data = pool_bytes(4, &[&[10, 0, 2, 0, 3], &[15, 6, 0, 1], &[18, 0, 0, 0, 1]]);
        let pool = parse(&data);

        assert_eq!(
            pool.get(1),
            Some(&ConstantEntry::Methodref {
                class_index: 2,
                name_and_type_index: 3
            })
        );
        assert_eq!(
            pool.get(2),
            Some(&ConstantEntry::MethodHandle {
                reference_kind: 6,
                reference_index: 1
            })
        );
        assert_eq!(pool.get(3).map(ConstantEntry::tag), Some(ConstantTag::InvokeDynamic));
        assert_eq!(pool.entries().count(), 3);
    }

    #[test]
    fn test_zero_count_pool() {
        let data = pool_bytes(0, &[]);
        let pool = parse(&data);
        assert!(pool.is_empty());
        assert_eq!(pool.get(1), None);
    }
}
