//! Constant pool tag definitions

/// Constant pool record tag (8 bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConstantTag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    Fieldref = 9,
    Methodref = 10,
    InterfaceMethodref = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    Dynamic = 17,
    InvokeDynamic = 18,
    Module = 19,
    Package = 20,
}

/// Shape of the payload following a tag byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// u2 byte length followed by that many bytes
    LengthPrefixed,
    /// Fixed number of payload bytes
    Fixed(usize),
}

/// Payload shape and number of pool slots a record occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    pub shape: PayloadShape,
    pub slots: u16,
}

impl ConstantTag {
    /// Parse a tag byte. Unknown tags yield `None`; the caller decides how
    /// far traversal can continue.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(ConstantTag::Utf8),
            3 => Some(ConstantTag::Integer),
            4 => Some(ConstantTag::Float),
            5 => Some(ConstantTag::Long),
            6 => Some(ConstantTag::Double),
            7 => Some(ConstantTag::Class),
            8 => Some(ConstantTag::String),
            9 => Some(ConstantTag::Fieldref),
            10 => Some(ConstantTag::Methodref),
            11 => Some(ConstantTag::InterfaceMethodref),
            12 => Some(ConstantTag::NameAndType),
            15 => Some(ConstantTag::MethodHandle),
            16 => Some(ConstantTag::MethodType),
            17 => Some(ConstantTag::Dynamic),
            18 => Some(ConstantTag::InvokeDynamic),
            19 => Some(ConstantTag::Module),
            20 => Some(ConstantTag::Package),
            _ => None,
        }
    }

    /// Convert tag to byte
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// The single table mapping a tag to its record layout.
    ///
    /// Long and Double are the only records that take two slots.
    pub fn layout(self) -> RecordLayout {
        use PayloadShape::*;

        let (shape, slots) = match self {
            ConstantTag::Utf8 => (LengthPrefixed, 1),

            ConstantTag::Integer | ConstantTag::Float => (Fixed(4), 1),

            ConstantTag::Long | ConstantTag::Double => (Fixed(8), 2),

            ConstantTag::Class
            | ConstantTag::String
            | ConstantTag::MethodType
            | ConstantTag::Module
            | ConstantTag::Package => (Fixed(2), 1),

            ConstantTag::Fieldref
            | ConstantTag::Methodref
            | ConstantTag::InterfaceMethodref
            | ConstantTag::NameAndType
            | ConstantTag::Dynamic
            | ConstantTag::InvokeDynamic => (Fixed(4), 1),

            ConstantTag::MethodHandle => (Fixed(3), 1),
        };

        RecordLayout { shape, slots }
    }

    pub fn is_wide(self) -> bool {
        self.layout().slots == 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(1, ConstantTag::Utf8)]
    #[test_case(5, ConstantTag::Long)]
    #[test_case(7, ConstantTag::Class)]
    #[test_case(15, ConstantTag::MethodHandle)]
    #[test_case(20, ConstantTag::Package)]
    fn test_tag_from_byte(byte: u8, tag: ConstantTag) {
        assert_eq!(ConstantTag::from_byte(byte), Some(tag));
        assert_eq!(tag.to_byte(), byte);
    }

    #[test_case(0)]
    #[test_case(2)]
    #[test_case(13)]
    #[test_case(14)]
    #[test_case(21)]
    #[test_case(0xFF)]
    fn test_unknown_tags(byte: u8) {
        assert_eq!(ConstantTag::from_byte(byte), None);
    }

    #[test]
    fn test_wide_records_take_two_slots() {
        assert!(ConstantTag::Long.is_wide());
        assert!(ConstantTag::Double.is_wide());
        assert!(!ConstantTag::Integer.is_wide());
        assert_eq!(ConstantTag::Double.layout().shape, PayloadShape::Fixed(8));
    }

    #[test]
    fn test_payload_sizes() {
        assert_eq!(ConstantTag::Utf8.layout().shape, PayloadShape::LengthPrefixed);
        assert_eq!(ConstantTag::Module.layout().shape, PayloadShape::Fixed(2));
        assert_eq!(ConstantTag::InvokeDynamic.layout().shape, PayloadShape::Fixed(4));
        assert_eq!(ConstantTag::MethodHandle.layout().shape, PayloadShape::Fixed(3));
    }
}
