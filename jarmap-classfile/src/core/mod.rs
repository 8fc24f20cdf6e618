pub mod access;
pub mod descriptor;
pub mod reader;
pub mod tags;
pub mod writer;

// Re-export core types
pub use self::access::ClassAccess;
pub use self::descriptor::{CLASS_MAGIC, ClassDescriptor, ClassHeader, ClassVersion, MIN_CLASS_LEN};
pub use self::reader::ByteReader;
pub use self::tags::{ConstantTag, PayloadShape, RecordLayout};
pub use self::writer::ClassFileWriter;
