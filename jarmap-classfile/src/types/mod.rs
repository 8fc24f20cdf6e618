pub mod name;

pub use self::name::{decode_modified_utf8, to_binary_name, to_internal_name};
