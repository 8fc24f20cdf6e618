pub mod pool;

pub use self::pool::{ConstantEntry, ConstantPool, PoolStop};
