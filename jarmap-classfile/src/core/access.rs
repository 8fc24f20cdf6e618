//! Class access flags

use bitflags::bitflags;

bitflags! {
    /// `access_flags` of a class file (16 bits)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClassAccess: u16 {
        const PUBLIC = 0x0001;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MODULE = 0x8000;
    }
}

impl ClassAccess {
    pub fn is_interface(self) -> bool {
        self.contains(ClassAccess::INTERFACE)
    }

    /// Short keyword for listings
    pub fn kind(self) -> &'static str {
        if self.contains(ClassAccess::ANNOTATION) {
            "annotation"
        } else if self.is_interface() {
            "interface"
        } else if self.contains(ClassAccess::ENUM) {
            "enum"
        } else if self.contains(ClassAccess::MODULE) {
            "module"
        } else {
            "class"
        }
    }
}
