//! Name-keyed table of parsed class descriptors

use indexmap::IndexMap;
use jarmap_classfile::ClassDescriptor;

use crate::error::RegistryError;

/// Progress of one registry slot through the definition phase.
///
/// `Defined` is terminal. `InProgress` marks a slot whose dependencies are
/// being defined; meeting it again means the graph has a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionState {
    Pending,
    InProgress,
    Defined,
}

#[derive(Debug)]
struct Slot {
    descriptor: ClassDescriptor,
    state: DefinitionState,
}

/// Descriptors keyed by qualified name, kept in insertion (archive) order.
/// Slots are addressed by their insertion index.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    slots: IndexMap<String, Slot>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a descriptor and return its slot index. Empty names and names
    /// already present are refused.
    pub fn insert(&mut self, descriptor: ClassDescriptor) -> Result<usize, RegistryError> {
        let name = descriptor.qualified_name().to_string();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.slots.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }

        let (index, _) = self.slots.insert_full(
            name,
            Slot {
                descriptor,
                state: DefinitionState::Pending,
            },
        );
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.slots.get_index_of(name)
    }

    pub fn get(&self, name: &str) -> Option<&ClassDescriptor> {
        self.slots.get(name).map(|slot| &slot.descriptor)
    }

    /// # Panics
    ///
    /// Panics if `index` is not a slot index of this registry.
    pub fn descriptor_at(&self, index: usize) -> &ClassDescriptor {
        &self.slots[index].descriptor
    }

    /// # Panics
    ///
    /// Panics if `index` is not a slot index of this registry.
    pub fn state(&self, index: usize) -> DefinitionState {
        self.slots[index].state
    }

    pub fn state_of(&self, name: &str) -> Option<DefinitionState> {
        self.slots.get(name).map(|slot| slot.state)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.state_of(name) == Some(DefinitionState::Defined)
    }

    pub fn defined_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| slot.state == DefinitionState::Defined)
            .count()
    }

    /// Descriptors in population order
    pub fn descriptors(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.slots.values().map(|slot| &slot.descriptor)
    }

    pub(crate) fn set_state(&mut self, index: usize, state: DefinitionState) {
        let slot = &mut self.slots[index];
        debug_assert!(
            slot.state != DefinitionState::Defined,
            "{} is already defined",
            slot.descriptor.qualified_name()
        );
        slot.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, super_name: &str) -> ClassDescriptor {
        ClassDescriptor::from_parts(name, super_name, Vec::new(), Vec::<u8>::new())
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut registry = ClassRegistry::new();
        registry.insert(descriptor("b.B", "")).unwrap();
        registry.insert(descriptor("a.A", "")).unwrap();
        registry.insert(descriptor("c.C", "")).unwrap();

        let names: Vec<_> = registry
            .descriptors()
            .map(ClassDescriptor::qualified_name)
            .collect();
        assert_eq!(names, vec!["b.B", "a.A", "c.C"]);
        assert_eq!(registry.index_of("a.A"), Some(1));
    }

    #[test]
    fn test_rejects_empty_and_duplicate_names() {
        let mut registry = ClassRegistry::new();
        assert_eq!(
            registry.insert(descriptor("", "")),
            Err(RegistryError::EmptyName)
        );

        registry.insert(descriptor("A", "")).unwrap();
        assert_eq!(
            registry.insert(descriptor("A", "Other")),
            Err(RegistryError::Duplicate("A".to_string()))
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("A").unwrap().super_name(), "");
    }

    #[test]
    fn test_state_transitions() {
        let mut registry = ClassRegistry::new();
        let index = registry.insert(descriptor("A", "")).unwrap();
        assert_eq!(registry.state(index), DefinitionState::Pending);

        registry.set_state(index, DefinitionState::InProgress);
        registry.set_state(index, DefinitionState::Defined);

        assert!(registry.is_defined("A"));
        assert_eq!(registry.defined_count(), 1);
        assert_eq!(registry.state_of("missing"), None);
    }
}
