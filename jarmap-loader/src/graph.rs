//! Dependency-respecting definition of a class registry

use tracing::{debug, error, info};

use crate::bridge::RuntimeBridge;
use crate::error::LoadError;
use crate::registry::{ClassRegistry, DefinitionState};

// Inheritance chains come from untrusted archives and can be arbitrarily
// deep, so recursion grows the stack on demand.
const STACK_RED_ZONE: usize = 32 * 1024;
const STACK_GROWTH: usize = 1024 * 1024;

/// Defines every registry slot through a [`RuntimeBridge`], superclass and
/// interfaces first.
///
/// Dependencies that are not in the registry are assumed to be provided by
/// the host and impose no ordering. The first failure stops all further
/// definitions; classes already defined stay defined.
pub struct DependencyGraphLoader<'a, B: RuntimeBridge> {
    registry: &'a mut ClassRegistry,
    bridge: &'a mut B,
    /// Slots currently being defined, outermost first
    path: Vec<usize>,
    order: Vec<String>,
}

impl<'a, B: RuntimeBridge> DependencyGraphLoader<'a, B> {
    pub fn new(registry: &'a mut ClassRegistry, bridge: &'a mut B) -> Self {
        Self {
            registry,
            bridge,
            path: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Define all pending slots in registry order and return the names in
    /// the order they were defined.
    pub fn define_all(mut self) -> Result<Vec<String>, LoadError> {
        info!(classes = self.registry.len(), "defining classes");
        for index in 0..self.registry.len() {
            if self.registry.state(index) != DefinitionState::Defined {
                self.define(index)?;
            }
        }
        Ok(self.order)
    }

    fn define(&mut self, index: usize) -> Result<(), LoadError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
            self.define_guarded(index)
        })
    }

    fn define_guarded(&mut self, index: usize) -> Result<(), LoadError> {
        match self.registry.state(index) {
            DefinitionState::Defined => return Ok(()),
            DefinitionState::InProgress => return Err(self.cycle_through(index)),
            DefinitionState::Pending => {}
        }

        self.registry.set_state(index, DefinitionState::InProgress);
        self.path.push(index);
        let result = self.define_dependencies_then_self(index);
        self.path.pop();

        match result {
            Ok(()) => {
                self.registry.set_state(index, DefinitionState::Defined);
                Ok(())
            }
            Err(err) => {
                self.registry.set_state(index, DefinitionState::Pending);
                Err(err)
            }
        }
    }

    fn define_dependencies_then_self(&mut self, index: usize) -> Result<(), LoadError> {
        let dependencies: Vec<usize> = self
            .registry
            .descriptor_at(index)
            .dependencies()
            .filter_map(|name| self.registry.index_of(name))
            .collect();

        for dependency in dependencies {
            if self.registry.state(dependency) != DefinitionState::Defined {
                self.define(dependency)?;
            }
        }

        let descriptor = self.registry.descriptor_at(index);
        let name = descriptor.qualified_name();
        if let Err(err) = self.bridge.define_class(name, descriptor.bytecode()) {
            error!(class = %name, error = %err, "failed to define class");
            return Err(err.into());
        }

        debug!(class = %name, bytes = descriptor.bytecode().len(), "defined class");
        self.order.push(name.to_string());
        Ok(())
    }

    fn cycle_through(&self, index: usize) -> LoadError {
        let start = self
            .path
            .iter()
            .position(|&on_path| on_path == index)
            .unwrap_or(0);
        let chain: Vec<String> = self.path[start..]
            .iter()
            .chain(std::iter::once(&index))
            .map(|&slot| self.registry.descriptor_at(slot).qualified_name().to_string())
            .collect();

        error!(chain = %chain.join(" -> "), "dependency cycle");
        LoadError::Cycle { chain }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::RecordingBridge;
    use crate::error::BridgeError;
    use jarmap_classfile::ClassDescriptor;
    use pretty_assertions::assert_eq;

    fn registry(classes: &[(&str, &str, &[&str])]) -> ClassRegistry {
        let mut registry = ClassRegistry::new();
        for (name, super_name, interfaces) in classes {
            let interfaces = interfaces.iter().map(|name| name.to_string()).collect();
            registry
                .insert(ClassDescriptor::from_parts(
                    *name,
                    *super_name,
                    interfaces,
                    name.as_bytes().to_vec(),
                ))
                .unwrap();
        }
        registry
    }

    fn define(
        registry: &mut ClassRegistry,
        bridge: &mut RecordingBridge,
    ) -> Result<Vec<String>, LoadError> {
        DependencyGraphLoader::new(registry, bridge).define_all()
    }

    #[test]
    fn test_superclass_defined_first() {
        let mut registry = registry(&[("B", "A", &[]), ("A", "", &[])]);
        let mut bridge = RecordingBridge::new();

        let order = define(&mut registry, &mut bridge).unwrap();

        assert_eq!(order, vec!["A", "B"]);
        assert_eq!(bridge.defined(), ["A", "B"]);
        assert_eq!(registry.defined_count(), 2);
    }

    #[test]
    fn test_interfaces_before_implementor_in_declaration_order() {
        let mut registry = registry(&[
            ("Impl", "Base", &["I2", "I1"]),
            ("I1", "", &[]),
            ("I2", "", &["I1"]),
            ("Base", "", &[]),
        ]);
        let mut bridge = RecordingBridge::new();

        let order = define(&mut registry, &mut bridge).unwrap();

        assert_eq!(order, vec!["Base", "I1", "I2", "Impl"]);
    }

    #[test]
    fn test_external_dependencies_impose_no_order() {
        let mut registry = registry(&[
            ("App", "java.lang.Thread", &["java.lang.Runnable"]),
            ("Util", "", &[]),
        ]);
        let mut bridge = RecordingBridge::new();

        let order = define(&mut registry, &mut bridge).unwrap();

        assert_eq!(order, vec!["App", "Util"]);
    }

    #[test]
    fn test_two_class_cycle_fails_fast() {
        let mut registry = registry(&[("A", "B", &[]), ("B", "A", &[])]);
        let mut bridge = RecordingBridge::new();

        let err = define(&mut registry, &mut bridge).unwrap_err();

        match err {
            LoadError::Cycle { chain } => assert_eq!(chain, vec!["A", "B", "A"]),
            other => panic!("expected cycle, got {other:?}"),
        }
        assert!(bridge.defined().is_empty());
        assert_eq!(registry.state_of("A"), Some(DefinitionState::Pending));
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let mut registry = registry(&[("Ok", "", &[]), ("Loop", "", &["Loop"])]);
        let mut bridge = RecordingBridge::new();

        let err = define(&mut registry, &mut bridge).unwrap_err();

        assert!(matches!(err, LoadError::Cycle { ref chain } if chain == &["Loop", "Loop"]));
        assert_eq!(bridge.defined(), ["Ok"]);
    }

    #[test]
    fn test_cycle_reached_through_interface() {
        let mut registry = registry(&[
            ("Top", "Mid", &[]),
            ("Mid", "", &["IFace"]),
            ("IFace", "", &["Mid"]),
        ]);
        let mut bridge = RecordingBridge::new();

        let err = define(&mut registry, &mut bridge).unwrap_err();

        assert!(matches!(err, LoadError::Cycle { ref chain } if chain == &["Mid", "IFace", "Mid"]));
    }

    #[test]
    fn test_definition_failure_aborts_remaining_work() {
        let mut registry = registry(&[
            ("App", "Base", &[]),
            ("Base", "", &[]),
            ("Other", "", &[]),
        ]);
        let mut bridge =
            RecordingBridge::new().reject_definition("Base", "java.lang.VerifyError: bad");

        let err = define(&mut registry, &mut bridge).unwrap_err();

        assert!(matches!(
            err,
            LoadError::Bridge(BridgeError::Definition { ref name, .. }) if name == "Base"
        ));
        assert!(bridge.defined().is_empty());
        assert!(!registry.is_defined("App"));
        assert!(!registry.is_defined("Other"));
    }

    #[test]
    fn test_defined_classes_are_kept_after_failure() {
        let mut registry = registry(&[("A", "", &[]), ("B", "", &[])]);
        let mut bridge = RecordingBridge::new().reject_definition("B", "duplicate");

        assert!(define(&mut registry, &mut bridge).is_err());
        assert!(registry.is_defined("A"));
        assert_eq!(bridge.defined(), ["A"]);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let names: Vec<String> = (0..20_000).map(|i| format!("C{i}")).collect();
        let mut registry = ClassRegistry::new();
        for i in (0..names.len()).rev() {
            let super_name = if i == 0 {
                String::new()
            } else {
                names[i - 1].clone()
            };
            registry
                .insert(ClassDescriptor::from_parts(
                    names[i].clone(),
                    super_name,
                    Vec::new(),
                    Vec::<u8>::new(),
                ))
                .unwrap();
        }
        let mut bridge = RecordingBridge::new();

        let order = define(&mut registry, &mut bridge).unwrap();

        assert_eq!(order.len(), names.len());
        assert_eq!(order.first().map(String::as_str), Some("C0"));
        assert_eq!(order.last().map(String::as_str), Some("C19999"));
    }
}
