//! The narrow surface through which the loader talks to the host runtime

use std::collections::{HashMap, HashSet};

use crate::error::BridgeError;

/// Host runtime operations needed to define classes and run an entry point.
///
/// Class names are passed in dotted form. Implementations must leave the
/// host with no pending fault when they return, whatever the outcome.
pub trait RuntimeBridge {
    /// Handle to a class known to the host
    type Class;
    /// Handle to a resolved static method
    type Method;

    fn define_class(&mut self, name: &str, bytecode: &[u8]) -> Result<Self::Class, BridgeError>;

    fn find_class(&mut self, name: &str) -> Result<Self::Class, BridgeError>;

    fn get_static_method(
        &mut self,
        class: &Self::Class,
        name: &str,
        signature: &str,
    ) -> Result<Self::Method, BridgeError>;

    fn invoke_static_void(
        &mut self,
        class: &Self::Class,
        method: &Self::Method,
    ) -> Result<(), BridgeError>;
}

impl<B: RuntimeBridge + ?Sized> RuntimeBridge for &mut B {
    type Class = B::Class;
    type Method = B::Method;

    fn define_class(&mut self, name: &str, bytecode: &[u8]) -> Result<Self::Class, BridgeError> {
        (**self).define_class(name, bytecode)
    }

    fn find_class(&mut self, name: &str) -> Result<Self::Class, BridgeError> {
        (**self).find_class(name)
    }

    fn get_static_method(
        &mut self,
        class: &Self::Class,
        name: &str,
        signature: &str,
    ) -> Result<Self::Method, BridgeError> {
        (**self).get_static_method(class, name, signature)
    }

    fn invoke_static_void(
        &mut self,
        class: &Self::Class,
        method: &Self::Method,
    ) -> Result<(), BridgeError> {
        (**self).invoke_static_void(class, method)
    }
}

/// Resolved static method of a [`RecordingBridge`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordedMethod {
    pub class: String,
    pub name: String,
    pub signature: String,
}

/// In-process stand-in for a host runtime.
///
/// Records every definition and invocation in order. It knows the classes it
/// has defined plus any declared with [`RecordingBridge::with_external_class`],
/// rejects redefinition like a real host, and can be told to reject chosen
/// definitions or fail chosen invocations.
#[derive(Debug, Default)]
pub struct RecordingBridge {
    defined: Vec<String>,
    external: HashSet<String>,
    static_methods: HashSet<(String, String, String)>,
    rejected: HashMap<String, String>,
    failing: HashMap<String, String>,
    invoked: Vec<RecordedMethod>,
}

impl RecordingBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `name` as already present in the host.
    pub fn with_external_class(mut self, name: impl Into<String>) -> Self {
        self.external.insert(name.into());
        self
    }

    /// Make `class.name` with `signature` resolvable as a static method.
    pub fn with_static_method(
        mut self,
        class: impl Into<String>,
        name: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        self.static_methods
            .insert((class.into(), name.into(), signature.into()));
        self
    }

    /// Reject any definition of `name` with `reason`.
    pub fn reject_definition(mut self, name: impl Into<String>, reason: impl Into<String>) -> Self {
        self.rejected.insert(name.into(), reason.into());
        self
    }

    /// Make invocations of static methods on `class` raise `reason`.
    pub fn fail_invocation(mut self, class: impl Into<String>, reason: impl Into<String>) -> Self {
        self.failing.insert(class.into(), reason.into());
        self
    }

    /// Names defined so far, in definition order
    pub fn defined(&self) -> &[String] {
        &self.defined
    }

    pub fn invoked(&self) -> &[RecordedMethod] {
        &self.invoked
    }

    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.defined.iter().position(|defined| defined == name)
    }

    fn knows(&self, name: &str) -> bool {
        self.external.contains(name) || self.defined.iter().any(|defined| defined == name)
    }
}

impl RuntimeBridge for RecordingBridge {
    type Class = String;
    type Method = RecordedMethod;

    fn define_class(&mut self, name: &str, _bytecode: &[u8]) -> Result<String, BridgeError> {
        if let Some(reason) = self.rejected.get(name) {
            return Err(BridgeError::Definition {
                name: name.to_string(),
                reason: reason.clone(),
            });
        }
        if self.knows(name) {
            return Err(BridgeError::Definition {
                name: name.to_string(),
                reason: "duplicate class definition".to_string(),
            });
        }
        self.defined.push(name.to_string());
        Ok(name.to_string())
    }

    fn find_class(&mut self, name: &str) -> Result<String, BridgeError> {
        if self.knows(name) {
            Ok(name.to_string())
        } else {
            Err(BridgeError::NotFound {
                what: "class",
                name: name.to_string(),
                reason: "not defined".to_string(),
            })
        }
    }

    fn get_static_method(
        &mut self,
        class: &String,
        name: &str,
        signature: &str,
    ) -> Result<RecordedMethod, BridgeError> {
        let key = (class.clone(), name.to_string(), signature.to_string());
        if !self.static_methods.contains(&key) {
            return Err(BridgeError::NotFound {
                what: "method",
                name: format!("{class}.{name}{signature}"),
                reason: "no such static method".to_string(),
            });
        }
        let (class, name, signature) = key;
        Ok(RecordedMethod {
            class,
            name,
            signature,
        })
    }

    fn invoke_static_void(
        &mut self,
        class: &String,
        method: &RecordedMethod,
    ) -> Result<(), BridgeError> {
        self.invoked.push(method.clone());
        match self.failing.get(class) {
            Some(reason) => Err(BridgeError::Invocation {
                target: format!("{class}.{}", method.name),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}
