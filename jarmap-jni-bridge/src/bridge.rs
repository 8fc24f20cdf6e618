//! [`RuntimeBridge`] over a live JNI environment

use jarmap_classfile::to_internal_name;
use jarmap_loader::{BridgeError, RuntimeBridge, ENTRY_SIGNATURE};
use jni::errors::Error as JniError;
use jni::objects::{GlobalRef, JClass, JObject, JStaticMethodID, JString, JThrowable};
use jni::signature::{Primitive, ReturnType};
use jni::JNIEnv;

/// A class known to the host, pinned by a global reference
#[derive(Debug)]
pub struct HostClass {
    pub name: String,
    class: GlobalRef,
}

impl HostClass {
    fn as_class(&self) -> &JClass<'static> {
        self.class.as_obj().into()
    }
}

#[derive(Debug)]
pub struct HostMethod {
    pub name: String,
    pub signature: String,
    id: JStaticMethodID,
}

/// Defines and runs classes through `JNIEnv`.
///
/// Classes are defined with the bootstrap loader. After every call that can
/// raise, a pending Java exception is described to stderr, cleared, and its
/// `toString()` becomes the error reason.
pub struct JniBridge<'local> {
    env: JNIEnv<'local>,
}

impl<'local> JniBridge<'local> {
    pub fn new(env: JNIEnv<'local>) -> Self {
        Self { env }
    }

    /// Reason for a failed call: the pending exception if there is one,
    /// otherwise the JNI error itself.
    fn failure(&mut self, err: JniError) -> String {
        self.drain_exception().unwrap_or_else(|| err.to_string())
    }

    fn drain_exception(&mut self) -> Option<String> {
        if !self.env.exception_check().unwrap_or(false) {
            return None;
        }
        let throwable = self.env.exception_occurred().ok();
        let _ = self.env.exception_describe();
        let _ = self.env.exception_clear();
        throwable.map(|throwable| self.render(throwable))
    }

    fn render(&mut self, throwable: JThrowable<'local>) -> String {
        let text = self
            .env
            .call_method(&throwable, "toString", "()Ljava/lang/String;", &[])
            .and_then(|value| value.l())
            .and_then(|object| {
                let string = JString::from(object);
                let text = self.env.get_string(&string).map(String::from);
                let _ = self.env.delete_local_ref(string);
                text
            });
        // toString itself may throw
        if self.env.exception_check().unwrap_or(false) {
            let _ = self.env.exception_clear();
        }
        let _ = self.env.delete_local_ref(throwable);
        text.unwrap_or_else(|_| "java.lang.Throwable".to_string())
    }

    fn pin(&mut self, name: &str, class: JClass<'local>) -> Result<HostClass, String> {
        let global = self.env.new_global_ref(&class);
        let _ = self.env.delete_local_ref(class);
        match global {
            Ok(class) => Ok(HostClass {
                name: name.to_string(),
                class,
            }),
            Err(err) => Err(self.failure(err)),
        }
    }
}

impl RuntimeBridge for JniBridge<'_> {
    type Class = HostClass;
    type Method = HostMethod;

    fn define_class(&mut self, name: &str, bytecode: &[u8]) -> Result<HostClass, BridgeError> {
        let definition_error = |reason| BridgeError::Definition {
            name: name.to_string(),
            reason,
        };

        let defined = self
            .env
            .define_class(to_internal_name(name), &JObject::null(), bytecode);
        let class = match defined {
            Ok(class) => class,
            Err(err) => return Err(definition_error(self.failure(err))),
        };
        self.pin(name, class).map_err(definition_error)
    }

    fn find_class(&mut self, name: &str) -> Result<HostClass, BridgeError> {
        let not_found = |reason| BridgeError::NotFound {
            what: "class",
            name: name.to_string(),
            reason,
        };

        let class = match self.env.find_class(to_internal_name(name)) {
            Ok(class) => class,
            Err(err) => return Err(not_found(self.failure(err))),
        };
        self.pin(name, class).map_err(not_found)
    }

    fn get_static_method(
        &mut self,
        class: &HostClass,
        name: &str,
        signature: &str,
    ) -> Result<HostMethod, BridgeError> {
        match self
            .env
            .get_static_method_id(class.as_class(), name, signature)
        {
            Ok(id) => Ok(HostMethod {
                name: name.to_string(),
                signature: signature.to_string(),
                id,
            }),
            Err(err) => Err(BridgeError::NotFound {
                what: "method",
                name: format!("{}.{name}{signature}", class.name),
                reason: self.failure(err),
            }),
        }
    }

    fn invoke_static_void(
        &mut self,
        class: &HostClass,
        method: &HostMethod,
    ) -> Result<(), BridgeError> {
        let target = format!("{}.{}", class.name, method.name);
        if method.signature != ENTRY_SIGNATURE {
            return Err(BridgeError::Invocation {
                target,
                reason: format!("unsupported signature {}", method.signature),
            });
        }

        // SAFETY: the id was resolved on this class with signature `()V`,
        // matching the void return type and the empty argument list.
        let result = unsafe {
            self.env.call_static_method_unchecked(
                class.as_class(),
                method.id,
                ReturnType::Primitive(Primitive::Void),
                &[],
            )
        };
        match result {
            Ok(_) => Ok(()),
            Err(err) => Err(BridgeError::Invocation {
                target,
                reason: self.failure(err),
            }),
        }
    }
}
