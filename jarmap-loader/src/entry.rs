//! Static entry-point invocation

use tracing::info;

use crate::bridge::RuntimeBridge;
use crate::error::BridgeError;

/// Entry points take no arguments and return nothing.
pub const ENTRY_SIGNATURE: &str = "()V";

/// Resolve `class_name` (dotted) through the host, then call its static
/// `()V` method `method_name`.
///
/// The class must already be known to the host; nothing is defined here.
pub fn invoke_entry_point<B: RuntimeBridge>(
    bridge: &mut B,
    class_name: &str,
    method_name: &str,
) -> Result<(), BridgeError> {
    let class = bridge.find_class(class_name)?;
    let method = bridge.get_static_method(&class, method_name, ENTRY_SIGNATURE)?;

    info!(class = %class_name, method = %method_name, "invoking entry point");
    bridge.invoke_static_void(&class, &method)?;
    info!(class = %class_name, method = %method_name, "entry point returned");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{RecordedMethod, RecordingBridge};

    #[test]
    fn test_invokes_registered_method() {
        let mut bridge = RecordingBridge::new()
            .with_external_class("app.Main")
            .with_static_method("app.Main", "init", ENTRY_SIGNATURE);

        invoke_entry_point(&mut bridge, "app.Main", "init").unwrap();

        assert_eq!(
            bridge.invoked(),
            [RecordedMethod {
                class: "app.Main".to_string(),
                name: "init".to_string(),
                signature: "()V".to_string(),
            }]
        );
    }

    #[test]
    fn test_unknown_class() {
        let mut bridge = RecordingBridge::new();
        let err = invoke_entry_point(&mut bridge, "app.Missing", "init").unwrap_err();
        assert!(matches!(err, BridgeError::NotFound { what: "class", .. }));
        assert!(bridge.invoked().is_empty());
    }

    #[test]
    fn test_wrong_signature_is_not_found() {
        let mut bridge = RecordingBridge::new()
            .with_external_class("app.Main")
            .with_static_method("app.Main", "init", "([Ljava/lang/String;)V");

        let err = invoke_entry_point(&mut bridge, "app.Main", "init").unwrap_err();
        assert!(matches!(err, BridgeError::NotFound { what: "method", .. }));
    }

    #[test]
    fn test_exception_in_entry_point_is_reported() {
        let mut bridge = RecordingBridge::new()
            .with_external_class("app.Main")
            .with_static_method("app.Main", "init", ENTRY_SIGNATURE)
            .fail_invocation("app.Main", "java.lang.IllegalStateException: boom");

        let err = invoke_entry_point(&mut bridge, "app.Main", "init").unwrap_err();
        assert_eq!(
            err.to_string(),
            "app.Main.init raised: java.lang.IllegalStateException: boom"
        );
    }
}
