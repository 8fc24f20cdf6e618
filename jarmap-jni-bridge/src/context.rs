//! Ownership of the host VM handle and of the worker thread's attachment

use jarmap_loader::BridgeError;
use jni::errors::{Error as JniError, JniError as JniStatus};
use jni::{JNIEnv, JavaVM};
use tracing::debug;

/// Owns the [`JavaVM`] for one worker thread.
///
/// A thread the VM already knows is used as is. Otherwise it is attached as
/// a daemon the first time an environment is requested, and stays attached
/// until [`HostContext::detach`] or drop. Only an attachment made here is
/// ever undone. Environments borrow the context, so none can outlive it.
pub struct HostContext {
    vm: JavaVM,
    attached: bool,
}

impl HostContext {
    pub fn new(vm: JavaVM) -> Self {
        Self {
            vm,
            attached: false,
        }
    }

    /// Whether this context attached the current thread
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Environment for the current thread, attaching it if needed.
    pub fn attach(&mut self) -> Result<JNIEnv<'_>, BridgeError> {
        if !self.attached {
            match self.vm.get_env() {
                Ok(_) => {}
                Err(JniError::JniCall(JniStatus::ThreadDetached)) => {
                    self.vm.attach_current_thread_as_daemon().map_err(|err| {
                        BridgeError::Environment(format!("attach failed: {err}"))
                    })?;
                    self.attached = true;
                    debug!("worker thread attached to host VM");
                }
                Err(err) => return Err(BridgeError::Environment(err.to_string())),
            }
        }

        self.vm
            .get_env()
            .map_err(|err| BridgeError::Environment(err.to_string()))
    }

    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        // SAFETY: every JNIEnv handed out borrows `self` mutably, so none is
        // alive here, and the thread was attached by this context.
        unsafe { self.vm.detach_current_thread() };
        self.attached = false;
        debug!("worker thread detached from host VM");
    }
}

impl Drop for HostContext {
    fn drop(&mut self) {
        self.detach();
    }
}
