//! Locating a VM that is already running in this process
//!
//! Used when the library was mapped into a live process by something other
//! than `System.loadLibrary`, in which case `JNI_OnLoad` never runs.

use std::ptr;

use anyhow::{bail, Context};
use jni::sys::{jint, jsize, JNI_OK};
use jni::JavaVM;
use libloading::{Library, Symbol};
use tracing::debug;

type GetCreatedJavaVms =
    unsafe extern "system" fn(*mut *mut jni::sys::JavaVM, jsize, *mut jsize) -> jint;

const GET_CREATED_VMS: &[u8] = b"JNI_GetCreatedJavaVMs\0";

#[cfg(unix)]
fn process_symbols() -> anyhow::Result<Library> {
    Ok(libloading::os::unix::Library::this().into())
}

#[cfg(windows)]
fn process_symbols() -> anyhow::Result<Library> {
    let library = libloading::os::windows::Library::open_already_loaded("jvm.dll")
        .context("jvm.dll is not loaded in this process")?;
    Ok(library.into())
}

/// The first VM created in this process, or `None` when the process has no
/// VM runtime loaded or has not created one yet.
pub fn find_running_vm() -> anyhow::Result<Option<JavaVM>> {
    let library = match process_symbols() {
        Ok(library) => library,
        Err(err) => {
            debug!("no VM runtime in process: {err:#}");
            return Ok(None);
        }
    };

    // SAFETY: the symbol, when present, has the signature fixed by the JNI
    // invocation API.
    let lookup: Symbol<'_, GetCreatedJavaVms> = match unsafe { library.get(GET_CREATED_VMS) } {
        Ok(lookup) => lookup,
        Err(_) => {
            debug!("JNI_GetCreatedJavaVMs is not exported in this process");
            return Ok(None);
        }
    };

    let mut vm: *mut jni::sys::JavaVM = ptr::null_mut();
    let mut count: jsize = 0;
    // SAFETY: room for exactly one VM pointer is passed, as advertised by
    // the buffer length.
    let status = unsafe { lookup(&mut vm, 1, &mut count) };
    if status != JNI_OK {
        bail!("JNI_GetCreatedJavaVMs failed with status {status}");
    }
    if count == 0 || vm.is_null() {
        return Ok(None);
    }

    // SAFETY: the pointer was just reported by the runtime as a live VM.
    let vm = unsafe { JavaVM::from_raw(vm) }.context("invalid VM pointer")?;
    Ok(Some(vm))
}
