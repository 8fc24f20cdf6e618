//! Library entry: the load sequence runs on a dedicated worker thread,
//! started either by the host VM loading this cdylib or, when the library is
//! mapped into a process with a running VM, by a load-time constructor.

use std::borrow::Cow;
use std::ffi::c_void;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use anyhow::Context;
use jarmap_loader::{LoaderConfig, MemoryClassLoader};
use jni::sys::{jint, JNI_ERR, JNI_VERSION_1_8};
use jni::JavaVM;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::bridge::JniBridge;
use crate::context::HostContext;
#[cfg(all(feature = "autostart", not(test)))]
use crate::discover;

include!(concat!(env!("OUT_DIR"), "/embedded.rs"));

pub const WORKER_THREAD_NAME: &str = "jarmap-loader";

const DEFAULT_LOG_FILTER: &str = "info";

static WORKER_CLAIMED: AtomicBool = AtomicBool::new(false);

#[no_mangle]
pub extern "system" fn JNI_OnLoad(vm: *mut jni::sys::JavaVM, _reserved: *mut c_void) -> jint {
    // SAFETY: the host passes its own VM pointer, valid for the process lifetime.
    let vm = match unsafe { JavaVM::from_raw(vm) } {
        Ok(vm) => vm,
        Err(_) => return JNI_ERR,
    };

    match spawn_worker(move || Some(vm)) {
        Ok(_) => JNI_VERSION_1_8,
        Err(_) => JNI_ERR,
    }
}

/// Start path for a library mapped into a process whose VM is already
/// running, where `JNI_OnLoad` is never called.
#[cfg(all(feature = "autostart", not(test)))]
#[ctor::ctor]
fn start_on_map() {
    let _ = spawn_worker(|| match discover::find_running_vm() {
        Ok(vm) => vm,
        Err(err) => {
            init_tracing(DEFAULT_LOG_FILTER);
            error!("failed to locate running VM: {err:#}");
            None
        }
    });
}

/// Spawn the named worker thread. `acquire` runs on that thread; the load
/// sequence starts only if it yields a VM and no other worker has claimed
/// one before.
pub fn spawn_worker<F>(acquire: F) -> std::io::Result<JoinHandle<()>>
where
    F: FnOnce() -> Option<JavaVM> + Send + 'static,
{
    std::thread::Builder::new()
        .name(WORKER_THREAD_NAME.to_string())
        .spawn(move || {
            let Some(vm) = acquire() else {
                return;
            };
            if claim_worker() {
                run_worker(vm);
            }
        })
}

/// First caller wins; every later call returns `false`.
fn claim_worker() -> bool {
    !WORKER_CLAIMED.swap(true, Ordering::SeqCst)
}

/// Body of the worker thread. Never panics on a load failure; the error is
/// logged and the thread detaches.
pub fn run_worker(vm: JavaVM) {
    let config = LoaderConfig::from_env();
    init_tracing(
        config
            .as_ref()
            .map_or(DEFAULT_LOG_FILTER, |config| config.log_filter.as_str()),
    );

    let mut context = HostContext::new(vm);
    let outcome = config
        .context("failed to read loader configuration")
        .and_then(|config| bootstrap(&mut context, &config));
    if let Err(err) = outcome {
        error!("bootstrap failed: {err:#}");
    }
    context.detach();
}

fn bootstrap(context: &mut HostContext, config: &LoaderConfig) -> anyhow::Result<()> {
    let archive = archive_bytes(EMBEDDED_ARCHIVE, config.archive_path.as_deref())?;

    let env = context.attach()?;
    let mut loader = MemoryClassLoader::new(JniBridge::new(env));
    let summary = loader.load(&archive).context("failed to load archive")?;
    info!(
        defined = summary.defined.len(),
        skipped = summary.skipped.len(),
        "classes loaded"
    );

    std::thread::sleep(config.settle_delay());

    loader
        .invoke_entry_point(&config.entry_class, &config.entry_method)
        .with_context(|| {
            format!(
                "failed to run {}.{}",
                config.entry_class, config.entry_method
            )
        })
}

/// The archive embedded at build time, or else the one at `path`.
pub fn archive_bytes(
    embedded: Option<&'static [u8]>,
    path: Option<&Path>,
) -> anyhow::Result<Cow<'static, [u8]>> {
    if let Some(bytes) = embedded {
        return Ok(Cow::Borrowed(bytes));
    }
    let path = path.context("no archive embedded and no archive_path configured")?;
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read archive {}", path.display()))?;
    Ok(Cow::Owned(bytes))
}

/// Install the stderr subscriber. `RUST_LOG` wins over `fallback`. A
/// subscriber installed earlier by the host is left alone.
pub fn init_tracing(fallback: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    static EMBEDDED: &[u8] = b"PK\x05\x06embedded";

    #[test]
    fn test_embedded_archive_wins() {
        let bytes =
            archive_bytes(Some(EMBEDDED), Some(Path::new("/nonexistent.jar"))).unwrap();
        assert!(matches!(bytes, Cow::Borrowed(_)));
        assert_eq!(bytes.as_ref(), EMBEDDED);
    }

    #[test]
    fn test_archive_read_from_path() {
        let path =
            std::env::temp_dir().join(format!("jarmap-bootstrap-{}.jar", std::process::id()));
        std::fs::write(&path, b"archive bytes").unwrap();

        let bytes = archive_bytes(None, Some(&path));
        std::fs::remove_file(&path).unwrap();

        assert_eq!(bytes.unwrap().as_ref(), b"archive bytes");
    }

    #[rstest]
    #[case(None, "no archive embedded")]
    #[case(
        Some("/nonexistent/app.jar"),
        "failed to read archive /nonexistent/app.jar"
    )]
    fn test_missing_archive(#[case] path: Option<&str>, #[case] message: &str) {
        let err = archive_bytes(None, path.map(Path::new)).unwrap_err();
        assert!(err.to_string().contains(message), "{err}");
    }

    #[test]
    fn test_worker_without_vm_does_nothing() {
        let handle = spawn_worker(|| None).unwrap();
        assert_eq!(handle.thread().name(), Some(WORKER_THREAD_NAME));
        handle.join().unwrap();
        assert!(!WORKER_CLAIMED.load(Ordering::SeqCst));
    }

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing("debug");
        init_tracing("info");
    }
}
