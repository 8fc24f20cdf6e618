//! JNI side of jarmap.
//!
//! Built as a `cdylib`, the library starts a worker thread, from
//! `JNI_OnLoad` or from a load-time constructor when mapped into a process
//! whose VM is already running. The worker loads an embedded (or configured)
//! class archive into the host VM and then runs the configured static entry
//! point.

pub mod bootstrap;
pub mod bridge;
pub mod context;
pub mod discover;

pub use bootstrap::{
    archive_bytes, init_tracing, run_worker, spawn_worker, EMBEDDED_ARCHIVE, WORKER_THREAD_NAME,
};
pub use bridge::{HostClass, HostMethod, JniBridge};
pub use context::HostContext;
pub use discover::find_running_vm;
