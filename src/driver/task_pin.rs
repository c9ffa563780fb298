//! Worker task spawning.
//!
//! On ESP-IDF, `std::thread` is a pthread over a FreeRTOS task, and
//! `esp_pthread_set_cfg()` sets the priority and stack of the *next*
//! `pthread_create()` from the calling thread. The config→spawn pair must
//! therefore not be interleaved with other thread creation on that thread.
//! Elsewhere the worker is a plain named thread and the priority is ignored.

use std::io;
use std::thread::JoinHandle;

use crate::config::DriverConfig;

/// Spawn the worker body on its own thread, named and sized from `config`.
#[cfg(all(feature = "espidf", target_os = "espidf"))]
pub(crate) fn spawn_worker(
    config: &DriverConfig,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    let name = std::ffi::CString::new(config.task_name.as_str())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "task name contains NUL"))?;

    // SAFETY: `cfg` is fully initialised by the default constructor and
    // `name` outlives the spawn below, which consumes the configuration.
    let ret = unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.prio = config.task_priority as _;
        cfg.stack_size = (config.task_stack_kb * 1024) as _;
        cfg.thread_name = name.as_ptr();
        esp_idf_sys::esp_pthread_set_cfg(&cfg)
    };
    if ret != esp_idf_sys::ESP_OK as i32 {
        return Err(io::Error::other(format!("esp_pthread_set_cfg failed: {ret}")));
    }

    log::info!(
        "Spawning '{}' (pri={}, stack={}KB)",
        config.task_name,
        config.task_priority,
        config.task_stack_kb
    );

    std::thread::Builder::new()
        .name(config.task_name.as_str().into())
        .spawn(f)
}

/// Host fallback — ignores priority.
#[cfg(not(all(feature = "espidf", target_os = "espidf")))]
pub(crate) fn spawn_worker(
    config: &DriverConfig,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    log::info!(
        "Spawning '{}' (host, stack={}KB)",
        config.task_name,
        config.task_stack_kb
    );

    std::thread::Builder::new()
        .name(config.task_name.as_str().into())
        .stack_size(config.task_stack_kb * 1024)
        .spawn(f)
}
