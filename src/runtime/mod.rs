//! Launch runtime for generated kernel wrappers.
//!
//! Generated code owns one [`KernelContext`] per kernel and calls its
//! `launch` method. Everything device-specific sits behind the [`Driver`]
//! trait: the `cuda` feature provides a CUDA driver-API implementation, and
//! tests plug in instrumented doubles.
//!
//! A process-wide driver is installed once with [`install_driver`] (or, with
//! the `cuda` feature, created on first use for device 0). Contexts built
//! with [`KernelContext::with_driver`] bypass the global driver entirely.

mod context;
#[cfg(feature = "cuda")]
pub mod cuda;

use std::ffi::c_void;
use std::sync::{Arc, OnceLock};

pub use context::KernelContext;

// ─── Types ─────────────────────────────────────────────────────────

/// Address of one argument storage cell, as the launch primitive expects it.
pub type ArgAddr = *mut c_void;

/// An address in device memory (`CUdeviceptr`).
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DevicePtr(pub u64);

impl DevicePtr {
    pub const NULL: DevicePtr = DevicePtr(0);

    pub fn new(addr: u64) -> Self {
        Self(addr)
    }

    pub fn addr(self) -> u64 {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Pointer `bytes` past this one.
    pub fn offset(self, bytes: u64) -> Self {
        Self(self.0 + bytes)
    }
}

/// Grid or block dimensions of a launch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dim3 {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Dim3 {
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// One-dimensional configuration.
    pub fn linear(x: u32) -> Self {
        Self { x, y: 1, z: 1 }
    }

    /// Total number of blocks or threads described.
    pub fn volume(self) -> u64 {
        self.x as u64 * self.y as u64 * self.z as u64
    }

    pub fn as_tuple(self) -> (u32, u32, u32) {
        (self.x, self.y, self.z)
    }
}

impl Default for Dim3 {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl From<u32> for Dim3 {
    fn from(x: u32) -> Self {
        Self::linear(x)
    }
}

impl From<(u32, u32)> for Dim3 {
    fn from((x, y): (u32, u32)) -> Self {
        Self::new(x, y, 1)
    }
}

impl From<(u32, u32, u32)> for Dim3 {
    fn from((x, y, z): (u32, u32, u32)) -> Self {
        Self::new(x, y, z)
    }
}

/// Opaque handle to a loaded kernel function (`CUfunction`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FunctionHandle(usize);

impl FunctionHandle {
    pub fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> usize {
        self.0
    }
}

/// Opaque handle to an execution queue (`CUstream`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StreamHandle(usize);

impl StreamHandle {
    pub fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> usize {
        self.0
    }
}

/// Persistent argument storage of one kernel.
///
/// Implemented by the generated `<Kernel>Args` structs. The storage lives in
/// a heap allocation owned by the kernel's context, which keeps only a raw
/// pointer to it. Addresses are derived from that pointer once and every
/// later write goes through the same pointer, so they stay valid and never
/// change.
///
/// # Safety
///
/// `addresses` must return exactly one pointer per kernel parameter, in
/// declaration order, each pointing at the matching field of `*this`.
pub unsafe trait KernelArgs: Default + Send + 'static {
    /// Address of every argument field, in parameter declaration order.
    ///
    /// # Safety
    ///
    /// `this` must point at a live value. No reference to it may be created
    /// while the returned pointers are in use.
    unsafe fn addresses(this: *mut Self) -> Vec<ArgAddr>;
}

// ─── Errors ────────────────────────────────────────────────────────

/// Failure reported by a [`Driver`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct DriverError(pub String);

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failure of a generated launch entry point.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LaunchError {
    #[error("no device driver installed")]
    NoDriver,
    #[error("cannot load kernel `{kernel}`: {source}")]
    Load {
        kernel: &'static str,
        source: DriverError,
    },
    #[error("cannot create stream for kernel `{kernel}`: {source}")]
    StreamCreate {
        kernel: &'static str,
        source: DriverError,
    },
    #[error("launch of kernel `{kernel}` failed: {source}")]
    Launch {
        kernel: &'static str,
        source: DriverError,
    },
    #[error("synchronizing kernel `{kernel}` failed: {source}")]
    Synchronize {
        kernel: &'static str,
        source: DriverError,
    },
}

// ─── Driver Trait ──────────────────────────────────────────────────

/// Device operations a kernel context needs.
///
/// Implementations must be usable from any thread; a context only calls them
/// while holding its own lock.
pub trait Driver: Send + Sync {
    /// Load `ptx` as a module and resolve the function `name` in it.
    fn load_function(&self, ptx: &str, name: &str) -> Result<FunctionHandle, DriverError>;

    /// Create a new execution queue.
    fn create_stream(&self) -> Result<StreamHandle, DriverError>;

    /// Queue a launch of `function` on `stream`.
    ///
    /// # Safety
    ///
    /// Every entry of `args` must point at a live value whose type matches
    /// the kernel's parameter at that index, and must stay valid and
    /// unmodified until `stream` has been synchronized.
    unsafe fn launch(
        &self,
        function: FunctionHandle,
        grid_dim: Dim3,
        block_dim: Dim3,
        shared_mem_bytes: u32,
        stream: StreamHandle,
        args: &[ArgAddr],
    ) -> Result<(), DriverError>;

    /// Block until all work queued on `stream` has completed.
    fn synchronize(&self, stream: StreamHandle) -> Result<(), DriverError>;
}

// ─── Process-wide Driver ───────────────────────────────────────────

static DRIVER: OnceLock<Arc<dyn Driver>> = OnceLock::new();

/// Install the driver used by contexts created with [`KernelContext::new`].
///
/// Only the first installation takes effect; later calls hand their driver
/// back as the error.
pub fn install_driver(driver: Arc<dyn Driver>) -> Result<(), Arc<dyn Driver>> {
    DRIVER.set(driver)
}

/// The installed driver, creating the CUDA driver on first use when the
/// `cuda` feature is enabled.
pub fn global_driver() -> Option<Arc<dyn Driver>> {
    if let Some(driver) = DRIVER.get() {
        return Some(Arc::clone(driver));
    }
    #[cfg(feature = "cuda")]
    {
        match cuda::CudaDriver::new(0) {
            Ok(driver) => {
                // Losing a race to another installer is fine: use the winner.
                let _ = DRIVER.set(Arc::new(driver));
            }
            Err(e) => {
                tracing::error!("cannot initialize CUDA driver: {}", e);
                return None;
            }
        }
    }
    DRIVER.get().cloned()
}
