use std::ptr::NonNull;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use super::{
    global_driver, ArgAddr, Dim3, Driver, FunctionHandle, KernelArgs, LaunchError, StreamHandle,
};

/// Process-wide launch state of one kernel.
///
/// Holds the lock that serializes launches of this kernel, the lazily loaded
/// function and stream, the persistent argument cells and the address array
/// pointing at them. Launches of different kernels use different contexts and
/// never contend.
pub struct KernelContext<A: KernelArgs> {
    name: &'static str,
    ptx: &'static str,
    driver: Option<Arc<dyn Driver>>,
    state: Mutex<LaunchState<A>>,
}

/// Device handles, created on the first launch.
#[derive(Clone)]
struct Loaded {
    driver: Arc<dyn Driver>,
    function: FunctionHandle,
    stream: StreamHandle,
}

struct LaunchState<A> {
    loaded: Option<Loaded>,
    /// Argument cells, leaked from a `Box` and freed on drop. Only ever
    /// accessed through this pointer, never through a reference.
    cells: NonNull<A>,
    /// Addresses of the fields of `cells`, derived from `cells`. Built once.
    addresses: Vec<ArgAddr>,
}

// SAFETY: `cells` and `addresses` point into an allocation the state owns.
// The state is reachable solely through the context's mutex, so the raw
// pointers are never used from two threads at once.
unsafe impl<A: KernelArgs> Send for LaunchState<A> {}

impl<A> Drop for LaunchState<A> {
    fn drop(&mut self) {
        // SAFETY: `cells` came from `Box::leak` in `KernelContext::build` and
        // is released only here.
        drop(unsafe { Box::from_raw(self.cells.as_ptr()) });
    }
}

impl<A: KernelArgs> KernelContext<A> {
    /// Context using the process-wide driver (see [`super::install_driver`]).
    pub fn new(name: &'static str, ptx: &'static str) -> Self {
        Self::build(name, ptx, None)
    }

    /// Context bound to an explicit driver.
    pub fn with_driver(name: &'static str, ptx: &'static str, driver: Arc<dyn Driver>) -> Self {
        Self::build(name, ptx, Some(driver))
    }

    fn build(name: &'static str, ptx: &'static str, driver: Option<Arc<dyn Driver>>) -> Self {
        let cells = NonNull::from(Box::leak(Box::<A>::default()));
        // SAFETY: `cells` is live and no reference to it exists.
        let addresses = unsafe { A::addresses(cells.as_ptr()) };
        Self {
            name,
            ptx,
            driver,
            state: Mutex::new(LaunchState {
                loaded: None,
                cells,
                addresses,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// True once the module has been loaded and the stream created.
    pub fn is_loaded(&self) -> bool {
        self.lock().loaded.is_some()
    }

    /// Launch the kernel and wait for it to finish.
    ///
    /// Under the context lock: loads the module and creates the stream on
    /// first use, copies `args` into the persistent cells, queues the launch
    /// with zero dynamic shared memory and synchronizes the stream. The lock
    /// is held until the device is done reading the cells, so a concurrent
    /// caller can never overwrite an argument that is still in use.
    pub fn launch(&self, grid_dim: Dim3, block_dim: Dim3, args: A) -> Result<(), LaunchError> {
        let mut state = self.lock();

        let loaded = match state.loaded.clone() {
            Some(loaded) => loaded,
            None => {
                let loaded = self.load()?;
                state.loaded = Some(loaded.clone());
                loaded
            }
        };

        // SAFETY: the lock is held and `cells` is live. Assigning through
        // the pointer `addresses` was derived from keeps them valid.
        unsafe { *state.cells.as_ptr() = args };

        debug!(
            kernel = self.name,
            grid = ?grid_dim.as_tuple(),
            block = ?block_dim.as_tuple(),
            "launching"
        );
        // SAFETY: `addresses` points into `state.cells`, which was just
        // written and stays untouched until the stream is synchronized below,
        // because the lock is held for the whole sequence.
        unsafe {
            loaded.driver.launch(
                loaded.function,
                grid_dim,
                block_dim,
                0,
                loaded.stream,
                &state.addresses,
            )
        }
        .map_err(|source| LaunchError::Launch {
            kernel: self.name,
            source,
        })?;

        loaded
            .driver
            .synchronize(loaded.stream)
            .map_err(|source| LaunchError::Synchronize {
                kernel: self.name,
                source,
            })
    }

    /// One-time initialization. Nothing is cached on failure, so the next
    /// launch tries again.
    fn load(&self) -> Result<Loaded, LaunchError> {
        let driver = match &self.driver {
            Some(driver) => Arc::clone(driver),
            None => global_driver().ok_or(LaunchError::NoDriver)?,
        };

        info!(kernel = self.name, "loading PTX code");
        let function = driver
            .load_function(self.ptx, self.name)
            .map_err(|source| LaunchError::Load {
                kernel: self.name,
                source,
            })?;
        let stream = driver
            .create_stream()
            .map_err(|source| LaunchError::StreamCreate {
                kernel: self.name,
                source,
            })?;

        Ok(Loaded {
            driver,
            function,
            stream,
        })
    }

    fn lock(&self) -> MutexGuard<'_, LaunchState<A>> {
        // Every launch rewrites all cells, so state left by a panicking
        // holder is safe to reuse.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
