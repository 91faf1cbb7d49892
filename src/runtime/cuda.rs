//! CUDA driver-API backend.
//!
//! Loads PTX with `cuModuleLoadData` and launches with `cuLaunchKernel`,
//! which takes the argument-address array directly.

use std::ffi::{c_void, CString};
use std::ptr;
use std::sync::Arc;

use cudarc::driver::sys as cuda_sys;
use cudarc::driver::CudaContext;

use super::{ArgAddr, Dim3, Driver, DriverError, FunctionHandle, StreamHandle};

/// [`Driver`] backed by the primary context of one CUDA device.
pub struct CudaDriver {
    context: Arc<CudaContext>,
}

impl CudaDriver {
    pub fn new(ordinal: usize) -> Result<Self, DriverError> {
        let context = CudaContext::new(ordinal)
            .map_err(|e| DriverError::new(format!("cannot open CUDA device {}: {}", ordinal, e)))?;
        Ok(Self { context })
    }

    /// Make the device context current on the calling thread.
    fn bind(&self) -> Result<(), DriverError> {
        self.context
            .bind_to_thread()
            .map_err(|e| DriverError::new(format!("cannot bind CUDA context: {}", e)))
    }
}

fn check(result: cuda_sys::CUresult, call: &str) -> Result<(), DriverError> {
    if result == cuda_sys::CUresult::CUDA_SUCCESS {
        Ok(())
    } else {
        Err(DriverError::new(format!("{} failed: {:?}", call, result)))
    }
}

impl Driver for CudaDriver {
    fn load_function(&self, ptx: &str, name: &str) -> Result<FunctionHandle, DriverError> {
        self.bind()?;

        let image = CString::new(ptx)
            .map_err(|e| DriverError::new(format!("PTX contains a NUL byte: {}", e)))?;
        let symbol = CString::new(name)
            .map_err(|e| DriverError::new(format!("invalid kernel name: {}", e)))?;

        let mut module: cuda_sys::CUmodule = ptr::null_mut();
        // SAFETY: `image` is a NUL-terminated PTX string that outlives the call.
        check(
            unsafe { cuda_sys::cuModuleLoadData(&mut module, image.as_ptr() as *const c_void) },
            "cuModuleLoadData",
        )?;

        let mut function: cuda_sys::CUfunction = ptr::null_mut();
        // SAFETY: `module` was just loaded and is never unloaded.
        check(
            unsafe { cuda_sys::cuModuleGetFunction(&mut function, module, symbol.as_ptr()) },
            "cuModuleGetFunction",
        )?;

        Ok(FunctionHandle::from_raw(function as usize))
    }

    fn create_stream(&self) -> Result<StreamHandle, DriverError> {
        self.bind()?;

        let mut stream: cuda_sys::CUstream = ptr::null_mut();
        // SAFETY: plain out-parameter call.
        check(
            unsafe {
                cuda_sys::cuStreamCreate(
                    &mut stream,
                    cuda_sys::CUstream_flags::CU_STREAM_NON_BLOCKING as u32,
                )
            },
            "cuStreamCreate",
        )?;
        Ok(StreamHandle::from_raw(stream as usize))
    }

    unsafe fn launch(
        &self,
        function: FunctionHandle,
        grid_dim: Dim3,
        block_dim: Dim3,
        shared_mem_bytes: u32,
        stream: StreamHandle,
        args: &[ArgAddr],
    ) -> Result<(), DriverError> {
        self.bind()?;

        // The driver only reads through the array.
        let params = if args.is_empty() {
            ptr::null_mut()
        } else {
            args.as_ptr() as *mut *mut c_void
        };
        check(
            cuda_sys::cuLaunchKernel(
                function.as_raw() as cuda_sys::CUfunction,
                grid_dim.x,
                grid_dim.y,
                grid_dim.z,
                block_dim.x,
                block_dim.y,
                block_dim.z,
                shared_mem_bytes,
                stream.as_raw() as cuda_sys::CUstream,
                params,
                ptr::null_mut(),
            ),
            "cuLaunchKernel",
        )
    }

    fn synchronize(&self, stream: StreamHandle) -> Result<(), DriverError> {
        self.bind()?;
        // SAFETY: the handle came from `create_stream` and is never destroyed.
        check(
            unsafe { cuda_sys::cuStreamSynchronize(stream.as_raw() as cuda_sys::CUstream) },
            "cuStreamSynchronize",
        )
    }
}
