//! The compiled kernel as handed to the code generator.

pub mod sanitize;

use crate::parser::KernelSignature;
use crate::types::HostParam;

pub use sanitize::sanitize_ptx;

/// Sanitized PTX plus the resolved kernel signature.
///
/// Built once per input file and never modified afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct KernelArtifact {
    signature: KernelSignature,
    params: Vec<HostParam>,
    ptx: String,
}

impl KernelArtifact {
    /// Sanitizes `raw_ptx` on construction. `params` must be the resolved
    /// parameters of `signature`, in the same order.
    pub fn new(signature: KernelSignature, params: Vec<HostParam>, raw_ptx: &str) -> Self {
        debug_assert_eq!(signature.params.len(), params.len());
        Self {
            signature,
            params,
            ptx: sanitize_ptx(raw_ptx),
        }
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn signature(&self) -> &KernelSignature {
        &self.signature
    }

    pub fn params(&self) -> &[HostParam] {
        &self.params
    }

    pub fn ptx(&self) -> &str {
        &self.ptx
    }
}
