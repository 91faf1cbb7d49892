//! Device-to-host type mapping.
//!
//! The table is closed: the layout of the generated argument storage is
//! derived from it, so a device type without an entry cannot be marshaled
//! and is always an error.

use std::fmt;

use crate::diagnostic::Diagnostic;
use crate::parser::{KernelSignature, Param};
use crate::span::Span;

/// Host-side representation of a kernel parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostType {
    /// Device pointer to `float` (`CUdeviceptr`).
    DevicePtr,
    F32,
    I32,
}

impl HostType {
    /// Type name as written in generated Rust.
    pub fn rust_name(self) -> &'static str {
        match self {
            HostType::DevicePtr => "DevicePtr",
            HostType::F32 => "f32",
            HostType::I32 => "i32",
        }
    }

    /// True if the generated code must import this type from the runtime.
    pub fn from_runtime(self) -> bool {
        matches!(self, HostType::DevicePtr)
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rust_name())
    }
}

/// Every device type the dialect accepts.
const TYPE_TABLE: &[(&str, HostType)] = &[
    ("float*", HostType::DevicePtr),
    ("float", HostType::F32),
    ("int", HostType::I32),
];

/// Look up a normalized device type.
pub fn map_device_type(device_type: &str) -> Option<HostType> {
    TYPE_TABLE
        .iter()
        .find(|(name, _)| *name == device_type)
        .map(|(_, host)| *host)
}

/// Device type names accepted by [`map_device_type`], in table order.
pub fn supported_device_types() -> impl Iterator<Item = &'static str> {
    TYPE_TABLE.iter().map(|(name, _)| *name)
}

/// A kernel parameter with its host type resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct HostParam {
    pub name: String,
    pub device_type: String,
    pub host_type: HostType,
    pub span: Span,
}

fn resolve_param(param: &Param) -> Result<HostParam, Diagnostic> {
    match map_device_type(&param.device_type) {
        Some(host_type) => Ok(HostParam {
            name: param.name.clone(),
            device_type: param.device_type.clone(),
            host_type,
            span: param.span,
        }),
        None => Err(Diagnostic::error(
            format!("unsupported device type `{}`", param.device_type),
            param.span,
        )
        .with_note(format!(
            "supported types: {}",
            supported_device_types().collect::<Vec<_>>().join(", ")
        ))),
    }
}

/// Resolve every parameter of `signature`, failing on the first unsupported type.
pub fn resolve_params(signature: &KernelSignature) -> Result<Vec<HostParam>, Diagnostic> {
    signature.params.iter().map(resolve_param).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(device_type: &str, name: &str) -> Param {
        Param {
            device_type: device_type.to_string(),
            name: name.to_string(),
            span: Span::new(0, 1),
        }
    }

    fn signature(params: Vec<Param>) -> KernelSignature {
        KernelSignature {
            name: "k".to_string(),
            name_span: Span::dummy(),
            params,
        }
    }

    #[test]
    fn test_table_entries() {
        assert_eq!(map_device_type("float*"), Some(HostType::DevicePtr));
        assert_eq!(map_device_type("float"), Some(HostType::F32));
        assert_eq!(map_device_type("int"), Some(HostType::I32));
    }

    #[test]
    fn test_closed_world() {
        for ty in ["double", "int*", "float**", "struct Vec3", "unsigned int", "Float", ""] {
            assert_eq!(map_device_type(ty), None, "{}", ty);
        }
    }

    #[test]
    fn test_rust_names() {
        assert_eq!(HostType::DevicePtr.rust_name(), "DevicePtr");
        assert_eq!(HostType::F32.to_string(), "f32");
        assert_eq!(HostType::I32.to_string(), "i32");
        assert!(HostType::DevicePtr.from_runtime());
        assert!(!HostType::F32.from_runtime());
    }

    #[test]
    fn test_resolve_preserves_order() {
        let sig = signature(vec![param("float", "a"), param("float*", "b"), param("int", "c")]);
        let resolved = resolve_params(&sig).unwrap();
        let names: Vec<_> = resolved.iter().map(|p| p.name.as_str()).collect();
        let types: Vec<_> = resolved.iter().map(|p| p.host_type).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(types, vec![HostType::F32, HostType::DevicePtr, HostType::I32]);
    }

    #[test]
    fn test_unsupported_type_is_named() {
        let sig = signature(vec![param("int", "n"), param("struct Vec3", "v")]);
        let d = resolve_params(&sig).unwrap_err();
        assert_eq!(d.message, "unsupported device type `struct Vec3`");
        assert_eq!(d.notes, vec!["supported types: float*, float, int".to_string()]);
    }

    #[test]
    fn test_empty_signature() {
        assert!(resolve_params(&signature(Vec::new())).unwrap().is_empty());
    }
}
