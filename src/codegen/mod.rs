//! Wrapper generation.
//!
//! [`build_wrapper`] turns a [`KernelArtifact`] into a [`Wrapper`]: an
//! explicit description of every declaration the generated Rust file
//! contains. [`render`] is the only place that knows the textual layout, so
//! naming and ordering can be tested on the structure alone.

mod naming;
mod render;

use crate::config::GenOptions;
use crate::diagnostic::Diagnostic;
use crate::ir::KernelArtifact;
use crate::types::HostType;

pub use naming::{pascal_case, rust_ident, snake_case};
pub use render::render;

/// Tool name written into generated headers.
pub const GENERATOR: &str = "cuda2rs";

/// Launcher parameters that follow the kernel arguments.
pub const GRID_PARAM: &str = "grid_dim";
pub const BLOCK_PARAM: &str = "block_dim";

/// A struct field or function parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    /// Rust identifier, raw (`r#type`) when the C name is a Rust keyword.
    pub ident: String,
    pub ty: HostType,
}

/// `#[repr(C)]` storage struct: one persistent cell per kernel parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArgsStruct {
    pub name: String,
    pub fields: Vec<Field>,
}

impl ArgsStruct {
    /// Fields whose addresses make up the argument-address array, in order.
    pub fn address_order(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.ident.as_str()).collect()
    }
}

/// The per-kernel `static` holding the launch context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextDecl {
    pub name: String,
    pub args_ty: String,
    /// Function name looked up in the PTX module.
    pub kernel: String,
    pub ptx_const: String,
}

/// One `<cell>: <value>` initializer of the launcher's argument literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Store {
    pub cell: String,
    pub value: String,
}

/// The public launch entry point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Launcher {
    pub name: String,
    /// Kernel arguments only; grid and block dimensions are appended on render.
    pub params: Vec<Field>,
    pub context: String,
    /// Argument struct built from `stores` and handed to the context.
    pub args_ty: String,
    pub stores: Vec<Store>,
}

/// The embedded PTX constant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PtxConst {
    pub name: String,
    pub text: String,
}

/// Everything a generated wrapper file declares, in output order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wrapper {
    pub kernel: String,
    pub source_name: String,
    pub fingerprint: String,
    pub runtime_path: String,
    /// Names imported from the runtime module, sorted.
    pub imports: Vec<&'static str>,
    /// C parameter names that are not snake case (`N`, `dX`).
    pub allow_non_snake_case: bool,
    pub args: ArgsStruct,
    pub context: ContextDecl,
    pub launcher: Launcher,
    pub ptx: PtxConst,
}

/// Describe the wrapper for `artifact`.
///
/// Fails when a parameter name cannot be used in Rust or collides with a
/// name the wrapper declares itself.
pub fn build_wrapper(
    artifact: &KernelArtifact,
    source_name: &str,
    fingerprint: &str,
    options: &GenOptions,
) -> Result<Wrapper, Diagnostic> {
    let kernel = artifact.name().to_string();
    let snake = snake_case(&kernel);
    let pascal = pascal_case(&kernel);
    if pascal.is_empty() || pascal.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(Diagnostic::error(
            format!("kernel name `{}` has no usable Rust spelling", kernel),
            artifact.signature().name_span,
        ));
    }

    let context_name = snake.to_uppercase();
    let ptx_const = format!("{}_PTX", context_name);
    let args_ty = format!("{}Args", pascal);
    let launcher_name = rust_ident(&format!("{}{}", options.launcher_prefix, snake)).ok_or_else(|| {
        Diagnostic::error(
            format!("kernel name `{}` cannot be used as a Rust function name", kernel),
            artifact.signature().name_span,
        )
    })?;

    let reserved = [
        GRID_PARAM,
        BLOCK_PARAM,
        context_name.as_str(),
        ptx_const.as_str(),
        "DevicePtr",
        "Ok",
        "Err",
        "Some",
        "None",
    ];

    let mut fields = Vec::with_capacity(artifact.params().len());
    let mut allow_non_snake_case = false;
    for param in artifact.params() {
        if reserved.contains(&param.name.as_str()) {
            return Err(Diagnostic::error(
                format!("parameter name `{}` is reserved by the generated launcher", param.name),
                param.span,
            )
            .with_help("rename the kernel parameter".to_string()));
        }
        let ident = rust_ident(&param.name).ok_or_else(|| {
            Diagnostic::error(
                format!("parameter name `{}` cannot be used in Rust", param.name),
                param.span,
            )
        })?;
        if param.name != snake_case(&param.name) {
            allow_non_snake_case = true;
        }
        fields.push(Field {
            ident,
            ty: param.host_type,
        });
    }

    let mut imports = vec!["ArgAddr", "Dim3", "KernelArgs", "KernelContext", "LaunchError"];
    if fields.iter().any(|f| f.ty.from_runtime()) {
        imports.push("DevicePtr");
    }
    imports.sort_unstable();

    let stores = fields
        .iter()
        .map(|f| Store {
            cell: f.ident.clone(),
            value: f.ident.clone(),
        })
        .collect();

    Ok(Wrapper {
        kernel: kernel.clone(),
        source_name: source_name.to_string(),
        fingerprint: fingerprint.to_string(),
        runtime_path: options.runtime_path.clone(),
        imports,
        allow_non_snake_case,
        args: ArgsStruct {
            name: args_ty.clone(),
            fields: fields.clone(),
        },
        context: ContextDecl {
            name: context_name.clone(),
            args_ty: args_ty.clone(),
            kernel,
            ptx_const: ptx_const.clone(),
        },
        launcher: Launcher {
            name: launcher_name,
            params: fields,
            context: context_name,
            args_ty,
            stores,
        },
        ptx: PtxConst {
            name: ptx_const,
            text: artifact.ptx().to_string(),
        },
    })
}
