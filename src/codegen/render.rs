use super::{
    ArgsStruct, ContextDecl, Field, Launcher, PtxConst, Store, Wrapper, BLOCK_PARAM, GENERATOR,
    GRID_PARAM,
};

const MAX_WIDTH: usize = 100;
const INDENT: &str = "    ";

/// Render `wrapper` as a Rust source file.
///
/// The file has no inner attributes or `//!` docs, so it can be pulled in
/// with `include!` as well as declared as a module.
pub fn render(wrapper: &Wrapper) -> String {
    let mut ctx = RenderCtx::default();
    ctx.header(wrapper);
    ctx.imports(wrapper);
    ctx.args_struct(&wrapper.kernel, &wrapper.args, wrapper.allow_non_snake_case);
    ctx.context_static(&wrapper.context);
    ctx.launcher(&wrapper.kernel, &wrapper.launcher, wrapper.allow_non_snake_case);
    ctx.ptx_const(&wrapper.ptx);
    ctx.output
}

#[derive(Default)]
struct RenderCtx {
    output: String,
}

impl RenderCtx {
    fn line(&mut self, text: &str) {
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn blank(&mut self) {
        self.output.push('\n');
    }

    fn header(&mut self, wrapper: &Wrapper) {
        self.line(&format!(
            "// Code generated by {} from {}. DO NOT EDIT.",
            GENERATOR, wrapper.source_name
        ));
        self.line(&format!("// fingerprint: {}", wrapper.fingerprint));
        self.blank();
    }

    fn imports(&mut self, wrapper: &Wrapper) {
        self.line("use std::sync::LazyLock;");
        self.blank();
        self.line(&format!(
            "use {}::{{{}}};",
            wrapper.runtime_path,
            wrapper.imports.join(", ")
        ));
        self.blank();
    }

    fn args_struct(&mut self, kernel: &str, args: &ArgsStruct, allow_non_snake_case: bool) {
        self.line(&format!(
            "/// Argument cells of kernel `{}`, in parameter order.",
            kernel
        ));
        if allow_non_snake_case {
            self.line("#[allow(non_snake_case)]");
        }
        self.line("#[repr(C)]");
        self.line("#[derive(Default)]");
        if args.fields.is_empty() {
            self.line(&format!("pub struct {} {{}}", args.name));
        } else {
            self.line(&format!("pub struct {} {{", args.name));
            for field in &args.fields {
                self.line(&format!("{}pub {}: {},", INDENT, field.ident, field.ty));
            }
            self.line("}");
        }
        self.blank();

        self.line("// SAFETY: one address per field of `*this`, in parameter order.");
        self.line(&format!("unsafe impl KernelArgs for {} {{", args.name));
        let order = args.address_order();
        if order.is_empty() {
            self.line(&format!("{}unsafe fn addresses(_this: *mut Self) -> Vec<ArgAddr> {{", INDENT));
            self.line(&format!("{0}{0}Vec::new()", INDENT));
        } else {
            self.line(&format!("{}unsafe fn addresses(this: *mut Self) -> Vec<ArgAddr> {{", INDENT));
            self.line(&format!("{0}{0}unsafe {{", INDENT));
            self.line(&format!("{0}{0}{0}vec![", INDENT));
            for ident in order {
                self.line(&format!(
                    "{0}{0}{0}{0}std::ptr::addr_of_mut!((*this).{1}).cast(),",
                    INDENT, ident
                ));
            }
            self.line(&format!("{0}{0}{0}]", INDENT));
            self.line(&format!("{0}{0}}}", INDENT));
        }
        self.line(&format!("{}}}", INDENT));
        self.line("}");
        self.blank();
    }

    fn context_static(&mut self, context: &ContextDecl) {
        self.line(&format!(
            "static {}: LazyLock<KernelContext<{}>> =",
            context.name, context.args_ty
        ));
        self.line(&format!(
            "{}LazyLock::new(|| KernelContext::new({:?}, {}));",
            INDENT, context.kernel, context.ptx_const
        ));
        self.blank();
    }

    fn launcher(&mut self, kernel: &str, launcher: &Launcher, allow_non_snake_case: bool) {
        self.line(&format!("/// Launch kernel `{}` and wait for it to finish.", kernel));
        self.line("///");
        self.line("/// Runs on the kernel's own stream. Concurrent calls are serialized.");
        if allow_non_snake_case {
            self.line("#[allow(non_snake_case)]");
        }

        let mut params: Vec<String> = launcher.params.iter().map(param_decl).collect();
        params.push(format!("{}: Dim3", GRID_PARAM));
        params.push(format!("{}: Dim3", BLOCK_PARAM));
        let ret = ") -> Result<(), LaunchError> {";
        let single = format!("pub fn {}({}{}", launcher.name, params.join(", "), ret);
        if single.len() <= MAX_WIDTH {
            self.line(&single);
        } else {
            self.line(&format!("pub fn {}(", launcher.name));
            for param in &params {
                self.line(&format!("{}{},", INDENT, param));
            }
            self.line(ret);
        }

        let inits: Vec<String> = launcher.stores.iter().map(field_init).collect();
        let literal = if inits.is_empty() {
            format!("{} {{}}", launcher.args_ty)
        } else {
            format!("{} {{ {} }}", launcher.args_ty, inits.join(", "))
        };
        let single = format!(
            "{}{}.launch({}, {}, {})",
            INDENT, launcher.context, GRID_PARAM, BLOCK_PARAM, literal
        );
        if single.len() <= MAX_WIDTH {
            self.line(&single);
        } else {
            self.line(&format!("{}{}.launch(", INDENT, launcher.context));
            self.line(&format!("{0}{0}{1},", INDENT, GRID_PARAM));
            self.line(&format!("{0}{0}{1},", INDENT, BLOCK_PARAM));
            self.line(&format!("{0}{0}{1} {{", INDENT, launcher.args_ty));
            for init in &inits {
                self.line(&format!("{0}{0}{0}{1},", INDENT, init));
            }
            self.line(&format!("{0}{0}}},", INDENT));
            self.line(&format!("{})", INDENT));
        }
        self.line("}");
        self.blank();
    }

    fn ptx_const(&mut self, ptx: &PtxConst) {
        if ptx.text.contains('\r') {
            // Raw strings reject a bare CR and read CRLF as LF.
            self.line(&format!("const {}: &str = {:?};", ptx.name, ptx.text));
            return;
        }
        let hashes = "#".repeat(raw_hash_count(&ptx.text));
        self.output.push_str(&format!(
            "const {}: &str = r{}\"{}\"{};\n",
            ptx.name, hashes, ptx.text, hashes
        ));
    }
}

fn param_decl(field: &Field) -> String {
    format!("{}: {}", field.ident, field.ty)
}

fn field_init(store: &Store) -> String {
    if store.cell == store.value {
        store.cell.clone()
    } else {
        format!("{}: {}", store.cell, store.value)
    }
}

/// Number of `#` a raw string needs so that no `"` in `text` closes it.
pub(super) fn raw_hash_count(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut longest = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'"' {
            let run = bytes[i + 1..].iter().take_while(|&&c| c == b'#').count();
            longest = longest.max(run);
        }
    }
    longest + 1
}
