pub mod project;

use std::path::{Path, PathBuf};

pub use project::ProjectConfig;

/// Module path the generated wrapper imports the launch runtime from.
pub const DEFAULT_RUNTIME_PATH: &str = "cuda2rs::runtime";

/// Prefix of the generated launch function (`k_<kernel>`).
pub const DEFAULT_LAUNCHER_PREFIX: &str = "k_";

/// Extension of the compiled PTX next to each kernel source.
pub const DEFAULT_IR_EXTENSION: &str = "ptx";

/// Extension of the generated wrapper.
pub const DEFAULT_OUTPUT_EXTENSION: &str = "rs";

/// Resolved generator settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenOptions {
    pub runtime_path: String,
    pub launcher_prefix: String,
    pub ir_extension: String,
    pub output_extension: String,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
            launcher_prefix: DEFAULT_LAUNCHER_PREFIX.to_string(),
            ir_extension: DEFAULT_IR_EXTENSION.to_string(),
            output_extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
        }
    }
}

impl GenOptions {
    /// Defaults overridden by whatever the project file sets.
    pub fn from_project(project: &ProjectConfig) -> Self {
        let mut options = Self::default();
        if let Some(path) = &project.runtime_path {
            options.runtime_path = path.clone();
        }
        if let Some(prefix) = &project.launcher_prefix {
            options.launcher_prefix = prefix.clone();
        }
        if let Some(ext) = &project.ir_extension {
            options.ir_extension = ext.clone();
        }
        if let Some(ext) = &project.output_extension {
            options.output_extension = ext.clone();
        }
        options
    }

    pub fn with_runtime_path(mut self, path: &str) -> Self {
        self.runtime_path = path.to_string();
        self
    }

    /// Path of the compiled PTX for `source`.
    pub fn ir_path(&self, source: &Path) -> PathBuf {
        source.with_extension(&self.ir_extension)
    }

    /// Path of the wrapper generated for `source`.
    pub fn output_path(&self, source: &Path) -> PathBuf {
        source.with_extension(&self.output_extension)
    }

    /// Check that every setting can appear in generated code.
    pub fn validate(&self) -> Result<(), String> {
        let segments: Vec<&str> = self.runtime_path.split("::").collect();
        if segments.iter().any(|s| !is_rust_ident(s)) {
            return Err(format!("invalid runtime_path '{}'", self.runtime_path));
        }
        if !self.launcher_prefix.is_empty() && !is_rust_ident(&self.launcher_prefix) {
            return Err(format!("invalid launcher_prefix '{}'", self.launcher_prefix));
        }
        for (key, ext) in [
            ("ir_extension", &self.ir_extension),
            ("output_extension", &self.output_extension),
        ] {
            if ext.is_empty() || ext.contains(['/', '\\']) {
                return Err(format!("invalid {} '{}'", key, ext));
            }
        }
        if self.ir_extension == self.output_extension {
            return Err("ir_extension and output_extension must differ".to_string());
        }
        Ok(())
    }
}

fn is_rust_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let o = GenOptions::default();
        assert_eq!(o.runtime_path, "cuda2rs::runtime");
        assert_eq!(o.launcher_prefix, "k_");
        assert!(o.validate().is_ok());
    }

    #[test]
    fn test_derived_paths() {
        let o = GenOptions::default();
        let src = Path::new("kernels/madd.cu");
        assert_eq!(o.ir_path(src), PathBuf::from("kernels/madd.ptx"));
        assert_eq!(o.output_path(src), PathBuf::from("kernels/madd.rs"));
    }

    #[test]
    fn test_from_project_overrides() {
        let project = ProjectConfig {
            runtime_path: Some("crate::gpu::runtime".to_string()),
            launcher_prefix: None,
            ir_extension: Some("ptx64".to_string()),
            output_extension: None,
        };
        let o = GenOptions::from_project(&project);
        assert_eq!(o.runtime_path, "crate::gpu::runtime");
        assert_eq!(o.launcher_prefix, "k_");
        assert_eq!(o.ir_extension, "ptx64");
        assert_eq!(o.output_extension, "rs");
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        assert!(GenOptions::default()
            .with_runtime_path("cuda2rs::")
            .validate()
            .is_err());
        assert!(GenOptions::default()
            .with_runtime_path("my-crate::rt")
            .validate()
            .is_err());
        let mut o = GenOptions::default();
        o.launcher_prefix = "launch-".to_string();
        assert!(o.validate().is_err());
        let mut o = GenOptions::default();
        o.output_extension = "ptx".to_string();
        assert!(o.validate().is_err());
    }

    #[test]
    fn test_empty_prefix_is_allowed() {
        let mut o = GenOptions::default();
        o.launcher_prefix = String::new();
        assert!(o.validate().is_ok());
    }
}
