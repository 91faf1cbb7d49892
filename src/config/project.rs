use std::path::{Path, PathBuf};

/// Name of the optional project configuration file.
pub const CONFIG_FILE: &str = "cuda2rs.toml";

/// Settings read from the `[generate]` section of `cuda2rs.toml`.
///
/// Unset keys keep the built-in defaults. The device type table is not
/// configurable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    pub runtime_path: Option<String>,
    pub launcher_prefix: Option<String>,
    pub ir_extension: Option<String>,
    pub output_extension: Option<String>,
}

impl ProjectConfig {
    /// Load configuration from a cuda2rs.toml file.
    pub fn load(toml_path: &Path) -> Result<ProjectConfig, String> {
        let content = std::fs::read_to_string(toml_path)
            .map_err(|e| format!("cannot read '{}': {}", toml_path.display(), e))?;
        Self::parse(&content).map_err(|e| format!("{}: {}", toml_path.display(), e))
    }

    /// Section-aware minimal TOML parsing; only string values are accepted.
    pub fn parse(content: &str) -> Result<ProjectConfig, String> {
        let mut config = ProjectConfig::default();
        let mut current_section = String::new();

        for (index, line) in content.lines().enumerate() {
            let lineno = index + 1;
            let trimmed = line.trim();
            if trimmed.starts_with('#') || trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                current_section = trimmed[1..trimmed.len() - 1].trim().to_string();
                continue;
            }
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(format!("line {}: expected `key = \"value\"`", lineno));
            };
            if current_section != "generate" {
                continue;
            }
            let key = key.trim().trim_matches('"');
            let value = parse_string(value.trim())
                .ok_or_else(|| format!("line {}: value of '{}' must be a quoted string", lineno, key))?;
            match key {
                "runtime_path" => config.runtime_path = Some(value),
                "launcher_prefix" => config.launcher_prefix = Some(value),
                "ir_extension" => config.ir_extension = Some(value),
                "output_extension" => config.output_extension = Some(value),
                other => return Err(format!("line {}: unknown key '{}' in [generate]", lineno, other)),
            }
        }

        Ok(config)
    }

    /// Try to find a cuda2rs.toml in the given directory or its ancestors.
    pub fn find(start_dir: &Path) -> Option<PathBuf> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.exists() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }
}

/// `"value"` (with an optional trailing `# comment`) → `value`.
fn parse_string(raw: &str) -> Option<String> {
    let rest = raw.strip_prefix('"')?;
    let end = rest.find('"')?;
    let tail = rest[end + 1..].trim();
    if !tail.is_empty() && !tail.starts_with('#') {
        return None;
    }
    Some(rest[..end].to_string())
}
