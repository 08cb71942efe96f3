//! Configuration loading from `.lciarc.toml`.
//!
//! Configuration is optional - the converter uses sensible defaults if no
//! config file exists. Relative paths are resolved against the directory the
//! config file lives in.
//!
//! # Example Configuration
//!
//! ```toml
//! [package]
//! version = "1.1.0"
//!
//! [paths]
//! bibliography = "data/lcia.bib"
//! methods = "data/methods.toml"
//! units = "data/units.toml"
//!
//! [output]
//! write_flows = false
//! format = "table"
//! color = true
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".lciarc.toml";

/// Root configuration structure loaded from `.lciarc.toml`.
///
/// All sections are optional and will use defaults if not specified.
#[derive(Debug, Deserialize, Default)]
pub struct LciaConfig {
    /// Package metadata stamped onto every entity.
    #[serde(default)]
    pub package: PackageSection,

    /// Locations of method metadata, bibliography and extra units.
    #[serde(default)]
    pub paths: PathsSection,

    /// Output preferences.
    #[serde(default)]
    pub output: OutputSettings,

    /// Directory relative paths are resolved against.
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Deserialize, Default)]
pub struct PackageSection {
    /// Version written to each method, indicator, flow and source.
    ///
    /// Default: the version of this tool.
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PathsSection {
    /// BibTeX file that method sources are generated from.
    #[serde(default)]
    pub bibliography: Option<PathBuf>,

    /// TOML catalog of method metadata (`[[method]]` tables).
    #[serde(default)]
    pub methods: Option<PathBuf>,

    /// TOML file with additional units (`[[unit]]` tables).
    #[serde(default)]
    pub units: Option<PathBuf>,
}

/// Output preferences. Command-line flags override these settings.
#[derive(Debug, Deserialize, Default)]
pub struct OutputSettings {
    /// Include flow entities in the package.
    #[serde(default)]
    pub write_flows: bool,

    /// Valid values: `table`, `json`
    #[serde(default)]
    pub format: Option<String>,

    /// Defaults to `true` when stdout is a TTY.
    #[serde(default)]
    pub color: Option<bool>,
}

impl LciaConfig {
    /// Load `.lciarc.toml` from the given directory.
    ///
    /// If the config file doesn't exist or can't be parsed, returns defaults.
    /// Parse errors are logged as warnings but don't cause failures.
    pub fn load(root: &Path) -> Self {
        Self::load_file(&root.join(CONFIG_FILE))
    }

    /// Load a specific config file, falling back to defaults.
    pub fn load_file(config_path: &Path) -> Self {
        let base_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match toml::from_str::<LciaConfig>(&content) {
                    Ok(mut config) => {
                        config.base_dir = base_dir;
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", config_path.display(), e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", config_path.display(), e);
                }
            }
        }
        Self {
            base_dir,
            ..Self::default()
        }
    }

    fn resolve(&self, path: &Option<PathBuf>) -> Option<PathBuf> {
        path.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                self.base_dir.join(p)
            }
        })
    }

    /// Package version, or this tool's version if not configured.
    pub fn package_version(&self) -> String {
        self.package
            .version
            .clone()
            .unwrap_or_else(|| lcia_core::version().to_string())
    }

    pub fn bibliography(&self) -> Option<PathBuf> {
        self.resolve(&self.paths.bibliography)
    }

    pub fn methods(&self) -> Option<PathBuf> {
        self.resolve(&self.paths.methods)
    }

    pub fn units(&self) -> Option<PathBuf> {
        self.resolve(&self.paths.units)
    }

    pub fn write_flows(&self) -> bool {
        self.output.write_flows
    }

    /// Get the default output format, if configured.
    pub fn default_format(&self) -> Option<&str> {
        self.output.format.as_deref()
    }

    /// Returns the configured value, or `None` to use auto-detection.
    pub fn use_color(&self) -> Option<bool> {
        self.output.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LciaConfig::default();
        assert!(!config.write_flows());
        assert!(config.bibliography().is_none());
        assert!(config.default_format().is_none());
        assert_eq!(config.package_version(), lcia_core::version());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[package]
version = "1.1.0"

[paths]
bibliography = "data/lcia.bib"
methods = "/etc/lcia/methods.toml"

[output]
write_flows = true
format = "json"
color = false
"#;
        let config: LciaConfig = toml::from_str(toml_content).unwrap();

        assert_eq!(config.package_version(), "1.1.0");
        assert_eq!(config.bibliography(), Some(PathBuf::from("data/lcia.bib")));
        assert_eq!(
            config.methods(),
            Some(PathBuf::from("/etc/lcia/methods.toml"))
        );
        assert!(config.units().is_none());
        assert!(config.write_flows());
        assert_eq!(config.default_format(), Some("json"));
        assert_eq!(config.use_color(), Some(false));
    }

    #[test]
    fn test_relative_paths_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[paths]\nbibliography = \"lcia.bib\"\n",
        )
        .unwrap();

        let config = LciaConfig::load(dir.path());
        assert_eq!(config.bibliography(), Some(dir.path().join("lcia.bib")));
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[output]\nwrite_flows = \"yes\"\n").unwrap();

        let config = LciaConfig::load(dir.path());
        assert!(!config.write_flows());
    }

    #[test]
    fn test_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = LciaConfig::load(dir.path());
        assert!(config.methods().is_none());
    }
}
