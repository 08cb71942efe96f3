//! Method metadata and generated descriptions.
//!
//! The catalog is a TOML document with one `[[method]]` table per supported
//! LCIA method:
//!
//! ```toml
//! [[method]]
//! name = "TRACI 2.1"
//! bib_id = "bare_traci_2012"
//! detail_note = "Characterization factors from the US EPA TRACI 2.1 tool."
//! url = "https://www.epa.gov/chemical-research/tool-reduction-and-assessment-chemicals-and-other-environmental-impacts-traci"
//!
//! [method.indicators]
//! "Global warming" = "100-year global warming potentials."
//! ```
//!
//! Methods missing from the catalog are still converted; they just have no
//! bibliography reference and a generic description.

use crate::error::{LciaError, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// Metadata for one LCIA method.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MethodMeta {
    pub name: String,
    #[serde(default)]
    pub bib_id: Option<String>,
    #[serde(default)]
    pub detail_note: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Indicator name -> indicator-specific note.
    #[serde(default)]
    pub indicators: IndexMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    method: Vec<MethodMeta>,
}

/// All known methods, keyed by exact method name.
#[derive(Clone, Debug, Default)]
pub struct MethodCatalog {
    methods: IndexMap<String, MethodMeta>,
}

impl MethodCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml(content: &str, origin: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content).map_err(|e| LciaError::Config {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        let mut catalog = Self::new();
        for meta in file.method {
            catalog.insert(meta);
        }
        Ok(catalog)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content, &path.display().to_string())
    }

    pub fn insert(&mut self, meta: MethodMeta) {
        self.methods.insert(meta.name.clone(), meta);
    }

    pub fn metadata(&self, name: &str) -> Option<&MethodMeta> {
        self.methods.get(name)
    }

    /// Bibliography key of a method, if the catalog knows one.
    pub fn bib_id(&self, name: &str) -> Option<&str> {
        let id = self.metadata(name)?.bib_id.as_deref()?;
        if id.trim().is_empty() {
            None
        } else {
            Some(id)
        }
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Human-readable description of a method, or of one of its indicators.
    pub fn describe(&self, method: &str, indicator: Option<&str>, version: &str) -> String {
        let meta = self.metadata(method);
        let mut parts = vec![format!(
            "{} characterization factors converted by the LCIA Formatter (v{}).",
            method, version
        )];

        if let Some(note) = meta.and_then(|m| m.detail_note.as_deref()) {
            parts.push(note.trim().to_string());
        }

        if let Some(indicator) = indicator {
            match meta.and_then(|m| m.indicators.get(indicator)) {
                Some(note) => parts.push(note.trim().to_string()),
                None => parts.push(format!(
                    "Characterization factors for the {} indicator.",
                    indicator
                )),
            }
        }

        if let Some(url) = meta.and_then(|m| m.url.as_deref()) {
            parts.push(format!("Source data: {}", url));
        }

        parts.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
[[method]]
name = "TRACI 2.1"
bib_id = "bare_traci_2012"
detail_note = "Factors from the TRACI 2.1 tool."
url = "https://example.org/traci"

[method.indicators]
"Global warming" = "100-year global warming potentials."

[[method]]
name = "ImpactWorld+"
bib_id = ""
"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = MethodCatalog::from_toml(CATALOG, "methods.toml").unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.bib_id("TRACI 2.1"), Some("bare_traci_2012"));
        // Blank keys count as absent
        assert_eq!(catalog.bib_id("ImpactWorld+"), None);
        assert_eq!(catalog.bib_id("Unknown"), None);
    }

    #[test]
    fn test_describe_method() {
        let catalog = MethodCatalog::from_toml(CATALOG, "methods.toml").unwrap();
        let desc = catalog.describe("TRACI 2.1", None, "1.1.0");
        assert!(desc.starts_with("TRACI 2.1 characterization factors"));
        assert!(desc.contains("v1.1.0"));
        assert!(desc.contains("Factors from the TRACI 2.1 tool."));
        assert!(desc.contains("https://example.org/traci"));
        assert!(!desc.contains("indicator"));
    }

    #[test]
    fn test_describe_indicator() {
        let catalog = MethodCatalog::from_toml(CATALOG, "methods.toml").unwrap();
        let known = catalog.describe("TRACI 2.1", Some("Global warming"), "1.1.0");
        assert!(known.contains("100-year global warming potentials."));

        let unknown = catalog.describe("TRACI 2.1", Some("Smog formation"), "1.1.0");
        assert!(unknown.contains("Characterization factors for the Smog formation indicator."));
    }

    #[test]
    fn test_describe_unknown_method() {
        let catalog = MethodCatalog::new();
        let desc = catalog.describe("Custom", Some("X"), "0.1.0");
        assert!(desc.contains("Custom characterization factors"));
        assert!(desc.contains("the X indicator"));
    }

    #[test]
    fn test_invalid_catalog() {
        let err = MethodCatalog::from_toml("[[method]]\nbib_id = 1", "broken.toml").unwrap_err();
        assert!(matches!(err, LciaError::Config { .. }));
    }
}
