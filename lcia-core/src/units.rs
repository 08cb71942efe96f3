//! Unit resolution against openLCA reference data.
//!
//! Maps a unit symbol from the input table to the flow property it measures
//! and to the unit itself, both as references into the openLCA reference
//! data set. Unknown symbols resolve to `None`; callers decide how loud to be
//! about it.

use crate::error::{LciaError, Result};
use crate::ids::make_uuid;
use crate::schema::Ref;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// One known unit and the flow property it belongs to.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UnitEntry {
    /// Unit symbol as it appears in the input table.
    pub name: String,
    /// Flow property name, e.g. "Mass".
    pub property: String,
    pub property_id: String,
    pub unit_id: String,
}

/// Reference unit groups of the openLCA reference data: flow property name,
/// flow property id, and the (symbol, unit id) pairs of the group.
///
/// Units listed without an id get a name-based id from [`make_uuid`]; a
/// `[[unit]]` entry with the same symbol replaces the built-in one and pins
/// its id.
const REFERENCE_UNITS: &[(&str, &str, &[(&str, Option<&str>)])] = &[
    (
        "Mass",
        "93a60a56-a3c8-11da-a746-0800200b9a66",
        &[
            ("kg", Some("20aadc24-a391-41cf-b340-3e4529f44bde")),
            ("g", None),
            ("mg", None),
            ("t", None),
            ("kt", None),
            ("lb", None),
        ],
    ),
    (
        "Energy",
        "f6811440-ee37-11de-8a39-0800200c9a66",
        &[
            ("MJ", Some("52765a6c-3896-43c2-b2f4-c679acf13efe")),
            ("kJ", None),
            ("GJ", None),
            ("kWh", Some("86ad2244-1f0e-4912-af53-7865283103e4")),
            ("MWh", None),
            ("Wh", None),
        ],
    ),
    (
        "Volume",
        "93a60a56-a3c8-22da-a746-0800200c9a66",
        &[
            ("m3", Some("1c3a9695-398d-4b1f-b07e-a8715b610f70")),
            ("l", None),
            ("dm3", None),
        ],
    ),
    (
        "Area",
        "93a60a57-a4c8-11da-a746-0800200b9a66",
        &[
            ("m2", Some("3ce61faa-5716-41c1-aef6-b5920054acc9")),
            ("ha", None),
            ("km2", None),
        ],
    ),
    (
        "Area*time",
        "93a60a56-a3c8-21da-a746-0800200b9a66",
        &[
            ("m2*a", Some("c7266b67-4ea2-457f-b391-9b89ba29e9b8")),
            ("m2a", Some("c7266b67-4ea2-457f-b391-9b89ba29e9b8")),
            ("ha*a", None),
        ],
    ),
    (
        "Volume*time",
        "93a60a56-a3c8-23da-a746-0800200c9a66",
        &[
            ("m3*a", None),
            ("m3a", None),
        ],
    ),
    (
        "Radioactivity",
        "93a60a56-a3c8-17da-a746-0800200c9a66",
        &[
            ("kBq", None),
            ("Bq", None),
        ],
    ),
    (
        "Length",
        "838aaa23-0117-11db-92e3-0800200c9a66",
        &[
            ("m", None),
            ("km", None),
        ],
    ),
    (
        "Number of items",
        "01846770-4cfe-4a25-8ad9-919d8d378345",
        &[("Item(s)", Some("5beb6eed-33a9-47b8-9ede-1dfe8f679159"))],
    ),
];

#[derive(Debug, Deserialize)]
struct UnitFile {
    #[serde(default)]
    unit: Vec<UnitEntry>,
}

/// Lookup table from unit symbol to property/unit references.
#[derive(Clone, Debug)]
pub struct UnitRegistry {
    units: HashMap<String, UnitEntry>,
}

impl Default for UnitRegistry {
    fn default() -> Self {
        let mut units = HashMap::new();
        for (property, property_id, group) in REFERENCE_UNITS {
            for (name, unit_id) in group.iter() {
                units.insert(
                    name.to_string(),
                    UnitEntry {
                        name: name.to_string(),
                        property: property.to_string(),
                        property_id: property_id.to_string(),
                        unit_id: unit_id
                            .map(str::to_string)
                            .unwrap_or_else(|| make_uuid(&["unit", *property, *name])),
                    },
                );
            }
        }
        Self { units }
    }
}

impl UnitRegistry {
    /// Registry with the built-in reference units only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a unit. Later registrations win.
    pub fn register(&mut self, entry: UnitEntry) {
        self.units.insert(entry.name.trim().to_string(), entry);
    }

    /// Extend the registry with `[[unit]]` tables from a TOML document.
    pub fn extend_from_toml(&mut self, content: &str, origin: &str) -> Result<usize> {
        let file: UnitFile = toml::from_str(content).map_err(|e| LciaError::Config {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        let count = file.unit.len();
        for entry in file.unit {
            self.register(entry);
        }
        Ok(count)
    }

    /// Extend the registry from a TOML file on disk.
    pub fn extend_from_path(&mut self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)?;
        self.extend_from_toml(&content, &path.display().to_string())
    }

    pub fn get(&self, unit: &str) -> Option<&UnitEntry> {
        self.units.get(unit.trim())
    }

    /// Reference to the flow property measured by `unit`.
    pub fn property_ref(&self, unit: &str) -> Option<Ref> {
        self.get(unit)
            .map(|e| Ref::new("FlowProperty", &e.property_id, &e.property))
    }

    /// Reference to the unit itself.
    pub fn unit_ref(&self, unit: &str) -> Option<Ref> {
        self.get(unit).map(|e| Ref::new("Unit", &e.unit_id, &e.name))
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
