//! Data models for the linked impact-assessment package.
//!
//! These types mirror the openLCA JSON-LD schema (version 2): every root
//! entity carries an `@type` and `@id`, field names are camelCase, and
//! entities point at each other through [`Ref`] values rather than nesting.

use serde::{Deserialize, Serialize};

/// Version and modification time stamped onto every entity of a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stamp {
    pub version: String,
    pub last_change: String,
}

impl Stamp {
    pub fn new(version: impl Into<String>, last_change: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            last_change: last_change.into(),
        }
    }

    /// Stamp with the current UTC time in RFC 3339 format.
    pub fn now(version: impl Into<String>) -> Self {
        Self::new(
            version,
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        )
    }
}

/// Reference to another root entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ref {
    #[serde(rename = "@type")]
    pub model_type: String,
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_unit: Option<String>,
}

impl Ref {
    pub fn new(model_type: &str, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            model_type: model_type.to_string(),
            id: id.into(),
            name: name.into(),
            category: None,
            ref_unit: None,
        }
    }
}

/// Direction of the flows characterized by an impact category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    /// Resource draws are inputs from nature; everything else is an emission.
    pub fn from_context(context: &str) -> Self {
        if context.starts_with("resource") {
            Direction::Input
        } else {
            Direction::Output
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowType {
    ElementaryFlow,
    ProductFlow,
    WasteFlow,
}

/// A characterization factor of one flow within an impact category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactFactor {
    #[serde(rename = "@type")]
    pub model_type: String,
    pub flow: Ref,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_property: Option<Ref>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Ref>,
    pub value: f64,
}

impl ImpactFactor {
    pub fn new(flow: Ref, flow_property: Option<Ref>, unit: Option<Ref>, value: f64) -> Self {
        Self {
            model_type: "ImpactFactor".to_string(),
            flow,
            flow_property,
            unit,
            value,
        }
    }
}

/// An LCIA method grouping impact categories.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactMethod {
    #[serde(rename = "@type")]
    pub model_type: String,
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub last_change: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub impact_categories: Vec<Ref>,
}

/// An impact category (indicator) with its characterization factors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactCategory {
    #[serde(rename = "@type")]
    pub model_type: String,
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub last_change: String,
    pub category: String,
    pub ref_unit: String,
    pub direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Ref>,
    pub impact_factors: Vec<ImpactFactor>,
}

/// Conversion of a flow into one of its flow properties.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowPropertyFactor {
    #[serde(rename = "@type")]
    pub model_type: String,
    pub flow_property: Ref,
    pub conversion_factor: f64,
    pub is_ref_flow_property: bool,
}

impl FlowPropertyFactor {
    /// The single reference property of a flow, converted 1:1.
    pub fn reference(flow_property: Ref) -> Self {
        Self {
            model_type: "FlowPropertyFactor".to_string(),
            flow_property,
            conversion_factor: 1.0,
            is_ref_flow_property: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    #[serde(rename = "@type")]
    pub model_type: String,
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cas: Option<String>,
    pub flow_type: FlowType,
    pub version: String,
    pub last_change: String,
    pub flow_properties: Vec<FlowPropertyFactor>,
}

/// A bibliographic source backing a method's provenance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(rename = "@type")]
    pub model_type: String,
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub version: String,
    pub last_change: String,
}

/// Common behaviour of entities that are stored as their own document.
pub trait RootEntity: Serialize {
    const MODEL_TYPE: &'static str;
    /// Folder of the package that holds documents of this type.
    const FOLDER: &'static str;

    fn id(&self) -> &str;
    fn name(&self) -> &str;

    fn category(&self) -> Option<&str> {
        None
    }

    fn to_ref(&self) -> Ref {
        let mut r = Ref::new(Self::MODEL_TYPE, self.id(), self.name());
        r.category = self.category().map(str::to_string);
        r
    }
}

impl RootEntity for ImpactMethod {
    const MODEL_TYPE: &'static str = "ImpactMethod";
    const FOLDER: &'static str = "lcia_methods";

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

impl RootEntity for ImpactCategory {
    const MODEL_TYPE: &'static str = "ImpactCategory";
    const FOLDER: &'static str = "lcia_categories";

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }

    fn to_ref(&self) -> Ref {
        let mut r = Ref::new(Self::MODEL_TYPE, &self.id, &self.name);
        r.category = Some(self.category.clone());
        r.ref_unit = Some(self.ref_unit.clone());
        r
    }
}

impl RootEntity for Flow {
    const MODEL_TYPE: &'static str = "Flow";
    const FOLDER: &'static str = "flows";

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }
}

impl RootEntity for Source {
    const MODEL_TYPE: &'static str = "Source";
    const FOLDER: &'static str = "sources";

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Any root entity, as handed to a sink.
#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    Method(ImpactMethod),
    Indicator(ImpactCategory),
    Flow(Flow),
    Source(Source),
}

impl Entity {
    pub fn id(&self) -> &str {
        match self {
            Entity::Method(m) => &m.id,
            Entity::Indicator(i) => &i.id,
            Entity::Flow(f) => &f.id,
            Entity::Source(s) => &s.id,
        }
    }

    pub fn model_type(&self) -> &'static str {
        match self {
            Entity::Method(_) => ImpactMethod::MODEL_TYPE,
            Entity::Indicator(_) => ImpactCategory::MODEL_TYPE,
            Entity::Flow(_) => Flow::MODEL_TYPE,
            Entity::Source(_) => Source::MODEL_TYPE,
        }
    }

    pub fn folder(&self) -> &'static str {
        match self {
            Entity::Method(_) => ImpactMethod::FOLDER,
            Entity::Indicator(_) => ImpactCategory::FOLDER,
            Entity::Flow(_) => Flow::FOLDER,
            Entity::Source(_) => Source::FOLDER,
        }
    }

    /// Path of the entity's document inside a package.
    pub fn path(&self) -> String {
        format!("{}/{}.json", self.folder(), self.id())
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            Entity::Method(m) => serde_json::to_vec_pretty(m),
            Entity::Indicator(i) => serde_json::to_vec_pretty(i),
            Entity::Flow(f) => serde_json::to_vec_pretty(f),
            Entity::Source(s) => serde_json::to_vec_pretty(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_now_is_rfc3339() {
        let stamp = Stamp::now("1.1.0");
        assert_eq!(stamp.version, "1.1.0");
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp.last_change).is_ok());
    }

    #[test]
    fn test_direction_from_context() {
        assert_eq!(
            Direction::from_context("resource/ground water"),
            Direction::Input
        );
        assert_eq!(Direction::from_context("resource"), Direction::Input);
        assert_eq!(Direction::from_context("air"), Direction::Output);
        assert_eq!(Direction::from_context("air/resource"), Direction::Output);
        assert_eq!(Direction::from_context(""), Direction::Output);
    }

    #[test]
    fn test_direction_serializes_upper_case() {
        let json = serde_json::to_string(&Direction::Input).unwrap();
        assert_eq!(json, "\"INPUT\"");
        let json = serde_json::to_string(&FlowType::ElementaryFlow).unwrap();
        assert_eq!(json, "\"ELEMENTARY_FLOW\"");
    }

    #[test]
    fn test_indicator_ref_carries_unit() {
        let ind = ImpactCategory {
            model_type: "ImpactCategory".to_string(),
            id: "abc".to_string(),
            name: "Global warming".to_string(),
            description: String::new(),
            version: "1.0.0".to_string(),
            last_change: String::new(),
            category: "TRACI 2.1".to_string(),
            ref_unit: "kg CO2 eq".to_string(),
            direction: Direction::Output,
            source: None,
            impact_factors: vec![],
        };
        let r = ind.to_ref();
        assert_eq!(r.model_type, "ImpactCategory");
        assert_eq!(r.ref_unit.as_deref(), Some("kg CO2 eq"));
        assert_eq!(r.category.as_deref(), Some("TRACI 2.1"));
    }

    #[test]
    fn test_ref_json_field_names() {
        let r = Ref::new("Flow", "f-1", "Carbon dioxide");
        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(value["@type"], "Flow");
        assert_eq!(value["@id"], "f-1");
        assert!(value.get("category").is_none());
    }

    #[test]
    fn test_entity_path() {
        let source = Source {
            model_type: "Source".to_string(),
            id: "s-1".to_string(),
            name: "TRACI 2.1".to_string(),
            description: None,
            text_reference: None,
            year: None,
            url: None,
            version: "1.0.0".to_string(),
            last_change: String::new(),
        };
        let entity = Entity::Source(source);
        assert_eq!(entity.path(), "sources/s-1.json");
        assert_eq!(entity.model_type(), "Source");
    }
}
