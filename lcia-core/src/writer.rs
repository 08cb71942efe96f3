//! Row-to-graph mapping of characterization factors.
//!
//! A [`Writer`] is one session: it owns its sink, resolves every table row
//! into deduplicated method, indicator and flow entities, attaches one impact
//! factor per row, and finally persists everything to the sink.
//!
//! # Identity
//!
//! | Entity    | Explicit key column | Derived key                      |
//! |-----------|---------------------|----------------------------------|
//! | Method    | `Method UUID`       | `make_uuid(Method)`              |
//! | Indicator | `Indicator UUID`    | `make_uuid(Method, Indicator)`   |
//! | Flow      | `Flow UUID`         | `make_uuid(Flowable, Context, Unit)` |
//! | Source    | -                   | `make_uuid(bib key)`             |
//!
//! The first row that produces a key creates the entity; later rows with the
//! same key reuse it unchanged.

use crate::bibtex::generate_sources;
use crate::error::Result;
use crate::ids::{is_non_empty_str, make_uuid};
use crate::methods::MethodCatalog;
use crate::schema::{
    Direction, Entity, Flow, FlowPropertyFactor, FlowType, ImpactCategory, ImpactFactor,
    ImpactMethod, RootEntity, Source, Stamp,
};
use crate::sink::{EntitySink, ZipSink};
use crate::table::{self, Row, Table};
use crate::units::UnitRegistry;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Collaborators and settings shared by every entity of a session.
#[derive(Clone, Debug)]
pub struct WriterContext {
    /// Package version and timestamp stamped onto each entity.
    pub stamp: Stamp,
    pub catalog: MethodCatalog,
    pub units: UnitRegistry,
    /// BibTeX file sources are generated from. Without one, no sources are written.
    pub bib_path: Option<PathBuf>,
}

impl WriterContext {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            stamp: Stamp::now(version),
            catalog: MethodCatalog::new(),
            units: UnitRegistry::new(),
            bib_path: None,
        }
    }

    pub fn with_catalog(mut self, catalog: MethodCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_units(mut self, units: UnitRegistry) -> Self {
        self.units = units;
        self
    }

    pub fn with_bibliography(mut self, path: impl Into<PathBuf>) -> Self {
        self.bib_path = Some(path.into());
        self
    }

    pub fn with_stamp(mut self, stamp: Stamp) -> Self {
        self.stamp = stamp;
        self
    }
}

/// Counts of what a session produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub rows: usize,
    pub methods: usize,
    pub indicators: usize,
    pub sources: usize,
    pub flows: usize,
    /// Flows written to the sink; zero unless flows were requested.
    pub flows_written: usize,
    pub factors: usize,
    /// Factors whose unit could not be resolved to a flow property.
    pub unresolved_units: usize,
}

/// Builds the entity graph for one session and persists it to `S`.
pub struct Writer<S: EntitySink> {
    sink: S,
    context: WriterContext,
    methods: IndexMap<String, ImpactMethod>,
    indicators: IndexMap<String, ImpactCategory>,
    flows: IndexMap<String, Flow>,
    sources: IndexMap<String, Source>,
    /// Bibliography key -> method name.
    bib_ids: IndexMap<String, String>,
    summary: WriteSummary,
}

impl<S: EntitySink> Writer<S> {
    pub fn new(sink: S, context: WriterContext) -> Self {
        Self {
            sink,
            context,
            methods: IndexMap::new(),
            indicators: IndexMap::new(),
            flows: IndexMap::new(),
            sources: IndexMap::new(),
            bib_ids: IndexMap::new(),
            summary: WriteSummary::default(),
        }
    }

    /// Convert `table` and persist the result, closing the sink.
    ///
    /// Methods, indicators and sources are always written; flows only when
    /// `write_flows` is set. Any error aborts the session; the sink is
    /// released either way.
    pub fn write(mut self, table: &Table, write_flows: bool) -> Result<WriteSummary> {
        self.build(table)?;
        self.flush(write_flows)?;
        let Writer { sink, summary, .. } = self;
        sink.close()?;
        Ok(summary)
    }

    /// Resolve all rows of `table` into the session caches.
    pub fn build(&mut self, table: &Table) -> Result<()> {
        table.validate()?;
        self.load_sources(table)?;

        for row in table.rows() {
            let indicator_id = self.resolve_indicator(&row)?;
            let flow = self.resolve_flow(&row)?.to_ref();

            let unit = row.get(table::UNIT)?;
            let flow_property = self.context.units.property_ref(unit);
            let unit_ref = self.context.units.unit_ref(unit);
            if flow_property.is_none() {
                self.summary.unresolved_units += 1;
            }
            let factor = ImpactFactor::new(
                flow,
                flow_property,
                unit_ref,
                row.value(table::CHARACTERIZATION_FACTOR)?,
            );

            if let Some(indicator) = self.indicators.get_mut(&indicator_id) {
                indicator.impact_factors.push(factor);
                self.summary.factors += 1;
            }
            self.summary.rows += 1;
        }
        Ok(())
    }

    /// Generate sources for the bibliography keys of the methods in `table`.
    fn load_sources(&mut self, table: &Table) -> Result<()> {
        for method in table.unique(table::METHOD)? {
            match self.context.catalog.bib_id(&method) {
                Some(bib) => {
                    self.bib_ids.insert(bib.to_string(), method);
                }
                None => debug!("no bibliography reference for method {}", method),
            }
        }
        if self.bib_ids.is_empty() {
            return Ok(());
        }

        let Some(path) = self.context.bib_path.as_deref() else {
            warn!(
                "{} bibliography reference(s) found but no bibliography file is configured",
                self.bib_ids.len()
            );
            return Ok(());
        };
        let sources: Vec<Source> =
            generate_sources(path, &self.bib_ids, &self.context.stamp)?.collect();
        for source in sources {
            self.sources.insert(source.id.clone(), source);
        }
        Ok(())
    }

    /// Look up or create the indicator of `row`; returns its id.
    ///
    /// A new indicator is registered on its method exactly once.
    pub fn resolve_indicator(&mut self, row: &Row<'_>) -> Result<String> {
        let method = row.get(table::METHOD)?;
        let name = row.get(table::INDICATOR)?;
        let explicit = row.get(table::INDICATOR_UUID)?;
        let uid = if is_non_empty_str(explicit) {
            explicit.trim().to_string()
        } else {
            make_uuid(&[method, name])
        };
        if self.indicators.contains_key(&uid) {
            return Ok(uid);
        }

        info!("writing {} indicator ...", name);
        let stamp = &self.context.stamp;
        let indicator = ImpactCategory {
            model_type: ImpactCategory::MODEL_TYPE.to_string(),
            id: uid.clone(),
            name: name.to_string(),
            description: self
                .context
                .catalog
                .describe(method, Some(name), &stamp.version),
            version: stamp.version.clone(),
            last_change: stamp.last_change.clone(),
            category: method.to_string(),
            ref_unit: row.get(table::INDICATOR_UNIT)?.to_string(),
            direction: Direction::from_context(row.get(table::CONTEXT)?),
            source: self.source_by_name(method).map(|s| s.to_ref()),
            impact_factors: Vec::new(),
        };
        let indicator_ref = indicator.to_ref();
        self.indicators.insert(uid.clone(), indicator);

        let method_id = self.resolve_method(row)?;
        if let Some(m) = self.methods.get_mut(&method_id) {
            m.impact_categories.push(indicator_ref);
        }
        Ok(uid)
    }

    /// Look up or create the method of `row`; returns its id.
    pub fn resolve_method(&mut self, row: &Row<'_>) -> Result<String> {
        let name = row.get(table::METHOD)?;
        let explicit = row.get(table::METHOD_UUID)?;
        let uid = if is_non_empty_str(explicit) {
            explicit.trim().to_string()
        } else {
            make_uuid(&[name])
        };
        if self.methods.contains_key(&uid) {
            return Ok(uid);
        }

        info!("writing {} method ...", name);
        let stamp = &self.context.stamp;
        let method = ImpactMethod {
            model_type: ImpactMethod::MODEL_TYPE.to_string(),
            id: uid.clone(),
            name: name.to_string(),
            description: self.context.catalog.describe(name, None, &stamp.version),
            version: stamp.version.clone(),
            last_change: stamp.last_change.clone(),
            category: None,
            impact_categories: Vec::new(),
        };
        self.methods.insert(uid.clone(), method);
        Ok(uid)
    }

    /// Look up or create the flow of `row`.
    ///
    /// Flow properties are set once, when the flow is created. An unknown
    /// unit leaves the flow without properties and is logged as an error.
    pub fn resolve_flow(&mut self, row: &Row<'_>) -> Result<&Flow> {
        let flowable = row.get(table::FLOWABLE)?;
        let context = row.get(table::CONTEXT)?;
        let unit = row.get(table::UNIT)?;
        let explicit = row.get(table::FLOW_UUID)?;
        let uid = if is_non_empty_str(explicit) {
            explicit.trim().to_string()
        } else {
            make_uuid(&[flowable, context, unit])
        };

        if !self.flows.contains_key(&uid) {
            let flow_properties = match self.context.units.property_ref(unit) {
                Some(prop) => vec![FlowPropertyFactor::reference(prop)],
                None => {
                    error!("could not infer flow property for unit {}", unit);
                    Vec::new()
                }
            };
            let cas = row.get(table::CAS_NO)?;
            let stamp = &self.context.stamp;
            let flow = Flow {
                model_type: Flow::MODEL_TYPE.to_string(),
                id: uid.clone(),
                name: flowable.to_string(),
                category: format!("Elementary flows/{}", context),
                cas: is_non_empty_str(cas).then(|| cas.trim().to_string()),
                flow_type: FlowType::ElementaryFlow,
                version: stamp.version.clone(),
                last_change: stamp.last_change.clone(),
                flow_properties,
            };
            self.flows.insert(uid.clone(), flow);
        }
        Ok(&self.flows[&uid])
    }

    /// The generated source whose name is exactly `name`, if any.
    pub fn source_by_name(&self, name: &str) -> Option<&Source> {
        self.sources.values().find(|s| s.name == name)
    }

    /// Persist all cached entities: indicators, methods, sources, then flows
    /// if requested. Each category keeps first-encountered order.
    ///
    /// Entities are moved into the sink, so the caches are empty afterwards;
    /// flushing ends the session.
    pub fn flush(&mut self, write_flows: bool) -> Result<()> {
        debug!("write entities");
        self.summary.methods = self.methods.len();
        self.summary.indicators = self.indicators.len();
        self.summary.sources = self.sources.len();
        self.summary.flows = self.flows.len();
        self.summary.flows_written = if write_flows { self.flows.len() } else { 0 };

        for (_, indicator) in std::mem::take(&mut self.indicators) {
            self.sink.write_entity(Entity::Indicator(indicator))?;
        }
        for (_, method) in std::mem::take(&mut self.methods) {
            self.sink.write_entity(Entity::Method(method))?;
        }
        for (_, source) in std::mem::take(&mut self.sources) {
            self.sink.write_entity(Entity::Source(source))?;
        }
        let flows = std::mem::take(&mut self.flows);
        if write_flows {
            for (_, flow) in flows {
                self.sink.write_entity(Entity::Flow(flow))?;
            }
        }
        Ok(())
    }

    pub fn methods(&self) -> impl Iterator<Item = &ImpactMethod> {
        self.methods.values()
    }

    pub fn indicators(&self) -> impl Iterator<Item = &ImpactCategory> {
        self.indicators.values()
    }

    pub fn flows(&self) -> impl Iterator<Item = &Flow> {
        self.flows.values()
    }

    pub fn sources(&self) -> impl Iterator<Item = &Source> {
        self.sources.values()
    }

    pub fn indicator(&self, id: &str) -> Option<&ImpactCategory> {
        self.indicators.get(id)
    }

    pub fn method(&self, id: &str) -> Option<&ImpactMethod> {
        self.methods.get(id)
    }

    pub fn flow(&self, id: &str) -> Option<&Flow> {
        self.flows.get(id)
    }

    pub fn summary(&self) -> &WriteSummary {
        &self.summary
    }
}

/// Convert `table` into a JSON-LD package at `path`.
pub fn to_jsonld(
    table: &Table,
    path: impl AsRef<Path>,
    context: WriterContext,
    write_flows: bool,
) -> Result<WriteSummary> {
    let sink = ZipSink::create(path)?;
    Writer::new(sink, context).write(table, write_flows)
}
