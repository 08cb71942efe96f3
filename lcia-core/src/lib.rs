//! LCIA core - converts characterization-factor tables into openLCA packages.
//!
//! The input is a flat table with one characterization factor per row. The
//! writer turns it into a deduplicated graph of impact methods, impact
//! categories (indicators), elementary flows and bibliographic sources,
//! linked by reference, and persists the graph as a JSON-LD zip package.
//!
//! # Usage
//!
//! ```no_run
//! use lcia_core::{to_jsonld, Table, WriterContext};
//!
//! # fn main() -> lcia_core::Result<()> {
//! let table = Table::from_csv_path("traci.csv".as_ref())?;
//! let context = WriterContext::new("1.1.0");
//! let summary = to_jsonld(&table, "traci.zip", context, false)?;
//! println!("{} indicators written", summary.indicators);
//! # Ok(())
//! # }
//! ```

pub mod bibtex;
pub mod error;
pub mod ids;
pub mod methods;
pub mod schema;
pub mod sink;
pub mod table;
pub mod units;
pub mod writer;

pub use error::{LciaError, Result};
pub use methods::MethodCatalog;
pub use sink::{EntitySink, MemorySink, ZipSink};
pub use table::Table;
pub use units::UnitRegistry;
pub use writer::{to_jsonld, WriteSummary, Writer, WriterContext};

/// Version of lcia-core, used as the default package version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
