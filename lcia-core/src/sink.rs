//! Entity sinks - where a writer session persists its entities.
//!
//! A sink is acquired when a session starts and is owned by the writer until
//! the session ends. [`ZipSink`] produces an openLCA JSON-LD package;
//! [`MemorySink`] keeps entities in memory for dry runs and tests.

use crate::error::Result;
use crate::schema::Entity;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Schema version marker written at the root of every package.
pub const SCHEMA_VERSION: u32 = 2;
const SCHEMA_META_FILE: &str = "olca-schema.json";

/// Destination for the entities of one writer session.
pub trait EntitySink {
    /// Persist one entity. Entities may be buffered until [`close`](Self::close).
    fn write_entity(&mut self, entity: Entity) -> Result<()>;

    /// Flush and release the sink.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Writes entities into a zip package, one JSON document per entity.
///
/// The archive is finalized by [`close`](EntitySink::close); if the sink is
/// dropped on an error path, the underlying `ZipWriter` finalizes on drop and
/// the file handle is released.
pub struct ZipSink {
    zip: ZipWriter<File>,
    path: PathBuf,
    options: SimpleFileOptions,
}

impl ZipSink {
    /// Create (or truncate) the package at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("create JSON-LD writer on {}", path.display());
        let file = File::create(path)?;
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut sink = Self {
            zip: ZipWriter::new(file),
            path: path.to_path_buf(),
            options,
        };

        let meta = serde_json::json!({ "version": SCHEMA_VERSION });
        sink.zip.start_file(SCHEMA_META_FILE, sink.options)?;
        sink.zip.write_all(&serde_json::to_vec(&meta)?)?;
        Ok(sink)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EntitySink for ZipSink {
    fn write_entity(&mut self, entity: Entity) -> Result<()> {
        let json = entity.to_json()?;
        self.zip.start_file(entity.path(), self.options)?;
        self.zip.write_all(&json)?;
        Ok(())
    }

    fn close(self) -> Result<()> {
        self.zip.finish()?;
        Ok(())
    }
}

/// Keeps written entities in write order.
#[derive(Debug, Default)]
pub struct MemorySink {
    entities: Vec<Entity>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }
}

impl EntitySink for MemorySink {
    fn write_entity(&mut self, entity: Entity) -> Result<()> {
        self.entities.push(entity);
        Ok(())
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}

/// Sinks borrowed mutably can be handed to a writer while the caller keeps
/// ownership; closing the borrow is a no-op.
impl<S: EntitySink> EntitySink for &mut S {
    fn write_entity(&mut self, entity: Entity) -> Result<()> {
        (**self).write_entity(entity)
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}
