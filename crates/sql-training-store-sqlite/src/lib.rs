//! `SQLite` storage for the SQL training harness: the database wrapper, CSV
//! loading, stage snapshots with their manifest, the stage pipeline and the
//! foreign key delete probes.

pub mod database;
pub mod integrity;
pub mod loader;
pub mod pipeline;
pub mod stages;

pub use database::{
    ColumnInfo, Database, ForeignKeyInfo, ForeignKeyViolation, IndexInfo, IntegrityReport, Row,
};
pub use integrity::{try_delete, DeleteOutcome};
pub use loader::{CsvLoader, MovieData, ShopifyData};
pub use pipeline::{LessonRun, Pipeline, StageReport};
pub use stages::{file_sha256, StageEntry, StageManifest, StageStore};
