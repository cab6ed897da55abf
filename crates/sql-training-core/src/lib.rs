//! Domain vocabulary for the SQL training harness: datasets and their numbered
//! stages, table names, schema DDL, the lesson catalog, query builders and the
//! CSV record types the loader produces.

pub mod dataset;
pub mod insert;
pub mod lessons;
pub mod query;
pub mod records;
pub mod schema;
pub mod select;
pub mod tables;

pub use dataset::{Dataset, Stage, StageKind, EMPTY_STAGE};
pub use lessons::{find_lesson, lessons_at, lessons_for, Lesson, LESSONS};
pub use query::{validate_identifier, Query, SqlValue};
pub use records::{Movie, MovieRelation, Rating, TableRow};

#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
pub enum TrainingError {
    #[error("invalid SQL identifier: {0:?}")]
    InvalidIdentifier(String),
    #[error("unknown dataset: {0}")]
    UnknownDataset(String),
    #[error("dataset {dataset} has no stage {stage:02}")]
    UnknownStage { dataset: String, stage: u8 },
    #[error("unknown lesson: {0}")]
    UnknownLesson(String),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("insert requires at least one row and one column")]
    EmptyInsert,
    #[error("insert into {table} binds {parameters} values, more than SQLite allows")]
    TooManyParameters { table: String, parameters: usize },
}
