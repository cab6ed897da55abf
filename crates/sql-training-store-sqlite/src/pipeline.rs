//! Runs numbered stages. Every stage starts from a copy of the previous
//! stage's snapshot, applies its operation and records itself in the manifest.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use sql_training_core::insert::{
    insert_names, insert_rating, insert_table_rows, link_movie, rows_per_statement,
};
use sql_training_core::records::DEFAULT_CHUNK_SIZE;
use sql_training_core::schema::{
    MOVIES_FLAT_TABLES, MOVIES_INDICES, MOVIES_RELATIONSHIP_TABLES, SHOPIFY_INDICES, SHOPIFY_TABLES,
};
use sql_training_core::{lessons_at, Dataset, MovieRelation, Query, Stage, StageKind, TableRow};
use tracing::{info, warn};

use crate::database::{Database, IntegrityReport, Row};
use crate::loader::CsvLoader;
use crate::stages::{StageEntry, StageStore};

pub struct Pipeline {
    store: StageStore,
    data_dir: PathBuf,
    chunk_size: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LessonRun {
    pub id: &'static str,
    pub title: &'static str,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StageReport {
    pub dataset: Dataset,
    pub stage: u8,
    pub slug: &'static str,
    pub title: &'static str,
    pub snapshot: String,
    pub sha256: String,
    pub rows_written: usize,
    pub table_counts: BTreeMap<String, i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lessons: Vec<LessonRun>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrity: Option<IntegrityReport>,
}

#[derive(Debug, Default)]
struct StageOutput {
    rows_written: usize,
    lessons: Vec<LessonRun>,
    integrity: Option<IntegrityReport>,
}

impl Pipeline {
    /// `data_dir` holds one subdirectory of CSV files per dataset.
    #[must_use]
    pub fn new(store: StageStore, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            data_dir: data_dir.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Rows per multi-row insert statement. Each table lowers it further when
    /// needed to stay under SQLite's bound-parameter ceiling.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    #[must_use]
    pub fn store(&self) -> &StageStore {
        &self.store
    }

    #[must_use]
    pub fn dataset_dir(&self, dataset: Dataset) -> PathBuf {
        self.data_dir.join(dataset.as_str())
    }

    /// Run every stage of `dataset` up to and including `through`.
    ///
    /// # Errors
    /// Returns an error for an unknown stage or the first stage that fails.
    pub fn run_through(&self, dataset: Dataset, through: u8) -> Result<Vec<StageReport>> {
        dataset.stage(through)?;
        dataset
            .stages()
            .iter()
            .take_while(|stage| stage.number <= through)
            .map(|stage| self.run_stage(*stage))
            .collect()
    }

    /// Build the snapshot for one stage from the previous stage's snapshot.
    /// A failed stage leaves no snapshot behind.
    ///
    /// # Errors
    /// Returns an error when the previous snapshot is missing, input cannot be
    /// read, any statement fails, or the integrity stage finds violations.
    pub fn run_stage(&self, stage: Stage) -> Result<StageReport> {
        let previous = stage.dataset.previous_stage(stage.number)?;
        info!(dataset = %stage.dataset, stage = stage.number, slug = stage.slug, "running stage");

        let db = Database::from_existing(&self.store, stage.dataset, previous, stage.number)?;
        let snapshot = self.store.snapshot_path(stage.dataset, stage.number);
        let (output, table_counts, entry) = match self.build(db, stage) {
            Ok(built) => built,
            Err(err) => {
                discard_snapshot(&snapshot);
                return Err(err.context(format!(
                    "{} stage {} ({}) failed",
                    stage.dataset,
                    stage.label(),
                    stage.slug
                )));
            }
        };
        info!(
            dataset = %stage.dataset,
            stage = stage.number,
            rows_written = output.rows_written,
            sha256 = %entry.sha256,
            "stage complete"
        );
        Ok(StageReport {
            dataset: stage.dataset,
            stage: stage.number,
            slug: stage.slug,
            title: stage.title,
            snapshot: snapshot.display().to_string(),
            sha256: entry.sha256,
            rows_written: output.rows_written,
            table_counts,
            lessons: output.lessons,
            integrity: output.integrity,
        })
    }

    /// Apply the stage, close the snapshot and record it in the manifest.
    fn build(
        &self,
        mut db: Database,
        stage: Stage,
    ) -> Result<(StageOutput, BTreeMap<String, i64>, StageEntry)> {
        let output = self.apply(&mut db, stage)?;
        let table_counts = db.table_counts()?;
        drop(db);
        let entry = self.store.record(&stage, table_counts.clone())?;
        Ok((output, table_counts, entry))
    }

    fn apply(&self, db: &mut Database, stage: Stage) -> Result<StageOutput> {
        let dataset = stage.dataset;
        match (dataset, stage.kind) {
            (Dataset::Movies, StageKind::CreateTables) => {
                create_all(db, &MOVIES_FLAT_TABLES, &MOVIES_INDICES)
            }
            (Dataset::Shopify, StageKind::CreateTables) => {
                create_all(db, &SHOPIFY_TABLES, &SHOPIFY_INDICES)
            }
            (Dataset::Movies, StageKind::InsertFlatData) => self.insert_movies(db),
            (Dataset::Shopify, StageKind::InsertFlatData) => self.insert_shopify(db),
            (Dataset::Movies, StageKind::InsertRatings) => self.insert_ratings(db),
            (Dataset::Movies, StageKind::CreateRelationshipTables) => {
                create_all(db, &MOVIES_RELATIONSHIP_TABLES, &[])
            }
            (Dataset::Movies, StageKind::InsertRelationshipData) => self.link_movies(db),
            (_, StageKind::Queries) => run_lessons(db, stage),
            (_, StageKind::Integrity) => check_integrity(db),
            (_, kind) => Err(anyhow!("{dataset} has no {kind:?} stage")),
        }
    }

    fn insert_movies(&self, db: &mut Database) -> Result<StageOutput> {
        let data = CsvLoader::movies(&self.dataset_dir(Dataset::Movies))?;
        let mut queries = Vec::new();
        for relation in MovieRelation::ALL {
            let names = data.names(relation);
            for chunk in names.chunks(rows_per_statement(self.chunk_size, 1)) {
                let query = insert_names(relation.parent_table(), relation.parent_column(), chunk)?;
                queries.push(query);
            }
        }
        queries.extend(self.chunked(&data.movies)?);
        let rows_written = db.insert_batch(&queries)?;
        Ok(StageOutput {
            rows_written,
            ..StageOutput::default()
        })
    }

    fn insert_shopify(&self, db: &mut Database) -> Result<StageOutput> {
        let data = CsvLoader::shopify(&self.dataset_dir(Dataset::Shopify))?;
        // Parents before the tables referencing them.
        let mut queries = self.chunked(&data.apps)?;
        queries.extend(self.chunked(&data.categories)?);
        queries.extend(self.chunked(&data.pricing_plans)?);
        queries.extend(self.chunked(&data.apps_categories)?);
        queries.extend(self.chunked(&data.apps_pricing_plans)?);
        queries.extend(self.chunked(&data.reviews)?);
        queries.extend(self.chunked(&data.key_benefits)?);
        let rows_written = db.insert_batch(&queries)?;
        Ok(StageOutput {
            rows_written,
            ..StageOutput::default()
        })
    }

    fn insert_ratings(&self, db: &mut Database) -> Result<StageOutput> {
        let data = CsvLoader::movies(&self.dataset_dir(Dataset::Movies))?;
        let queries = data.ratings.iter().map(insert_rating).collect::<Vec<_>>();
        let rows_written = db.insert_batch(&queries)?;
        let skipped = data.ratings.len().saturating_sub(rows_written);
        if skipped > 0 {
            warn!(skipped, "ratings reference movies that are not loaded");
        }
        Ok(StageOutput {
            rows_written,
            ..StageOutput::default()
        })
    }

    fn link_movies(&self, db: &mut Database) -> Result<StageOutput> {
        let data = CsvLoader::movies(&self.dataset_dir(Dataset::Movies))?;
        let mut queries = Vec::new();
        for movie in &data.movies {
            for relation in MovieRelation::ALL {
                for name in relation.names(movie) {
                    queries.push(link_movie(relation, &movie.imdb_id, name));
                }
            }
        }
        let rows_written = db.insert_batch(&queries)?;
        Ok(StageOutput {
            rows_written,
            ..StageOutput::default()
        })
    }

    fn chunked<T: TableRow>(&self, rows: &[T]) -> Result<Vec<Query>> {
        rows.chunks(rows_per_statement(self.chunk_size, T::COLUMNS.len()))
            .map(|chunk| {
                insert_table_rows(chunk)
                    .with_context(|| format!("failed to build insert into {}", T::TABLE))
            })
            .collect()
    }
}

fn create_all(db: &Database, tables: &[&str], indices: &[&str]) -> Result<StageOutput> {
    for ddl in tables {
        db.create_table(ddl)?;
    }
    for ddl in indices {
        db.create_index(ddl)?;
    }
    Ok(StageOutput::default())
}

fn run_lessons(db: &Database, stage: Stage) -> Result<StageOutput> {
    let mut lessons = Vec::new();
    for lesson in lessons_at(stage.dataset, stage.number) {
        let rows = db
            .select_multiple_rows(&lesson.query())
            .with_context(|| format!("lesson {} failed", lesson.id))?;
        info!(lesson = lesson.id, rows = rows.len(), "lesson ran");
        lessons.push(LessonRun {
            id: lesson.id,
            title: lesson.title,
            rows,
        });
    }
    Ok(StageOutput {
        lessons,
        ..StageOutput::default()
    })
}

fn check_integrity(db: &Database) -> Result<StageOutput> {
    if !db.foreign_keys_enabled()? {
        bail!("foreign key enforcement is off");
    }
    let report = db.integrity_check()?;
    if !report.quick_check_ok {
        bail!("quick_check failed: {}", report.quick_check_message);
    }
    if let Some(violation) = report.foreign_key_violations.first() {
        bail!(
            "{} foreign key violation(s), first in {} referencing {}",
            report.foreign_key_violations.len(),
            violation.table,
            violation.parent
        );
    }
    Ok(StageOutput {
        integrity: Some(report),
        ..StageOutput::default()
    })
}

fn discard_snapshot(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        warn!(path = %path.display(), error = %err, "failed to remove partial snapshot");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures")
    }

    #[test]
    fn stages_must_run_in_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let pipeline = Pipeline::new(StageStore::new(dir.path()), fixtures());
        let err = pipeline.run_stage(Dataset::Movies.stage(2)?).err();
        assert!(err.is_some_and(|err| err.to_string().contains("movies-01.sqlite3")));
        assert!(!pipeline.store().has_snapshot(Dataset::Movies, 2));
        Ok(())
    }

    #[test]
    fn failed_stage_discards_its_snapshot() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let pipeline = Pipeline::new(StageStore::new(dir.path()), dir.path().join("no-data"));
        pipeline.run_stage(Dataset::Shopify.stage(1)?)?;
        let err = pipeline.run_stage(Dataset::Shopify.stage(2)?).err();
        assert!(err.is_some_and(|err| format!("{err:#}").contains("apps.csv")));
        assert!(!pipeline.store().has_snapshot(Dataset::Shopify, 2));
        assert!(pipeline.store().has_snapshot(Dataset::Shopify, 1));
        Ok(())
    }

    #[test]
    fn small_chunks_insert_the_same_rows() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let pipeline = Pipeline::new(StageStore::new(dir.path()), fixtures()).with_chunk_size(2);
        let reports = pipeline.run_through(Dataset::Shopify, 2)?;
        let counts = &reports[1].table_counts;
        assert_eq!(counts.get("apps"), Some(&6));
        assert_eq!(counts.get("apps_categories"), Some(&11));
        assert_eq!(counts.get("key_benefits"), Some(&4));
        assert_eq!(reports[1].rows_written, 6 + 4 + 11 + 6 + 7 + 11 + 4);
        Ok(())
    }

    #[test]
    fn large_chunks_split_under_the_parameter_ceiling() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let movies_dir = dir.path().join("data").join("movies");
        fs::create_dir_all(&movies_dir)?;
        let mut csv = String::from(
            "id,imdb_id,popularity,budget,revenue,original_title,cast,homepage,director,tagline,\
             keywords,overview,runtime,genres,production_companies,release_date,vote_count,\
             vote_average,release_year,budget_adj,revenue_adj\n",
        );
        for n in 0..3000 {
            csv.push_str(&format!(
                "{n},tt{n:07},1.5,1000,2000,Movie {n},Actor {n},,Director {},,plot,Overview,\
                 90,Drama,Studio,1/2/15,10,6.5,2015,1000.0,2000.0\n",
                n % 40
            ));
        }
        fs::write(movies_dir.join("movies.csv"), csv)?;
        fs::write(
            movies_dir.join("ratings.csv"),
            "userId,imdbId,rating,timestamp\n",
        )?;

        let store = StageStore::new(dir.path().join("stages"));
        let pipeline = Pipeline::new(store, dir.path().join("data")).with_chunk_size(3000);
        let reports = pipeline.run_through(Dataset::Movies, 2)?;
        let counts = &reports[1].table_counts;
        assert_eq!(counts.get("movies"), Some(&3000));
        assert_eq!(counts.get("actors"), Some(&3000));
        assert_eq!(counts.get("directors"), Some(&40));
        Ok(())
    }

    #[test]
    fn stage_that_cannot_be_recorded_leaves_no_snapshot() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = StageStore::new(dir.path());
        fs::create_dir_all(store.manifest_path(Dataset::Shopify))?;
        let pipeline = Pipeline::new(store, fixtures());
        let err = pipeline.run_stage(Dataset::Shopify.stage(1)?).err();
        assert!(err.is_some_and(|err| format!("{err:#}").contains("stage manifest")));
        assert!(!pipeline.store().has_snapshot(Dataset::Shopify, 1));
        Ok(())
    }

    #[test]
    fn rerunning_a_stage_is_repeatable() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let pipeline = Pipeline::new(StageStore::new(dir.path()), fixtures());
        let first = pipeline.run_through(Dataset::Shopify, 2)?;
        let again = pipeline.run_stage(Dataset::Shopify.stage(2)?)?;
        assert_eq!(first[1].table_counts, again.table_counts);
        let manifest = pipeline.store().load_manifest(Dataset::Shopify)?;
        assert_eq!(manifest.entries.len(), 2);
        Ok(())
    }

    #[test]
    fn unknown_stage_is_rejected() {
        let dir = tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let pipeline = Pipeline::new(StageStore::new(dir.path()), fixtures());
        assert!(pipeline.run_through(Dataset::Shopify, 9).is_err());
    }
}
