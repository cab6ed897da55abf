use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, DatabaseName, OpenFlags};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as JsonValue};
use sql_training_core::{select, Dataset, Query, SqlValue, EMPTY_STAGE};
use tracing::debug;

use crate::stages::StageStore;

/// One result row, keyed by result column name in select order.
pub type Row = Map<String, JsonValue>;

pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnInfo {
    pub cid: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub primary_key: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexInfo {
    pub name: String,
    pub unique: bool,
    pub origin: String,
    pub partial: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForeignKeyInfo {
    pub id: i64,
    pub seq: i64,
    pub table: String,
    pub from: String,
    pub to: Option<String>,
    pub on_update: String,
    pub on_delete: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForeignKeyViolation {
    pub table: String,
    pub rowid: Option<i64>,
    pub parent: String,
    pub fk_index: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntegrityReport {
    pub quick_check_ok: bool,
    pub quick_check_message: String,
    pub foreign_key_violations: Vec<ForeignKeyViolation>,
}

impl IntegrityReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.quick_check_ok && self.foreign_key_violations.is_empty()
    }
}

impl Database {
    /// Open (or create) a database file with foreign keys enforced.
    ///
    /// # Errors
    /// Returns an error when the database cannot be opened or pragmas cannot be applied.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create parent directory for {}", path.display())
            })?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open sqlite database at {}", path.display()))?;
        configure(&conn)?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// # Errors
    /// Returns an error when the in-memory database cannot be configured.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        configure(&conn)?;
        Ok(Self { conn, path: None })
    }

    /// Start snapshot `to` as a copy of snapshot `from`. Stage [`EMPTY_STAGE`]
    /// is the empty database, so `from == 0` yields a fresh file.
    ///
    /// # Errors
    /// Returns an error when the source snapshot is missing or the copy fails.
    pub fn from_existing(store: &StageStore, dataset: Dataset, from: u8, to: u8) -> Result<Self> {
        let target = store.snapshot_path(dataset, to);
        store.ensure_root()?;
        if target.exists() {
            fs::remove_file(&target)
                .with_context(|| format!("failed to remove stale snapshot {}", target.display()))?;
        }

        if from == EMPTY_STAGE {
            debug!(dataset = %dataset, to, "starting from an empty database");
            return Self::open(&target);
        }

        let source = store.snapshot_path(dataset, from);
        if !source.exists() {
            return Err(anyhow!(
                "snapshot {} does not exist; run {dataset} stage {from:02} first",
                source.display()
            ));
        }
        debug!(dataset = %dataset, from, to, "copying snapshot");
        Self::open(&source)?.backup_to(&target)?;
        Self::open(&target)
    }

    /// Open an existing snapshot without copying it.
    ///
    /// # Errors
    /// Returns an error when the snapshot has not been produced yet.
    pub fn open_snapshot(store: &StageStore, dataset: Dataset, stage: u8) -> Result<Self> {
        Self::open(&existing_snapshot(store, dataset, stage)?)
    }

    /// Open an existing snapshot through a read-only connection, so no
    /// statement run against it can change the file.
    ///
    /// # Errors
    /// Returns an error when the snapshot has not been produced yet or cannot be opened.
    pub fn open_snapshot_read_only(
        store: &StageStore,
        dataset: Dataset,
        stage: u8,
    ) -> Result<Self> {
        let path = existing_snapshot(store, dataset, stage)?;
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open sqlite database at {}", path.display()))?;
        configure(&conn)?;
        Ok(Self {
            conn,
            path: Some(path),
        })
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run one or more statements without parameters.
    ///
    /// # Errors
    /// Returns an error when any statement fails.
    pub fn execute(&self, sql: &str) -> Result<()> {
        debug!(sql = sql.trim(), "execute");
        self.conn
            .execute_batch(sql)
            .with_context(|| format!("failed to execute: {}", sql.trim()))
    }

    /// # Errors
    /// Returns an error when the DDL fails.
    pub fn create_table(&self, sql: &str) -> Result<()> {
        self.execute(sql).context("failed to create table")
    }

    /// # Errors
    /// Returns an error when the DDL fails.
    pub fn create_index(&self, sql: &str) -> Result<()> {
        self.execute(sql).context("failed to create index")
    }

    /// Run one bound insert and return the number of rows written.
    ///
    /// # Errors
    /// Returns an error when the statement fails, including constraint violations.
    pub fn insert(&self, query: &Query) -> Result<usize> {
        debug!(sql = %query.sql, params = query.params.len(), "insert");
        self.conn
            .execute(&query.sql, params_from_iter(bound_values(query)))
            .with_context(|| format!("failed to insert: {}", query.sql))
    }

    /// Run several bound inserts in one transaction.
    ///
    /// # Errors
    /// Returns an error, leaving the database untouched, when any insert fails.
    pub fn insert_batch(&mut self, queries: &[Query]) -> Result<usize> {
        let tx = self
            .conn
            .transaction()
            .context("failed to start insert transaction")?;
        let mut written = 0;
        for query in queries {
            debug!(sql = %query.sql, params = query.params.len(), "insert");
            written += tx
                .execute(&query.sql, params_from_iter(bound_values(query)))
                .with_context(|| format!("failed to insert: {}", query.sql))?;
        }
        tx.commit().context("failed to commit insert transaction")?;
        Ok(written)
    }

    /// Run a bound delete in its own transaction, rolled back on error.
    ///
    /// # Errors
    /// Returns an error when the delete fails, for example on a foreign key violation.
    pub fn delete(&mut self, query: &Query) -> Result<usize> {
        debug!(sql = %query.sql, params = query.params.len(), "delete");
        let tx = self
            .conn
            .transaction()
            .context("failed to start delete transaction")?;
        let deleted = tx
            .execute(&query.sql, params_from_iter(bound_values(query)))
            .with_context(|| format!("failed to delete: {}", query.sql))?;
        tx.commit().context("failed to commit delete transaction")?;
        Ok(deleted)
    }

    /// # Errors
    /// Returns an error when the pragma cannot be applied.
    pub fn set_foreign_keys(&self, enabled: bool) -> Result<()> {
        let state = if enabled { "ON" } else { "OFF" };
        self.execute(&format!("PRAGMA foreign_keys = {state};"))
    }

    /// # Errors
    /// Returns an error when the pragma cannot be read.
    pub fn foreign_keys_enabled(&self) -> Result<bool> {
        let enabled = self
            .conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get::<_, i64>(0))
            .context("failed to read PRAGMA foreign_keys")?;
        Ok(enabled == 1)
    }

    /// # Errors
    /// Returns an error when the query cannot be prepared or run, or is not read-only.
    pub fn select_single_row(&self, query: &Query) -> Result<Option<Row>> {
        Ok(self.select_rows(query, Some(1))?.into_iter().next())
    }

    /// # Errors
    /// Returns an error when the query cannot be prepared or run, or is not read-only.
    pub fn select_multiple_rows(&self, query: &Query) -> Result<Vec<Row>> {
        self.select_rows(query, None)
    }

    fn select_rows(&self, query: &Query, limit: Option<usize>) -> Result<Vec<Row>> {
        debug!(sql = %query.sql, params = query.params.len(), "select");
        let mut stmt = self
            .conn
            .prepare(&query.sql)
            .with_context(|| format!("failed to prepare query: {}", query.sql.trim()))?;
        let keyword = leading_keyword(&query.sql);
        if !stmt.readonly() || CONNECTION_KEYWORDS.contains(&keyword.as_str()) {
            return Err(anyhow!(
                "only read-only statements can be selected: {}",
                query.sql.trim()
            ));
        }
        let columns = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let mut rows = stmt
            .query(params_from_iter(bound_values(query)))
            .with_context(|| format!("failed to run query: {}", query.sql.trim()))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut object = Row::new();
            for (index, name) in columns.iter().enumerate() {
                object.insert(name.clone(), json_value(row.get_ref(index)?));
            }
            out.push(object);
            if limit.is_some_and(|limit| out.len() >= limit) {
                break;
            }
        }
        Ok(out)
    }

    /// # Errors
    /// Returns an error when `sqlite_master` cannot be read.
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let exists = self
            .conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
                params![table_name],
                |row| row.get::<_, i64>(0),
            )
            .with_context(|| format!("failed to check if table exists: {table_name}"))?;
        Ok(exists == 1)
    }

    /// # Errors
    /// Returns an error for a malformed or unknown table name.
    pub fn table_info(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        self.require_table(table)?;
        let query = select::table_info(table)?;
        let mut stmt = self
            .conn
            .prepare(&query.sql)
            .with_context(|| format!("failed to inspect table_info for {table}"))?;
        let rows = stmt.query_map([], |row| {
            Ok(ColumnInfo {
                cid: row.get(0)?,
                name: row.get(1)?,
                column_type: row.get(2)?,
                not_null: row.get::<_, i64>(3)? == 1,
                default_value: row.get(4)?,
                primary_key: row.get(5)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("failed to read table_info for {table}"))
    }

    /// # Errors
    /// Returns an error for a malformed or unknown table name.
    pub fn index_list(&self, table: &str) -> Result<Vec<IndexInfo>> {
        self.require_table(table)?;
        let query = select::index_list(table)?;
        let mut stmt = self
            .conn
            .prepare(&query.sql)
            .with_context(|| format!("failed to inspect index_list for {table}"))?;
        let rows = stmt.query_map([], |row| {
            Ok(IndexInfo {
                name: row.get(1)?,
                unique: row.get::<_, i64>(2)? == 1,
                origin: row.get(3)?,
                partial: row.get::<_, i64>(4)? == 1,
            })
        })?;
        let mut indices = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("failed to read index_list for {table}"))?;
        indices.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(indices)
    }

    /// # Errors
    /// Returns an error for a malformed or unknown table name.
    pub fn foreign_key_list(&self, table: &str) -> Result<Vec<ForeignKeyInfo>> {
        self.require_table(table)?;
        let query = select::foreign_key_list(table)?;
        let mut stmt = self
            .conn
            .prepare(&query.sql)
            .with_context(|| format!("failed to inspect foreign_key_list for {table}"))?;
        let rows = stmt.query_map([], |row| {
            Ok(ForeignKeyInfo {
                id: row.get(0)?,
                seq: row.get(1)?,
                table: row.get(2)?,
                from: row.get(3)?,
                to: row.get(4)?,
                on_update: row.get(5)?,
                on_delete: row.get(6)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("failed to read foreign_key_list for {table}"))
    }

    /// Row count of every user table, keyed by table name.
    ///
    /// # Errors
    /// Returns an error when the catalog or a table cannot be read.
    pub fn table_counts(&self) -> Result<BTreeMap<String, i64>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )
            .context("failed to list tables")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to read table names")?;

        let mut counts = BTreeMap::new();
        for name in names {
            let query = select::select_count(&name)?;
            let count = self
                .conn
                .query_row(&query.sql, [], |row| row.get::<_, i64>(0))
                .with_context(|| format!("failed to count rows in {name}"))?;
            counts.insert(name, count);
        }
        Ok(counts)
    }

    /// Run quick-check and foreign-key-check health probes.
    ///
    /// # Errors
    /// Returns an error when any integrity probe query fails.
    pub fn integrity_check(&self) -> Result<IntegrityReport> {
        let quick_check_message: String = self
            .conn
            .query_row("PRAGMA quick_check", [], |row| row.get::<_, String>(0))
            .context("failed to run PRAGMA quick_check")?;

        let mut stmt = self
            .conn
            .prepare("PRAGMA foreign_key_check")
            .context("failed to prepare PRAGMA foreign_key_check")?;
        let rows = stmt.query_map([], |row| {
            Ok(ForeignKeyViolation {
                table: row.get(0)?,
                rowid: row.get(1)?,
                parent: row.get(2)?,
                fk_index: row.get(3)?,
            })
        })?;

        let mut foreign_key_violations = Vec::new();
        for row in rows {
            foreign_key_violations.push(row?);
        }

        Ok(IntegrityReport {
            quick_check_ok: quick_check_message == "ok",
            quick_check_message,
            foreign_key_violations,
        })
    }

    /// Copy the whole main database into `out_file`.
    ///
    /// # Errors
    /// Returns an error when backup directories cannot be created or backup fails.
    pub fn backup_to(&self, out_file: &Path) -> Result<()> {
        if let Some(parent) = out_file
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).with_context(|| {
                format!(
                    "failed to create parent directory for backup file {}",
                    out_file.display()
                )
            })?;
        }

        self.conn
            .backup(DatabaseName::Main, out_file, None)
            .with_context(|| format!("failed to create sqlite backup at {}", out_file.display()))
    }

    fn require_table(&self, table: &str) -> Result<()> {
        if self.table_exists(table)? {
            Ok(())
        } else {
            Err(anyhow!("table does not exist: {table}"))
        }
    }
}

/// Statements SQLite reports as read-only that still change the connection
/// or touch other files.
const CONNECTION_KEYWORDS: [&str; 3] = ["ATTACH", "DETACH", "PRAGMA"];

fn existing_snapshot(store: &StageStore, dataset: Dataset, stage: u8) -> Result<PathBuf> {
    let path = store.snapshot_path(dataset, stage);
    if !path.exists() {
        return Err(anyhow!(
            "snapshot {} does not exist; \
             run `sqlt stage run --dataset {dataset} --through {stage}` first",
            path.display()
        ));
    }
    Ok(path)
}

/// First keyword of `sql`, upper-cased, after whitespace and comments.
fn leading_keyword(sql: &str) -> String {
    let mut rest = sql.trim_start();
    loop {
        if let Some(line) = rest.strip_prefix("--") {
            rest = line
                .split_once('\n')
                .map_or("", |(_, tail)| tail)
                .trim_start();
        } else if let Some(block) = rest.strip_prefix("/*") {
            rest = block
                .split_once("*/")
                .map_or("", |(_, tail)| tail)
                .trim_start();
        } else {
            break;
        }
    }
    rest.chars()
        .take_while(char::is_ascii_alphabetic)
        .collect::<String>()
        .to_ascii_uppercase()
}

fn configure(conn: &Connection) -> Result<()> {
    // Rollback journal keeps every snapshot in a single file.
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;",
    )
    .context("failed to configure sqlite pragmas")
}

fn bound_values(query: &Query) -> impl Iterator<Item = Value> + '_ {
    query.params.iter().map(|param| match param {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(value) => Value::Integer(*value),
        SqlValue::Real(value) => Value::Real(*value),
        SqlValue::Text(value) => Value::Text(value.clone()),
    })
}

fn json_value(value: ValueRef<'_>) -> JsonValue {
    match value {
        ValueRef::Null => JsonValue::Null,
        ValueRef::Integer(value) => JsonValue::from(value),
        ValueRef::Real(value) => Number::from_f64(value).map_or(JsonValue::Null, JsonValue::Number),
        ValueRef::Text(bytes) => JsonValue::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => JsonValue::String(hex::encode(bytes)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sql_training_core::schema::{MOVIES_FLAT_TABLES, MOVIES_INDICES};
    use sql_training_core::select::{delete_row_by_id, select_actor_by_name, select_count};

    use super::*;

    fn movies_schema() -> Result<Database> {
        let db = Database::open_in_memory()?;
        for ddl in MOVIES_FLAT_TABLES {
            db.create_table(ddl)?;
        }
        for ddl in MOVIES_INDICES {
            db.create_index(ddl)?;
        }
        Ok(db)
    }

    #[test]
    fn rows_keep_select_order_and_value_types() -> Result<()> {
        let db = Database::open_in_memory()?;
        let row = db.select_single_row(&Query::new(
            "SELECT 3 AS z, 1.5 AS a, 'O''Neil' AS name, NULL AS missing, X'CAFE' AS raw",
        ))?;
        let row = row.ok_or_else(|| anyhow!("expected a row"))?;
        assert_eq!(
            row.keys().collect::<Vec<_>>(),
            vec!["z", "a", "name", "missing", "raw"]
        );
        assert_eq!(
            JsonValue::Object(row),
            json!({"z": 3, "a": 1.5, "name": "O'Neil", "missing": null, "raw": "cafe"})
        );
        Ok(())
    }

    #[test]
    fn selects_refuse_statements_that_write() -> Result<()> {
        let db = movies_schema()?;
        assert!(db
            .select_multiple_rows(&Query::new("DELETE FROM genres"))
            .is_err());
        assert!(db
            .select_multiple_rows(&Query::new("DROP TABLE genres"))
            .is_err());
        assert!(db.table_exists("genres")?);
        Ok(())
    }

    #[test]
    fn selects_refuse_attach_and_pragmas() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let db = Database::open(&dir.path().join("lessons.sqlite3"))?;
        let attached = dir.path().join("created.db");
        let attach = format!("ATTACH DATABASE '{}' AS x", attached.display());
        assert!(db.select_multiple_rows(&Query::new(attach)).is_err());
        assert!(!attached.exists());

        assert!(db
            .select_multiple_rows(&Query::new("PRAGMA foreign_keys = OFF"))
            .is_err());
        assert!(db
            .select_multiple_rows(&Query::new("/* off */ pragma foreign_keys(0)"))
            .is_err());
        assert!(db
            .select_multiple_rows(&Query::new("-- x\n DETACH DATABASE x"))
            .is_err());
        assert!(db.foreign_keys_enabled()?);
        assert_eq!(leading_keyword("  -- note\n /* a */ select 1"), "SELECT");
        Ok(())
    }

    #[test]
    fn read_only_snapshots_reject_writes() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = StageStore::new(dir.path());
        let db = Database::from_existing(&store, Dataset::Movies, EMPTY_STAGE, 1)?;
        db.create_table("CREATE TABLE genres (id INTEGER PRIMARY KEY, genre TEXT NOT NULL)")?;
        drop(db);

        let db = Database::open_snapshot_read_only(&store, Dataset::Movies, 1)?;
        assert!(db
            .execute("INSERT INTO genres (genre) VALUES ('Drama')")
            .is_err());
        assert!(db.execute("CREATE TABLE extra (id INTEGER)").is_err());
        assert_eq!(db.table_counts()?.get("genres"), Some(&0));
        assert!(db.table_counts()?.get("extra").is_none());
        Ok(())
    }

    #[test]
    fn bound_text_is_not_interpreted_as_sql() -> Result<()> {
        let db = movies_schema()?;
        let name = "Robert'); DROP TABLE actors; --";
        db.insert(&Query::new("INSERT INTO actors (full_name) VALUES (?1)").bind(name))?;

        let row = db.select_single_row(&select_actor_by_name(name))?;
        assert_eq!(
            row.and_then(|row| row.get("full_name").cloned()),
            Some(json!(name))
        );
        assert!(db.table_exists("actors")?);
        Ok(())
    }

    #[test]
    fn schema_introspection_reports_columns_indices_and_keys() -> Result<()> {
        let db = movies_schema()?;
        let columns = db.table_info("movies")?;
        assert_eq!(
            columns.first().map(|column| column.name.as_str()),
            Some("id")
        );
        assert!(columns
            .iter()
            .any(|column| column.name == "homepage" && !column.not_null));

        let indices = db.index_list("movies")?;
        let names = indices
            .iter()
            .map(|index| index.name.as_str())
            .collect::<Vec<_>>();
        assert!(names.contains(&"movies_imdb_id_unq_idx"));
        assert!(names.contains(&"movies_release_date_idx"));
        assert!(indices
            .iter()
            .any(|index| index.name == "movies_imdb_id_unq_idx" && index.unique));

        let keys = db.foreign_key_list("movie_ratings")?;
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].table, "movies");
        assert_eq!(keys[0].from, "movie_id");

        assert!(db.table_info("nope").is_err());
        assert!(db.table_info("movies; --").is_err());
        Ok(())
    }

    #[test]
    fn rejected_delete_rolls_back_and_keeps_the_row() -> Result<()> {
        let mut db = movies_schema()?;
        db.insert(&Query::new(
            "INSERT INTO movies (imdb_id, popularity, budget, budget_adjusted, revenue,
             revenue_adjusted, original_title, overview, runtime, release_date)
             VALUES ('tt1', 1, 1, 1, 1, 1, 'One', '', 90, '2015-01-01')",
        ))?;
        db.insert(&Query::new(
            "INSERT INTO movie_ratings (user_id, movie_id, rating, time_created)
             VALUES (1, 1, 5, '2015-01-01T00:00:00Z')",
        ))?;

        assert!(db.delete(&delete_row_by_id("movies", 1)?).is_err());
        assert_eq!(db.table_counts()?.get("movies"), Some(&1));

        db.set_foreign_keys(false)?;
        assert!(!db.foreign_keys_enabled()?);
        assert_eq!(db.delete(&delete_row_by_id("movies", 1)?)?, 1);
        let report = db.integrity_check()?;
        assert!(report.quick_check_ok);
        assert_eq!(report.foreign_key_violations.len(), 1);
        assert_eq!(report.foreign_key_violations[0].table, "movie_ratings");
        assert!(!report.is_clean());
        Ok(())
    }

    #[test]
    fn batch_insert_is_all_or_nothing() -> Result<()> {
        let mut db = movies_schema()?;
        let good = Query::new("INSERT INTO genres (genre) VALUES (?1)").bind("Drama");
        let duplicate = good.clone();
        assert!(db.insert_batch(&[good.clone(), duplicate]).is_err());
        assert_eq!(
            db.select_single_row(&select_count("genres")?)?,
            Some(row_with_count(0))
        );

        assert_eq!(db.insert_batch(&[good])?, 1);
        assert_eq!(
            db.select_single_row(&select_count("genres")?)?,
            Some(row_with_count(1))
        );
        Ok(())
    }

    #[test]
    fn backup_copies_into_a_standalone_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let db = movies_schema()?;
        db.insert(&Query::new("INSERT INTO genres (genre) VALUES ('Horror')"))?;
        let copy_path = dir.path().join("nested").join("copy.sqlite3");
        db.backup_to(&copy_path)?;

        let copy = Database::open(&copy_path)?;
        assert_eq!(copy.path(), Some(copy_path.as_path()));
        assert_eq!(copy.table_counts()?.get("genres"), Some(&1));
        assert!(copy.foreign_keys_enabled()?);
        Ok(())
    }

    fn row_with_count(count: i64) -> Row {
        let mut row = Row::new();
        row.insert("c".to_string(), json!(count));
        row
    }
}
