//! Select builders used by the stages and their checks. Identifiers are
//! validated and spliced in; values are always bound.

use crate::query::{validate_identifier, Query};
use crate::tables::{
    ACTORS, CATEGORIES, DIRECTORS, GENRES, KEYWORDS, MOVIES, PRODUCTION_COMPANIES, REVIEWS,
};
use crate::TrainingError;

/// `SELECT COUNT(*) AS c FROM <table>`
///
/// # Errors
/// Returns [`TrainingError::InvalidIdentifier`] for a malformed table name.
pub fn select_count(table: &str) -> Result<Query, TrainingError> {
    let table = validate_identifier(table)?;
    Ok(Query::new(format!("SELECT COUNT(*) AS c FROM {table}")))
}

/// # Errors
/// Returns [`TrainingError::InvalidIdentifier`] for a malformed table name.
pub fn select_row_by_id(table: &str, id: i64) -> Result<Query, TrainingError> {
    let table = validate_identifier(table)?;
    Ok(Query::new(format!("SELECT * FROM {table} WHERE id = ?1")).bind(id))
}

/// # Errors
/// Returns [`TrainingError::InvalidIdentifier`] for a malformed table or column name.
pub fn select_unique_row_count(table: &str, column: &str) -> Result<Query, TrainingError> {
    let table = validate_identifier(table)?;
    let column = validate_identifier(column)?;
    Ok(Query::new(format!("SELECT COUNT(DISTINCT {column}) AS c FROM {table}")))
}

/// # Errors
/// Returns [`TrainingError::InvalidIdentifier`] for a malformed table or column name.
pub fn select_column_from_table(column: &str, table: &str) -> Result<Query, TrainingError> {
    let column = validate_identifier(column)?;
    let table = validate_identifier(table)?;
    Ok(Query::new(format!("SELECT {column} FROM {table}")))
}

/// # Errors
/// Returns [`TrainingError::InvalidIdentifier`] for a malformed table name.
pub fn delete_row_by_id(table: &str, id: i64) -> Result<Query, TrainingError> {
    let table = validate_identifier(table)?;
    Ok(Query::new(format!("DELETE FROM {table} WHERE id = ?1")).bind(id))
}

fn select_by_column(table: &str, column: &str, value: &str) -> Query {
    Query::new(format!("SELECT * FROM {table} WHERE {column} = ?1")).bind(value)
}

#[must_use]
pub fn select_actor_by_name(full_name: &str) -> Query {
    select_by_column(ACTORS, "full_name", full_name)
}

#[must_use]
pub fn select_keyword(keyword: &str) -> Query {
    select_by_column(KEYWORDS, "keyword", keyword)
}

#[must_use]
pub fn select_director(full_name: &str) -> Query {
    select_by_column(DIRECTORS, "full_name", full_name)
}

#[must_use]
pub fn select_genre(genre: &str) -> Query {
    select_by_column(GENRES, "genre", genre)
}

#[must_use]
pub fn select_production_company(company_name: &str) -> Query {
    select_by_column(PRODUCTION_COMPANIES, "company_name", company_name)
}

#[must_use]
pub fn select_movie(imdb_id: &str) -> Query {
    select_by_column(MOVIES, "imdb_id", imdb_id)
}

fn select_by_id(table: &str, id: i64) -> Query {
    Query::new(format!("SELECT * FROM {table} WHERE id = ?1")).bind(id)
}

#[must_use]
pub fn select_actor_by_id(id: i64) -> Query {
    select_by_id(ACTORS, id)
}

#[must_use]
pub fn select_keyword_by_id(id: i64) -> Query {
    select_by_id(KEYWORDS, id)
}

#[must_use]
pub fn select_director_by_id(id: i64) -> Query {
    select_by_id(DIRECTORS, id)
}

#[must_use]
pub fn select_genre_by_id(id: i64) -> Query {
    select_by_id(GENRES, id)
}

#[must_use]
pub fn select_production_company_by_id(id: i64) -> Query {
    select_by_id(PRODUCTION_COMPANIES, id)
}

#[must_use]
pub fn select_movie_by_id(id: i64) -> Query {
    select_by_id(MOVIES, id)
}

#[must_use]
pub fn select_category_by_title(title: &str) -> Query {
    select_by_column(CATEGORIES, "title", title)
}

#[must_use]
pub fn select_app_categories_by_app_id(app_id: i64) -> Query {
    Query::new(
        r"
  SELECT a.title AS app_title, ac.category_id, c.title AS category_title
  FROM apps_categories AS ac
  INNER JOIN categories AS c ON ac.category_id = c.id
  INNER JOIN apps AS a ON ac.app_id = a.id
  WHERE ac.app_id = ?1
  ORDER BY ac.category_id",
    )
    .bind(app_id)
}

#[must_use]
pub fn select_review_by_app_id_author(app_id: i64, author: &str) -> Query {
    Query::new(format!("SELECT * FROM {REVIEWS} WHERE app_id = ?1 AND author = ?2"))
        .bind(app_id)
        .bind(author)
}

/// `PRAGMA table_info(<table>)`
///
/// # Errors
/// Returns [`TrainingError::InvalidIdentifier`] for a malformed table name.
pub fn table_info(table: &str) -> Result<Query, TrainingError> {
    let table = validate_identifier(table)?;
    Ok(Query::new(format!("PRAGMA table_info({table})")))
}

/// `PRAGMA index_list(<table>)`
///
/// # Errors
/// Returns [`TrainingError::InvalidIdentifier`] for a malformed table name.
pub fn index_list(table: &str) -> Result<Query, TrainingError> {
    let table = validate_identifier(table)?;
    Ok(Query::new(format!("PRAGMA index_list({table})")))
}

/// `PRAGMA foreign_key_list(<table>)`
///
/// # Errors
/// Returns [`TrainingError::InvalidIdentifier`] for a malformed table name.
pub fn foreign_key_list(table: &str) -> Result<Query, TrainingError> {
    let table = validate_identifier(table)?;
    Ok(Query::new(format!("PRAGMA foreign_key_list({table})")))
}
