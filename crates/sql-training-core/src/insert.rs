//! Multi-row insert builders. Every value is bound through a placeholder.

use crate::query::{validate_identifier, Query, SqlValue};
use crate::records::{MovieRelation, Rating, TableRow};
use crate::tables::{MOVIES, MOVIE_RATINGS};
use crate::TrainingError;

/// SQLite's ceiling on bound parameters in one statement.
pub const MAX_BOUND_PARAMETERS: usize = 32_766;

/// Rows per statement for a table of `columns` columns: `chunk_size`, lowered
/// so one statement never binds more than [`MAX_BOUND_PARAMETERS`] values.
#[must_use]
pub fn rows_per_statement(chunk_size: usize, columns: usize) -> usize {
    let ceiling = MAX_BOUND_PARAMETERS / columns.max(1);
    chunk_size.clamp(1, ceiling.max(1))
}

/// `INSERT INTO <table> (<columns>) VALUES (?, ...), (?, ...)`
///
/// # Errors
/// Returns [`TrainingError::EmptyInsert`] for no rows or no columns,
/// [`TrainingError::InvalidRecord`] when a row's width differs from `columns`,
/// [`TrainingError::TooManyParameters`] past [`MAX_BOUND_PARAMETERS`], and
/// [`TrainingError::InvalidIdentifier`] for malformed names.
pub fn insert_rows(
    table: &str,
    columns: &[&str],
    rows: Vec<Vec<SqlValue>>,
) -> Result<Query, TrainingError> {
    if rows.is_empty() || columns.is_empty() {
        return Err(TrainingError::EmptyInsert);
    }
    let row_count = rows.len();
    let parameters = row_count * columns.len();
    if parameters > MAX_BOUND_PARAMETERS {
        return Err(TrainingError::TooManyParameters { table: table.to_string(), parameters });
    }
    let table = validate_identifier(table)?;
    let column_list =
        columns.iter().map(|column| validate_identifier(column)).collect::<Result<Vec<_>, _>>()?;

    let placeholders = format!("({})", vec!["?"; columns.len()].join(", "));
    let mut params = Vec::with_capacity(parameters);
    for row in rows {
        if row.len() != columns.len() {
            return Err(TrainingError::InvalidRecord(format!(
                "row for {table} has {} values, expected {}",
                row.len(),
                columns.len()
            )));
        }
        params.extend(row);
    }
    let values = vec![placeholders.as_str(); row_count].join(", ");

    Ok(Query::with_params(
        format!("INSERT INTO {table} ({}) VALUES {values}", column_list.join(", ")),
        params,
    ))
}

/// Insert a chunk of typed rows into their table.
///
/// # Errors
/// Same as [`insert_rows`].
pub fn insert_table_rows<T: TableRow>(rows: &[T]) -> Result<Query, TrainingError> {
    insert_rows(T::TABLE, T::COLUMNS, rows.iter().map(TableRow::values).collect())
}

/// Insert names into a single-column lookup table such as `actors (full_name)`.
///
/// # Errors
/// Same as [`insert_rows`].
pub fn insert_names(table: &str, column: &str, names: &[String]) -> Result<Query, TrainingError> {
    insert_rows(table, &[column], names.iter().map(|name| vec![name.clone().into()]).collect())
}

/// Insert one rating, resolving the movie through its IMDb id. Ratings for
/// unknown movies insert nothing.
#[must_use]
pub fn insert_rating(rating: &Rating) -> Query {
    Query::new(format!(
        "INSERT INTO {MOVIE_RATINGS} (user_id, movie_id, rating, time_created)
         SELECT ?1, m.id, ?2, ?3 FROM {MOVIES} AS m WHERE m.imdb_id = ?4"
    ))
    .bind(rating.user_id)
    .bind(rating.rating)
    .bind(rating.time_created.clone())
    .bind(rating.imdb_id.clone())
}

/// Link a movie to a named parent row (`genres.genre = 'Drama'`, ...).
#[must_use]
pub fn link_movie(relation: MovieRelation, imdb_id: &str, name: &str) -> Query {
    let table = relation.table();
    let column = relation.column();
    let parent = relation.parent_table();
    let parent_column = relation.parent_column();
    Query::new(format!(
        "INSERT OR IGNORE INTO {table} (movie_id, {column})
         SELECT m.id, p.id FROM {MOVIES} AS m
         JOIN {parent} AS p ON p.{parent_column} = ?2
         WHERE m.imdb_id = ?1"
    ))
    .bind(imdb_id)
    .bind(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::CategoryRecord;

    #[test]
    fn names_expand_to_one_placeholder_group_per_row() -> Result<(), TrainingError> {
        let names = vec!["Tom Hardy".to_string(), "Brie Larson".to_string()];
        let query = insert_names("actors", "full_name", &names)?;
        assert_eq!(query.sql, "INSERT INTO actors (full_name) VALUES (?), (?)");
        assert_eq!(query.params.len(), 2);
        Ok(())
    }

    #[test]
    fn typed_rows_use_their_column_order() -> Result<(), TrainingError> {
        let rows = vec![
            CategoryRecord { id: 1, title: "Store design".to_string() },
            CategoryRecord { id: 3, title: "Marketing".to_string() },
        ];
        let query = insert_table_rows(&rows)?;
        assert_eq!(query.sql, "INSERT INTO categories (id, title) VALUES (?, ?), (?, ?)");
        assert_eq!(
            query.params,
            vec![
                SqlValue::Integer(1),
                SqlValue::Text("Store design".to_string()),
                SqlValue::Integer(3),
                SqlValue::Text("Marketing".to_string()),
            ]
        );
        Ok(())
    }

    #[test]
    fn empty_and_ragged_inserts_are_rejected() {
        assert_eq!(insert_rows("genres", &["genre"], Vec::new()), Err(TrainingError::EmptyInsert));
        let ragged = insert_rows("genres", &["genre"], vec![vec![SqlValue::Null, SqlValue::Null]]);
        assert!(matches!(ragged, Err(TrainingError::InvalidRecord(_))));
        assert_eq!(insert_rows("t", &[], vec![vec![]]), Err(TrainingError::EmptyInsert));
    }

    #[test]
    fn statements_stay_under_the_parameter_ceiling() {
        assert_eq!(rows_per_statement(500, 13), 500);
        assert_eq!(rows_per_statement(3000, 13), 2520);
        assert_eq!(rows_per_statement(0, 2), 1);
        assert_eq!(rows_per_statement(usize::MAX, 0), MAX_BOUND_PARAMETERS);

        let names = vec!["x".to_string(); MAX_BOUND_PARAMETERS + 1];
        assert!(matches!(
            insert_names("genres", "genre", &names),
            Err(TrainingError::TooManyParameters { parameters: 32_767, .. })
        ));
        assert!(insert_names("genres", "genre", &names[1..]).is_ok());
    }

    #[test]
    fn link_binds_imdb_id_then_name() {
        let query = link_movie(MovieRelation::Keywords, "tt3659388", "mars");
        assert!(query.sql.contains("INSERT OR IGNORE INTO movie_keywords (movie_id, keyword_id)"));
        assert!(query.sql.contains("JOIN keywords AS p ON p.keyword = ?2"));
        assert_eq!(
            query.params,
            vec![SqlValue::Text("tt3659388".to_string()), SqlValue::Text("mars".to_string())]
        );
    }
}
