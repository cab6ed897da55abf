//! CSV input for both datasets. Files are read whole; each row is checked
//! against its record type and malformed rows name their file and line.

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use sql_training_core::records::{
    unique_in_order, AppCategoryRecord, AppPricingPlanRecord, AppRecord, CategoryRecord,
    KeyBenefitRecord, MovieRecord, PricingPlanRecord, RatingRecord, ReviewRecord,
};
use sql_training_core::{Movie, MovieRelation, Rating, TrainingError};
use tracing::debug;

pub const MOVIES_FILE: &str = "movies.csv";
pub const RATINGS_FILE: &str = "ratings.csv";

pub const APPS_FILE: &str = "apps.csv";
pub const CATEGORIES_FILE: &str = "categories.csv";
pub const APPS_CATEGORIES_FILE: &str = "apps_categories.csv";
pub const REVIEWS_FILE: &str = "reviews.csv";
pub const PRICING_PLANS_FILE: &str = "pricing_plans.csv";
pub const APPS_PRICING_PLANS_FILE: &str = "apps_pricing_plans.csv";
pub const KEY_BENEFITS_FILE: &str = "key_benefits.csv";

pub struct CsvLoader;

#[derive(Debug, Clone, PartialEq)]
pub struct MovieData {
    pub movies: Vec<Movie>,
    pub ratings: Vec<Rating>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShopifyData {
    pub apps: Vec<AppRecord>,
    pub categories: Vec<CategoryRecord>,
    pub apps_categories: Vec<AppCategoryRecord>,
    pub reviews: Vec<ReviewRecord>,
    pub pricing_plans: Vec<PricingPlanRecord>,
    pub apps_pricing_plans: Vec<AppPricingPlanRecord>,
    pub key_benefits: Vec<KeyBenefitRecord>,
}

impl CsvLoader {
    /// Read `movies.csv` and `ratings.csv` from `data_dir`.
    ///
    /// # Errors
    /// Returns an error naming the file when it is missing or a row cannot be parsed.
    pub fn movies(data_dir: &Path) -> Result<MovieData> {
        let movies =
            read_csv_as::<MovieRecord, _, _>(&data_dir.join(MOVIES_FILE), Movie::try_from)?;
        let ratings =
            read_csv_as::<RatingRecord, _, _>(&data_dir.join(RATINGS_FILE), Rating::try_from)?;
        Ok(MovieData { movies, ratings })
    }

    /// Read the seven shopify CSV files from `data_dir`.
    ///
    /// # Errors
    /// Returns an error naming the file when it is missing or a row cannot be parsed.
    pub fn shopify(data_dir: &Path) -> Result<ShopifyData> {
        Ok(ShopifyData {
            apps: read_csv(&data_dir.join(APPS_FILE))?,
            categories: read_csv(&data_dir.join(CATEGORIES_FILE))?,
            apps_categories: read_csv(&data_dir.join(APPS_CATEGORIES_FILE))?,
            reviews: read_csv(&data_dir.join(REVIEWS_FILE))?,
            pricing_plans: read_csv(&data_dir.join(PRICING_PLANS_FILE))?,
            apps_pricing_plans: read_csv(&data_dir.join(APPS_PRICING_PLANS_FILE))?,
            key_benefits: read_csv(&data_dir.join(KEY_BENEFITS_FILE))?,
        })
    }
}

impl MovieData {
    /// Distinct names for one relation, in first-seen order.
    #[must_use]
    pub fn names(&self, relation: MovieRelation) -> Vec<String> {
        unique_in_order(self.movies.iter().flat_map(|movie| relation.names(movie)))
    }

    #[must_use]
    pub fn actors(&self) -> Vec<String> {
        self.names(MovieRelation::Actors)
    }

    #[must_use]
    pub fn keywords(&self) -> Vec<String> {
        self.names(MovieRelation::Keywords)
    }

    #[must_use]
    pub fn directors(&self) -> Vec<String> {
        self.names(MovieRelation::Directors)
    }

    #[must_use]
    pub fn genres(&self) -> Vec<String> {
        self.names(MovieRelation::Genres)
    }

    #[must_use]
    pub fn production_companies(&self) -> Vec<String> {
        self.names(MovieRelation::ProductionCompanies)
    }
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    read_csv_as(path, Ok::<T, TrainingError>)
}

/// Deserialize every row as `R` and convert it. Errors name the file and the
/// line the row starts on.
fn read_csv_as<R, T, F>(path: &Path, convert: F) -> Result<Vec<T>>
where
    R: DeserializeOwned,
    F: Fn(R) -> Result<T, TrainingError>,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open CSV file {}", path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("{}: unreadable header", path.display()))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("{}: malformed CSV", path.display()))?;
        let line = record.position().map_or(0, csv::Position::line);
        let row = record
            .deserialize::<R>(Some(&headers))
            .map_err(anyhow::Error::from)
            .and_then(|raw| convert(raw).map_err(anyhow::Error::from))
            .with_context(|| format!("{}: line {line}", path.display()))?;
        rows.push(row);
    }
    debug!(path = %path.display(), rows = rows.len(), "read CSV file");
    Ok(rows)
}
