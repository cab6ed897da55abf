//! CSV record types and the rows they normalise into.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::{Date, Month, OffsetDateTime};

use crate::query::SqlValue;
use crate::tables::{
    ACTORS, APPS, APPS_CATEGORIES, APPS_PRICING_PLANS, CATEGORIES, DIRECTORS, GENRES,
    KEY_BENEFITS, KEYWORDS, MOVIES, MOVIE_ACTORS, MOVIE_DIRECTORS, MOVIE_GENRES, MOVIE_KEYWORDS,
    MOVIE_PRODUCTION_COMPANIES, PRICING_PLANS, PRODUCTION_COMPANIES, REVIEWS,
};
use crate::TrainingError;

/// Rows of `M/D/YY` dates with a year at or below this land in the 2000s.
pub const TWO_DIGIT_YEAR_PIVOT: i32 = 30;

pub const DEFAULT_CHUNK_SIZE: usize = 500;

const DATE_FORMAT: &str = "[year]-[month]-[day]";

/// A row type with a fixed target table and column order.
pub trait TableRow {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn values(&self) -> Vec<SqlValue>;
}

/// One line of the TMDB movie export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    pub id: i64,
    pub imdb_id: String,
    pub popularity: f64,
    pub budget: f64,
    pub revenue: f64,
    pub original_title: String,
    pub cast: String,
    pub homepage: Option<String>,
    pub director: String,
    pub tagline: Option<String>,
    pub keywords: String,
    pub overview: String,
    pub runtime: i64,
    pub genres: String,
    pub production_companies: String,
    pub release_date: String,
    pub vote_count: i64,
    pub vote_average: f64,
    pub release_year: i64,
    pub budget_adj: f64,
    pub revenue_adj: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingRecord {
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "imdbId")]
    pub imdb_id: String,
    pub rating: f64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Movie {
    pub imdb_id: String,
    pub popularity: f64,
    pub budget: f64,
    pub budget_adjusted: f64,
    pub revenue: f64,
    pub revenue_adjusted: f64,
    pub original_title: String,
    pub homepage: Option<String>,
    pub tagline: Option<String>,
    pub overview: String,
    pub runtime: i64,
    pub release_date: String,
    pub cast: Vec<String>,
    pub directors: Vec<String>,
    pub keywords: Vec<String>,
    pub genres: Vec<String>,
    pub production_companies: Vec<String>,
}

impl TryFrom<MovieRecord> for Movie {
    type Error = TrainingError;

    fn try_from(record: MovieRecord) -> Result<Self, Self::Error> {
        let release_date =
            normalize_release_date(&record.release_date).map_err(|err| match err {
                TrainingError::InvalidRecord(reason) => {
                    TrainingError::InvalidRecord(format!("movie {}: {reason}", record.imdb_id))
                }
                other => other,
            })?;
        Ok(Self {
            popularity: record.popularity,
            budget: record.budget,
            budget_adjusted: record.budget_adj,
            revenue: record.revenue,
            revenue_adjusted: record.revenue_adj,
            original_title: record.original_title,
            homepage: non_empty(record.homepage),
            tagline: non_empty(record.tagline),
            overview: record.overview,
            runtime: record.runtime,
            release_date,
            cast: split_list(&record.cast),
            directors: split_list(&record.director),
            keywords: split_list(&record.keywords),
            genres: split_list(&record.genres),
            production_companies: split_list(&record.production_companies),
            imdb_id: record.imdb_id,
        })
    }
}

impl TableRow for Movie {
    const TABLE: &'static str = MOVIES;
    const COLUMNS: &'static [&'static str] = &[
        "imdb_id",
        "popularity",
        "budget",
        "budget_adjusted",
        "revenue",
        "revenue_adjusted",
        "original_title",
        "homepage",
        "tagline",
        "overview",
        "runtime",
        "release_date",
    ];

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.imdb_id.clone().into(),
            self.popularity.into(),
            self.budget.into(),
            self.budget_adjusted.into(),
            self.revenue.into(),
            self.revenue_adjusted.into(),
            self.original_title.clone().into(),
            self.homepage.clone().into(),
            self.tagline.clone().into(),
            self.overview.clone().into(),
            self.runtime.into(),
            self.release_date.clone().into(),
        ]
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Rating {
    pub user_id: i64,
    pub imdb_id: String,
    pub rating: f64,
    pub time_created: String,
}

impl TryFrom<RatingRecord> for Rating {
    type Error = TrainingError;

    fn try_from(record: RatingRecord) -> Result<Self, Self::Error> {
        let time_created = OffsetDateTime::from_unix_timestamp(record.timestamp)
            .ok()
            .and_then(|at| at.format(&Rfc3339).ok())
            .ok_or_else(|| {
                TrainingError::InvalidRecord(format!(
                    "rating by user {} has invalid timestamp {}",
                    record.user_id, record.timestamp
                ))
            })?;
        Ok(Self {
            user_id: record.user_id,
            imdb_id: record.imdb_id,
            rating: record.rating,
            time_created,
        })
    }
}

/// The many-to-many associations between movies and the named flat tables.
#[derive(Debug, Clone, Copy, Serialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MovieRelation {
    Genres,
    Actors,
    Directors,
    Keywords,
    ProductionCompanies,
}

impl MovieRelation {
    pub const ALL: [MovieRelation; 5] = [
        MovieRelation::Genres,
        MovieRelation::Actors,
        MovieRelation::Directors,
        MovieRelation::Keywords,
        MovieRelation::ProductionCompanies,
    ];

    /// Junction table.
    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            Self::Genres => MOVIE_GENRES,
            Self::Actors => MOVIE_ACTORS,
            Self::Directors => MOVIE_DIRECTORS,
            Self::Keywords => MOVIE_KEYWORDS,
            Self::ProductionCompanies => MOVIE_PRODUCTION_COMPANIES,
        }
    }

    /// Junction column referencing the parent table.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::Genres => "genre_id",
            Self::Actors => "actor_id",
            Self::Directors => "director_id",
            Self::Keywords => "keyword_id",
            Self::ProductionCompanies => "company_id",
        }
    }

    #[must_use]
    pub fn parent_table(self) -> &'static str {
        match self {
            Self::Genres => GENRES,
            Self::Actors => ACTORS,
            Self::Directors => DIRECTORS,
            Self::Keywords => KEYWORDS,
            Self::ProductionCompanies => PRODUCTION_COMPANIES,
        }
    }

    /// Name column of the parent table.
    #[must_use]
    pub fn parent_column(self) -> &'static str {
        match self {
            Self::Genres => "genre",
            Self::Actors | Self::Directors => "full_name",
            Self::Keywords => "keyword",
            Self::ProductionCompanies => "company_name",
        }
    }

    #[must_use]
    pub fn names(self, movie: &Movie) -> &[String] {
        match self {
            Self::Genres => &movie.genres,
            Self::Actors => &movie.cast,
            Self::Directors => &movie.directors,
            Self::Keywords => &movie.keywords,
            Self::ProductionCompanies => &movie.production_companies,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppRecord {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub developer: String,
    pub developer_link: Option<String>,
    pub icon: Option<String>,
    pub rating: f64,
    pub reviews_count: i64,
    pub description: Option<String>,
    pub tagline: Option<String>,
    pub pricing_hint: Option<String>,
}

impl TableRow for AppRecord {
    const TABLE: &'static str = APPS;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "url",
        "title",
        "developer",
        "developer_link",
        "icon",
        "rating",
        "reviews_count",
        "description",
        "tagline",
        "pricing_hint",
    ];

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.id.into(),
            self.url.clone().into(),
            self.title.clone().into(),
            self.developer.clone().into(),
            self.developer_link.clone().into(),
            self.icon.clone().into(),
            self.rating.into(),
            self.reviews_count.into(),
            self.description.clone().into(),
            self.tagline.clone().into(),
            self.pricing_hint.clone().into(),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRecord {
    pub id: i64,
    pub title: String,
}

impl TableRow for CategoryRecord {
    const TABLE: &'static str = CATEGORIES;
    const COLUMNS: &'static [&'static str] = &["id", "title"];

    fn values(&self) -> Vec<SqlValue> {
        vec![self.id.into(), self.title.clone().into()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppCategoryRecord {
    pub app_id: i64,
    pub category_id: i64,
}

impl TableRow for AppCategoryRecord {
    const TABLE: &'static str = APPS_CATEGORIES;
    const COLUMNS: &'static [&'static str] = &["app_id", "category_id"];

    fn values(&self) -> Vec<SqlValue> {
        vec![self.app_id.into(), self.category_id.into()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewRecord {
    pub app_id: i64,
    pub author: String,
    pub rating: i64,
    pub posted_at: String,
    pub body: Option<String>,
    pub helpful_count: i64,
    pub developer_reply: Option<String>,
    pub developer_reply_posted_at: Option<String>,
}

impl TableRow for ReviewRecord {
    const TABLE: &'static str = REVIEWS;
    const COLUMNS: &'static [&'static str] = &[
        "app_id",
        "author",
        "rating",
        "date_created",
        "body",
        "helpful_count",
        "developer_reply",
        "developer_reply_date",
    ];

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.app_id.into(),
            self.author.clone().into(),
            self.rating.into(),
            self.posted_at.clone().into(),
            self.body.clone().into(),
            self.helpful_count.into(),
            self.developer_reply.clone().into(),
            self.developer_reply_posted_at.clone().into(),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PricingPlanRecord {
    pub id: i64,
    pub price: String,
}

impl TableRow for PricingPlanRecord {
    const TABLE: &'static str = PRICING_PLANS;
    const COLUMNS: &'static [&'static str] = &["id", "price"];

    fn values(&self) -> Vec<SqlValue> {
        vec![self.id.into(), self.price.clone().into()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppPricingPlanRecord {
    pub app_id: i64,
    pub pricing_plan_id: i64,
}

impl TableRow for AppPricingPlanRecord {
    const TABLE: &'static str = APPS_PRICING_PLANS;
    const COLUMNS: &'static [&'static str] = &["app_id", "pricing_plan_id"];

    fn values(&self) -> Vec<SqlValue> {
        vec![self.app_id.into(), self.pricing_plan_id.into()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyBenefitRecord {
    pub app_id: i64,
    pub title: String,
    pub description: String,
}

impl TableRow for KeyBenefitRecord {
    const TABLE: &'static str = KEY_BENEFITS;
    const COLUMNS: &'static [&'static str] = &["app_id", "title", "description"];

    fn values(&self) -> Vec<SqlValue> {
        vec![self.app_id.into(), self.title.clone().into(), self.description.clone().into()]
    }
}

/// Split a `|`-separated list column, dropping blank entries.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split('|').map(str::trim).filter(|item| !item.is_empty()).map(str::to_string).collect()
}

/// Deduplicate while keeping the first occurrence of every item.
#[must_use]
pub fn unique_in_order<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for item in items {
        let item = item.as_ref();
        if seen.insert(item.to_string()) {
            unique.push(item.to_string());
        }
    }
    unique
}

/// Normalise `M/D/YY`, `M/D/YYYY` or `YYYY-MM-DD` to `YYYY-MM-DD`.
///
/// # Errors
/// Returns [`TrainingError::InvalidRecord`] when the text is not a calendar date.
pub fn normalize_release_date(raw: &str) -> Result<String, TrainingError> {
    let raw = raw.trim();
    let invalid = || TrainingError::InvalidRecord(format!("unrecognised release date {raw:?}"));
    let format = time::format_description::parse(DATE_FORMAT).map_err(|_| invalid())?;

    let date = if raw.contains('/') {
        let parts = raw
            .split('/')
            .map(str::parse::<i32>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;
        let [month, day, year] = parts.as_slice() else {
            return Err(invalid());
        };
        let year = if (0..=TWO_DIGIT_YEAR_PIVOT).contains(year) {
            2000 + year
        } else if (0..100).contains(year) {
            1900 + year
        } else {
            *year
        };
        let month =
            u8::try_from(*month).ok().and_then(|m| Month::try_from(m).ok()).ok_or_else(invalid)?;
        let day = u8::try_from(*day).map_err(|_| invalid())?;
        Date::from_calendar_date(year, month, day).map_err(|_| invalid())?
    } else {
        Date::parse(raw, &format).map_err(|_| invalid())?
    };

    date.format(&format).map_err(|_| invalid())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn jurassic_world() -> MovieRecord {
        MovieRecord {
            id: 135_397,
            imdb_id: "tt0369610".to_string(),
            popularity: 32.985_763,
            budget: 150_000_000.0,
            revenue: 1_513_528_810.0,
            original_title: "Jurassic World".to_string(),
            cast: "Chris Pratt|Bryce Dallas Howard||Irrfan Khan".to_string(),
            homepage: Some("http://www.jurassicworld.com/".to_string()),
            director: "Colin Trevorrow".to_string(),
            tagline: Some("  ".to_string()),
            keywords: "monster|dna".to_string(),
            overview: "Isla Nublar now features a dinosaur theme park.".to_string(),
            runtime: 124,
            genres: "Action|Adventure|Science Fiction".to_string(),
            production_companies: String::new(),
            release_date: "6/9/15".to_string(),
            vote_count: 5562,
            vote_average: 6.5,
            release_year: 2015,
            budget_adj: 137_999_939.3,
            revenue_adj: 1_392_445_893.0,
        }
    }

    #[test]
    fn movie_record_normalises_lists_dates_and_blanks() -> Result<(), TrainingError> {
        let movie = Movie::try_from(jurassic_world())?;
        assert_eq!(movie.release_date, "2015-06-09");
        assert_eq!(movie.cast, vec!["Chris Pratt", "Bryce Dallas Howard", "Irrfan Khan"]);
        assert_eq!(movie.directors, vec!["Colin Trevorrow"]);
        assert!(movie.production_companies.is_empty());
        assert_eq!(movie.tagline, None);
        assert_eq!(movie.budget_adjusted, 137_999_939.3);
        assert_eq!(movie.values().len(), Movie::COLUMNS.len());
        Ok(())
    }

    #[test]
    fn release_dates_pivot_two_digit_years() -> Result<(), TrainingError> {
        assert_eq!(normalize_release_date("1/5/66")?, "1966-01-05");
        assert_eq!(normalize_release_date("12/3/14")?, "2014-12-03");
        assert_eq!(normalize_release_date("1/1/30")?, "2030-01-01");
        assert_eq!(normalize_release_date("1/1/31")?, "1931-01-01");
        assert_eq!(normalize_release_date("1/1/00")?, "2000-01-01");
        assert_eq!(normalize_release_date("7/4/1999")?, "1999-07-04");
        assert_eq!(normalize_release_date("2017-03-22")?, "2017-03-22");
        assert!(normalize_release_date("13/1/15").is_err());
        assert!(normalize_release_date("2/30/15").is_err());
        assert!(normalize_release_date("yesterday").is_err());
        let Err(TrainingError::InvalidRecord(reason)) = normalize_release_date("yesterday") else {
            panic!("expected an invalid record");
        };
        assert_eq!(reason, "unrecognised release date \"yesterday\"");
        Ok(())
    }

    #[test]
    fn rating_timestamps_render_as_rfc3339() -> Result<(), TrainingError> {
        let rating = Rating::try_from(RatingRecord {
            user_id: 1,
            imdb_id: "tt0369610".to_string(),
            rating: 4.5,
            timestamp: 1_425_941_529,
        })?;
        assert_eq!(rating.time_created, "2015-03-09T22:52:09Z");
        Ok(())
    }

    #[test]
    fn relations_name_existing_junction_columns() {
        for relation in MovieRelation::ALL {
            assert!(relation.table().starts_with("movie_"));
            assert!(relation.column().ends_with("_id"));
        }
        assert_eq!(MovieRelation::ProductionCompanies.parent_column(), "company_name");
    }

    proptest! {
        #[test]
        fn split_list_yields_trimmed_non_empty_items(raw in "[a-z |]{0,40}") {
            for item in split_list(&raw) {
                prop_assert!(!item.is_empty());
                prop_assert_eq!(item.trim(), item.as_str());
                prop_assert!(!item.contains('|'));
            }
        }

        #[test]
        fn unique_in_order_keeps_first_occurrences(
            items in proptest::collection::vec("[a-c]{1,2}", 0..30)
        ) {
            let unique = unique_in_order(&items);
            let distinct = unique.iter().collect::<HashSet<_>>();
            prop_assert_eq!(distinct.len(), unique.len());
            for item in &items {
                prop_assert!(unique.contains(item));
            }
            let first_positions = unique
                .iter()
                .map(|item| items.iter().position(|candidate| candidate == item))
                .collect::<Vec<_>>();
            let mut sorted = first_positions.clone();
            sorted.sort();
            prop_assert_eq!(first_positions, sorted);
        }
    }
}
