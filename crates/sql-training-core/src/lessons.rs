//! The lesson catalog: fixed queries attached to the query stages of each dataset.

use serde::Serialize;

use crate::dataset::Dataset;
use crate::query::Query;
use crate::TrainingError;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Lesson {
    pub id: &'static str,
    pub dataset: Dataset,
    pub stage: u8,
    pub title: &'static str,
    pub sql: &'static str,
}

impl Lesson {
    #[must_use]
    pub fn query(&self) -> Query {
        Query::new(self.sql)
    }
}

pub const LESSONS: &[Lesson] = &[
    Lesson {
        id: "movies-count-released-in-2015",
        dataset: Dataset::Movies,
        stage: 6,
        title: "Count movies released in 2015",
        sql: r"
      SELECT COUNT(*) AS count
      FROM movies
      WHERE release_date BETWEEN '2015-01-01' AND '2015-12-31';",
    },
    Lesson {
        id: "movies-top-three-by-revenue",
        dataset: Dataset::Movies,
        stage: 6,
        title: "Select the three highest grossing movies",
        sql: r"
      SELECT original_title, revenue
      FROM movies
      ORDER BY revenue DESC
      LIMIT 3;",
    },
    Lesson {
        id: "movies-average-runtime",
        dataset: Dataset::Movies,
        stage: 6,
        title: "Select the average runtime of all movies",
        sql: r"
      SELECT ROUND(AVG(runtime), 2) AS avg_runtime
      FROM movies;",
    },
    Lesson {
        id: "movies-without-homepage",
        dataset: Dataset::Movies,
        stage: 6,
        title: "Count movies without a homepage",
        sql: r"
      SELECT COUNT(*) AS count
      FROM movies
      WHERE homepage IS NULL;",
    },
    Lesson {
        id: "movies-most-active-raters",
        dataset: Dataset::Movies,
        stage: 6,
        title: "Select the three users who rated the most movies",
        sql: r"
      SELECT user_id, COUNT(*) AS ratings
      FROM movie_ratings
      GROUP BY user_id
      ORDER BY ratings DESC, user_id
      LIMIT 3;",
    },
    Lesson {
        id: "movies-top-directors-by-budget",
        dataset: Dataset::Movies,
        stage: 7,
        title: "Select top three directors ordered by total budget spent in their movies",
        sql: r"
      SELECT directors.full_name AS director, ROUND(SUM(movies.budget_adjusted), 2) AS total_budget
      FROM directors
      JOIN movie_directors ON directors.id = movie_directors.director_id
      JOIN movies ON movies.id = movie_directors.movie_id
      GROUP BY directors.full_name
      ORDER BY total_budget DESC, director
      LIMIT 3;",
    },
    Lesson {
        id: "movies-top-keywords",
        dataset: Dataset::Movies,
        stage: 7,
        title: "Select top ten keywords ordered by their appearance in movies",
        sql: r"
      SELECT keywords.keyword, COUNT(*) AS count
      FROM keywords
      JOIN movie_keywords ON keywords.id = movie_keywords.keyword_id
      GROUP BY keywords.keyword
      ORDER BY count DESC, keywords.keyword
      LIMIT 10;",
    },
    Lesson {
        id: "movies-actor-count-for-life",
        dataset: Dataset::Movies,
        stage: 7,
        title: "Select all movies called Life and return amount of actors",
        sql: r"
      SELECT movies.original_title AS original_title, COUNT(*) AS count
      FROM movies
      JOIN movie_actors ON movies.id = movie_actors.movie_id
      JOIN actors ON movie_actors.actor_id = actors.id
      WHERE movies.original_title = 'Life'
      GROUP BY movies.original_title;",
    },
    Lesson {
        id: "movies-genres-by-five-star-ratings",
        dataset: Dataset::Movies,
        stage: 7,
        title: "Select three genres which have the most ratings with 5 stars",
        sql: r"
      SELECT genres.genre AS genre, COUNT(*) AS five_stars_count
      FROM movie_ratings
      JOIN movies ON movie_ratings.movie_id = movies.id
      JOIN movie_genres ON movies.id = movie_genres.movie_id
      JOIN genres ON movie_genres.genre_id = genres.id
      WHERE movie_ratings.rating = 5
      GROUP BY genres.genre
      ORDER BY five_stars_count DESC, genre
      LIMIT 3;",
    },
    Lesson {
        id: "movies-genres-by-average-rating",
        dataset: Dataset::Movies,
        stage: 7,
        title: "Select top three genres ordered by average rating",
        sql: r"
      SELECT genres.genre AS genre, ROUND(AVG(movie_ratings.rating), 2) AS avg_rating
      FROM movie_ratings
      JOIN movies ON movie_ratings.movie_id = movies.id
      JOIN movie_genres ON movies.id = movie_genres.movie_id
      JOIN genres ON movie_genres.genre_id = genres.id
      GROUP BY genres.genre
      ORDER BY avg_rating DESC, genre
      LIMIT 3;",
    },
    Lesson {
        id: "shopify-count-apps",
        dataset: Dataset::Shopify,
        stage: 3,
        title: "Count apps in the store",
        sql: r"
        SELECT COUNT(*) AS count
        FROM apps;",
    },
    Lesson {
        id: "shopify-unique-review-authors",
        dataset: Dataset::Shopify,
        stage: 3,
        title: "Count distinct review authors",
        sql: r"
        SELECT COUNT(DISTINCT author) AS count
        FROM reviews;",
    },
    Lesson {
        id: "shopify-top-rated-apps",
        dataset: Dataset::Shopify,
        stage: 3,
        title: "Select the three best rated apps, most reviewed first on ties",
        sql: r"
        SELECT title, rating
        FROM apps
        ORDER BY rating DESC, reviews_count DESC
        LIMIT 3;",
    },
    Lesson {
        id: "shopify-reviews-with-developer-reply",
        dataset: Dataset::Shopify,
        stage: 3,
        title: "Count reviews the developer replied to",
        sql: r"
        SELECT COUNT(*) AS count
        FROM reviews
        WHERE developer_reply IS NOT NULL;",
    },
    Lesson {
        id: "shopify-apps-on-free-plans",
        dataset: Dataset::Shopify,
        stage: 4,
        title: "Select count of apps which have a free pricing plan",
        sql: r"
        SELECT COUNT(pricing_plan_id) AS count
        FROM apps_pricing_plans
        WHERE pricing_plan_id IN (SELECT id FROM pricing_plans WHERE price LIKE 'Free%');",
    },
    Lesson {
        id: "shopify-top-categories",
        dataset: Dataset::Shopify,
        stage: 4,
        title: "Select top three most common categories",
        sql: r"
        SELECT COUNT(ac.category_id) AS count, c.title AS category
        FROM apps_categories ac
        JOIN categories c ON ac.category_id = c.id
        GROUP BY ac.category_id, c.title
        ORDER BY count DESC, category
        LIMIT 3;",
    },
    Lesson {
        id: "shopify-prices-between-five-and-ten",
        dataset: Dataset::Shopify,
        stage: 4,
        title: "Select top three prices by appearance in apps in the $5 to $10 range inclusive",
        sql: r"
        SELECT COUNT(*) AS count, pricing.price,
               CAST(SUBSTR(pricing.price, 2) AS DECIMAL(10, 2)) AS casted_price
        FROM apps_pricing_plans app_pricing
        JOIN pricing_plans pricing ON app_pricing.pricing_plan_id = pricing.id
        WHERE CAST(SUBSTR(pricing.price, 2) AS DECIMAL(10, 2)) BETWEEN 5 AND 10
        GROUP BY CAST(SUBSTR(pricing.price, 2) AS DECIMAL(10, 2))
        ORDER BY count DESC, casted_price
        LIMIT 3;",
    },
];

/// # Errors
/// Returns [`TrainingError::UnknownLesson`] when no lesson has this id.
pub fn find_lesson(id: &str) -> Result<&'static Lesson, TrainingError> {
    LESSONS
        .iter()
        .find(|lesson| lesson.id == id)
        .ok_or_else(|| TrainingError::UnknownLesson(id.to_string()))
}

pub fn lessons_for(dataset: Dataset) -> impl Iterator<Item = &'static Lesson> {
    LESSONS.iter().filter(move |lesson| lesson.dataset == dataset)
}

pub fn lessons_at(dataset: Dataset, stage: u8) -> impl Iterator<Item = &'static Lesson> {
    lessons_for(dataset).filter(move |lesson| lesson.stage == stage)
}
