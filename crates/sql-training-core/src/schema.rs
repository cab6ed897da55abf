//! Schema DDL, executed verbatim by the stage pipeline.

pub const CREATE_MOVIES_TABLE: &str = r"
CREATE TABLE movies (
  id INTEGER NOT NULL PRIMARY KEY,
  imdb_id TEXT NOT NULL,
  popularity REAL NOT NULL,
  budget REAL NOT NULL,
  budget_adjusted REAL NOT NULL,
  revenue REAL NOT NULL,
  revenue_adjusted REAL NOT NULL,
  original_title TEXT NOT NULL,
  homepage TEXT,
  tagline TEXT,
  overview TEXT NOT NULL,
  runtime INTEGER NOT NULL,
  release_date TEXT NOT NULL
);
";

pub const CREATE_MOVIE_RATINGS_TABLE: &str = r"
CREATE TABLE movie_ratings (
  user_id INTEGER NOT NULL,
  movie_id INTEGER NOT NULL,
  rating REAL NOT NULL,
  time_created TEXT NOT NULL,
  PRIMARY KEY (user_id, movie_id),
  FOREIGN KEY (movie_id) REFERENCES movies(id)
);
";

pub const CREATE_ACTORS_TABLE: &str = r"
CREATE TABLE actors (
  id INTEGER NOT NULL PRIMARY KEY,
  full_name TEXT NOT NULL
);
";

pub const CREATE_KEYWORDS_TABLE: &str = r"
CREATE TABLE keywords (
  id INTEGER NOT NULL PRIMARY KEY,
  keyword TEXT NOT NULL
);
";

pub const CREATE_DIRECTORS_TABLE: &str = r"
CREATE TABLE directors (
  id INTEGER NOT NULL PRIMARY KEY,
  full_name TEXT NOT NULL
);
";

pub const CREATE_GENRES_TABLE: &str = r"
CREATE TABLE genres (
  id INTEGER NOT NULL PRIMARY KEY,
  genre TEXT NOT NULL
);
";

pub const CREATE_PRODUCTION_COMPANIES_TABLE: &str = r"
CREATE TABLE production_companies (
  id INTEGER NOT NULL PRIMARY KEY,
  company_name TEXT NOT NULL
);
";

pub const CREATE_INDEX_MOVIES_RELEASE_DATE: &str =
    "CREATE INDEX movies_release_date_idx ON movies (release_date);";

pub const CREATE_INDEX_MOVIE_RATINGS_TIME_CREATED: &str =
    "CREATE INDEX movie_ratings_time_created_idx ON movie_ratings (time_created);";

pub const CREATE_UNIQUE_INDEX_MOVIES_IMDB_ID: &str =
    "CREATE UNIQUE INDEX movies_imdb_id_unq_idx ON movies (imdb_id);";

pub const CREATE_UNIQUE_INDEX_KEYWORDS_KEYWORD: &str =
    "CREATE UNIQUE INDEX keywords_keyword_unq_idx ON keywords (keyword);";

pub const CREATE_UNIQUE_INDEX_GENRES_GENRE: &str =
    "CREATE UNIQUE INDEX genres_genre_unq_idx ON genres (genre);";

pub const CREATE_UNIQUE_INDEX_PRODUCTION_COMPANIES_COMPANY_NAME: &str =
    "CREATE UNIQUE INDEX production_companies_company_name_unq_idx \
     ON production_companies (company_name);";

pub const MOVIES_FLAT_TABLES: [&str; 7] = [
    CREATE_MOVIES_TABLE,
    CREATE_MOVIE_RATINGS_TABLE,
    CREATE_ACTORS_TABLE,
    CREATE_KEYWORDS_TABLE,
    CREATE_DIRECTORS_TABLE,
    CREATE_GENRES_TABLE,
    CREATE_PRODUCTION_COMPANIES_TABLE,
];

pub const MOVIES_INDICES: [&str; 6] = [
    CREATE_INDEX_MOVIES_RELEASE_DATE,
    CREATE_INDEX_MOVIE_RATINGS_TIME_CREATED,
    CREATE_UNIQUE_INDEX_MOVIES_IMDB_ID,
    CREATE_UNIQUE_INDEX_KEYWORDS_KEYWORD,
    CREATE_UNIQUE_INDEX_GENRES_GENRE,
    CREATE_UNIQUE_INDEX_PRODUCTION_COMPANIES_COMPANY_NAME,
];

pub const CREATE_MOVIE_GENRES_TABLE: &str = r"
CREATE TABLE movie_genres (
  movie_id INTEGER NOT NULL,
  genre_id INTEGER NOT NULL,
  PRIMARY KEY (movie_id, genre_id),
  FOREIGN KEY (movie_id) REFERENCES movies(id),
  FOREIGN KEY (genre_id) REFERENCES genres(id)
);
";

pub const CREATE_MOVIE_ACTORS_TABLE: &str = r"
CREATE TABLE movie_actors (
  movie_id INTEGER NOT NULL,
  actor_id INTEGER NOT NULL,
  PRIMARY KEY (movie_id, actor_id),
  FOREIGN KEY (movie_id) REFERENCES movies(id),
  FOREIGN KEY (actor_id) REFERENCES actors(id)
);
";

pub const CREATE_MOVIE_DIRECTORS_TABLE: &str = r"
CREATE TABLE movie_directors (
  movie_id INTEGER NOT NULL,
  director_id INTEGER NOT NULL,
  PRIMARY KEY (movie_id, director_id),
  FOREIGN KEY (movie_id) REFERENCES movies(id),
  FOREIGN KEY (director_id) REFERENCES directors(id)
);
";

pub const CREATE_MOVIE_KEYWORDS_TABLE: &str = r"
CREATE TABLE movie_keywords (
  movie_id INTEGER NOT NULL,
  keyword_id INTEGER NOT NULL,
  PRIMARY KEY (movie_id, keyword_id),
  FOREIGN KEY (movie_id) REFERENCES movies(id),
  FOREIGN KEY (keyword_id) REFERENCES keywords(id)
);
";

pub const CREATE_MOVIE_PRODUCTION_COMPANIES_TABLE: &str = r"
CREATE TABLE movie_production_companies (
  movie_id INTEGER NOT NULL,
  company_id INTEGER NOT NULL,
  PRIMARY KEY (movie_id, company_id),
  FOREIGN KEY (movie_id) REFERENCES movies(id),
  FOREIGN KEY (company_id) REFERENCES production_companies(id)
);
";

pub const MOVIES_RELATIONSHIP_TABLES: [&str; 5] = [
    CREATE_MOVIE_GENRES_TABLE,
    CREATE_MOVIE_ACTORS_TABLE,
    CREATE_MOVIE_DIRECTORS_TABLE,
    CREATE_MOVIE_KEYWORDS_TABLE,
    CREATE_MOVIE_PRODUCTION_COMPANIES_TABLE,
];

pub const CREATE_APPS_TABLE: &str = r"
CREATE TABLE apps (
  id INTEGER NOT NULL PRIMARY KEY,
  url TEXT NOT NULL,
  title TEXT NOT NULL,
  developer TEXT NOT NULL,
  developer_link TEXT,
  icon TEXT,
  rating REAL NOT NULL,
  reviews_count INTEGER NOT NULL,
  description TEXT,
  tagline TEXT,
  pricing_hint TEXT
);
";

pub const CREATE_CATEGORIES_TABLE: &str = r"
CREATE TABLE categories (
  id INTEGER NOT NULL PRIMARY KEY,
  title TEXT NOT NULL
);
";

pub const CREATE_APPS_CATEGORIES_TABLE: &str = r"
CREATE TABLE apps_categories (
  app_id INTEGER NOT NULL,
  category_id INTEGER NOT NULL,
  PRIMARY KEY (app_id, category_id),
  FOREIGN KEY (app_id) REFERENCES apps(id),
  FOREIGN KEY (category_id) REFERENCES categories(id)
);
";

pub const CREATE_REVIEWS_TABLE: &str = r"
CREATE TABLE reviews (
  app_id INTEGER NOT NULL,
  author TEXT NOT NULL,
  rating INTEGER NOT NULL,
  date_created TEXT NOT NULL,
  body TEXT,
  helpful_count INTEGER NOT NULL,
  developer_reply TEXT,
  developer_reply_date TEXT,
  PRIMARY KEY (app_id, author),
  FOREIGN KEY (app_id) REFERENCES apps(id)
);
";

pub const CREATE_PRICING_PLANS_TABLE: &str = r"
CREATE TABLE pricing_plans (
  id INTEGER NOT NULL PRIMARY KEY,
  price TEXT NOT NULL
);
";

pub const CREATE_APPS_PRICING_PLANS_TABLE: &str = r"
CREATE TABLE apps_pricing_plans (
  app_id INTEGER NOT NULL,
  pricing_plan_id INTEGER NOT NULL,
  PRIMARY KEY (app_id, pricing_plan_id),
  FOREIGN KEY (app_id) REFERENCES apps(id),
  FOREIGN KEY (pricing_plan_id) REFERENCES pricing_plans(id)
);
";

pub const CREATE_KEY_BENEFITS_TABLE: &str = r"
CREATE TABLE key_benefits (
  app_id INTEGER NOT NULL,
  title TEXT NOT NULL,
  description TEXT NOT NULL,
  PRIMARY KEY (app_id, title),
  FOREIGN KEY (app_id) REFERENCES apps(id)
);
";

pub const CREATE_UNIQUE_INDEX_CATEGORIES_TITLE: &str =
    "CREATE UNIQUE INDEX categories_title_unq_idx ON categories (title);";

pub const CREATE_UNIQUE_INDEX_PRICING_PLANS_PRICE: &str =
    "CREATE UNIQUE INDEX pricing_plans_price_unq_idx ON pricing_plans (price);";

pub const CREATE_INDEX_REVIEWS_DATE_CREATED: &str =
    "CREATE INDEX reviews_date_created_idx ON reviews (date_created);";

pub const SHOPIFY_TABLES: [&str; 7] = [
    CREATE_APPS_TABLE,
    CREATE_CATEGORIES_TABLE,
    CREATE_APPS_CATEGORIES_TABLE,
    CREATE_REVIEWS_TABLE,
    CREATE_PRICING_PLANS_TABLE,
    CREATE_APPS_PRICING_PLANS_TABLE,
    CREATE_KEY_BENEFITS_TABLE,
];

pub const SHOPIFY_INDICES: [&str; 3] = [
    CREATE_UNIQUE_INDEX_CATEGORIES_TITLE,
    CREATE_UNIQUE_INDEX_PRICING_PLANS_PRICE,
    CREATE_INDEX_REVIEWS_DATE_CREATED,
];
