pub const MOVIES: &str = "movies";
pub const MOVIE_RATINGS: &str = "movie_ratings";
pub const ACTORS: &str = "actors";
pub const KEYWORDS: &str = "keywords";
pub const DIRECTORS: &str = "directors";
pub const GENRES: &str = "genres";
pub const PRODUCTION_COMPANIES: &str = "production_companies";

pub const MOVIE_GENRES: &str = "movie_genres";
pub const MOVIE_ACTORS: &str = "movie_actors";
pub const MOVIE_DIRECTORS: &str = "movie_directors";
pub const MOVIE_KEYWORDS: &str = "movie_keywords";
pub const MOVIE_PRODUCTION_COMPANIES: &str = "movie_production_companies";

pub const APPS: &str = "apps";
pub const CATEGORIES: &str = "categories";
pub const APPS_CATEGORIES: &str = "apps_categories";
pub const REVIEWS: &str = "reviews";
pub const PRICING_PLANS: &str = "pricing_plans";
pub const APPS_PRICING_PLANS: &str = "apps_pricing_plans";
pub const KEY_BENEFITS: &str = "key_benefits";

pub const ALL_TABLES: [&str; 7] =
    [MOVIES, MOVIE_RATINGS, ACTORS, KEYWORDS, DIRECTORS, GENRES, PRODUCTION_COMPANIES];

pub const ALL_RELATIONSHIP_TABLES: [&str; 5] =
    [MOVIE_GENRES, MOVIE_ACTORS, MOVIE_DIRECTORS, MOVIE_KEYWORDS, MOVIE_PRODUCTION_COMPANIES];

pub const ALL_SHOPIFY_TABLES: [&str; 7] =
    [APPS, CATEGORIES, APPS_CATEGORIES, REVIEWS, PRICING_PLANS, APPS_PRICING_PLANS, KEY_BENEFITS];
