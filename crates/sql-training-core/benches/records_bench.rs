use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sql_training_core::records::{unique_in_order, MovieRecord};
use sql_training_core::{insert, Movie};

fn synthetic_records(count: usize) -> Vec<MovieRecord> {
    (0..count)
        .map(|index| MovieRecord {
            id: i64::try_from(index).unwrap_or(i64::MAX),
            imdb_id: format!("tt{index:07}"),
            popularity: 1.5,
            budget: 1_000_000.0,
            revenue: 2_000_000.0,
            original_title: format!("Movie {index}"),
            cast: format!("Actor {}|Actor {}|Actor {}", index % 97, index % 89, index % 83),
            homepage: None,
            director: format!("Director {}", index % 41),
            tagline: Some("Tagline".to_string()),
            keywords: "space|robot|time travel".to_string(),
            overview: "Overview".to_string(),
            runtime: 100,
            genres: "Drama|Comedy".to_string(),
            production_companies: format!("Studio {}", index % 13),
            release_date: format!("{}/{}/{:02}", index % 12 + 1, index % 28 + 1, index % 100),
            vote_count: 10,
            vote_average: 6.0,
            release_year: 2000,
            budget_adj: 1_000_000.0,
            revenue_adj: 2_000_000.0,
        })
        .collect()
}

fn bench_normalise(c: &mut Criterion) {
    let records = synthetic_records(3_000);

    c.bench_function("normalise_3000_movie_records", |b| {
        b.iter(|| {
            let movies = records
                .iter()
                .cloned()
                .map(Movie::try_from)
                .collect::<Result<Vec<_>, _>>()
                .unwrap_or_default();
            black_box(movies.len())
        });
    });

    let movies =
        records.into_iter().map(Movie::try_from).collect::<Result<Vec<_>, _>>().unwrap_or_default();

    c.bench_function("unique_actors_3000_movies", |b| {
        b.iter(|| black_box(unique_in_order(movies.iter().flat_map(|movie| movie.cast.iter()))));
    });

    c.bench_function("insert_movies_chunk_500", |b| {
        b.iter(|| {
            black_box(insert::insert_table_rows(&movies[..500]).map(|query| query.params.len()))
        });
    });
}

criterion_group!(benches, bench_normalise);
criterion_main!(benches);
