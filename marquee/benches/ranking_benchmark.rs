use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use marquee::candidate::{Candidate, MovieRecord, PersonRecord};
use marquee::query::analyze;
use marquee::ranking::similarity;
use marquee::search::rank_at;

const TITLES: &[&str] = &[
    "The Dark Knight",
    "The Dark Knight Rises",
    "Dark City",
    "Darkest Hour",
    "Zero Dark Thirty",
    "Knight and Day",
    "A Knight's Tale",
    "The Green Knight",
    "Blade Runner",
    "Blade Runner 2049",
    "Interstellar",
    "Inception",
    "The Prestige",
    "Memento",
    "Dunkirk",
    "Tenet",
    "Oppenheimer",
    "The Godfather",
    "The Godfather Part II",
    "La La Land",
];

const OVERVIEW: &str = "When a menace known as the Joker wreaks havoc and chaos on the \
    people of Gotham, Batman must accept one of the greatest psychological and \
    physical tests of his ability to fight injustice.";

/// A remote-sized batch: mostly films, a few people, spread over years and popularity.
fn batch(size: usize) -> Vec<Candidate> {
    (0..size)
        .map(|i| {
            let title = TITLES[i % TITLES.len()];
            if i % 7 == 6 {
                Candidate::from(PersonRecord {
                    name: format!("{title} Person"),
                    popularity: Some((i * 3) as f64),
                    ..Default::default()
                })
            } else {
                Candidate::from(MovieRecord {
                    title: title.to_string(),
                    original_title: None,
                    release_year: Some(1950 + (i as i32 * 7) % 75),
                    popularity: Some((i * 13 % 200) as f64),
                    overview: Some(OVERVIEW.to_string()),
                })
            }
        })
        .collect()
}

fn bench_rank(c: &mut Criterion) {
    let queries = vec![
        ("short", "da"),
        ("word", "knight"),
        ("multi_word", "the dark knight"),
        ("with_year", "dark knight 2008"),
        ("typo", "the drak knihgt"),
    ];

    let mut group = c.benchmark_group("rank");
    for size in [10usize, 50] {
        let candidates = batch(size);
        for (name, query) in &queries {
            let info = analyze(query);
            group.bench_with_input(BenchmarkId::new(*name, size), &candidates, |b, candidates| {
                b.iter(|| rank_at(black_box(candidates.clone()), &info, 5, 2025));
            });
        }
    }
    group.finish();
}

fn bench_similarity(c: &mut Criterion) {
    c.bench_function("similarity/long_titles", |b| {
        b.iter(|| {
            similarity(
                black_box("dr. strangelove or: how i learned to stop worrying"),
                black_box("dr strangelove or how i learned to stop worrying and love the bomb"),
            )
        })
    });
}

criterion_group!(benches, bench_rank, bench_similarity);
criterion_main!(benches);
