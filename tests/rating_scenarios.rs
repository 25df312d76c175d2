//! Synthetic rating suite: scale/rounding properties under randomized
//! classifier confidences, tone ordering with the lexicon backend, and
//! weight-knob plumbing. Seeded RNG keeps every run deterministic.

use std::sync::Arc;

use rand::{rngs::StdRng, Rng, SeedableRng};

use moviehub_review_pipeline::config::SentimentConfig;
use moviehub_review_pipeline::model::mock::{ConstSentimentModel, ScriptedSentimentModel};
use moviehub_review_pipeline::{DynSentimentModel, LexiconClassifier, SentimentAggregator};

fn aggregator(model: DynSentimentModel) -> SentimentAggregator {
    SentimentAggregator::new(model, SentimentConfig::default())
}

/* ----------------------------
Scale and rounding
---------------------------- */

#[test]
fn randomized_confidences_always_land_on_the_scale() {
    for seed in [1u64, 7, 42, 1337, 987_654_321] {
        let mut rng = StdRng::seed_from_u64(seed);
        let script: Vec<(f32, f32)> = (0..64)
            .map(|_| (rng.random_range(0.0..=1.0), rng.random_range(0.0..=1.0)))
            .collect();
        let reviews: Vec<String> = (0..64)
            .map(|i| format!("Synthetic review {i}: the film swings between extremes."))
            .collect();

        let agg = aggregator(Arc::new(ScriptedSentimentModel::new(script)));
        let out = agg.predict_rating(reviews.iter().map(String::as_str));

        assert_eq!(out.reviews_scored, 64, "seed {seed}");
        assert!(
            (0.0..=10.0).contains(&out.rating),
            "seed {seed}: rating {} off the scale",
            out.rating
        );
        // one decimal place
        let tenths = out.rating * 10.0;
        assert!(
            (tenths - tenths.round()).abs() < 1e-3,
            "seed {seed}: rating {} not on the 0.1 grid",
            out.rating
        );
    }
}

#[test]
fn unanimous_extremes_clamp_to_the_scale_ends() {
    let reviews = ["An all-timer, no two ways about it."];

    let high = aggregator(Arc::new(ConstSentimentModel::new(1.0, 0.0)));
    assert_eq!(high.predict_rating(reviews).rating, 10.0);

    let low = aggregator(Arc::new(ConstSentimentModel::new(0.0, 1.0)));
    assert_eq!(low.predict_rating(reviews).rating, 0.0);
}

/* ----------------------------
Lexicon backend, tone ordering
---------------------------- */

const PRAISE: &[&str] = &[
    "A masterpiece of patient storytelling.",
    "Brilliant performances from the whole ensemble.",
    "Superb direction and gripping tension throughout.",
    "An ultimately rewarding watch, start to finish.",
];

const PANS: &[&str] = &[
    "A dull, boring slog from the first scene.",
    "Terrible dialogue wrapped around awful pacing.",
    "A disappointing mess with nothing to say.",
    "A complete waste of two long hours.",
];

// praise outweighs the pan in every phrase, so the corpus sits mid-scale
const MIXED: &[&str] = &[
    "A masterpiece of patient storytelling, though a bit boring in the middle.",
    "Brilliant performances wrapped around a disappointing final act.",
    "Superb direction and gripping tension, despite the dull stretches.",
    "An ultimately rewarding watch, even with the occasional mess.",
];

const FILLER: &[&str] = &[
    "The runtime lands at just over two hours.",
    "Shot on location across three cities.",
    "Features a large ensemble and a period setting.",
];

fn corpus(pool: &[&str]) -> Vec<String> {
    // cross every opinion phrase with every filler so each review carries
    // exactly one opinionated clause
    let mut reviews = Vec::new();
    for phrase in pool {
        for extra in FILLER {
            reviews.push(format!("{phrase} {extra}"));
        }
    }
    reviews
}

#[test]
fn lexicon_orders_corpora_by_tone() {
    let agg = aggregator(Arc::new(LexiconClassifier::new()));

    let glowing = agg.predict_rating(corpus(PRAISE));
    let panned = agg.predict_rating(corpus(PANS));
    let middling = agg.predict_rating(corpus(MIXED));

    assert!(
        glowing.rating > middling.rating && middling.rating > panned.rating,
        "expected {} > {} > {}",
        glowing.rating,
        middling.rating,
        panned.rating
    );
    assert!(glowing.rating > 5.0);
    assert!(panned.rating < 1.0);
    assert!(middling.rating > 1.0 && middling.rating < 9.0);
    assert!(!glowing.degraded && !panned.degraded && !middling.degraded);
}

#[test]
fn repeated_lexicon_runs_are_bit_identical() {
    let agg = aggregator(Arc::new(LexiconClassifier::new()));
    let reviews = corpus(PRAISE);

    let first = agg.predict_rating(reviews.iter().map(String::as_str));
    let second = agg.predict_rating(reviews.iter().map(String::as_str));

    assert_eq!(first, second);
    assert_eq!(first.rating.to_bits(), second.rating.to_bits());
}

/* ----------------------------
Weight knobs
---------------------------- */

#[test]
fn configured_weights_scale_the_outcome() {
    let reviews = ["Evenly split between admiration and fatigue."];

    let mut cfg = SentimentConfig::default();
    cfg.positive_weight = 2.0;
    cfg.negative_weight = 0.5;
    let agg = SentimentAggregator::new(Arc::new(ConstSentimentModel::new(0.5, 0.5)), cfg);
    // 0.5*2.0 - 0.5*0.5 = 0.75 -> 7.5
    assert!((agg.predict_rating(reviews).rating - 7.5).abs() < 1e-4);

    let mut cfg = SentimentConfig::default();
    cfg.positive_weight = 0.5;
    cfg.negative_weight = 2.0;
    let agg = SentimentAggregator::new(Arc::new(ConstSentimentModel::new(0.5, 0.5)), cfg);
    // 0.5*0.5 - 0.5*2.0 = -0.75 -> clamps at 0.0
    assert_eq!(agg.predict_rating(reviews).rating, 0.0);
}
