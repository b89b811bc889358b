mod common;

use std::collections::HashSet;

use agri_ga::{optimize, GeneticConfig};
use common::context;

#[test]
fn runs_are_deterministic_for_a_seed() {
    let ctx = context();
    let config = GeneticConfig::default();
    let a = optimize(&ctx, &config).unwrap();
    let b = optimize(&ctx, &config).unwrap();
    assert_eq!(a.history, b.history);
    assert_eq!(a.top, b.top);
    assert_eq!(a.history.len(), config.generations);
}

#[test]
fn worker_count_does_not_change_the_result() {
    let ctx = context();
    let single = optimize(&ctx, &GeneticConfig::default()).unwrap();
    let parallel = optimize(
        &ctx,
        &GeneticConfig {
            workers: 3,
            ..GeneticConfig::default()
        },
    )
    .unwrap();
    assert_eq!(single.history, parallel.history);
    assert_eq!(single.top, parallel.top);
}

#[test]
fn ranking_is_distinct_sorted_and_feasible() {
    let ctx = context();
    let config = GeneticConfig {
        population_size: 30,
        generations: 15,
        seed: 7,
        ..GeneticConfig::default()
    };
    let report = optimize(&ctx, &config).unwrap();
    assert!(report.top.len() <= 3);
    assert!(report
        .top
        .windows(2)
        .all(|pair| pair[0].fitness >= pair[1].fitness));
    let pairs: HashSet<_> = report
        .top
        .iter()
        .map(|s| (s.sowing_index, s.harvest_index))
        .collect();
    assert_eq!(pairs.len(), report.top.len());
    for schedule in &report.top {
        assert!((3..=6).contains(&schedule.duration_months));
        assert!(schedule.fitness > 0.0);
    }
    assert_eq!(report.forecast.len(), 24);
}

#[test]
fn invalid_configs_are_rejected() {
    let ctx = context();
    for config in [
        GeneticConfig {
            population_size: 7,
            ..GeneticConfig::default()
        },
        GeneticConfig {
            generations: 1,
            ..GeneticConfig::default()
        },
        GeneticConfig {
            mutation_rate: 1.5,
            ..GeneticConfig::default()
        },
        GeneticConfig {
            workers: 0,
            ..GeneticConfig::default()
        },
    ] {
        let err = optimize(&ctx, &config).unwrap_err();
        assert_eq!(err.info().code, "genetic-config");
    }
}
