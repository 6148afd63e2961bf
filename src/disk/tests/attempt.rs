//! Tests for attempt generation.

use rstest::rstest;

use crate::category::Category::{self, Cloud, Essd, EssdAuto, EssdEntry, Ssd};
use crate::category::PerformanceLevel::{self, Pl0, Pl1, Pl2};
use crate::disk::{CreateAttempt, generate_create_attempts};

fn plain(category: Category) -> CreateAttempt {
    CreateAttempt::new(category)
}

fn tiered(category: Category, level: PerformanceLevel) -> CreateAttempt {
    CreateAttempt::with_level(category, level)
}

#[rstest]
#[case::expands_tiers_in_place(
    &[EssdEntry, Essd, EssdAuto],
    &[Pl0, Pl1],
    vec![plain(EssdEntry), tiered(Essd, Pl0), tiered(Essd, Pl1), plain(EssdAuto)],
)]
#[case::no_levels_means_one_attempt(&[Essd, Ssd], &[], vec![plain(Essd), plain(Ssd)])]
#[case::levels_ignored_for_untiered(&[Ssd, Cloud], &[Pl2], vec![plain(Ssd), plain(Cloud)])]
#[case::duplicate_category_emitted_once(&[Ssd, Essd, Ssd], &[], vec![plain(Ssd), plain(Essd)])]
#[case::duplicate_level_emitted_once(&[Essd], &[Pl1, Pl1, Pl0], vec![tiered(Essd, Pl1), tiered(Essd, Pl0)])]
#[case::empty(&[], &[Pl0], vec![])]
fn generates_attempts_in_fallback_order(
    #[case] categories: &[Category],
    #[case] levels: &[PerformanceLevel],
    #[case] expected: Vec<CreateAttempt>,
) {
    assert_eq!(generate_create_attempts(categories, levels), expected);
}

#[rstest]
fn attempts_carry_no_instance() {
    let attempts = generate_create_attempts(&[Category::EedStandard], &[]);
    assert!(attempts.iter().all(|attempt| attempt.instance_id.is_none()));
}

#[rstest]
#[case(tiered(Essd, Pl1), "cloud_essd/PL1")]
#[case(plain(Ssd), "cloud_ssd")]
fn attempt_display(#[case] attempt: CreateAttempt, #[case] expected: &str) {
    assert_eq!(attempt.to_string(), expected);
}
