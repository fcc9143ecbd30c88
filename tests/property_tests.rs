use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal_macros::dec;

use runsense::config::EngineConfig;
use runsense::load::LoadTracker;
use runsense::metrics::derive_training_paces;
use runsense::models::{PlannedSession, SessionRecord, TargetDistribution};
use runsense::{distribution, recovery};

fn session_strategy() -> impl Strategy<Value = SessionRecord> {
    (
        0u32..120,
        0.0f64..45.0,
        0.0f64..240.0,
        proptest::option::of(1u8..=10),
    )
        .prop_map(|(day, distance_km, duration_min, perceived_effort)| SessionRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .checked_add_days(chrono::Days::new(day as u64))
                .unwrap(),
            distance_km,
            duration_min,
            avg_pace: None,
            avg_heart_rate: None,
            perceived_effort,
            is_race: false,
        })
}

fn planned_strategy() -> impl Strategy<Value = PlannedSession> {
    (0u32..60, 1.0f64..180.0, 0.0f64..110.0).prop_map(
        |(day, duration_min, intensity_percent)| PlannedSession {
            date: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .checked_add_days(chrono::Days::new(day as u64))
                .unwrap(),
            duration_min,
            intensity_percent,
            description: String::new(),
        },
    )
}

proptest! {
    #[test]
    fn paces_ordered_across_valid_domain(index in 30.0f64..=85.0) {
        let config = EngineConfig::default();
        let paces = derive_training_paces(index, &config.metrics).unwrap();
        prop_assert!(paces.repetition < paces.interval);
        prop_assert!(paces.interval < paces.threshold);
        prop_assert!(paces.threshold < paces.marathon);
        prop_assert!(paces.marathon < paces.easy);
    }

    #[test]
    fn paces_rejected_outside_domain(index in prop_oneof![-50.0f64..30.0, 85.1f64..500.0]) {
        let config = EngineConfig::default();
        prop_assert!(derive_training_paces(index, &config.metrics).is_err());
    }

    #[test]
    fn load_is_non_negative_with_ratio_invariant(
        mut sessions in proptest::collection::vec(session_strategy(), 0..60)
    ) {
        sessions.sort_by_key(|s| s.date);
        let config = EngineConfig::default();
        let load = LoadTracker::new(config.load.clone()).compute(&sessions, dec!(5.0));

        prop_assert!(load.acute >= 0.0);
        prop_assert!(load.chronic >= 0.0);
        if load.chronic > 0.0 {
            prop_assert!((load.ratio - load.acute / load.chronic).abs() < 1e-9);
        } else {
            prop_assert_eq!(load.ratio, 1.0);
        }
    }

    #[test]
    fn recovery_and_risk_bounded(
        mut sessions in proptest::collection::vec(session_strategy(), 0..40),
        resting_hr in proptest::option::of(30u16..120),
        hrv in proptest::option::of(5.0f64..150.0),
        growth in -80.0f64..200.0,
    ) {
        sessions.sort_by_key(|s| s.date);
        let config = EngineConfig::default();

        let score = recovery::compute_recovery_score(&sessions, resting_hr, hrv, &config);
        prop_assert!((0.0..=100.0).contains(&score));

        let load = LoadTracker::new(config.load.clone()).compute(&sessions, dec!(5.0));
        let risk = recovery::compute_injury_risk(&load, growth, score, &config);
        prop_assert!((0.0..=100.0).contains(&risk));
    }

    #[test]
    fn distribution_shares_sum_to_hundred(
        plan in proptest::collection::vec(planned_strategy(), 1..30)
    ) {
        let config = EngineConfig::default();
        let target = TargetDistribution { easy: 80.0, moderate: 5.0, hard: 15.0 };
        let report = distribution::evaluate(&plan, &target, &config);

        let sum = report.overall.easy + report.overall.moderate + report.overall.hard;
        prop_assert!((sum - 100.0).abs() < 1e-6);
        prop_assert!((0.0..=100.0).contains(&report.compliance));
    }
}
