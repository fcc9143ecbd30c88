//! Weekly pattern analysis
//!
//! Groups a session history into Monday-start calendar weeks and reports
//! volume, frequency, week-over-week growth, and a consistency score.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::models::SessionRecord;

/// Aggregates for one calendar week
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySummary {
    /// Monday of the week
    pub week_start: NaiveDate,
    pub total_km: f64,
    pub total_duration_min: f64,
    pub session_count: usize,

    /// Distance-weighted average pace in min/km
    pub avg_pace: Option<Decimal>,
}

/// Multi-week training pattern
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyPattern {
    /// One summary per active week, oldest first. Empty weeks in the span
    /// are not materialized; the consistency score accounts for them.
    pub weeks: Vec<WeeklySummary>,

    /// Mean distance over active weeks
    pub avg_weekly_km: f64,

    /// Largest single-week distance
    pub peak_weekly_km: f64,

    /// Mean session count over active weeks
    pub avg_sessions_per_week: f64,

    /// Session count per weekday, Monday first
    pub day_frequency: [usize; 7],

    /// Most frequent training weekdays, one per average weekly session
    pub preferred_days: Vec<Weekday>,

    /// Weekday the athlete most often runs long (over 15 km)
    pub long_run_day: Option<Weekday>,

    /// Distance change from the previous week to the latest week, percent
    pub volume_growth_pct: f64,

    /// Share of calendar weeks in the span with at least one session (0-100)
    pub consistency_score: f64,
}

/// Distance above which a session counts as a long run (km)
const LONG_RUN_KM: f64 = 15.0;

/// Monday of the week containing `date`
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn weekday_from_index(days_from_monday: usize) -> Weekday {
    use Weekday::*;
    [Mon, Tue, Wed, Thu, Fri, Sat, Sun][days_from_monday]
}

fn group_by_week(sessions: &[SessionRecord]) -> BTreeMap<NaiveDate, Vec<&SessionRecord>> {
    let mut weeks: BTreeMap<NaiveDate, Vec<&SessionRecord>> = BTreeMap::new();
    for session in sessions {
        weeks.entry(week_start(session.date)).or_default().push(session);
    }
    weeks
}

/// Distance change from the previous active week to the latest, in percent.
/// Zero with fewer than two active weeks or a zero-distance previous week.
pub fn weekly_volume_growth_pct(sessions: &[SessionRecord]) -> f64 {
    let weeks = group_by_week(sessions);
    let volumes: Vec<f64> = weeks
        .values()
        .map(|w| w.iter().map(|s| s.distance_km).sum())
        .collect();

    match volumes.as_slice() {
        [.., previous, latest] if *previous > 0.0 => (latest - previous) / previous * 100.0,
        _ => 0.0,
    }
}

pub struct WeeklyPatternAnalyzer;

impl WeeklyPatternAnalyzer {
    /// Build the weekly pattern for a session history.
    pub fn analyze(sessions: &[SessionRecord]) -> WeeklyPattern {
        let grouped = group_by_week(sessions);

        let weeks: Vec<WeeklySummary> = grouped
            .iter()
            .map(|(&start, members)| Self::summarize(start, members))
            .collect();

        if weeks.is_empty() {
            return WeeklyPattern {
                weeks,
                avg_weekly_km: 0.0,
                peak_weekly_km: 0.0,
                avg_sessions_per_week: 0.0,
                day_frequency: [0; 7],
                preferred_days: Vec::new(),
                long_run_day: None,
                volume_growth_pct: 0.0,
                consistency_score: 0.0,
            };
        }

        let active = weeks.len() as f64;
        let avg_weekly_km = weeks.iter().map(|w| w.total_km).sum::<f64>() / active;
        let peak_weekly_km = weeks.iter().map(|w| w.total_km).fold(0.0, f64::max);
        let avg_sessions_per_week =
            weeks.iter().map(|w| w.session_count).sum::<usize>() as f64 / active;

        let day_frequency = Self::day_frequency(sessions);
        let preferred_days =
            Self::preferred_days(&day_frequency, avg_sessions_per_week.round() as usize);
        let long_run_day = Self::long_run_day(sessions);

        let first = weeks[0].week_start;
        let last = weeks[weeks.len() - 1].week_start;
        let span_weeks = ((last - first).num_days() / 7 + 1) as f64;
        let consistency_score = (active / span_weeks * 100.0).min(100.0);

        WeeklyPattern {
            volume_growth_pct: weekly_volume_growth_pct(sessions),
            weeks,
            avg_weekly_km,
            peak_weekly_km,
            avg_sessions_per_week,
            day_frequency,
            preferred_days,
            long_run_day,
            consistency_score,
        }
    }

    fn day_frequency(sessions: &[SessionRecord]) -> [usize; 7] {
        let mut counts = [0usize; 7];
        for session in sessions {
            counts[session.date.weekday().num_days_from_monday() as usize] += 1;
        }
        counts
    }

    /// Top-N weekdays by frequency, N being the rounded average sessions
    /// per week. Ties resolve to the earlier weekday.
    fn preferred_days(day_frequency: &[usize; 7], n: usize) -> Vec<Weekday> {
        let mut ranked: Vec<(usize, usize)> = day_frequency
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, count)| count > 0)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        ranked
            .into_iter()
            .take(n)
            .map(|(day, _)| weekday_from_index(day))
            .collect()
    }

    fn long_run_day(sessions: &[SessionRecord]) -> Option<Weekday> {
        let mut counts = [0usize; 7];
        for session in sessions.iter().filter(|s| s.distance_km > LONG_RUN_KM) {
            counts[session.date.weekday().num_days_from_monday() as usize] += 1;
        }
        counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .max_by_key(|&(_, &count)| count)
            .map(|(day, _)| weekday_from_index(day))
    }

    fn summarize(week_start: NaiveDate, members: &[&SessionRecord]) -> WeeklySummary {
        let total_km: f64 = members.iter().map(|s| s.distance_km).sum();
        let total_duration_min: f64 = members.iter().map(|s| s.duration_min).sum();

        // Distance-weighted pace so a short recovery jog does not skew
        // the week's average
        let avg_pace = if total_km > 0.0 {
            let weighted: f64 = members
                .iter()
                .filter_map(|s| {
                    let pace = s.effective_pace()?.to_f64()?;
                    Some(pace * s.distance_km)
                })
                .sum();
            Decimal::from_f64(weighted / total_km)
        } else {
            None
        };

        WeeklySummary {
            week_start,
            total_km,
            total_duration_min,
            session_count: members.len(),
            avg_pace,
        }
    }
}
