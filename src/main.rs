use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tabled::{Table, Tabled};

use runsense::adaptation::{AdaptationEngine, InMemoryPatternStore};
use runsense::config::EngineConfig;
use runsense::load::LoadTracker;
use runsense::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use runsense::metrics::{derive_training_paces, threshold_pace_from_index, FitnessCalculator};
use runsense::models::{Methodology, PlanContext, RecoveryMetrics, TargetDistribution, TrainingPhase};
use runsense::weekly::WeeklyPatternAnalyzer;
use runsense::{distribution, sessions, zones};

/// runsense - Running Fitness & Adaptive Load CLI
///
/// Computes fitness metrics, training load, personalized zones, intensity
/// distribution reports, and adaptive plan suggestions from a session log.
#[derive(Parser)]
#[command(name = "runsense")]
#[command(version = "0.1.0")]
#[command(about = "Running fitness metrics and adaptive load analysis", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format (pretty, json, compact)
    #[arg(long, default_value = "compact")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute fitness metrics from a session log
    Metrics {
        /// Session log (CSV or JSON)
        #[arg(short, long)]
        sessions: PathBuf,
    },

    /// Show acute/chronic training load and trend
    Load {
        /// Session log (CSV or JSON)
        #[arg(short, long)]
        sessions: PathBuf,

        /// Threshold pace in min/km (derived from the log if omitted)
        #[arg(short, long)]
        threshold_pace: Option<f64>,

        /// Show the trailing load series
        #[arg(long, default_value = "0")]
        history: usize,
    },

    /// Personalize the seven training zones
    Zones {
        /// Maximum heart rate in bpm
        #[arg(short, long)]
        max_hr: u16,

        /// Aerobic index the threshold pace is derived from
        #[arg(short, long)]
        aerobic_index: f64,
    },

    /// Derive the five training paces from an aerobic index
    Paces {
        /// Aerobic index (valid range 30-85)
        #[arg(short, long)]
        aerobic_index: f64,
    },

    /// Analyze weekly training patterns
    Weekly {
        /// Session log (CSV or JSON)
        #[arg(short, long)]
        sessions: PathBuf,
    },

    /// Check a plan's intensity distribution against its target
    Distribution {
        /// Planned sessions (JSON)
        #[arg(short, long)]
        plan: PathBuf,

        /// Training methodology (polarized, pyramidal, threshold)
        #[arg(short, long, default_value = "polarized")]
        methodology: String,

        /// Training phase (base, build, peak, taper, recovery)
        #[arg(long, default_value = "build")]
        phase: String,
    },

    /// Suggest plan modifications from progress and recovery data
    Suggest {
        /// Plan context (JSON)
        #[arg(long)]
        plan: PathBuf,

        /// Completed sessions (CSV or JSON)
        #[arg(long)]
        completed: PathBuf,

        /// Planned sessions (JSON)
        #[arg(long)]
        planned: PathBuf,

        /// Recovery metrics (JSON)
        #[arg(long)]
        recovery: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig {
        level: LogLevel::from_verbosity(cli.verbose),
        format: cli.log_format,
        include_spans: false,
    };
    init_logging(&log_config)?;

    let config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::load_or_default()?,
    };

    match cli.command {
        Commands::Metrics { sessions } => cmd_metrics(&config, &sessions),
        Commands::Load {
            sessions,
            threshold_pace,
            history,
        } => cmd_load(&config, &sessions, threshold_pace, history),
        Commands::Zones {
            max_hr,
            aerobic_index,
        } => cmd_zones(&config, max_hr, aerobic_index),
        Commands::Paces { aerobic_index } => cmd_paces(&config, aerobic_index),
        Commands::Weekly { sessions } => cmd_weekly(&sessions),
        Commands::Distribution {
            plan,
            methodology,
            phase,
        } => cmd_distribution(&config, &plan, &methodology, &phase),
        Commands::Suggest {
            plan,
            completed,
            planned,
            recovery,
        } => cmd_suggest(&config, &plan, &completed, &planned, recovery.as_deref()),
    }
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn cmd_metrics(config: &EngineConfig, path: &std::path::Path) -> Result<()> {
    let sessions = sessions::load_sessions(path)?;
    let metrics = FitnessCalculator::new(config.clone()).compute(&sessions);

    println!("{}", "Fitness Metrics".bold());
    let rows = vec![
        MetricRow {
            name: "Aerobic index".to_string(),
            value: format!("{:.1}", metrics.aerobic_index),
        },
        MetricRow {
            name: "Critical speed".to_string(),
            value: format!("{:.1} km/h", metrics.critical_speed_kmh),
        },
        MetricRow {
            name: "Running economy".to_string(),
            value: format!("{:.0} ml/kg/km", metrics.running_economy),
        },
        MetricRow {
            name: "Threshold pace".to_string(),
            value: format_pace(metrics.lactate_threshold_pace),
        },
        MetricRow {
            name: "Training load (acute)".to_string(),
            value: format!("{:.0}", metrics.training_load),
        },
        MetricRow {
            name: "Recovery score".to_string(),
            value: score_colored(metrics.recovery_score, true),
        },
        MetricRow {
            name: "Injury risk".to_string(),
            value: score_colored(metrics.injury_risk, false),
        },
    ];
    println!("{}", Table::new(rows));
    Ok(())
}

#[derive(Tabled)]
struct LoadRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "TSS")]
    tss: String,
    #[tabled(rename = "Acute")]
    acute: String,
    #[tabled(rename = "Chronic")]
    chronic: String,
}

fn cmd_load(
    config: &EngineConfig,
    path: &std::path::Path,
    threshold_pace: Option<f64>,
    history: usize,
) -> Result<()> {
    let sessions = sessions::load_sessions(path)?;

    let pace = match threshold_pace {
        Some(p) => Decimal::from_f64(p)
            .filter(|p| *p > Decimal::ZERO)
            .context("Threshold pace must be a positive number")?,
        None => {
            let calc = FitnessCalculator::new(config.clone());
            let index = calc.aerobic_index(&sessions);
            threshold_pace_from_index(index, &config.metrics)
        }
    };

    let tracker = LoadTracker::new(config.load.clone());
    let load = tracker.compute(&sessions, pace);

    println!("{}", "Training Load".bold());
    println!("  Acute:   {:.0}", load.acute);
    println!("  Chronic: {:.0}", load.chronic);
    println!("  Ratio:   {:.2} ({:?})", load.ratio, load.trend);
    println!("  {}", load.recommendation.cyan());

    if history > 0 {
        let series = tracker.series(&sessions, pace);
        let rows: Vec<LoadRow> = series
            .iter()
            .rev()
            .take(history)
            .rev()
            .map(|p| LoadRow {
                date: p.date.to_string(),
                tss: format!("{:.0}", p.tss),
                acute: format!("{:.0}", p.acute),
                chronic: format!("{:.0}", p.chronic),
            })
            .collect();
        println!("{}", Table::new(rows));
    }
    Ok(())
}

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "Zone")]
    number: u8,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Heart Rate")]
    hr: String,
    #[tabled(rename = "Pace")]
    pace: String,
    #[tabled(rename = "RPE")]
    rpe: String,
    #[tabled(rename = "Purpose")]
    purpose: String,
}

fn cmd_zones(config: &EngineConfig, max_hr: u16, aerobic_index: f64) -> Result<()> {
    // Validate the index through the same gate as pace derivation
    derive_training_paces(aerobic_index, &config.metrics)?;
    let threshold_pace = threshold_pace_from_index(aerobic_index, &config.metrics);

    let rows: Vec<ZoneRow> = zones::personalize_zones(max_hr, threshold_pace)
        .into_iter()
        .map(|z| ZoneRow {
            number: z.number,
            name: z.name,
            hr: format!("{}-{} bpm", z.min_hr, z.max_hr),
            pace: format!("{}-{}", format_pace(z.fast_pace), format_pace(z.slow_pace)),
            rpe: format!("{}-{}", z.min_rpe, z.max_rpe),
            purpose: z.purpose,
        })
        .collect();

    println!("{}", "Training Zones".bold());
    println!("{}", Table::new(rows));
    Ok(())
}

fn cmd_paces(config: &EngineConfig, aerobic_index: f64) -> Result<()> {
    let paces = derive_training_paces(aerobic_index, &config.metrics)?;

    println!("{}", "Training Paces".bold());
    println!("  Easy:       {}", format_pace(paces.easy));
    println!("  Marathon:   {}", format_pace(paces.marathon));
    println!("  Threshold:  {}", format_pace(paces.threshold));
    println!("  Interval:   {}", format_pace(paces.interval));
    println!("  Repetition: {}", format_pace(paces.repetition));
    Ok(())
}

#[derive(Tabled)]
struct WeekRow {
    #[tabled(rename = "Week of")]
    week: String,
    #[tabled(rename = "Distance")]
    km: String,
    #[tabled(rename = "Sessions")]
    count: usize,
    #[tabled(rename = "Avg Pace")]
    pace: String,
}

fn cmd_weekly(path: &std::path::Path) -> Result<()> {
    let sessions = sessions::load_sessions(path)?;
    let pattern = WeeklyPatternAnalyzer::analyze(&sessions);

    let rows: Vec<WeekRow> = pattern
        .weeks
        .iter()
        .map(|w| WeekRow {
            week: w.week_start.to_string(),
            km: format!("{:.1} km", w.total_km),
            count: w.session_count,
            pace: w.avg_pace.map(format_pace).unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    println!("{}", "Weekly Pattern".bold());
    println!("{}", Table::new(rows));
    println!(
        "  Average: {:.1} km/week over {:.1} sessions, peak {:.1} km",
        pattern.avg_weekly_km, pattern.avg_sessions_per_week, pattern.peak_weekly_km
    );
    println!(
        "  Consistency: {:.0}%  Volume growth: {:+.1}%",
        pattern.consistency_score, pattern.volume_growth_pct
    );
    if !pattern.preferred_days.is_empty() {
        let days: Vec<String> = pattern.preferred_days.iter().map(|d| d.to_string()).collect();
        println!("  Preferred days: {}", days.join(", "));
    }
    if let Some(day) = pattern.long_run_day {
        println!("  Long-run day: {}", day);
    }
    Ok(())
}

fn cmd_distribution(
    config: &EngineConfig,
    plan_path: &std::path::Path,
    methodology: &str,
    phase: &str,
) -> Result<()> {
    let plan = sessions::load_planned_sessions(plan_path)?;
    let methodology = Methodology::from_str_loose(methodology)?;
    let phase = TrainingPhase::from_str_loose(phase)?;
    let target = TargetDistribution::for_phase(methodology, phase);

    let report = distribution::evaluate(&plan, &target, config);

    println!("{}", "Intensity Distribution".bold());
    println!(
        "  Actual: {:.0}/{:.0}/{:.0}  Target: {:.0}/{:.0}/{:.0} (easy/moderate/hard)",
        report.overall.easy,
        report.overall.moderate,
        report.overall.hard,
        report.target.easy,
        report.target.moderate,
        report.target.hard,
    );
    println!("  Compliance: {}", score_colored(report.compliance, true));

    for violation in &report.violations {
        println!(
            "  {} {} bucket off target by {:+.0} points",
            "violation:".red().bold(),
            violation.bucket,
            violation.deviation_pct
        );
    }
    for rec in &report.recommendations {
        println!("  {} {}", "->".yellow(), rec);
    }
    Ok(())
}

fn cmd_suggest(
    config: &EngineConfig,
    plan_path: &std::path::Path,
    completed_path: &std::path::Path,
    planned_path: &std::path::Path,
    recovery_path: Option<&std::path::Path>,
) -> Result<()> {
    let plan: PlanContext = read_json(plan_path)?;
    let completed = sessions::load_sessions(completed_path)?;
    let planned = sessions::load_planned_sessions(planned_path)?;
    let recovery: Option<RecoveryMetrics> = match recovery_path {
        Some(path) => Some(read_json(path)?),
        None => None,
    };

    let progress = runsense::adaptation::analyze_progress(&completed, &planned);
    let engine = AdaptationEngine::new(
        config.adaptation.clone(),
        Arc::new(InMemoryPatternStore::new()),
    );
    let modifications = engine.suggest(
        &plan,
        &progress,
        recovery.as_ref(),
        Utc::now().date_naive(),
    );

    println!("{}", "Plan Suggestions".bold());
    println!(
        "  Adherence: {:.0}%  Trend: {:?}",
        progress.adherence_rate, progress.performance_trend
    );

    if modifications.is_empty() {
        println!("  {}", "No changes needed; keep executing the plan".green());
        return Ok(());
    }

    for m in &modifications {
        let priority = match m.priority {
            runsense::adaptation::Priority::High => "HIGH".red().bold(),
            runsense::adaptation::Priority::Medium => "MEDIUM".yellow().bold(),
            runsense::adaptation::Priority::Low => "LOW".green().bold(),
        };
        println!("  [{}] {:?}: {}", priority, m.modification_type, m.reason);
        println!("        {}", serde_json::to_string(&m.suggested_changes)?);
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Format a min/km pace as M:SS
fn format_pace(pace: Decimal) -> String {
    let total = pace.to_f64().unwrap_or(0.0);
    let minutes = total.floor() as u32;
    let seconds = ((total - minutes as f64) * 60.0).round() as u32;
    if seconds == 60 {
        format!("{}:00/km", minutes + 1)
    } else {
        format!("{}:{:02}/km", minutes, seconds)
    }
}

fn score_colored(score: f64, higher_is_better: bool) -> String {
    let text = format!("{:.0}/100", score);
    let good = if higher_is_better { score >= 70.0 } else { score < 40.0 };
    let bad = if higher_is_better { score < 40.0 } else { score >= 70.0 };
    if good {
        text.green().to_string()
    } else if bad {
        text.red().to_string()
    } else {
        text.yellow().to_string()
    }
}
