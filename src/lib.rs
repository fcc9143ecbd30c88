// Library interface for the runsense engine
// Lets the CLI and integration tests share the core calculators

pub mod adaptation;
pub mod config;
pub mod distribution;
pub mod error;
pub mod load;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod recovery;
pub mod sessions;
pub mod weekly;
pub mod zones;

// Re-export commonly used types for convenience
pub use adaptation::{
    analyze_progress, AdaptationEngine, AdaptationPattern, InMemoryPatternStore,
    ModificationType, PatternStore, PerformanceTrend, PlanModification, Priority, ProgressData,
};
pub use config::EngineConfig;
pub use distribution::{evaluate as evaluate_intensity_distribution, IntensityReport};
pub use error::{Result, RunSenseError};
pub use load::{LoadTracker, TrainingLoad, TrendDirection};
pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
pub use metrics::{
    derive_training_paces, FitnessCalculator, FitnessMetrics, MetricsError, TrainingPaces,
};
pub use models::*;
pub use recovery::{compute_injury_risk, compute_recovery_score};
pub use weekly::{WeeklyPattern, WeeklyPatternAnalyzer};
pub use zones::{personalize_zones, zone_for_intensity, TrainingZone};
