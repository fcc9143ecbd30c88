//! Session log import
//!
//! Loads session histories and planned sessions from CSV or JSON files,
//! validates the records, and returns them sorted by date. The engine
//! itself never touches the filesystem; this module is the boundary the
//! CLI uses to feed it.

use serde::de::DeserializeOwned;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::models::{PlannedSession, SessionRecord};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported file extension for {0}; expected .csv or .json")]
    UnsupportedFormat(String),

    #[error("Invalid record on entry {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

/// Load a session history, dispatching on file extension.
pub fn load_sessions(path: &Path) -> Result<Vec<SessionRecord>, ImportError> {
    let mut sessions: Vec<SessionRecord> = match extension(path)?.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        other => return Err(ImportError::UnsupportedFormat(other.to_string())),
    };

    for (index, session) in sessions.iter().enumerate() {
        validate_session(index, session)?;
    }

    sessions.sort_by_key(|s| s.date);
    info!(count = sessions.len(), path = %path.display(), "loaded sessions");
    Ok(sessions)
}

/// Load planned sessions from a JSON file.
pub fn load_planned_sessions(path: &Path) -> Result<Vec<PlannedSession>, ImportError> {
    let mut sessions: Vec<PlannedSession> = load_json(path)?;

    for (index, session) in sessions.iter().enumerate() {
        if session.duration_min < 0.0 {
            return Err(ImportError::InvalidRecord {
                index,
                reason: format!("negative duration {}", session.duration_min),
            });
        }
        if session.intensity_percent < 0.0 {
            return Err(ImportError::InvalidRecord {
                index,
                reason: format!("negative intensity {}", session.intensity_percent),
            });
        }
    }

    sessions.sort_by_key(|s| s.date);
    Ok(sessions)
}

fn extension(path: &Path) -> Result<String, ImportError> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| ImportError::UnsupportedFormat(path.display().to_string()))
}

fn load_csv(path: &Path) -> Result<Vec<SessionRecord>, ImportError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for result in reader.deserialize() {
        records.push(result?);
    }
    Ok(records)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ImportError> {
    let text = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

fn validate_session(index: usize, session: &SessionRecord) -> Result<(), ImportError> {
    if session.distance_km < 0.0 {
        return Err(ImportError::InvalidRecord {
            index,
            reason: format!("negative distance {}", session.distance_km),
        });
    }
    if session.duration_min < 0.0 {
        return Err(ImportError::InvalidRecord {
            index,
            reason: format!("negative duration {}", session.duration_min),
        });
    }
    if let Some(effort) = session.perceived_effort {
        if !(1..=10).contains(&effort) {
            return Err(ImportError::InvalidRecord {
                index,
                reason: format!("perceived effort {} outside 1-10", effort),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(name: &str, content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_csv_sessions() {
        let csv = "\
date,distance_km,duration_min,avg_pace,avg_heart_rate,perceived_effort,is_race
2024-06-05,10.0,52.0,5.2,148,6,false
2024-06-03,5.0,24.5,,165,9,true
";
        let (_dir, path) = write_file("log.csv", csv);
        let sessions = load_sessions(&path).unwrap();

        assert_eq!(sessions.len(), 2);
        // Sorted by date
        assert!(sessions[0].date < sessions[1].date);
        assert!(sessions[0].is_race);
        assert_eq!(sessions[1].avg_heart_rate, Some(148));
    }

    #[test]
    fn test_load_json_sessions() {
        let json = r#"[
            {"date":"2024-06-03","distance_km":8.0,"duration_min":44.0,
             "avg_pace":null,"avg_heart_rate":null,"perceived_effort":5}
        ]"#;
        let (_dir, path) = write_file("log.json", json);
        let sessions = load_sessions(&path).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].perceived_effort, Some(5));
    }

    #[test]
    fn test_unsupported_extension() {
        let (_dir, path) = write_file("log.xml", "<sessions/>");
        assert!(matches!(
            load_sessions(&path),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_invalid_effort_rejected() {
        let json = r#"[
            {"date":"2024-06-03","distance_km":8.0,"duration_min":44.0,
             "avg_pace":null,"avg_heart_rate":null,"perceived_effort":11}
        ]"#;
        let (_dir, path) = write_file("log.json", json);
        assert!(matches!(
            load_sessions(&path),
            Err(ImportError::InvalidRecord { index: 0, .. })
        ));
    }

    #[test]
    fn test_negative_distance_rejected() {
        let csv = "\
date,distance_km,duration_min,avg_pace,avg_heart_rate,perceived_effort,is_race
2024-06-05,-1.0,52.0,,,,false
";
        let (_dir, path) = write_file("log.csv", csv);
        assert!(load_sessions(&path).is_err());
    }

    #[test]
    fn test_load_planned_sessions() {
        let json = r#"[
            {"date":"2024-06-04","duration_min":25.0,"intensity_percent":92.0,
             "description":"intervals"},
            {"date":"2024-06-03","duration_min":60.0,"intensity_percent":65.0}
        ]"#;
        let (_dir, path) = write_file("plan.json", json);
        let sessions = load_planned_sessions(&path).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].intensity_percent, 65.0);
        assert_eq!(sessions[1].description, "intervals");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_sessions(Path::new("/nonexistent/log.json"));
        assert!(matches!(result, Err(ImportError::Io { .. })));
    }
}
