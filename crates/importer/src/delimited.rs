//! Bulk upload of one WOD's scores from a delimited text file.
//!
//! Expected layout, header line first:
//!
//! ```text
//! athlete;score_label;division
//! Ana Souza;12:31;RX
//! Bia Lima;245;Scaled
//! ```
//!
//! The division column is matched against the competition's division names
//! (trimmed, case-insensitive). The score label fills the WOD's first metric
//! slot and is kept verbatim as the submission's label.

use std::path::PathBuf;

use storage::{
    dto::submission::NewSubmission,
    models::{Division, ScoreValue, Wod},
    repository::{CompetitionRepository, SubmissionRepository},
    services::{leaderboard, submissions::normalize_submission},
};
use tracing::{debug, info, warn};

use crate::{ImportContext, ImportReport, ImporterError, Result, SubmissionImporter};

const COLUMNS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimitedRow {
    /// 1-based line in the source file
    pub line: usize,
    pub athlete: String,
    pub score_label: String,
    pub division: String,
}

/// Split the file into rows, skipping the header and blank lines.
pub fn parse_rows(content: &str, delimiter: char) -> Result<Vec<DelimitedRow>> {
    let mut rows = Vec::new();

    for (index, raw) in content.lines().enumerate().skip(1) {
        let line = index + 1;
        let raw = raw.trim_end_matches('\r');
        if raw.trim().is_empty() {
            continue;
        }

        let columns: Vec<&str> = raw.split(delimiter).map(str::trim).collect();
        if columns.len() != COLUMNS {
            return Err(ImporterError::RowError {
                line,
                message: format!(
                    "expected {} columns separated by '{}', found {}",
                    COLUMNS,
                    delimiter,
                    columns.len()
                ),
            });
        }

        rows.push(DelimitedRow {
            line,
            athlete: columns[0].to_string(),
            score_label: columns[1].to_string(),
            division: columns[2].to_string(),
        });
    }

    Ok(rows)
}

/// Turn parsed rows into normalized submissions for `wod`.
///
/// Every row is checked; all problems are reported together.
pub fn resolve_rows(
    rows: &[DelimitedRow],
    wod: &Wod,
    divisions: &[Division],
) -> Result<Vec<NewSubmission>> {
    let mut submissions = Vec::with_capacity(rows.len());
    let mut errors = Vec::new();

    for row in rows {
        let Some(division) = divisions
            .iter()
            .find(|d| d.name.trim().eq_ignore_ascii_case(&row.division))
        else {
            errors.push(format!("Line {}: unknown division '{}'", row.line, row.division));
            continue;
        };

        let candidate = NewSubmission {
            athlete: row.athlete.clone(),
            wod_id: wod.wod_id,
            division_id: division.division_id,
            scores: vec![Some(ScoreValue::from(row.score_label.as_str()))],
            score_label: Some(row.score_label.clone()),
        };

        match normalize_submission(wod, candidate) {
            Ok(submission) => submissions.push(submission),
            Err(e) => errors.push(format!("Line {}: {}", row.line, e)),
        }
    }

    if !errors.is_empty() {
        return Err(ImporterError::ValidationError(errors));
    }

    Ok(submissions)
}

/// Imports a delimited file into one WOD, then rebuilds the leaderboard once.
pub struct DelimitedImporter {
    path: PathBuf,
    wod_id: i32,
    delimiter: char,
}

impl DelimitedImporter {
    pub fn new(path: impl Into<PathBuf>, wod_id: i32, delimiter: char) -> Self {
        Self {
            path: path.into(),
            wod_id,
            delimiter,
        }
    }
}

#[async_trait::async_trait]
impl SubmissionImporter for DelimitedImporter {
    async fn import(&self, competition_handle: &str, context: &ImportContext) -> Result<ImportReport> {
        info!("Reading submissions from: {}", self.path.display());
        let content = tokio::fs::read_to_string(&self.path).await?;
        let rows = parse_rows(&content, self.delimiter)?;
        debug!(rows = rows.len(), "Parsed delimited file");

        let competitions = CompetitionRepository::new(&context.pool);
        let competition = competitions.find_by_handle(competition_handle).await?;
        let wod = competitions
            .find_wod(competition.competition_id, self.wod_id)
            .await?;
        let divisions = competitions
            .list_divisions(competition.competition_id)
            .await?;

        let submissions = resolve_rows(&rows, &wod, &divisions)?;

        let mut report = ImportReport {
            rows: rows.len(),
            ..ImportReport::default()
        };

        if context.validate_only {
            info!("{} row(s) valid for WOD '{}', nothing written", report.rows, wod.name);
            return Ok(report);
        }

        if submissions.is_empty() {
            warn!("No rows to import");
            return Ok(report);
        }

        let mut tx = context.pool.begin().await?;
        report.inserted = SubmissionRepository::new(&context.pool)
            .create_many(&submissions, &mut tx)
            .await?;
        tx.commit().await?;

        info!(
            competition = competition_handle,
            wod = %wod.name,
            inserted = report.inserted,
            "Submissions imported"
        );

        report.leaderboard_rows = leaderboard::rebuild(&context.pool, competition_handle).await?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use storage::models::{MetricConfig, MetricKind};
    use uuid::Uuid;

    use super::*;

    fn timed_wod() -> Wod {
        Wod {
            wod_id: 5,
            competition_id: Uuid::nil(),
            name: "24.1".to_string(),
            description: None,
            metrics: vec![MetricConfig::lower_is_better("Time", MetricKind::Time)],
            display_order: 0,
        }
    }

    fn divisions() -> Vec<Division> {
        ["RX", "Scaled"]
            .iter()
            .enumerate()
            .map(|(i, name)| Division {
                division_id: i as i32 + 1,
                competition_id: Uuid::nil(),
                name: name.to_string(),
                display_order: i as i32,
            })
            .collect()
    }

    #[test]
    fn test_parse_skips_header_and_blank_lines() {
        let content = "athlete;score;division\r\nAna; 12:31 ;RX\r\n\r\nBia;245;scaled\n";

        let rows = parse_rows(content, ';').unwrap();

        assert_eq!(
            rows,
            vec![
                DelimitedRow {
                    line: 2,
                    athlete: "Ana".to_string(),
                    score_label: "12:31".to_string(),
                    division: "RX".to_string(),
                },
                DelimitedRow {
                    line: 4,
                    athlete: "Bia".to_string(),
                    score_label: "245".to_string(),
                    division: "scaled".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_rejects_wrong_column_count() {
        let result = parse_rows("a,b,c\nAna,12:31\n", ',');

        assert!(matches!(result, Err(ImporterError::RowError { line: 2, .. })));
    }

    #[test]
    fn test_resolve_matches_divisions_and_parses_time() {
        let rows = parse_rows("h\nAna;12:31;rx\nBia;245;Scaled\n", ';').unwrap();

        let submissions = resolve_rows(&rows, &timed_wod(), &divisions()).unwrap();

        assert_eq!(submissions.len(), 2);
        assert_eq!(submissions[0].division_id, 1);
        assert_eq!(submissions[0].scores, vec![Some(ScoreValue::from(751))]);
        assert_eq!(submissions[0].score_label.as_deref(), Some("12:31"));
        assert_eq!(submissions[1].division_id, 2);
        assert_eq!(submissions[1].scores, vec![Some(ScoreValue::from(245))]);
    }

    #[test]
    fn test_resolve_reports_every_bad_row() {
        let rows = parse_rows("h\nAna;12:31;Masters\nBia;fast;RX\nCaio;10:00;RX\n", ';').unwrap();

        match resolve_rows(&rows, &timed_wod(), &divisions()) {
            Err(ImporterError::ValidationError(errors)) => {
                assert_eq!(errors.len(), 2);
                assert!(errors[0].starts_with("Line 2"));
                assert!(errors[1].starts_with("Line 3"));
            }
            other => panic!("expected validation errors, got {:?}", other),
        }
    }
}
