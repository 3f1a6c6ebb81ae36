use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::score::{MetricConfig, Scores};

/// A scored event of a competition with its ordered metric slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Wod {
    pub wod_id: i32,
    pub competition_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(json)]
    pub metrics: Vec<MetricConfig>,
    pub display_order: i32,
}

impl Wod {
    /// Aligns a submitted score vector with this WOD's metrics.
    ///
    /// Each value is coerced to its slot's kind; trailing slots the caller
    /// left out stay absent. More values than metrics is an error.
    pub fn normalize_scores(&self, scores: Scores) -> Result<Scores, String> {
        if scores.len() > self.metrics.len() {
            return Err(format!(
                "WOD '{}' has {} metric(s) but {} score value(s) were given",
                self.name,
                self.metrics.len(),
                scores.len()
            ));
        }

        scores
            .into_iter()
            .zip(&self.metrics)
            .map(|(value, metric)| match value {
                Some(value) => value
                    .normalize(metric.kind)
                    .map_err(|e| format!("{}: {}", metric.label, e)),
                None => Ok(None),
            })
            .collect()
    }
}
