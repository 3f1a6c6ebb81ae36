use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::dto::common::{PaginationParams, default_page, default_page_size};
use crate::models::{Scores, Submission};

/// Request payload for recording a score
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateSubmissionRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Athlete must be between 1 and 255 characters"
    ))]
    pub athlete: String,

    pub wod_id: i32,

    pub division_id: i32,

    /// One value per WOD metric, in metric order. Time slots accept `mm:ss`.
    #[serde(default)]
    #[schema(value_type = Vec<Value>)]
    pub scores: Scores,

    #[validate(length(max = 255))]
    pub score_label: Option<String>,
}

/// Request payload for correcting a score; omitted fields are kept
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateSubmissionRequest {
    #[validate(length(min = 1, max = 255))]
    pub athlete: Option<String>,

    pub wod_id: Option<i32>,

    pub division_id: Option<i32>,

    #[schema(value_type = Option<Vec<Value>>)]
    pub scores: Option<Scores>,

    #[validate(length(max = 255))]
    pub score_label: Option<String>,
}

/// A validated submission ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    pub athlete: String,
    pub wod_id: i32,
    pub division_id: i32,
    pub scores: Scores,
    pub score_label: Option<String>,
}

/// Query string of the submission list.
///
/// Paging fields are inlined rather than flattened: query strings only carry
/// text and flattened numeric fields fail to deserialize.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubmissionFilter {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    pub wod_id: Option<i32>,
    pub division_id: Option<i32>,
    /// Exact athlete name
    pub athlete: Option<String>,
}

impl SubmissionFilter {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

impl From<CreateSubmissionRequest> for NewSubmission {
    fn from(req: CreateSubmissionRequest) -> Self {
        Self {
            athlete: req.athlete,
            wod_id: req.wod_id,
            division_id: req.division_id,
            scores: req.scores,
            score_label: req.score_label,
        }
    }
}

impl UpdateSubmissionRequest {
    /// Overlay the provided fields on an existing submission.
    ///
    /// Moving to another WOD without new scores keeps the old vector; it is
    /// re-checked against the new WOD's metrics before writing.
    pub fn apply_to(self, existing: &Submission) -> NewSubmission {
        NewSubmission {
            athlete: self.athlete.unwrap_or_else(|| existing.athlete.clone()),
            wod_id: self.wod_id.unwrap_or(existing.wod_id),
            division_id: self.division_id.unwrap_or(existing.division_id),
            scores: self.scores.unwrap_or_else(|| existing.scores.clone()),
            score_label: self.score_label.or_else(|| existing.score_label.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::models::ScoreValue;

    fn existing() -> Submission {
        Submission {
            submission_id: 7,
            athlete: "Ana".to_string(),
            wod_id: 1,
            division_id: 2,
            scores: vec![Some(ScoreValue::from(300))],
            score_label: Some("5:00".to_string()),
            submitted_at: DateTime::<Utc>::default(),
        }
    }

    #[test]
    fn test_update_keeps_omitted_fields() {
        let update: UpdateSubmissionRequest =
            serde_json::from_value(serde_json::json!({ "scores": ["4:30"] })).unwrap();

        let merged = update.apply_to(&existing());

        assert_eq!(merged.athlete, "Ana");
        assert_eq!(merged.wod_id, 1);
        assert_eq!(merged.division_id, 2);
        assert_eq!(merged.scores, vec![Some(ScoreValue::from("4:30"))]);
        assert_eq!(merged.score_label.as_deref(), Some("5:00"));
    }

    #[test]
    fn test_create_request_accepts_mixed_scores() {
        let req: CreateSubmissionRequest = serde_json::from_value(serde_json::json!({
            "athlete": "Bia",
            "wod_id": 3,
            "division_id": 1,
            "scores": [120, null, "12:30"]
        }))
        .unwrap();

        assert!(req.validate().is_ok());
        let new = NewSubmission::from(req);
        assert_eq!(new.scores.len(), 3);
        assert_eq!(new.scores[1], None);
    }

    #[test]
    fn test_filter_defaults() {
        let filter: SubmissionFilter = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(filter.pagination().page, 1);
        assert_eq!(filter.pagination().page_size, 50);
        assert!(filter.wod_id.is_none());
    }

    #[test]
    fn test_blank_athlete_is_rejected() {
        let req: CreateSubmissionRequest = serde_json::from_value(serde_json::json!({
            "athlete": "",
            "wod_id": 3,
            "division_id": 1
        }))
        .unwrap();

        assert!(req.validate().is_err());
    }
}
