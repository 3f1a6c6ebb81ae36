use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Competition, Division, MetricConfig, Wod};

/// Request payload for creating a new competition
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCompetitionRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    /// Derived from the name when omitted
    #[validate(length(
        min = 1,
        max = 255,
        message = "Handle must be between 1 and 255 characters"
    ))]
    #[validate(custom(function = "validate_handle"))]
    pub handle: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub divisions: Vec<DivisionInput>,

    #[serde(default)]
    #[validate(nested)]
    pub wods: Vec<WodInput>,
}

/// Request payload for updating an existing competition.
///
/// Listed divisions and WODs with an id are updated in place, the others are
/// appended. Entities left out of the lists are kept.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCompetitionRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[validate(nested)]
    pub divisions: Option<Vec<DivisionInput>>,

    #[validate(nested)]
    pub wods: Option<Vec<WodInput>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DivisionInput {
    pub division_id: Option<i32>,

    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct WodInput {
    pub wod_id: Option<i32>,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    pub description: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, message = "A WOD needs at least one metric"))]
    pub metrics: Vec<MetricConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetitionResponse {
    pub competition_id: Uuid,
    pub name: String,
    pub handle: String,
    pub created_at: chrono::NaiveDateTime,
}

/// Competition with its divisions and WODs, both in display order
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetitionDetailResponse {
    #[serde(flatten)]
    pub competition: CompetitionResponse,
    pub divisions: Vec<Division>,
    pub wods: Vec<Wod>,
}

fn validate_handle(handle: &str) -> Result<(), validator::ValidationError> {
    let is_valid = handle
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !handle.starts_with('-')
        && !handle.ends_with('-')
        && !handle.contains("--");

    if is_valid {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_handle"))
    }
}

/// Builds a URL handle from a competition name: lowercase ASCII letters and
/// digits, everything else collapsed into single hyphens.
pub fn derive_handle(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

impl CreateCompetitionRequest {
    /// The handle to store: the explicit one, or one derived from the name
    pub fn resolved_handle(&self) -> Result<String, &'static str> {
        let handle = match &self.handle {
            Some(handle) => handle.clone(),
            None => derive_handle(&self.name),
        };

        if handle.is_empty() {
            return Err("Cannot derive a handle from the competition name");
        }

        Ok(handle)
    }
}

impl From<Competition> for CompetitionResponse {
    fn from(comp: Competition) -> Self {
        Self {
            competition_id: comp.competition_id,
            name: comp.name,
            handle: comp.handle,
            created_at: comp.created_at,
        }
    }
}
