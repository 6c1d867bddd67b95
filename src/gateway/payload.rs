//! Request and response bodies of the JSON API.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use super::error::GatewayError;
use crate::matching::{Preferences, Profile, ProfileVectorReport};
use crate::repair::{
    AnalysisResult, DuplicateMatch, ImageInput, IntakeOutcome, IntakeRequest, Location,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub my_profile: Profile,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub candidates: Vec<Profile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorGenerationRequest {
    pub user_id: i64,
    #[serde(default)]
    pub self_description: Option<String>,
    #[serde(default)]
    pub roommate_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VectorGenerationResponse {
    pub status: &'static str,
    pub message: String,
    pub details: ProfileVectorReport,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
/// Floors arrive as `3` or `"3"` (or `"B1"`).
pub enum FloorValue {
    Number(i64),
    Text(String),
}

impl FloorValue {
    fn into_string(self) -> String {
        match self {
            FloorValue::Number(n) => n.to_string(),
            FloorValue::Text(s) => s.trim().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RepairAnalyzeRequest {
    #[serde(rename = "imagePath", default)]
    pub image_path: Option<String>,
    #[serde(rename = "imageBase64", default)]
    pub image_base64: Option<String>,
    /// Image vector computed ahead of time.
    #[serde(default)]
    pub vector: Option<Vec<f32>>,
    #[serde(default)]
    pub building: String,
    pub floor: FloorValue,
    /// Absent or blank for a common area.
    #[serde(default)]
    pub room_number: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Same-building reports to check for duplicates.
    #[serde(rename = "existingReportIds", default)]
    pub existing_report_ids: Vec<u64>,
}

impl RepairAnalyzeRequest {
    /// Validates the image source and converts to a workflow request.
    pub fn into_intake_request(self) -> Result<IntakeRequest, GatewayError> {
        let image_path = non_blank(self.image_path);
        let image_base64 = non_blank(self.image_base64);

        let image = match (image_path, image_base64) {
            (Some(path), None) => ImageInput::Path(path.into()),
            (None, Some(encoded)) => ImageInput::Bytes(decode_image(&encoded)?),
            (Some(_), Some(_)) => {
                return Err(GatewayError::InvalidRequest(
                    "provide either imagePath or imageBase64, not both".to_string(),
                ));
            }
            (None, None) => {
                return Err(GatewayError::InvalidRequest(
                    "one of imagePath or imageBase64 is required".to_string(),
                ));
            }
        };

        let floor = self.floor.into_string();
        if floor.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "floor must not be empty".to_string(),
            ));
        }

        Ok(IntakeRequest {
            image,
            precomputed_vector: self.vector,
            location: Location::new(self.building.trim(), floor, non_blank(self.room_number)),
            description: non_blank(self.description),
            candidate_ids: self.existing_report_ids,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Decodes standard base64, accepting a `data:<mime>;base64,` prefix.
fn decode_image(encoded: &str) -> Result<Vec<u8>, GatewayError> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded,
    };

    BASE64
        .decode(payload.trim())
        .map_err(|e| GatewayError::InvalidRequest(format!("imageBase64 is not valid base64: {}", e)))
}

#[derive(Debug, Serialize)]
pub struct RepairAnalyzeResponse {
    pub analysis: Option<AnalysisResult>,
    pub duplicates: Vec<DuplicateMatch>,
    pub is_new: bool,
    pub report_id: Option<u64>,
}

impl From<IntakeOutcome> for RepairAnalyzeResponse {
    fn from(outcome: IntakeOutcome) -> Self {
        match outcome {
            IntakeOutcome::New {
                report_id,
                analysis,
            } => Self {
                analysis: Some(analysis),
                duplicates: Vec::new(),
                is_new: true,
                report_id: Some(report_id),
            },
            IntakeOutcome::Duplicate { matches } => Self {
                analysis: None,
                duplicates: matches,
                is_new: false,
                report_id: None,
            },
        }
    }
}
