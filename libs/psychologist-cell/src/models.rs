use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_utils::lenient;

/// The slice of a psychologist profile the scheduler reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Psychologist {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::opt_price")]
    pub price_chat: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_price")]
    pub price_video: Option<f64>,
}

/// A recurring weekly open slot. Times are anchored to 1970-01-01 UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(deserialize_with = "lenient::id")]
    pub psychologist_id: String,
    pub weekday: i16,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAvailabilityRequest {
    #[serde(default, deserialize_with = "lenient::opt_integer")]
    pub weekday: Option<Result<i64, String>>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAvailabilityRequest {
    #[serde(default, deserialize_with = "lenient::opt_integer")]
    pub weekday: Option<Result<i64, String>>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl UpdateAvailabilityRequest {
    pub fn is_empty(&self) -> bool {
        self.weekday.is_none() && self.start_time.is_none() && self.end_time.is_none()
    }
}

/// A validated slot ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAvailability {
    pub psychologist_id: String,
    pub weekday: i16,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// The merged, validated state of an availability after an update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityChanges {
    pub weekday: i16,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}
