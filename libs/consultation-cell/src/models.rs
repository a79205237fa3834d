use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shared_utils::access::ConsultationParties;
use shared_utils::lenient;
use shared_utils::pagination::PageInfo;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationChannel {
    Chat,
    Video,
}

impl fmt::Display for ConsultationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsultationChannel::Chat => write!(f, "chat"),
            ConsultationChannel::Video => write!(f, "video"),
        }
    }
}

impl FromStr for ConsultationChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(ConsultationChannel::Chat),
            "video" => Ok(ConsultationChannel::Video),
            other => Err(format!("Unknown channel '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationStatus {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
    NoShow,
    Refunded,
}

impl ConsultationStatus {
    pub const ACTIVE: [ConsultationStatus; 2] = [ConsultationStatus::Scheduled, ConsultationStatus::Ongoing];

    /// Active bookings occupy the psychologist's calendar.
    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

impl fmt::Display for ConsultationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsultationStatus::Scheduled => write!(f, "scheduled"),
            ConsultationStatus::Ongoing => write!(f, "ongoing"),
            ConsultationStatus::Completed => write!(f, "completed"),
            ConsultationStatus::Cancelled => write!(f, "cancelled"),
            ConsultationStatus::NoShow => write!(f, "no_show"),
            ConsultationStatus::Refunded => write!(f, "refunded"),
        }
    }
}

impl FromStr for ConsultationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(ConsultationStatus::Scheduled),
            "ongoing" => Ok(ConsultationStatus::Ongoing),
            "completed" => Ok(ConsultationStatus::Completed),
            "cancelled" => Ok(ConsultationStatus::Cancelled),
            "no_show" => Ok(ConsultationStatus::NoShow),
            "refunded" => Ok(ConsultationStatus::Refunded),
            other => Err(format!("Unknown status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consultation {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(deserialize_with = "lenient::id")]
    pub patient_id: String,
    #[serde(deserialize_with = "lenient::id")]
    pub psychologist_id: String,
    pub channel: ConsultationChannel,
    pub status: ConsultationStatus,
    pub scheduled_start_at: DateTime<Utc>,
    pub scheduled_end_at: DateTime<Utc>,
    /// Snapshot of the psychologist's price when the booking was made.
    #[serde(default, deserialize_with = "lenient::opt_price")]
    pub price: Option<f64>,
    #[serde(default)]
    pub patient_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConsultationParties for Consultation {
    fn patient_id(&self) -> &str {
        &self.patient_id
    }

    fn psychologist_id(&self) -> &str {
        &self.psychologist_id
    }
}

/// A consultation with the collaborator records embedded by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultationDetail {
    #[serde(flatten)]
    pub consultation: Consultation,
    #[serde(default)]
    pub patient: Option<Value>,
    #[serde(default)]
    pub psychologist: Option<Value>,
    #[serde(default)]
    pub payments: Vec<Value>,
    #[serde(default)]
    pub review: Option<Value>,
    #[serde(default)]
    pub stream_channel: Option<Value>,
}

impl From<Consultation> for ConsultationDetail {
    fn from(consultation: Consultation) -> Self {
        Self {
            consultation,
            patient: None,
            psychologist: None,
            payments: Vec::new(),
            review: None,
            stream_channel: None,
        }
    }
}

impl ConsultationParties for ConsultationDetail {
    fn patient_id(&self) -> &str {
        &self.consultation.patient_id
    }

    fn psychologist_id(&self) -> &str {
        &self.consultation.psychologist_id
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Raw booking payload; fields are validated by the booking service so every
/// malformed value surfaces as the same error kind.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateConsultationRequest {
    #[serde(default, deserialize_with = "lenient::opt_id")]
    pub psychologist_id: Option<String>,
    pub channel: Option<String>,
    pub scheduled_start_at: Option<String>,
    pub scheduled_end_at: Option<String>,
    pub patient_notes: Option<String>,
    /// Honored only for admins booking on behalf of a patient.
    #[serde(default, deserialize_with = "lenient::opt_id")]
    pub patient_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateConsultationRequest {
    pub status: Option<String>,
    pub scheduled_start_at: Option<String>,
    pub scheduled_end_at: Option<String>,
}

impl UpdateConsultationRequest {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.scheduled_start_at.is_none() && self.scheduled_end_at.is_none()
    }

    pub fn touches_schedule(&self) -> bool {
        self.scheduled_start_at.is_some() || self.scheduled_end_at.is_some()
    }
}

// ==============================================================================
// STORE MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewConsultation {
    pub patient_id: String,
    pub psychologist_id: String,
    pub channel: ConsultationChannel,
    pub status: ConsultationStatus,
    pub scheduled_start_at: DateTime<Utc>,
    pub scheduled_end_at: DateTime<Utc>,
    pub price: Option<f64>,
    pub patient_notes: Option<String>,
}

/// Fields to overwrite; `updated_at` is always refreshed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsultationChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ConsultationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_start_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_end_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsultationFilter {
    pub patient_id: Option<String>,
    pub psychologist_id: Option<String>,
    pub status: Option<ConsultationStatus>,
    /// Order by `scheduled_start_at` ascending instead of newest first.
    pub oldest_first: bool,
}

/// `?status=` on a psychologist's calendar.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarQuery {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsultationPage {
    pub items: Vec<ConsultationDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageInfo>,
}
