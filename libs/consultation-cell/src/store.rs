use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_database::supabase::{return_representation, SupabaseClient};
use shared_models::error::ScheduleError;
use shared_utils::interval::overlaps;
use shared_utils::pagination::Pagination;

use crate::models::{
    Consultation, ConsultationChanges, ConsultationDetail, ConsultationFilter, ConsultationStatus,
    NewConsultation,
};

#[async_trait]
pub trait ConsultationStore: Send + Sync {
    async fn find(&self, id: &str) -> Result<Option<Consultation>, ScheduleError>;

    async fn find_detail(&self, id: &str) -> Result<Option<ConsultationDetail>, ScheduleError>;

    /// Scheduled or ongoing consultations of a psychologist, optionally leaving one out.
    async fn find_active(
        &self,
        psychologist_id: &str,
        exclude_id: Option<&str>,
    ) -> Result<Vec<Consultation>, ScheduleError>;

    /// Ordered by `scheduled_start_at`, newest first unless the filter asks
    /// otherwise. Returns the requested page and the total number of matching rows.
    async fn list(
        &self,
        filter: &ConsultationFilter,
        page: Option<Pagination>,
    ) -> Result<(Vec<ConsultationDetail>, u64), ScheduleError>;

    async fn insert(&self, consultation: NewConsultation) -> Result<Consultation, ScheduleError>;

    async fn update(&self, id: &str, changes: ConsultationChanges) -> Result<Consultation, ScheduleError>;
}

const CONSULTATIONS: &str = "/rest/v1/consultations";

/// Resource embedding for the collaborator records returned with a consultation.
const DETAIL_SELECT: &str =
    "*,patient:patients(*),psychologist:psychologists(*,user:users(*)),payments(*),review:reviews(*),stream_channel:stream_channels(*)";

pub struct SupabaseConsultationStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseConsultationStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn filter_query(filter: &ConsultationFilter) -> String {
        let mut query = String::new();
        if let Some(patient_id) = &filter.patient_id {
            query.push_str(&format!("&patient_id=eq.{}", urlencoding::encode(patient_id)));
        }
        if let Some(psychologist_id) = &filter.psychologist_id {
            query.push_str(&format!("&psychologist_id=eq.{}", urlencoding::encode(psychologist_id)));
        }
        if let Some(status) = filter.status {
            query.push_str(&format!("&status=eq.{}", status));
        }
        query
    }
}

#[async_trait]
impl ConsultationStore for SupabaseConsultationStore {
    async fn find(&self, id: &str) -> Result<Option<Consultation>, ScheduleError> {
        let path = format!("{}?id=eq.{}", CONSULTATIONS, urlencoding::encode(id));
        let rows: Vec<Consultation> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn find_detail(&self, id: &str) -> Result<Option<ConsultationDetail>, ScheduleError> {
        let path = format!(
            "{}?id=eq.{}&select={}",
            CONSULTATIONS,
            urlencoding::encode(id),
            DETAIL_SELECT
        );
        let rows: Vec<ConsultationDetail> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn find_active(
        &self,
        psychologist_id: &str,
        exclude_id: Option<&str>,
    ) -> Result<Vec<Consultation>, ScheduleError> {
        let mut path = format!(
            "{}?psychologist_id=eq.{}&status=in.(scheduled,ongoing)",
            CONSULTATIONS,
            urlencoding::encode(psychologist_id)
        );
        if let Some(id) = exclude_id {
            path.push_str(&format!("&id=neq.{}", urlencoding::encode(id)));
        }

        let rows: Vec<Consultation> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows)
    }

    async fn list(
        &self,
        filter: &ConsultationFilter,
        page: Option<Pagination>,
    ) -> Result<(Vec<ConsultationDetail>, u64), ScheduleError> {
        let direction = if filter.oldest_first { "asc" } else { "desc" };
        let mut path = format!(
            "{}?select={}&order=scheduled_start_at.{}{}",
            CONSULTATIONS,
            DETAIL_SELECT,
            direction,
            Self::filter_query(filter)
        );

        match page {
            Some(page) => {
                path.push_str(&format!("&limit={}&offset={}", page.take(), page.skip()));
                let (rows, total): (Vec<ConsultationDetail>, Option<u64>) =
                    self.supabase.request_with_count(&path, None).await?;
                let total = total.unwrap_or((page.skip() + rows.len()) as u64);
                Ok((rows, total))
            }
            None => {
                let rows: Vec<ConsultationDetail> = self.supabase.request(Method::GET, &path, None, None).await?;
                let total = rows.len() as u64;
                Ok((rows, total))
            }
        }
    }

    async fn insert(&self, consultation: NewConsultation) -> Result<Consultation, ScheduleError> {
        let now = Utc::now().to_rfc3339();
        let body = json!({
            "patient_id": consultation.patient_id,
            "psychologist_id": consultation.psychologist_id,
            "channel": consultation.channel,
            "status": consultation.status,
            "scheduled_start_at": consultation.scheduled_start_at.to_rfc3339(),
            "scheduled_end_at": consultation.scheduled_end_at.to_rfc3339(),
            "price": consultation.price,
            "patient_notes": consultation.patient_notes,
            "created_at": now,
            "updated_at": now
        });

        let rows: Vec<Consultation> = self
            .supabase
            .request_with_headers(Method::POST, CONSULTATIONS, None, Some(body), Some(return_representation()))
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| ScheduleError::Internal("Insert returned no consultation".to_string()))
    }

    async fn update(&self, id: &str, changes: ConsultationChanges) -> Result<Consultation, ScheduleError> {
        let path = format!("{}?id=eq.{}", CONSULTATIONS, urlencoding::encode(id));

        let mut body = serde_json::to_value(&changes).map_err(|e| ScheduleError::Internal(e.to_string()))?;
        if let Value::Object(fields) = &mut body {
            fields.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));
        }

        let rows: Vec<Consultation> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, None, Some(body), Some(return_representation()))
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| ScheduleError::NotFound("Consultation".to_string()))
    }
}

/// In-process store for local runs and tests. Writes that leave a row active
/// re-check overlap under the map's write lock, mirroring the database
/// exclusion constraint.
#[derive(Default)]
pub struct MemoryConsultationStore {
    rows: RwLock<HashMap<String, Consultation>>,
}

impl MemoryConsultationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn clashes(
    rows: &HashMap<String, Consultation>,
    psychologist_id: &str,
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
    exclude_id: Option<&str>,
) -> bool {
    rows.values().any(|row| {
        Some(row.id.as_str()) != exclude_id
            && row.psychologist_id == psychologist_id
            && row.status.is_active()
            && overlaps(&row.scheduled_start_at, &row.scheduled_end_at, start, end)
    })
}

fn storage_conflict() -> ScheduleError {
    ScheduleError::Conflict("Schedule conflict".to_string())
}

#[async_trait]
impl ConsultationStore for MemoryConsultationStore {
    async fn find(&self, id: &str) -> Result<Option<Consultation>, ScheduleError> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn find_detail(&self, id: &str) -> Result<Option<ConsultationDetail>, ScheduleError> {
        Ok(self.rows.read().await.get(id).cloned().map(ConsultationDetail::from))
    }

    async fn find_active(
        &self,
        psychologist_id: &str,
        exclude_id: Option<&str>,
    ) -> Result<Vec<Consultation>, ScheduleError> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|row| row.psychologist_id == psychologist_id && row.status.is_active())
            .filter(|row| Some(row.id.as_str()) != exclude_id)
            .cloned()
            .collect())
    }

    async fn list(
        &self,
        filter: &ConsultationFilter,
        page: Option<Pagination>,
    ) -> Result<(Vec<ConsultationDetail>, u64), ScheduleError> {
        let rows = self.rows.read().await;
        let mut matching: Vec<Consultation> = rows
            .values()
            .filter(|row| filter.patient_id.as_ref().map_or(true, |id| &row.patient_id == id))
            .filter(|row| filter.psychologist_id.as_ref().map_or(true, |id| &row.psychologist_id == id))
            .filter(|row| filter.status.map_or(true, |status| row.status == status))
            .cloned()
            .collect();
        if filter.oldest_first {
            matching.sort_by(|a, b| a.scheduled_start_at.cmp(&b.scheduled_start_at));
        } else {
            matching.sort_by(|a, b| b.scheduled_start_at.cmp(&a.scheduled_start_at));
        }

        let total = matching.len() as u64;
        let selected: Vec<ConsultationDetail> = match page {
            Some(page) => matching
                .into_iter()
                .skip(page.skip())
                .take(page.take())
                .map(ConsultationDetail::from)
                .collect(),
            None => matching.into_iter().map(ConsultationDetail::from).collect(),
        };

        Ok((selected, total))
    }

    async fn insert(&self, consultation: NewConsultation) -> Result<Consultation, ScheduleError> {
        let mut rows = self.rows.write().await;
        if consultation.status.is_active()
            && clashes(
                &rows,
                &consultation.psychologist_id,
                &consultation.scheduled_start_at,
                &consultation.scheduled_end_at,
                None,
            )
        {
            return Err(storage_conflict());
        }

        let now = Utc::now();
        let row = Consultation {
            id: Uuid::new_v4().to_string(),
            patient_id: consultation.patient_id,
            psychologist_id: consultation.psychologist_id,
            channel: consultation.channel,
            status: consultation.status,
            scheduled_start_at: consultation.scheduled_start_at,
            scheduled_end_at: consultation.scheduled_end_at,
            price: consultation.price,
            patient_notes: consultation.patient_notes,
            created_at: now,
            updated_at: now,
        };
        debug!("Stored consultation {} in memory", row.id);
        rows.insert(row.id.clone(), row.clone());
        Ok(row)
    }

    async fn update(&self, id: &str, changes: ConsultationChanges) -> Result<Consultation, ScheduleError> {
        let mut rows = self.rows.write().await;
        let current = rows
            .get(id)
            .cloned()
            .ok_or_else(|| ScheduleError::NotFound("Consultation".to_string()))?;

        let status: ConsultationStatus = changes.status.unwrap_or(current.status);
        let start = changes.scheduled_start_at.unwrap_or(current.scheduled_start_at);
        let end = changes.scheduled_end_at.unwrap_or(current.scheduled_end_at);

        if status.is_active() && clashes(&rows, &current.psychologist_id, &start, &end, Some(id)) {
            return Err(storage_conflict());
        }

        let row = rows
            .get_mut(id)
            .ok_or_else(|| ScheduleError::NotFound("Consultation".to_string()))?;
        row.status = status;
        row.scheduled_start_at = start;
        row.scheduled_end_at = end;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}
