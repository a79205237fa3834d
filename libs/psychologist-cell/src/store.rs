use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_database::supabase::{return_representation, SupabaseClient};
use shared_models::error::ScheduleError;
use shared_utils::interval::overlaps;

use crate::models::{Availability, AvailabilityChanges, NewAvailability, Psychologist};

/// Read-only lookup of psychologist records.
#[async_trait]
pub trait PsychologistDirectory: Send + Sync {
    async fn find_psychologist(&self, id: &str) -> Result<Option<Psychologist>, ScheduleError>;
}

#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    async fn find(&self, id: &str) -> Result<Option<Availability>, ScheduleError>;

    /// Slots of one psychologist on one weekday, optionally leaving one out.
    async fn list_for_weekday(
        &self,
        psychologist_id: &str,
        weekday: i16,
        exclude_id: Option<&str>,
    ) -> Result<Vec<Availability>, ScheduleError>;

    /// All slots of a psychologist ordered by (weekday, start_time).
    async fn list_by_psychologist(&self, psychologist_id: &str) -> Result<Vec<Availability>, ScheduleError>;

    async fn insert(&self, availability: NewAvailability) -> Result<Availability, ScheduleError>;

    async fn update(&self, id: &str, changes: AvailabilityChanges) -> Result<Availability, ScheduleError>;

    async fn delete(&self, id: &str) -> Result<(), ScheduleError>;
}

const AVAILABILITIES: &str = "/rest/v1/availabilities";
const PSYCHOLOGISTS: &str = "/rest/v1/psychologists";

pub struct SupabaseAvailabilityStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAvailabilityStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl AvailabilityStore for SupabaseAvailabilityStore {
    async fn find(&self, id: &str) -> Result<Option<Availability>, ScheduleError> {
        let path = format!("{}?id=eq.{}", AVAILABILITIES, urlencoding::encode(id));
        let rows: Vec<Availability> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn list_for_weekday(
        &self,
        psychologist_id: &str,
        weekday: i16,
        exclude_id: Option<&str>,
    ) -> Result<Vec<Availability>, ScheduleError> {
        let mut path = format!(
            "{}?psychologist_id=eq.{}&weekday=eq.{}",
            AVAILABILITIES,
            urlencoding::encode(psychologist_id),
            weekday
        );
        if let Some(id) = exclude_id {
            path.push_str(&format!("&id=neq.{}", urlencoding::encode(id)));
        }

        let rows: Vec<Availability> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows)
    }

    async fn list_by_psychologist(&self, psychologist_id: &str) -> Result<Vec<Availability>, ScheduleError> {
        let path = format!(
            "{}?psychologist_id=eq.{}&order=weekday.asc,start_time.asc",
            AVAILABILITIES,
            urlencoding::encode(psychologist_id)
        );
        let rows: Vec<Availability> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows)
    }

    async fn insert(&self, availability: NewAvailability) -> Result<Availability, ScheduleError> {
        let now = Utc::now();
        let body = json!({
            "psychologist_id": availability.psychologist_id,
            "weekday": availability.weekday,
            "start_time": availability.start_time.to_rfc3339(),
            "end_time": availability.end_time.to_rfc3339(),
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let rows: Vec<Availability> = self
            .supabase
            .request_with_headers(Method::POST, AVAILABILITIES, None, Some(body), Some(return_representation()))
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| ScheduleError::Internal("Insert returned no availability".to_string()))
    }

    async fn update(&self, id: &str, changes: AvailabilityChanges) -> Result<Availability, ScheduleError> {
        let path = format!("{}?id=eq.{}", AVAILABILITIES, urlencoding::encode(id));
        let body = json!({
            "weekday": changes.weekday,
            "start_time": changes.start_time.to_rfc3339(),
            "end_time": changes.end_time.to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let rows: Vec<Availability> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, None, Some(body), Some(return_representation()))
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| ScheduleError::NotFound("Availability".to_string()))
    }

    async fn delete(&self, id: &str) -> Result<(), ScheduleError> {
        let path = format!("{}?id=eq.{}", AVAILABILITIES, urlencoding::encode(id));
        self.supabase.execute(Method::DELETE, &path, None, None).await?;
        Ok(())
    }
}

pub struct SupabasePsychologistDirectory {
    supabase: Arc<SupabaseClient>,
}

impl SupabasePsychologistDirectory {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl PsychologistDirectory for SupabasePsychologistDirectory {
    async fn find_psychologist(&self, id: &str) -> Result<Option<Psychologist>, ScheduleError> {
        let path = format!(
            "{}?id=eq.{}&select=id,price_chat,price_video",
            PSYCHOLOGISTS,
            urlencoding::encode(id)
        );
        let rows: Vec<Psychologist> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows.into_iter().next())
    }
}

/// In-process store for local runs and tests. Writes re-check overlap under
/// the map's write lock, mirroring the database exclusion constraint.
#[derive(Default)]
pub struct MemoryAvailabilityStore {
    rows: RwLock<HashMap<String, Availability>>,
}

impl MemoryAvailabilityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn clashes(rows: &HashMap<String, Availability>, candidate: &NewAvailability, exclude_id: Option<&str>) -> bool {
    rows.values().any(|row| {
        Some(row.id.as_str()) != exclude_id
            && row.psychologist_id == candidate.psychologist_id
            && row.weekday == candidate.weekday
            && overlaps(&row.start_time, &row.end_time, &candidate.start_time, &candidate.end_time)
    })
}

fn sort_slots(rows: &mut [Availability]) {
    rows.sort_by(|a, b| (a.weekday, a.start_time).cmp(&(b.weekday, b.start_time)));
}

#[async_trait]
impl AvailabilityStore for MemoryAvailabilityStore {
    async fn find(&self, id: &str) -> Result<Option<Availability>, ScheduleError> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn list_for_weekday(
        &self,
        psychologist_id: &str,
        weekday: i16,
        exclude_id: Option<&str>,
    ) -> Result<Vec<Availability>, ScheduleError> {
        let rows = self.rows.read().await;
        let mut matching: Vec<Availability> = rows
            .values()
            .filter(|row| row.psychologist_id == psychologist_id && row.weekday == weekday)
            .filter(|row| Some(row.id.as_str()) != exclude_id)
            .cloned()
            .collect();
        sort_slots(&mut matching);
        Ok(matching)
    }

    async fn list_by_psychologist(&self, psychologist_id: &str) -> Result<Vec<Availability>, ScheduleError> {
        let rows = self.rows.read().await;
        let mut matching: Vec<Availability> = rows
            .values()
            .filter(|row| row.psychologist_id == psychologist_id)
            .cloned()
            .collect();
        sort_slots(&mut matching);
        Ok(matching)
    }

    async fn insert(&self, availability: NewAvailability) -> Result<Availability, ScheduleError> {
        let mut rows = self.rows.write().await;
        if clashes(&rows, &availability, None) {
            return Err(ScheduleError::Conflict("Schedule conflict".to_string()));
        }

        let now = Utc::now();
        let row = Availability {
            id: Uuid::new_v4().to_string(),
            psychologist_id: availability.psychologist_id,
            weekday: availability.weekday,
            start_time: availability.start_time,
            end_time: availability.end_time,
            created_at: now,
            updated_at: now,
        };
        debug!("Stored availability {} in memory", row.id);
        rows.insert(row.id.clone(), row.clone());
        Ok(row)
    }

    async fn update(&self, id: &str, changes: AvailabilityChanges) -> Result<Availability, ScheduleError> {
        let mut rows = self.rows.write().await;
        let owner = rows
            .get(id)
            .map(|row| row.psychologist_id.clone())
            .ok_or_else(|| ScheduleError::NotFound("Availability".to_string()))?;

        let candidate = NewAvailability {
            psychologist_id: owner,
            weekday: changes.weekday,
            start_time: changes.start_time,
            end_time: changes.end_time,
        };
        if clashes(&rows, &candidate, Some(id)) {
            return Err(ScheduleError::Conflict("Schedule conflict".to_string()));
        }

        let row = rows
            .get_mut(id)
            .ok_or_else(|| ScheduleError::NotFound("Availability".to_string()))?;
        row.weekday = changes.weekday;
        row.start_time = changes.start_time;
        row.end_time = changes.end_time;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), ScheduleError> {
        self.rows.write().await.remove(id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPsychologistDirectory {
    psychologists: RwLock<HashMap<String, Psychologist>>,
}

impl MemoryPsychologistDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_psychologists(psychologists: impl IntoIterator<Item = Psychologist>) -> Self {
        Self {
            psychologists: RwLock::new(
                psychologists
                    .into_iter()
                    .map(|p| (p.id.clone(), p))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl PsychologistDirectory for MemoryPsychologistDirectory {
    async fn find_psychologist(&self, id: &str) -> Result<Option<Psychologist>, ScheduleError> {
        Ok(self.psychologists.read().await.get(id).cloned())
    }
}
