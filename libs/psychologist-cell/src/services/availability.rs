use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use shared_models::auth::Actor;
use shared_models::error::ScheduleError;
use shared_utils::access::is_admin_or_owner;
use shared_utils::interval::{overlaps, TimeRange};
use shared_utils::lock::ScheduleLocks;
use shared_utils::time::{parse_time_of_day, validate_weekday};

use crate::models::{
    Availability, AvailabilityChanges, CreateAvailabilityRequest, NewAvailability,
    UpdateAvailabilityRequest,
};
use crate::store::AvailabilityStore;

const OVERLAP_MESSAGE: &str = "Availability overlaps with existing slot";

pub struct AvailabilityService {
    store: Arc<dyn AvailabilityStore>,
    locks: ScheduleLocks,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn AvailabilityStore>, locks: ScheduleLocks) -> Self {
        Self { store, locks }
    }

    /// Declares a weekly slot for `psychologist_id`.
    #[instrument(skip(self, request), fields(actor = %actor.id))]
    pub async fn create(
        &self,
        psychologist_id: &str,
        request: CreateAvailabilityRequest,
        actor: &Actor,
    ) -> Result<Availability, ScheduleError> {
        debug!("Creating availability for psychologist {}", psychologist_id);

        if !is_admin_or_owner(actor, psychologist_id) {
            warn!("{} may not manage availability of {}", actor.id, psychologist_id);
            return Err(ScheduleError::Forbidden);
        }

        let weekday = match request.weekday {
            Some(value) => parse_weekday(value)?,
            None => return Err(ScheduleError::InvalidInput("weekday is required".to_string())),
        };
        let start_time = required_time(request.start_time.as_deref(), "start")?;
        let end_time = required_time(request.end_time.as_deref(), "end")?;
        check_range(&start_time, &end_time)?;

        let _guard = self
            .locks
            .acquire(&ScheduleLocks::availability_key(psychologist_id))
            .await;

        self.ensure_free(psychologist_id, weekday, &start_time, &end_time, None)
            .await?;

        let created = self
            .store
            .insert(NewAvailability {
                psychologist_id: psychologist_id.to_string(),
                weekday,
                start_time,
                end_time,
            })
            .await
            .map_err(overlap_message)?;

        info!("Availability {} created for psychologist {}", created.id, psychologist_id);
        Ok(created)
    }

    /// Applies a partial change to an existing slot.
    #[instrument(skip(self, request), fields(actor = %actor.id))]
    pub async fn update(
        &self,
        id: &str,
        request: UpdateAvailabilityRequest,
        actor: &Actor,
    ) -> Result<Availability, ScheduleError> {
        debug!("Updating availability {}", id);

        let existing = self.load(id).await?;
        if !is_admin_or_owner(actor, &existing.psychologist_id) {
            warn!("{} may not modify availability {}", actor.id, id);
            return Err(ScheduleError::Forbidden);
        }

        if request.is_empty() {
            return Err(ScheduleError::InvalidInput("No fields to update".to_string()));
        }

        let weekday = match request.weekday {
            Some(value) => parse_weekday(value)?,
            None => existing.weekday,
        };
        let start_time = match request.start_time.as_deref() {
            Some(raw) => parse_time_of_day(raw, "start")?,
            None => existing.start_time,
        };
        let end_time = match request.end_time.as_deref() {
            Some(raw) => parse_time_of_day(raw, "end")?,
            None => existing.end_time,
        };
        check_range(&start_time, &end_time)?;

        let _guard = self
            .locks
            .acquire(&ScheduleLocks::availability_key(&existing.psychologist_id))
            .await;

        self.ensure_free(&existing.psychologist_id, weekday, &start_time, &end_time, Some(id))
            .await?;

        let updated = self
            .store
            .update(
                id,
                AvailabilityChanges {
                    weekday,
                    start_time,
                    end_time,
                },
            )
            .await
            .map_err(overlap_message)?;

        info!("Availability {} updated", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: &str, actor: &Actor) -> Result<(), ScheduleError> {
        debug!("Deleting availability {}", id);

        let existing = self.load(id).await?;
        if !is_admin_or_owner(actor, &existing.psychologist_id) {
            warn!("{} may not delete availability {}", actor.id, id);
            return Err(ScheduleError::Forbidden);
        }

        self.store.delete(id).await?;
        info!("Availability {} deleted", id);
        Ok(())
    }

    /// Public listing ordered by (weekday, start_time).
    pub async fn list_by_psychologist(&self, psychologist_id: &str) -> Result<Vec<Availability>, ScheduleError> {
        self.store.list_by_psychologist(psychologist_id).await
    }

    /// The slot of `psychologist_id` on `weekday` that fully covers the given
    /// time-of-day range, if any.
    pub async fn covering_window(
        &self,
        psychologist_id: &str,
        weekday: i16,
        start_time: &DateTime<Utc>,
        end_time: &DateTime<Utc>,
    ) -> Result<Option<Availability>, ScheduleError> {
        let Some(wanted) = TimeRange::new(*start_time, *end_time) else {
            return Ok(None);
        };

        let slots = self.store.list_for_weekday(psychologist_id, weekday, None).await?;
        Ok(slots.into_iter().find(|slot| {
            TimeRange::new(slot.start_time, slot.end_time).is_some_and(|window| window.contains(&wanted))
        }))
    }

    async fn load(&self, id: &str) -> Result<Availability, ScheduleError> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound("Availability".to_string()))
    }

    async fn ensure_free(
        &self,
        psychologist_id: &str,
        weekday: i16,
        start_time: &DateTime<Utc>,
        end_time: &DateTime<Utc>,
        exclude_id: Option<&str>,
    ) -> Result<(), ScheduleError> {
        let siblings = self
            .store
            .list_for_weekday(psychologist_id, weekday, exclude_id)
            .await?;

        if let Some(clash) = siblings
            .iter()
            .find(|slot| overlaps(&slot.start_time, &slot.end_time, start_time, end_time))
        {
            warn!(
                "Availability for {} on weekday {} overlaps slot {}",
                psychologist_id, weekday, clash.id
            );
            return Err(ScheduleError::Conflict(OVERLAP_MESSAGE.to_string()));
        }

        Ok(())
    }
}

fn parse_weekday(value: Result<i64, String>) -> Result<i16, ScheduleError> {
    match value {
        Ok(n) => validate_weekday(n),
        Err(raw) => Err(ScheduleError::InvalidInput(format!("Invalid weekday '{}'", raw))),
    }
}

fn required_time(raw: Option<&str>, label: &str) -> Result<DateTime<Utc>, ScheduleError> {
    match raw {
        Some(value) => parse_time_of_day(value, label),
        None => Err(ScheduleError::InvalidInput(format!("{}_time is required", label))),
    }
}

fn check_range(start_time: &DateTime<Utc>, end_time: &DateTime<Utc>) -> Result<(), ScheduleError> {
    if end_time <= start_time {
        return Err(ScheduleError::InvalidRange(
            "end_time must be after start_time".to_string(),
        ));
    }
    Ok(())
}

/// A storage-level exclusion hit reads the same as the service-level check.
fn overlap_message(error: ScheduleError) -> ScheduleError {
    match error {
        ScheduleError::Conflict(_) => ScheduleError::Conflict(OVERLAP_MESSAGE.to_string()),
        other => other,
    }
}
