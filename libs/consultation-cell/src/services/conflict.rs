use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use shared_models::error::ScheduleError;
use shared_utils::interval::overlaps;

use crate::models::Consultation;
use crate::store::ConsultationStore;

pub const CONFLICT_MESSAGE: &str = "Schedule conflict";

pub struct ConflictDetectionService {
    store: Arc<dyn ConsultationStore>,
}

impl ConflictDetectionService {
    pub fn new(store: Arc<dyn ConsultationStore>) -> Self {
        Self { store }
    }

    /// Active consultations of the psychologist that intersect `[start, end)`.
    pub async fn find_conflicts(
        &self,
        psychologist_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<&str>,
    ) -> Result<Vec<Consultation>, ScheduleError> {
        debug!(
            "Checking conflicts for psychologist {} from {} to {}",
            psychologist_id, start, end
        );

        let active = self.store.find_active(psychologist_id, exclude_id).await?;

        Ok(active
            .into_iter()
            .filter(|c| overlaps(&start, &end, &c.scheduled_start_at, &c.scheduled_end_at))
            .collect())
    }

    /// Fails with `Conflict` when any active booking intersects the range.
    pub async fn check_conflicts(
        &self,
        psychologist_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<&str>,
    ) -> Result<(), ScheduleError> {
        let conflicting = self
            .find_conflicts(psychologist_id, start, end, exclude_id)
            .await?;

        if !conflicting.is_empty() {
            warn!(
                "Conflict detected for psychologist {} - {} conflicting consultations",
                psychologist_id,
                conflicting.len()
            );
            return Err(ScheduleError::Conflict(CONFLICT_MESSAGE.to_string()));
        }

        Ok(())
    }
}
