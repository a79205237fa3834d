use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use psychologist_cell::services::AvailabilityService;
use psychologist_cell::store::PsychologistDirectory;
use shared_config::SchedulingConfig;
use shared_models::auth::{Actor, Role};
use shared_models::error::ScheduleError;
use shared_utils::access::{can_book, can_cancel_consultation, can_see_consultation, is_admin_or_owner};
use shared_utils::lock::ScheduleLocks;
use shared_utils::pagination::Pagination;
use shared_utils::time::{on_reference_date, parse_timestamp, weekday_of};

use crate::models::{
    Consultation, ConsultationChanges, ConsultationChannel, ConsultationDetail, ConsultationFilter,
    ConsultationPage, ConsultationStatus, CreateConsultationRequest, NewConsultation,
    UpdateConsultationRequest,
};
use crate::services::conflict::{ConflictDetectionService, CONFLICT_MESSAGE};
use crate::services::lifecycle::ConsultationLifecycleService;
use crate::services::pricing::PricingService;
use crate::store::ConsultationStore;

pub struct ConsultationBookingService {
    store: Arc<dyn ConsultationStore>,
    pricing: PricingService,
    conflicts: ConflictDetectionService,
    lifecycle: ConsultationLifecycleService,
    availability: Arc<AvailabilityService>,
    locks: ScheduleLocks,
    enforce_availability: bool,
}

impl ConsultationBookingService {
    pub fn new(
        store: Arc<dyn ConsultationStore>,
        directory: Arc<dyn PsychologistDirectory>,
        availability: Arc<AvailabilityService>,
        locks: ScheduleLocks,
        config: &SchedulingConfig,
    ) -> Self {
        Self {
            pricing: PricingService::new(directory),
            conflicts: ConflictDetectionService::new(store.clone()),
            lifecycle: ConsultationLifecycleService::new(config.strict_transitions),
            store,
            availability,
            locks,
            enforce_availability: config.enforce_availability,
        }
    }

    /// Books a consultation. Patients book for themselves; admins may name
    /// the patient.
    #[instrument(skip(self, request), fields(actor = %actor.id))]
    pub async fn create_consultation(
        &self,
        actor: &Actor,
        request: CreateConsultationRequest,
    ) -> Result<Consultation, ScheduleError> {
        debug!("Creating consultation");

        if !can_book(actor) {
            warn!("{} ({}) may not book consultations", actor.id, actor.role);
            return Err(ScheduleError::Forbidden);
        }

        let psychologist_id = request
            .psychologist_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ScheduleError::InvalidInput("psychologist_id is required".to_string()))?;
        let channel = parse_channel(request.channel.as_deref())?;

        // Unknown psychologists are reported before any timestamp problem.
        let price = self.pricing.quote(&psychologist_id, channel).await?;

        let start = required_timestamp(request.scheduled_start_at.as_deref(), "scheduled_start_at")?;
        let end = required_timestamp(request.scheduled_end_at.as_deref(), "scheduled_end_at")?;

        let patient_id = match (actor.role, request.patient_id) {
            (Role::Admin, Some(patient_id)) => patient_id,
            _ => actor.id.clone(),
        };

        check_range(&start, &end)?;
        if self.enforce_availability {
            self.ensure_within_availability(&psychologist_id, &start, &end).await?;
        }

        let _guard = self
            .locks
            .acquire(&ScheduleLocks::consultation_key(&psychologist_id))
            .await;

        self.conflicts
            .check_conflicts(&psychologist_id, start, end, None)
            .await?;

        let consultation = self
            .store
            .insert(NewConsultation {
                patient_id,
                psychologist_id,
                channel,
                status: ConsultationStatus::Scheduled,
                scheduled_start_at: start,
                scheduled_end_at: end,
                price,
                patient_notes: request.patient_notes,
            })
            .await
            .map_err(schedule_conflict)?;

        info!(
            "Consultation {} booked with psychologist {} from {} to {}",
            consultation.id, consultation.psychologist_id, start, end
        );
        Ok(consultation)
    }

    /// Changes status and/or schedule on behalf of the owning psychologist or an admin.
    #[instrument(skip(self, request), fields(actor = %actor.id))]
    pub async fn update_consultation(
        &self,
        id: &str,
        actor: &Actor,
        request: UpdateConsultationRequest,
    ) -> Result<Consultation, ScheduleError> {
        debug!("Updating consultation {}", id);

        let existing = self.load(id).await?;
        if !is_admin_or_owner(actor, &existing.psychologist_id) {
            warn!("{} may not modify consultation {}", actor.id, id);
            return Err(ScheduleError::Forbidden);
        }

        if request.is_empty() {
            return Err(ScheduleError::InvalidInput("No fields to update".to_string()));
        }

        let requested_status = request
            .status
            .as_deref()
            .map(|raw| {
                raw.parse::<ConsultationStatus>()
                    .map_err(ScheduleError::InvalidInput)
            })
            .transpose()?;
        let requested_start = request
            .scheduled_start_at
            .as_deref()
            .map(|raw| parse_field(raw, "scheduled_start_at"))
            .transpose()?;
        let requested_end = request
            .scheduled_end_at
            .as_deref()
            .map(|raw| parse_field(raw, "scheduled_end_at"))
            .transpose()?;

        let _guard = self
            .locks
            .acquire(&ScheduleLocks::consultation_key(&existing.psychologist_id))
            .await;

        // Re-read under the lock so the checks below see the latest row.
        let current = self.load(id).await?;

        let next_status = requested_status.unwrap_or(current.status);
        self.lifecycle
            .validate_status_transition(current.status, next_status, actor)?;

        let mut changes = ConsultationChanges {
            status: requested_status,
            ..Default::default()
        };

        let start = requested_start.unwrap_or(current.scheduled_start_at);
        let end = requested_end.unwrap_or(current.scheduled_end_at);
        let rescheduled = request.touches_schedule();

        if rescheduled {
            check_range(&start, &end)?;

            if next_status.is_terminal() && self.lifecycle.is_strict() && !actor.is_admin() {
                return Err(ScheduleError::InvalidInput(format!(
                    "Cannot reschedule a {} consultation",
                    next_status
                )));
            }

            changes.scheduled_start_at = Some(start);
            changes.scheduled_end_at = Some(end);
        }

        let reactivated = current.status.is_terminal() && next_status.is_active();
        if next_status.is_active() && (rescheduled || reactivated) {
            if self.enforce_availability && rescheduled {
                self.ensure_within_availability(&current.psychologist_id, &start, &end)
                    .await?;
            }

            self.conflicts
                .check_conflicts(&current.psychologist_id, start, end, Some(id))
                .await?;
        }

        let updated = self
            .store
            .update(id, changes)
            .await
            .map_err(schedule_conflict)?;

        info!("Consultation {} updated (status {})", id, updated.status);
        Ok(updated)
    }

    /// Cancels on behalf of the booked patient or an admin. Cancelling an
    /// already cancelled consultation returns it unchanged.
    #[instrument(skip(self), fields(actor = %actor.id))]
    pub async fn cancel_consultation(&self, id: &str, actor: &Actor) -> Result<Consultation, ScheduleError> {
        debug!("Cancelling consultation {}", id);

        let existing = self.load(id).await?;
        if !can_cancel_consultation(actor, &existing) {
            warn!("{} may not cancel consultation {}", actor.id, id);
            return Err(ScheduleError::Forbidden);
        }

        let _guard = self
            .locks
            .acquire(&ScheduleLocks::consultation_key(&existing.psychologist_id))
            .await;

        let current = self.load(id).await?;
        if current.status == ConsultationStatus::Cancelled {
            debug!("Consultation {} already cancelled", id);
            return Ok(current);
        }

        self.lifecycle
            .validate_status_transition(current.status, ConsultationStatus::Cancelled, actor)?;

        let cancelled = self
            .store
            .update(
                id,
                ConsultationChanges {
                    status: Some(ConsultationStatus::Cancelled),
                    ..Default::default()
                },
            )
            .await?;

        info!("Consultation {} cancelled by {}", id, actor.id);
        Ok(cancelled)
    }

    pub async fn get_consultation(&self, id: &str, actor: &Actor) -> Result<ConsultationDetail, ScheduleError> {
        debug!("Fetching consultation {}", id);

        let detail = self
            .store
            .find_detail(id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound("Consultation".to_string()))?;

        if !can_see_consultation(actor, &detail) {
            warn!("{} may not view consultation {}", actor.id, id);
            return Err(ScheduleError::Forbidden);
        }

        Ok(detail)
    }

    /// The caller's consultations, newest first. Admins see every consultation.
    pub async fn list_my_consultations(
        &self,
        actor: &Actor,
        page: Option<Pagination>,
    ) -> Result<ConsultationPage, ScheduleError> {
        debug!("Listing consultations for {} ({})", actor.id, actor.role);

        let filter = match actor.role {
            Role::Patient => ConsultationFilter {
                patient_id: Some(actor.id.clone()),
                ..Default::default()
            },
            Role::Psychologist => ConsultationFilter {
                psychologist_id: Some(actor.id.clone()),
                ..Default::default()
            },
            Role::Admin => ConsultationFilter::default(),
        };

        let (items, total) = self.store.list(&filter, page).await?;

        Ok(ConsultationPage {
            items,
            meta: page.map(|p| p.info(total)),
        })
    }

    /// A psychologist's calendar, oldest first, optionally narrowed to one status.
    pub async fn list_for_psychologist(
        &self,
        psychologist_id: &str,
        status: Option<&str>,
        actor: &Actor,
    ) -> Result<Vec<ConsultationDetail>, ScheduleError> {
        debug!("Listing calendar of psychologist {}", psychologist_id);

        if !is_admin_or_owner(actor, psychologist_id) {
            warn!("{} may not view the calendar of {}", actor.id, psychologist_id);
            return Err(ScheduleError::Forbidden);
        }

        let status = status
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                raw.parse::<ConsultationStatus>()
                    .map_err(ScheduleError::InvalidInput)
            })
            .transpose()?;

        let filter = ConsultationFilter {
            psychologist_id: Some(psychologist_id.to_string()),
            status,
            oldest_first: true,
            ..Default::default()
        };

        let (items, _) = self.store.list(&filter, None).await?;
        Ok(items)
    }

    async fn load(&self, id: &str) -> Result<Consultation, ScheduleError> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound("Consultation".to_string()))
    }

    /// The booking must sit inside one declared weekly slot on the UTC
    /// weekday of its start, without crossing midnight.
    async fn ensure_within_availability(
        &self,
        psychologist_id: &str,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<(), ScheduleError> {
        if start.date_naive() != end.date_naive() {
            return Err(ScheduleError::InvalidInput(
                "Consultation must not cross midnight".to_string(),
            ));
        }

        let from = on_reference_date(start.time());
        let until = on_reference_date(end.time());

        let window = self
            .availability
            .covering_window(psychologist_id, weekday_of(start), &from, &until)
            .await?;

        if window.is_none() {
            warn!(
                "Requested time {} - {} is outside the availability of {}",
                start, end, psychologist_id
            );
            return Err(ScheduleError::InvalidInput(
                "Requested time is outside the psychologist's availability".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_channel(raw: Option<&str>) -> Result<ConsultationChannel, ScheduleError> {
    raw.ok_or_else(|| ScheduleError::InvalidInput("channel is required".to_string()))?
        .parse::<ConsultationChannel>()
        .map_err(ScheduleError::InvalidInput)
}

fn required_timestamp(raw: Option<&str>, field: &str) -> Result<DateTime<Utc>, ScheduleError> {
    match raw {
        Some(value) => parse_field(value, field),
        None => Err(ScheduleError::InvalidInput(format!("{} is required", field))),
    }
}

fn parse_field(raw: &str, field: &str) -> Result<DateTime<Utc>, ScheduleError> {
    parse_timestamp(raw).map_err(|_| ScheduleError::InvalidInput(format!("Invalid {}", field)))
}

fn check_range(start: &DateTime<Utc>, end: &DateTime<Utc>) -> Result<(), ScheduleError> {
    if end <= start {
        return Err(ScheduleError::InvalidRange("Invalid schedule range".to_string()));
    }
    Ok(())
}

/// A storage-level exclusion hit reads the same as the service-level check.
fn schedule_conflict(error: ScheduleError) -> ScheduleError {
    match error {
        ScheduleError::Conflict(_) => ScheduleError::Conflict(CONFLICT_MESSAGE.to_string()),
        other => other,
    }
}
