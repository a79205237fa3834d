use std::sync::Arc;

use assert_matches::assert_matches;
use futures::future::join_all;

use consultation_cell::models::{
    ConsultationChannel, ConsultationStatus, CreateConsultationRequest, UpdateConsultationRequest,
};
use consultation_cell::services::ConsultationBookingService;
use consultation_cell::store::{ConsultationStore, MemoryConsultationStore};
use psychologist_cell::models::{CreateAvailabilityRequest, Psychologist};
use psychologist_cell::services::AvailabilityService;
use psychologist_cell::store::{MemoryAvailabilityStore, MemoryPsychologistDirectory};
use shared_config::SchedulingConfig;
use shared_models::auth::Actor;
use shared_models::error::ScheduleError;
use shared_utils::lock::ScheduleLocks;
use shared_utils::pagination::Pagination;

const PSY: &str = "psy-1";
const PATIENT: &str = "pat-1";

struct Harness {
    booking: Arc<ConsultationBookingService>,
    availability: Arc<AvailabilityService>,
    store: Arc<MemoryConsultationStore>,
}

fn harness_with(config: SchedulingConfig) -> Harness {
    let locks = ScheduleLocks::new();
    let store = Arc::new(MemoryConsultationStore::new());
    let directory = Arc::new(MemoryPsychologistDirectory::with_psychologists([
        Psychologist {
            id: PSY.to_string(),
            price_chat: Some(50.0),
            price_video: Some(120.0),
        },
        Psychologist {
            id: "psy-free".to_string(),
            price_chat: None,
            price_video: None,
        },
    ]));
    let availability = Arc::new(AvailabilityService::new(
        Arc::new(MemoryAvailabilityStore::new()),
        locks.clone(),
    ));
    let booking = Arc::new(ConsultationBookingService::new(
        store.clone(),
        directory,
        availability.clone(),
        locks,
        &config,
    ));

    Harness {
        booking,
        availability,
        store,
    }
}

fn harness() -> Harness {
    harness_with(SchedulingConfig::default())
}

fn booking(channel: &str, start: &str, end: &str) -> CreateConsultationRequest {
    CreateConsultationRequest {
        psychologist_id: Some(PSY.to_string()),
        channel: Some(channel.to_string()),
        scheduled_start_at: Some(start.to_string()),
        scheduled_end_at: Some(end.to_string()),
        patient_notes: None,
        patient_id: None,
    }
}

fn reschedule(start: &str, end: &str) -> UpdateConsultationRequest {
    UpdateConsultationRequest {
        scheduled_start_at: Some(start.to_string()),
        scheduled_end_at: Some(end.to_string()),
        ..Default::default()
    }
}

fn set_status(status: &str) -> UpdateConsultationRequest {
    UpdateConsultationRequest {
        status: Some(status.to_string()),
        ..Default::default()
    }
}

fn patient() -> Actor {
    Actor::patient(PATIENT)
}

fn psychologist() -> Actor {
    Actor::psychologist(PSY)
}

fn admin() -> Actor {
    Actor::admin("root")
}

#[tokio::test]
async fn video_booking_takes_video_price_and_blocks_overlap() {
    let h = harness();

    let first = h
        .booking
        .create_consultation(
            &patient(),
            booking("video", "2025-01-10T09:00:00Z", "2025-01-10T10:00:00Z"),
        )
        .await
        .unwrap();

    assert_eq!(first.price, Some(120.0));
    assert_eq!(first.channel, ConsultationChannel::Video);
    assert_eq!(first.status, ConsultationStatus::Scheduled);
    assert_eq!(first.patient_id, PATIENT);

    let second = h
        .booking
        .create_consultation(
            &Actor::patient("pat-2"),
            booking("chat", "2025-01-10T09:30:00Z", "2025-01-10T10:30:00Z"),
        )
        .await;
    assert_matches!(second, Err(ScheduleError::Conflict(msg)) if msg == "Schedule conflict");
}

#[tokio::test]
async fn back_to_back_bookings_are_fine() {
    let h = harness();

    h.booking
        .create_consultation(&patient(), booking("chat", "2025-01-10T09:00:00Z", "2025-01-10T10:00:00Z"))
        .await
        .unwrap();
    let next = h
        .booking
        .create_consultation(&patient(), booking("chat", "2025-01-10T10:00:00Z", "2025-01-10T11:00:00Z"))
        .await
        .unwrap();

    assert_eq!(next.price, Some(50.0));
}

#[tokio::test]
async fn missing_price_is_stored_as_null() {
    let h = harness();
    let created = h
        .booking
        .create_consultation(
            &patient(),
            CreateConsultationRequest {
                psychologist_id: Some("psy-free".to_string()),
                ..booking("chat", "2025-01-10T09:00:00Z", "2025-01-10T10:00:00Z")
            },
        )
        .await
        .unwrap();

    assert_eq!(created.price, None);
}

#[tokio::test]
async fn cancelled_bookings_free_the_slot() {
    let h = harness();

    let first = h
        .booking
        .create_consultation(&patient(), booking("video", "2025-01-10T09:00:00Z", "2025-01-10T10:00:00Z"))
        .await
        .unwrap();

    let cancelled = h.booking.cancel_consultation(&first.id, &admin()).await.unwrap();
    assert_eq!(cancelled.status, ConsultationStatus::Cancelled);

    let retry = h
        .booking
        .create_consultation(
            &Actor::patient("pat-2"),
            booking("video", "2025-01-10T09:30:00Z", "2025-01-10T10:30:00Z"),
        )
        .await;
    assert!(retry.is_ok());
}

#[tokio::test]
async fn terminal_bookings_do_not_block_but_active_ones_do() {
    let h = harness();

    let done = h
        .booking
        .create_consultation(&patient(), booking("chat", "2025-01-11T09:00:00Z", "2025-01-11T10:00:00Z"))
        .await
        .unwrap();
    h.booking
        .update_consultation(&done.id, &psychologist(), set_status("completed"))
        .await
        .unwrap();

    let ongoing = h
        .booking
        .create_consultation(&patient(), booking("chat", "2025-01-11T11:00:00Z", "2025-01-11T12:00:00Z"))
        .await
        .unwrap();
    h.booking
        .update_consultation(&ongoing.id, &psychologist(), set_status("ongoing"))
        .await
        .unwrap();

    assert!(h
        .booking
        .create_consultation(&patient(), booking("chat", "2025-01-11T09:15:00Z", "2025-01-11T09:45:00Z"))
        .await
        .is_ok());
    assert_matches!(
        h.booking
            .create_consultation(&patient(), booking("chat", "2025-01-11T11:30:00Z", "2025-01-11T12:30:00Z"))
            .await,
        Err(ScheduleError::Conflict(_))
    );
}

#[tokio::test]
async fn rescheduling_into_an_active_booking_changes_nothing() {
    let h = harness();

    let a = h
        .booking
        .create_consultation(&patient(), booking("chat", "2025-01-12T09:00:00Z", "2025-01-12T10:00:00Z"))
        .await
        .unwrap();
    let b = h
        .booking
        .create_consultation(&patient(), booking("chat", "2025-01-12T11:00:00Z", "2025-01-12T12:00:00Z"))
        .await
        .unwrap();

    let result = h
        .booking
        .update_consultation(
            &b.id,
            &psychologist(),
            reschedule("2025-01-12T09:30:00Z", "2025-01-12T10:30:00Z"),
        )
        .await;
    assert_matches!(result, Err(ScheduleError::Conflict(_)));

    assert_eq!(h.store.find(&a.id).await.unwrap().unwrap(), a);
    assert_eq!(h.store.find(&b.id).await.unwrap().unwrap(), b);
}

#[tokio::test]
async fn rescheduling_excludes_itself() {
    let h = harness();

    let a = h
        .booking
        .create_consultation(&patient(), booking("chat", "2025-01-12T09:00:00Z", "2025-01-12T10:00:00Z"))
        .await
        .unwrap();

    let moved = h
        .booking
        .update_consultation(
            &a.id,
            &psychologist(),
            UpdateConsultationRequest {
                scheduled_end_at: Some("2025-01-12T10:30:00Z".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(moved.scheduled_start_at, a.scheduled_start_at);
    assert_eq!(moved.scheduled_end_at.to_rfc3339(), "2025-01-12T10:30:00+00:00");
    assert!(moved.updated_at >= a.updated_at);
}

#[tokio::test]
async fn concurrent_overlapping_creates_have_one_winner() {
    let h = harness();

    let attempts = (0..8).map(|i| {
        let booking_service = h.booking.clone();
        async move {
            booking_service
                .create_consultation(
                    &Actor::patient(format!("pat-{}", i)),
                    booking("video", "2025-02-01T15:00:00Z", "2025-02-01T16:00:00Z"),
                )
                .await
        }
    });

    let results = join_all(attempts).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, ScheduleError::Conflict(_))));
}

#[tokio::test]
async fn concurrent_creates_on_spawned_tasks_have_one_winner() {
    let h = harness();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let booking_service = h.booking.clone();
            tokio::spawn(async move {
                booking_service
                    .create_consultation(
                        &Actor::patient(format!("pat-{}", i)),
                        booking("chat", "2025-02-02T08:00:00Z", "2025-02-02T08:45:00Z"),
                    )
                    .await
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(e) => assert_matches!(e, ScheduleError::Conflict(_)),
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn strict_transitions_block_psychologist_but_not_admin() {
    let h = harness();

    let c = h
        .booking
        .create_consultation(&patient(), booking("chat", "2025-03-01T09:00:00Z", "2025-03-01T10:00:00Z"))
        .await
        .unwrap();
    h.booking
        .update_consultation(&c.id, &psychologist(), set_status("completed"))
        .await
        .unwrap();

    assert_matches!(
        h.booking
            .update_consultation(&c.id, &psychologist(), set_status("scheduled"))
            .await,
        Err(ScheduleError::InvalidInput(_))
    );

    // Another booking now occupies the slot; reactivation would double-book.
    let other = h
        .booking
        .create_consultation(&Actor::patient("pat-2"), booking("chat", "2025-03-01T09:30:00Z", "2025-03-01T10:30:00Z"))
        .await
        .unwrap();
    assert_matches!(
        h.booking.update_consultation(&c.id, &admin(), set_status("scheduled")).await,
        Err(ScheduleError::Conflict(_))
    );

    h.booking.cancel_consultation(&other.id, &admin()).await.unwrap();
    let reactivated = h
        .booking
        .update_consultation(&c.id, &admin(), set_status("scheduled"))
        .await
        .unwrap();
    assert_eq!(reactivated.status, ConsultationStatus::Scheduled);
}

#[tokio::test]
async fn lenient_transitions_allow_any_move() {
    let h = harness_with(SchedulingConfig {
        strict_transitions: false,
        ..SchedulingConfig::default()
    });

    let c = h
        .booking
        .create_consultation(&patient(), booking("chat", "2025-03-02T09:00:00Z", "2025-03-02T10:00:00Z"))
        .await
        .unwrap();
    h.booking
        .update_consultation(&c.id, &psychologist(), set_status("refunded"))
        .await
        .unwrap();
    let back = h
        .booking
        .update_consultation(&c.id, &psychologist(), set_status("scheduled"))
        .await
        .unwrap();

    assert_eq!(back.status, ConsultationStatus::Scheduled);
}

#[tokio::test]
async fn rescheduling_a_terminal_booking_needs_admin() {
    let h = harness();

    let c = h
        .booking
        .create_consultation(&patient(), booking("chat", "2025-03-03T09:00:00Z", "2025-03-03T10:00:00Z"))
        .await
        .unwrap();
    h.booking.cancel_consultation(&c.id, &patient()).await.unwrap();

    assert_matches!(
        h.booking
            .update_consultation(&c.id, &psychologist(), reschedule("2025-03-04T09:00:00Z", "2025-03-04T10:00:00Z"))
            .await,
        Err(ScheduleError::InvalidInput(_))
    );
    assert!(h
        .booking
        .update_consultation(&c.id, &admin(), reschedule("2025-03-04T09:00:00Z", "2025-03-04T10:00:00Z"))
        .await
        .is_ok());
}

#[tokio::test]
async fn update_validation_and_authorization() {
    let h = harness();
    let c = h
        .booking
        .create_consultation(&patient(), booking("chat", "2025-03-05T09:00:00Z", "2025-03-05T10:00:00Z"))
        .await
        .unwrap();

    assert_matches!(
        h.booking
            .update_consultation(&c.id, &Actor::psychologist("psy-2"), set_status("ongoing"))
            .await,
        Err(ScheduleError::Forbidden)
    );
    assert_matches!(
        h.booking.update_consultation(&c.id, &patient(), set_status("ongoing")).await,
        Err(ScheduleError::Forbidden)
    );
    assert_matches!(
        h.booking.update_consultation("missing", &admin(), set_status("ongoing")).await,
        Err(ScheduleError::NotFound(what)) if what == "Consultation"
    );
    assert_matches!(
        h.booking
            .update_consultation(&c.id, &psychologist(), UpdateConsultationRequest::default())
            .await,
        Err(ScheduleError::InvalidInput(_))
    );
    assert_matches!(
        h.booking.update_consultation(&c.id, &psychologist(), set_status("postponed")).await,
        Err(ScheduleError::InvalidInput(_))
    );
    assert_matches!(
        h.booking
            .update_consultation(
                &c.id,
                &psychologist(),
                UpdateConsultationRequest {
                    scheduled_end_at: Some("2025-03-05T08:00:00Z".to_string()),
                    ..Default::default()
                }
            )
            .await,
        Err(ScheduleError::InvalidRange(_))
    );
}

#[tokio::test]
async fn create_validation_and_authorization() {
    let h = harness();

    assert_matches!(
        h.booking
            .create_consultation(&psychologist(), booking("chat", "2025-04-01T09:00:00Z", "2025-04-01T10:00:00Z"))
            .await,
        Err(ScheduleError::Forbidden)
    );
    assert_matches!(
        h.booking
            .create_consultation(&patient(), booking("phone", "2025-04-01T09:00:00Z", "2025-04-01T10:00:00Z"))
            .await,
        Err(ScheduleError::InvalidInput(_))
    );
    assert_matches!(
        h.booking
            .create_consultation(&patient(), booking("chat", "not a date", "2025-04-01T10:00:00Z"))
            .await,
        Err(ScheduleError::InvalidInput(_))
    );
    assert_matches!(
        h.booking
            .create_consultation(&patient(), booking("chat", "2025-04-01T10:00:00Z", "2025-04-01T10:00:00Z"))
            .await,
        Err(ScheduleError::InvalidRange(_))
    );
    assert_matches!(
        h.booking
            .create_consultation(
                &patient(),
                CreateConsultationRequest {
                    psychologist_id: Some("ghost".to_string()),
                    ..booking("chat", "2025-04-01T09:00:00Z", "2025-04-01T10:00:00Z")
                }
            )
            .await,
        Err(ScheduleError::NotFound(what)) if what == "Psychologist"
    );
}

#[tokio::test]
async fn patient_id_is_only_honored_for_admins() {
    let h = harness();

    let by_admin = h
        .booking
        .create_consultation(
            &admin(),
            CreateConsultationRequest {
                patient_id: Some("pat-9".to_string()),
                ..booking("chat", "2025-04-02T09:00:00Z", "2025-04-02T10:00:00Z")
            },
        )
        .await
        .unwrap();
    assert_eq!(by_admin.patient_id, "pat-9");

    let by_patient = h
        .booking
        .create_consultation(
            &patient(),
            CreateConsultationRequest {
                patient_id: Some("pat-9".to_string()),
                ..booking("chat", "2025-04-02T11:00:00Z", "2025-04-02T12:00:00Z")
            },
        )
        .await
        .unwrap();
    assert_eq!(by_patient.patient_id, PATIENT);
}

#[tokio::test]
async fn cancellation_rules() {
    let h = harness();
    let c = h
        .booking
        .create_consultation(&patient(), booking("chat", "2025-04-03T09:00:00Z", "2025-04-03T10:00:00Z"))
        .await
        .unwrap();

    assert_matches!(
        h.booking.cancel_consultation(&c.id, &psychologist()).await,
        Err(ScheduleError::Forbidden)
    );
    assert_matches!(
        h.booking.cancel_consultation(&c.id, &Actor::patient("pat-2")).await,
        Err(ScheduleError::Forbidden)
    );
    assert_matches!(
        h.booking.cancel_consultation("missing", &admin()).await,
        Err(ScheduleError::NotFound(_))
    );

    let first = h.booking.cancel_consultation(&c.id, &patient()).await.unwrap();
    let again = h.booking.cancel_consultation(&c.id, &patient()).await.unwrap();
    assert_eq!(first, again);
}

#[tokio::test]
async fn completed_bookings_cannot_be_cancelled_by_patients() {
    let h = harness();
    let c = h
        .booking
        .create_consultation(&patient(), booking("chat", "2025-04-04T09:00:00Z", "2025-04-04T10:00:00Z"))
        .await
        .unwrap();
    h.booking
        .update_consultation(&c.id, &psychologist(), set_status("completed"))
        .await
        .unwrap();

    assert_matches!(
        h.booking.cancel_consultation(&c.id, &patient()).await,
        Err(ScheduleError::InvalidInput(_))
    );
    assert!(h.booking.cancel_consultation(&c.id, &admin()).await.is_ok());
}

#[tokio::test]
async fn visibility_is_limited_to_participants() {
    let h = harness();
    let c = h
        .booking
        .create_consultation(&patient(), booking("chat", "2025-04-05T09:00:00Z", "2025-04-05T10:00:00Z"))
        .await
        .unwrap();

    assert!(h.booking.get_consultation(&c.id, &patient()).await.is_ok());
    assert!(h.booking.get_consultation(&c.id, &psychologist()).await.is_ok());
    assert!(h.booking.get_consultation(&c.id, &admin()).await.is_ok());
    assert_matches!(
        h.booking.get_consultation(&c.id, &Actor::patient("pat-2")).await,
        Err(ScheduleError::Forbidden)
    );
    assert_matches!(
        h.booking.get_consultation("missing", &admin()).await,
        Err(ScheduleError::NotFound(_))
    );
}

#[tokio::test]
async fn listing_follows_the_callers_role() {
    let h = harness();
    let starts = ["2025-05-01T09:00:00Z", "2025-05-03T09:00:00Z", "2025-05-02T09:00:00Z"];
    for start in starts {
        let end = start.replace("09:00", "10:00");
        h.booking
            .create_consultation(&patient(), booking("chat", start, &end))
            .await
            .unwrap();
    }
    h.booking
        .create_consultation(
            &Actor::patient("pat-2"),
            booking("chat", "2025-05-04T09:00:00Z", "2025-05-04T10:00:00Z"),
        )
        .await
        .unwrap();

    let mine = h.booking.list_my_consultations(&patient(), None).await.unwrap();
    assert_eq!(mine.items.len(), 3);
    assert!(mine.meta.is_none());
    let order: Vec<String> = mine
        .items
        .iter()
        .map(|d| d.consultation.scheduled_start_at.format("%d").to_string())
        .collect();
    assert_eq!(order, vec!["03", "02", "01"]);

    let psy = h.booking.list_my_consultations(&psychologist(), None).await.unwrap();
    assert_eq!(psy.items.len(), 4);

    let other_psy = h
        .booking
        .list_my_consultations(&Actor::psychologist("psy-2"), None)
        .await
        .unwrap();
    assert!(other_psy.items.is_empty());

    let all = h.booking.list_my_consultations(&admin(), None).await.unwrap();
    assert_eq!(all.items.len(), 4);
}

#[tokio::test]
async fn listing_paginates() {
    let h = harness();
    for day in 1..=5 {
        h.booking
            .create_consultation(
                &patient(),
                booking(
                    "chat",
                    &format!("2025-06-0{}T09:00:00Z", day),
                    &format!("2025-06-0{}T10:00:00Z", day),
                ),
            )
            .await
            .unwrap();
    }

    let page = h
        .booking
        .list_my_consultations(&patient(), Some(Pagination { page: 2, limit: 2 }))
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    let meta = page.meta.unwrap();
    assert_eq!(meta.total, 5);
    assert_eq!(meta.total_pages, 3);
    assert!(meta.has_next && meta.has_prev);
    assert_eq!(
        page.items[0].consultation.scheduled_start_at.to_rfc3339(),
        "2025-06-03T09:00:00+00:00"
    );
}

#[tokio::test]
async fn availability_enforcement_when_enabled() {
    let h = harness_with(SchedulingConfig {
        enforce_availability: true,
        ..SchedulingConfig::default()
    });

    // 2025-01-13 is a Monday (weekday 1).
    h.availability
        .create(
            PSY,
            CreateAvailabilityRequest {
                weekday: Some(Ok(1)),
                start_time: Some("09:00".to_string()),
                end_time: Some("12:00".to_string()),
            },
            &psychologist(),
        )
        .await
        .unwrap();

    assert!(h
        .booking
        .create_consultation(&patient(), booking("video", "2025-01-13T09:00:00Z", "2025-01-13T10:00:00Z"))
        .await
        .is_ok());
    assert_matches!(
        h.booking
            .create_consultation(&patient(), booking("video", "2025-01-13T11:30:00Z", "2025-01-13T12:30:00Z"))
            .await,
        Err(ScheduleError::InvalidInput(_))
    );
    assert_matches!(
        h.booking
            .create_consultation(&patient(), booking("video", "2025-01-14T09:00:00Z", "2025-01-14T10:00:00Z"))
            .await,
        Err(ScheduleError::InvalidInput(_))
    );
}

#[tokio::test]
async fn availability_is_not_enforced_by_default() {
    let h = harness();
    assert!(h
        .booking
        .create_consultation(&patient(), booking("video", "2025-01-14T23:00:00Z", "2025-01-15T00:30:00Z"))
        .await
        .is_ok());
}

#[tokio::test]
async fn participant_ids_grant_access_whatever_the_role() {
    let h = harness();
    let c = h
        .booking
        .create_consultation(
            &admin(),
            CreateConsultationRequest {
                patient_id: Some("u-7".to_string()),
                ..booking("chat", "2025-04-06T09:00:00Z", "2025-04-06T10:00:00Z")
            },
        )
        .await
        .unwrap();

    // "u-7" is the booked patient but signs in with a psychologist role.
    let dual = Actor::psychologist("u-7");
    assert!(h.booking.get_consultation(&c.id, &dual).await.is_ok());

    let cancelled = h.booking.cancel_consultation(&c.id, &dual).await.unwrap();
    assert_eq!(cancelled.status, ConsultationStatus::Cancelled);
}

#[tokio::test]
async fn unknown_psychologist_is_reported_before_bad_timestamps() {
    let h = harness();

    assert_matches!(
        h.booking
            .create_consultation(
                &patient(),
                CreateConsultationRequest {
                    psychologist_id: Some("ghost".to_string()),
                    ..booking("chat", "not a date", "also not a date")
                }
            )
            .await,
        Err(ScheduleError::NotFound(what)) if what == "Psychologist"
    );
}

#[tokio::test]
async fn psychologist_calendar_is_oldest_first_and_filterable() {
    let h = harness();
    let mut ids = Vec::new();
    for start in ["2025-07-03T09:00:00Z", "2025-07-01T09:00:00Z", "2025-07-02T09:00:00Z"] {
        let end = start.replace("09:00", "10:00");
        let c = h
            .booking
            .create_consultation(&patient(), booking("chat", start, &end))
            .await
            .unwrap();
        ids.push(c.id);
    }
    h.booking.cancel_consultation(&ids[2], &patient()).await.unwrap();

    let calendar = h
        .booking
        .list_for_psychologist(PSY, None, &psychologist())
        .await
        .unwrap();
    let days: Vec<String> = calendar
        .iter()
        .map(|d| d.consultation.scheduled_start_at.format("%d").to_string())
        .collect();
    assert_eq!(days, vec!["01", "02", "03"]);

    let scheduled = h
        .booking
        .list_for_psychologist(PSY, Some("scheduled"), &admin())
        .await
        .unwrap();
    assert_eq!(scheduled.len(), 2);
    assert!(scheduled
        .iter()
        .all(|d| d.consultation.status == ConsultationStatus::Scheduled));

    assert_matches!(
        h.booking
            .list_for_psychologist(PSY, Some("pending"), &psychologist())
            .await,
        Err(ScheduleError::InvalidInput(_))
    );
    assert_matches!(
        h.booking
            .list_for_psychologist(PSY, None, &Actor::psychologist("psy-2"))
            .await,
        Err(ScheduleError::Forbidden)
    );
    assert_matches!(
        h.booking.list_for_psychologist(PSY, None, &patient()).await,
        Err(ScheduleError::Forbidden)
    );
}
