// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::{tenant, Fixture, GUEST, RATE};
use fd_adapters::{FolioCall, FolioOp, FolioStatus};
use fd_core::{ReservationPatch, Role, RoomStatus};
use fd_storage::AuditAction;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::default();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

fn check_in_request(reservation: &Reservation, room: &Room) -> CheckInRequest {
    CheckInRequest {
        reservation_id: reservation.id.clone(),
        room_id: room.id.clone(),
        notes: None,
        idempotency_key: None,
    }
}

fn check_out_request(reservation: &Reservation) -> CheckOutRequest {
    CheckOutRequest {
        reservation_id: reservation.id.clone(),
        idempotency_key: None,
    }
}

/// Room 101 and a confirmed two-night reservation, checked in
async fn checked_in(fx: &Fixture) -> CheckInOutcome {
    checked_in_to(fx, "101").await
}

async fn checked_in_to(fx: &Fixture, number: &str) -> CheckInOutcome {
    let room = fx.room(number).await;
    let reservation = fx.reservation().await;
    fx.desk
        .workflow()
        .perform_check_in(&fx.caller, check_in_request(&reservation, &room))
        .await
        .unwrap()
}

async fn settle(fx: &Fixture, outcome: &CheckInOutcome) {
    fx.desk
        .folios()
        .post_payment(
            &fx.caller.tenant_id,
            &outcome.folio.id,
            "card",
            outcome.folio.balance(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn check_in_occupies_room_and_charges_stay() {
    let fx = Fixture::new();
    let outcome = checked_in(&fx).await;

    assert_eq!(outcome.reservation.status, ReservationStatus::CheckedIn);
    assert_eq!(outcome.reservation.room_id.as_deref(), Some("room-1"));
    assert_eq!(outcome.room.status, RoomStatus::Occupied);
    assert_eq!(outcome.room.current_guest_id.as_deref(), Some(GUEST));
    assert_eq!(
        outcome.room.current_reservation_id.as_deref(),
        Some(outcome.reservation.id.as_str())
    );
    assert!(outcome.folio.is_open());
    assert_eq!(outcome.folio.balance(), 2 * RATE);
    assert_eq!(outcome.folio.charges[0].description, "Room 101 - 2 night(s)");

    let calls = fx.folios.calls();
    assert!(matches!(calls[0], FolioCall::Create { .. }));
    assert!(matches!(calls[1], FolioCall::PostCharge { amount, .. } if amount == 2 * RATE));
}

#[tokio::test]
async fn repeated_check_in_replays_first_outcome() {
    let fx = Fixture::new();
    let first = checked_in(&fx).await;
    let calls = fx.folios.calls().len();

    let again = fx
        .desk
        .workflow()
        .perform_check_in(
            &fx.caller,
            CheckInRequest {
                reservation_id: first.reservation.id.clone(),
                room_id: first.room.id.clone(),
                notes: Some("ignored".into()),
                idempotency_key: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(again, first);
    assert_eq!(fx.folios.calls().len(), calls);

    fx.clock.advance(std::time::Duration::from_secs(60 * 60));
    let err = fx
        .desk
        .workflow()
        .perform_check_in(&fx.caller, check_in_request(&first.reservation, &first.room))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "BUSINESS_RULE_ERROR");
}

#[tokio::test]
async fn replay_cache_forgets_outcomes_after_ttl() {
    let fx = Fixture::new();
    let workflow = fx.desk.workflow();
    for number in ["101", "102"] {
        checked_in_to(&fx, number).await;
    }
    assert_eq!(workflow.check_ins.len(), 2);

    fx.clock.advance(std::time::Duration::from_secs(60 * 60));
    checked_in_to(&fx, "103").await;
    assert_eq!(workflow.check_ins.len(), 1);
}

#[tokio::test]
async fn supplied_keys_do_not_cross_tenants() {
    let fx = Fixture::new();
    let room = fx.room("101").await;
    let reservation = fx.reservation().await;
    let mut request = check_in_request(&reservation, &room);
    request.idempotency_key = Some("front-desk-1".into());
    fx.desk
        .workflow()
        .perform_check_in(&fx.caller, request)
        .await
        .unwrap();

    let other = Caller::new(tenant("hotel-2"), "clerk-9", Role::Staff);
    let mut request = check_in_request(&reservation, &room);
    request.idempotency_key = Some("front-desk-1".into());
    let err = fx
        .desk
        .workflow()
        .perform_check_in(&other, request)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[tokio::test]
async fn check_in_refused_before_any_change() {
    let fx = Fixture::new();
    let dirty = fx.room_with_status("101", RoomStatus::Dirty).await;
    let reservation = fx.reservation().await;

    let err = fx
        .desk
        .workflow()
        .perform_check_in(&fx.caller, check_in_request(&reservation, &dirty))
        .await
        .unwrap_err();
    assert_eq!(err.rule(), Some("ROOM_NOT_AVAILABLE_FOR_ASSIGNMENT"));

    let stored = fx
        .desk
        .reservations()
        .get(&fx.caller, &reservation.id)
        .await
        .unwrap();
    assert_eq!(stored, reservation);
    assert!(fx.folios.calls().is_empty());

    let history = fx.history(&reservation.id).await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].metadata["failed_operation"], "perform_check_in");
}

#[tokio::test]
async fn second_check_in_to_another_room_changes_nothing() {
    let fx = Fixture::new();
    let first = checked_in(&fx).await;
    let spare = fx.room("102").await;
    let calls = fx.folios.calls().len();

    let err = fx
        .desk
        .workflow()
        .perform_check_in(&fx.caller, check_in_request(&first.reservation, &spare))
        .await
        .unwrap_err();
    assert_eq!(err.rule(), Some("INVALID_RESERVATION_STATUS_TRANSITION"));
    assert!(err.to_string().ends_with("Allowed transitions: checked_out"));

    let rooms = fx.desk.rooms();
    let spare = rooms.get(&fx.caller, &spare.id).await.unwrap();
    assert_eq!(spare.status, RoomStatus::Available);
    assert_eq!(spare.version, 0);
    let stored = fx
        .desk
        .reservations()
        .get(&fx.caller, &first.reservation.id)
        .await
        .unwrap();
    assert_eq!(stored, first.reservation);
    assert_eq!(fx.folios.calls().len(), calls);
}

#[tokio::test]
async fn check_in_validates_ids() {
    let fx = Fixture::new();
    let workflow = fx.desk.workflow();
    let err = workflow
        .perform_check_in(
            &fx.caller,
            CheckInRequest {
                reservation_id: " ".into(),
                room_id: "room-1".into(),
                notes: None,
                idempotency_key: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Reservation ID is required");

    let reservation = fx.reservation().await;
    let err = workflow
        .perform_check_in(
            &fx.caller,
            CheckInRequest {
                reservation_id: reservation.id.clone(),
                room_id: "room-404".into(),
                notes: None,
                idempotency_key: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Room with ID room-404 not found");
}

#[test]
fn folio_failure_after_check_in_is_a_workflow_error() {
    let (logs, ()) = with_tracing(|| async {
        let fx = Fixture::new();
        let room = fx.room("101").await;
        let reservation = fx.reservation().await;
        fx.folios.fail_on(FolioOp::Create);

        let err = fx
            .desk
            .workflow()
            .perform_check_in(&fx.caller, check_in_request(&reservation, &room))
            .await
            .unwrap_err();
        match &err {
            DeskError::Workflow {
                step,
                rollback_required,
                ..
            } => {
                assert_eq!(*step, "create_folio");
                assert!(rollback_required);
            }
            other => panic!("expected workflow error, got {other:?}"),
        }

        // Earlier steps stand
        let stored = fx
            .desk
            .reservations()
            .get(&fx.caller, &reservation.id)
            .await
            .unwrap();
        assert_eq!(stored.status, ReservationStatus::CheckedIn);
        let room = fx.desk.rooms().get(&fx.caller, &room.id).await.unwrap();
        assert_eq!(room.status, RoomStatus::Occupied);

        let latest = &fx.history(&reservation.id).await[0];
        assert_eq!(latest.action, AuditAction::FailedOperation);
        assert_eq!(latest.metadata["failed_operation"], "create_folio");
    });

    assert!(logs.contains("workflow step failed after the reservation changed"));
    assert!(logs.contains("step=\"create_folio\""));
    assert!(logs.contains("tenant_id=hotel-1"));
}

#[tokio::test]
async fn zero_rate_stay_posts_no_charge() {
    let fx = Fixture::new();
    let room = fx.room("101").await;
    let mut new = crate::test_helpers::new_reservation(
        crate::test_helpers::date(3, 1),
        crate::test_helpers::date(3, 2),
    );
    new.room_rate = 0;
    let reservation = fx
        .desk
        .reservations()
        .create(&fx.caller, new)
        .await
        .unwrap();

    let outcome = fx
        .desk
        .workflow()
        .perform_check_in(&fx.caller, check_in_request(&reservation, &room))
        .await
        .unwrap();
    assert!(outcome.folio.charges.is_empty());
    assert_eq!(fx.folios.calls().len(), 1);
}

#[tokio::test]
async fn check_out_refused_while_balance_outstanding() {
    let fx = Fixture::new();
    let outcome = checked_in(&fx).await;

    let err = fx
        .desk
        .workflow()
        .perform_check_out(&fx.caller, check_out_request(&outcome.reservation))
        .await
        .unwrap_err();
    assert_eq!(err.rule(), Some("FOLIO_BALANCE_MUST_BE_ZERO"));
    assert_eq!(
        err.to_string(),
        "Outstanding balance of 20000. Please settle before checkout."
    );

    let room = fx
        .desk
        .rooms()
        .get(&fx.caller, &outcome.room.id)
        .await
        .unwrap();
    assert_eq!(room, outcome.room);
    let reservation = fx
        .desk
        .reservations()
        .get(&fx.caller, &outcome.reservation.id)
        .await
        .unwrap();
    assert_eq!(reservation, outcome.reservation);
}

#[tokio::test]
async fn check_out_closes_folio_releases_room_and_replays() {
    let fx = Fixture::new();
    let outcome = checked_in(&fx).await;
    settle(&fx, &outcome).await;

    let done = fx
        .desk
        .workflow()
        .perform_check_out(&fx.caller, check_out_request(&outcome.reservation))
        .await
        .unwrap();
    assert_eq!(done.reservation.status, ReservationStatus::CheckedOut);
    assert_eq!(done.reservation.room_id, None);
    assert_eq!(done.reservation.checked_out_at, Some(fx.clock.utc_now()));
    assert_eq!(
        done.folio.as_ref().map(|folio| folio.status),
        Some(FolioStatus::Closed)
    );
    match &done.room_release {
        RoomRelease::Released(room) => {
            assert_eq!(room.status, RoomStatus::Dirty);
            assert_eq!(room.current_reservation_id, None);
        }
        other => panic!("expected release, got {other:?}"),
    }

    let again = fx
        .desk
        .workflow()
        .perform_check_out(&fx.caller, check_out_request(&outcome.reservation))
        .await
        .unwrap();
    assert_eq!(again, done);
}

#[tokio::test]
async fn check_out_stands_when_room_release_fails() {
    let fx = Fixture::new();
    let outcome = checked_in(&fx).await;
    settle(&fx, &outcome).await;
    let mutex = fx.desk.rooms().mutex();
    assert!(mutex.acquire(&fx.caller.tenant_id, &outcome.room.id, "housekeeping"));

    let done = fx
        .desk
        .workflow()
        .perform_check_out(&fx.caller, check_out_request(&outcome.reservation))
        .await
        .unwrap();
    assert_eq!(done.reservation.status, ReservationStatus::CheckedOut);
    assert_eq!(
        done.room_release,
        RoomRelease::Failed {
            room_id: outcome.room.id.clone(),
            code: "CONFLICT",
            error: format!(
                "{} is currently locked by another operation. Please try again.",
                outcome.room.id
            ),
        }
    );

    let room = fx
        .desk
        .rooms()
        .get(&fx.caller, &outcome.room.id)
        .await
        .unwrap();
    assert_eq!(room.status, RoomStatus::Occupied);
    assert_eq!(
        fx.history(&outcome.room.id).await[0].action,
        AuditAction::ConflictDetected
    );
}

#[tokio::test]
async fn check_out_of_confirmed_reservation_is_refused() {
    let fx = Fixture::new();
    let reservation = fx.reservation().await;

    let err = fx
        .desk
        .workflow()
        .perform_check_out(&fx.caller, check_out_request(&reservation))
        .await
        .unwrap_err();
    assert_eq!(err.rule(), Some("INVALID_RESERVATION_STATUS_TRANSITION"));
    assert_eq!(
        fx.history(&reservation.id).await[0].metadata["failed_operation"],
        "perform_check_out"
    );
}

/// Confirmed reservation pre-assigned to room 101, with the room occupied
/// for it
async fn held_room(fx: &Fixture) -> (Room, Reservation) {
    let room = fx.room("101").await;
    let reservation = fx.reservation().await;
    let reservation = fx
        .desk
        .reservations()
        .update(
            &fx.caller,
            &reservation.id,
            ReservationPatch {
                room_id: Some(room.id.clone()),
                ..ReservationPatch::default()
            },
            0,
        )
        .await
        .unwrap();
    let room = fx
        .desk
        .rooms()
        .assign_to_guest(&fx.caller, &room.id, GUEST, &reservation.id, 0)
        .await
        .unwrap();
    (room, reservation)
}

#[tokio::test]
async fn cancel_stands_when_release_fails() {
    let fx = Fixture::new();
    let (room, reservation) = held_room(&fx).await;
    assert!(fx
        .desk
        .rooms()
        .mutex()
        .acquire(&fx.caller.tenant_id, &room.id, "housekeeping"));

    let outcome = fx
        .desk
        .workflow()
        .cancel_reservation(&fx.caller, &reservation.id, reservation.version, Some("flight"))
        .await
        .unwrap();
    assert_eq!(outcome.reservation.status, ReservationStatus::Cancelled);
    assert_eq!(
        outcome.reservation.cancellation_reason.as_deref(),
        Some("flight")
    );
    assert!(outcome.room_release.is_failed());

    let latest = &fx.history(&room.id).await[0];
    assert_eq!(latest.action, AuditAction::ConflictDetected);
    let room = fx.desk.rooms().get(&fx.caller, &room.id).await.unwrap();
    assert_eq!(room.status, RoomStatus::Occupied);
}

#[test]
fn cancel_with_unoccupied_pre_assigned_room_releases_nothing() {
    let (logs, ()) = with_tracing(|| async {
        let fx = Fixture::new();
        let room = fx.room_with_status("101", RoomStatus::Reserved).await;
        let entries = fx.history(&room.id).await.len();
        let reservation = fx.reservation().await;
        let reservation = fx
            .desk
            .reservations()
            .update(
                &fx.caller,
                &reservation.id,
                ReservationPatch {
                    room_id: Some(room.id.clone()),
                    ..ReservationPatch::default()
                },
                0,
            )
            .await
            .unwrap();

        let outcome = fx
            .desk
            .workflow()
            .cancel_reservation(&fx.caller, &reservation.id, reservation.version, None)
            .await
            .unwrap();
        assert_eq!(outcome.reservation.status, ReservationStatus::Cancelled);
        assert_eq!(outcome.room_release, RoomRelease::NotAssigned);

        let stored = fx.desk.rooms().get(&fx.caller, &room.id).await.unwrap();
        assert_eq!(stored, room);
        assert_eq!(fx.history(&room.id).await.len(), entries);
    });

    assert!(!logs.contains("ERROR"));
    assert!(logs.contains("nothing to release"));
}

#[tokio::test]
async fn release_never_evicts_another_reservation() {
    let fx = Fixture::new();
    let room = fx.room("101").await;
    fx.desk
        .rooms()
        .assign_to_guest(&fx.caller, &room.id, GUEST, "res-other", 0)
        .await
        .unwrap();
    let reservation = fx.reservation().await;
    let reservation = fx
        .desk
        .reservations()
        .update(
            &fx.caller,
            &reservation.id,
            ReservationPatch {
                room_id: Some(room.id.clone()),
                ..ReservationPatch::default()
            },
            0,
        )
        .await
        .unwrap();

    let outcome = fx
        .desk
        .workflow()
        .mark_no_show(&fx.caller, &reservation.id, reservation.version, None)
        .await
        .unwrap();
    assert_eq!(outcome.reservation.status, ReservationStatus::NoShow);
    assert!(matches!(
        outcome.room_release,
        RoomRelease::Failed {
            code: "BUSINESS_RULE_ERROR",
            ..
        }
    ));

    let room = fx.desk.rooms().get(&fx.caller, &room.id).await.unwrap();
    assert_eq!(room.current_reservation_id.as_deref(), Some("res-other"));
}

#[tokio::test]
async fn no_show_without_room_has_nothing_to_release() {
    let fx = Fixture::new();
    let reservation = fx.reservation().await;

    let outcome = fx
        .desk
        .workflow()
        .mark_no_show(&fx.caller, &reservation.id, 0, None)
        .await
        .unwrap();
    assert_eq!(outcome.reservation.status, ReservationStatus::NoShow);
    assert_eq!(outcome.room_release, RoomRelease::NotAssigned);
}

#[test]
fn failed_release_is_logged_with_context() {
    let (logs, ()) = with_tracing(|| async {
        let fx = Fixture::new();
        let (room, reservation) = held_room(&fx).await;
        assert!(fx
            .desk
            .rooms()
            .mutex()
            .acquire(&fx.caller.tenant_id, &room.id, "housekeeping"));
        fx.desk
            .workflow()
            .cancel_reservation(&fx.caller, &reservation.id, reservation.version, None)
            .await
            .unwrap();
    });

    assert!(logs.contains("ERROR"));
    assert!(logs.contains("room release failed"));
    assert!(logs.contains("operation=\"cancel\""));
    assert!(logs.contains("room_id=\"room-1\""));
    assert!(logs.contains("actor=clerk-1"));
}

fn transfer_request(reservation: &Reservation, from: &Room, to: &Room) -> TransferRequest {
    TransferRequest {
        from_room_id: from.id.clone(),
        to_room_id: to.id.clone(),
        reservation_id: reservation.id.clone(),
        reason: Some("noisy neighbours".to_string()),
        from_expected_version: from.version,
        to_expected_version: to.version,
    }
}

#[tokio::test]
async fn transfer_moves_reservation_with_guest() {
    let fx = Fixture::new();
    let outcome = checked_in(&fx).await;
    let target = fx.room("102").await;

    let moved = fx
        .desk
        .workflow()
        .transfer_room(
            &fx.caller,
            &transfer_request(&outcome.reservation, &outcome.room, &target),
        )
        .await
        .unwrap();
    assert_eq!(moved.reservation.room_id.as_deref(), Some(target.id.as_str()));
    assert_eq!(moved.reservation.version, outcome.reservation.version + 1);
    assert_eq!(moved.to_room.status, RoomStatus::Occupied);
    assert_ne!(moved.from_room.status, RoomStatus::Occupied);

    let history = fx.history(&outcome.reservation.id).await;
    assert_eq!(history[0].action, AuditAction::FieldUpdate);
    assert_eq!(history[0].new_value.as_deref(), Some("room_id: room-2"));

    // check-out now releases the room the guest moved into
    settle(&fx, &outcome).await;
    let done = fx
        .desk
        .workflow()
        .perform_check_out(&fx.caller, check_out_request(&outcome.reservation))
        .await
        .unwrap();
    match &done.room_release {
        RoomRelease::Released(room) => assert_eq!(room.id, target.id),
        other => panic!("expected release of room 102, got {other:?}"),
    }
}

#[tokio::test]
async fn refused_transfer_leaves_reservation_untouched() {
    let fx = Fixture::new();
    let outcome = checked_in(&fx).await;
    let target = fx.room_with_status("102", RoomStatus::OutOfOrder).await;

    let err = fx
        .desk
        .workflow()
        .transfer_room(
            &fx.caller,
            &transfer_request(&outcome.reservation, &outcome.room, &target),
        )
        .await
        .unwrap_err();
    assert!(!matches!(err, DeskError::Workflow { .. }));

    let reservation = fx
        .desk
        .reservations()
        .get(&fx.caller, &outcome.reservation.id)
        .await
        .unwrap();
    assert_eq!(reservation, outcome.reservation);
}
