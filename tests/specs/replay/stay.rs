//! Replay specs for a guest's stay from check-in to turnover

use crate::prelude::*;

const FULL_STAY: &str = r#"
[[steps]]
action = "check_in"
reservation = "smith"
room = "101"

[[steps]]
action = "payment"
reservation = "smith"

[[steps]]
action = "check_out"
reservation = "smith"

[[steps]]
action = "room_status"
room = "101"
status = "cleaning"

[[steps]]
action = "room_status"
room = "101"
status = "inspecting"

[[steps]]
action = "room_status"
room = "101"
status = "available"
"#;

#[test]
fn full_stay_reports_each_step() {
    Project::hotel(FULL_STAY)
        .fdesk()
        .args(&["replay", "scenario.toml"])
        .passes()
        .stdout_has("tenant hotel-1")
        .stdout_has("steps (6 run, 0 failed):")
        .stdout_has("[1] check_in smith -> 101: ok, res-1 checked in to room 101, folio folio-1 balance 20000")
        .stdout_has("[2] payment smith: ok, paid 20000 into folio folio-1, balance 0")
        .stdout_has("[3] check_out smith: ok, res-1 checked out, room 101 released (dirty)")
        .stdout_has("[6] room_status 101 -> available: ok, room 101 inspecting -> available");
}

#[test]
fn full_stay_as_json() {
    let run = Project::hotel(FULL_STAY)
        .fdesk()
        .args(&["replay", "scenario.toml", "--format", "json"])
        .passes();
    let report = run.json();

    let statuses: Vec<&str> = report["steps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|step| step["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, ["ok"; 6]);

    let room = &report["rooms"][0];
    assert_eq!(room["room_number"], "101");
    assert_eq!(room["status"], "available");
    assert_eq!(room["version"], 5);
    assert!(room.get("current_reservation_id").is_none());

    let reservation = &report["reservations"][0];
    assert_eq!(reservation["status"], "checked_out");
    assert_eq!(reservation["total_amount"], 20000);
    assert!(reservation.get("room_id").is_none());

    // oldest first, one entry per change
    let actions: Vec<(&str, &str)> = report["audit"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|entry| entry["resource_id"] == "room-1")
        .map(|entry| {
            (
                entry["action"].as_str().unwrap(),
                entry["new_value"].as_str().unwrap_or(""),
            )
        })
        .collect();
    assert_eq!(actions[0].0, "created");
    assert_eq!(actions[1].0, "assignment");
    assert_eq!(actions[2].0, "release");
    assert_eq!(
        &actions[3..],
        [
            ("status_change", "cleaning"),
            ("status_change", "inspecting"),
            ("status_change", "available"),
        ]
    );
}

#[test]
fn transfer_moves_guest_and_reservation() {
    Project::hotel(
        r#"
[[steps]]
action = "check_in"
reservation = "smith"
room = "101"

[[steps]]
action = "transfer"
reservation = "smith"
from = "101"
to = "102"
reason = "upgrade"

[[steps]]
action = "payment"
reservation = "smith"

[[steps]]
action = "check_out"
reservation = "smith"
"#,
    )
    .fdesk()
    .args(&["replay", "scenario.toml"])
    .passes()
    .stdout_has("[2] transfer smith 101 -> 102: ok, res-1 moved from room 101 to room 102")
    .stdout_has("[4] check_out smith: ok, res-1 checked out, room 102 released (dirty)");
}

#[test]
fn repeated_check_in_key_is_replayed() {
    let run = Project::hotel(
        r#"
[[steps]]
action = "check_in"
reservation = "smith"
room = "101"
key = "desk-7"

[[steps]]
action = "check_in"
reservation = "smith"
room = "101"
key = "desk-7"
"#,
    )
    .fdesk()
    .args(&["replay", "scenario.toml", "--format", "json"])
    .passes();
    let report = run.json();

    assert_eq!(report["steps"][0]["detail"], report["steps"][1]["detail"]);
    let check_ins = report["audit"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|entry| entry["resource_id"] == "res-1" && entry["action"] == "status_change")
        .count();
    assert_eq!(check_ins, 1);
}

#[test]
fn logs_go_to_stderr_filtered_by_env() {
    let project = Project::hotel(FULL_STAY);
    project
        .fdesk()
        .args(&["replay", "scenario.toml"])
        .passes()
        .stderr_lacks("check-in completed");
    project
        .fdesk()
        .env("FDESK_LOG", "info")
        .args(&["replay", "scenario.toml"])
        .passes()
        .stderr_has("check-in completed")
        .stdout_lacks("check-in completed");
}
