// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;

const STAY: &str = r#"
tenant = "hotel-1"
actor = "clerk-1"
now = "2026-03-01T12:00:00Z"
guests = ["guest-1"]

[[rooms]]
number = "101"
floor = 1
type = "double"

[[rooms]]
number = "102"
status = "dirty"

[[reservations]]
ref = "smith"
guest = "guest-1"
check_in = "2026-03-01"
check_out = "2026-03-03"
adults = 2
rate = 10000

[[steps]]
action = "check_in"
reservation = "smith"
room = "101"

[[steps]]
action = "payment"
reservation = "smith"

[[steps]]
action = "room_status"
room = "102"
status = "cleaning"
reason = "turnover"
"#;

#[test]
fn parses_a_full_scenario() {
    let scenario = Scenario::parse(STAY).unwrap();

    assert_eq!(scenario.role, Role::Staff);
    assert_eq!(scenario.rooms.len(), 2);
    assert_eq!(scenario.rooms[0].room_type, "double");
    assert_eq!(scenario.rooms[1].status, Some(RoomStatus::Dirty));
    assert_eq!(scenario.reservations[0].reference, "smith");
    assert_eq!(scenario.reservations[0].adults, 2);
    assert_eq!(
        scenario.steps[0],
        Step::CheckIn {
            reservation: "smith".to_string(),
            room: "101".to_string(),
            notes: None,
            key: None,
        }
    );
    assert_eq!(
        scenario.steps[1],
        Step::Payment {
            reservation: "smith".to_string(),
            amount: None,
        }
    );
    assert_eq!(scenario.steps[2].action(), "room_status");
    assert_eq!(scenario.steps[2].target(), "102 -> cleaning");
}

#[test]
fn role_and_adults_have_defaults() {
    let scenario = Scenario::parse(
        r#"
tenant = "hotel-1"
actor = "gm-1"
role = "general_manager"

[[reservations]]
ref = "solo"
guest = "g"
check_in = "2026-03-01"
check_out = "2026-03-02"
rate = 0
"#,
    )
    .unwrap();
    assert_eq!(scenario.role, Role::GeneralManager);
    assert_eq!(scenario.reservations[0].adults, 1);
    assert_eq!(scenario.now, None);
}

#[test]
fn unknown_step_reference_is_refused() {
    let raw = STAY.replace("room = \"101\"", "room = \"999\"");
    let err = Scenario::parse(&raw).unwrap_err();
    assert_eq!(err, "step 1 (check_in) names unknown room 999");

    let raw = STAY.replace(
        "action = \"payment\"\nreservation = \"smith\"",
        "action = \"payment\"\nreservation = \"jones\"",
    );
    let err = Scenario::parse(&raw).unwrap_err();
    assert_eq!(err, "step 2 (payment) names unknown reservation 'jones'");
}

#[test]
fn duplicate_declarations_are_refused() {
    let raw = STAY.replace("number = \"102\"", "number = \"101\"");
    assert_eq!(
        Scenario::parse(&raw).unwrap_err(),
        "room 101 is declared twice"
    );
}

#[test]
fn blank_tenant_and_unknown_fields_are_refused() {
    let raw = STAY.replace("tenant = \"hotel-1\"", "tenant = \"  \"");
    assert!(Scenario::parse(&raw).unwrap_err().contains("Tenant ID is required"));

    let raw = STAY.replace("floor = 1", "floor = 1\nview = \"sea\"");
    assert!(Scenario::parse(&raw).unwrap_err().contains("view"));

    let raw = STAY.replace("action = \"payment\"", "action = \"teleport\"");
    assert!(Scenario::parse(&raw).is_err());
}

#[test]
fn load_reports_path_in_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"tenant = 3").unwrap();

    let err = Scenario::load(file.path()).unwrap_err();
    let output = err.to_string();
    assert!(output.contains("error: Invalid scenario"));
    assert!(output.contains(&file.path().display().to_string()));
    assert!(output.contains("suggestions:"));
}

#[test]
fn load_of_missing_file_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let err = Scenario::load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(err.message.starts_with("Cannot read scenario"));
}
