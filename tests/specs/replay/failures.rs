//! Replay specs for refused steps
//!
//! A refused step is reported with its stable code and the replay carries on;
//! the command still exits 0.

use crate::prelude::*;

#[test]
fn unpaid_check_out_is_refused_and_replay_continues() {
    Project::hotel(
        r#"
[[steps]]
action = "check_in"
reservation = "smith"
room = "101"

[[steps]]
action = "check_out"
reservation = "smith"

[[steps]]
action = "payment"
reservation = "smith"
amount = 5000
"#,
    )
    .fdesk()
    .args(&["replay", "scenario.toml"])
    .passes()
    .stdout_has("steps (3 run, 1 failed):")
    .stdout_has(
        "[2] check_out smith: BUSINESS_RULE_ERROR FOLIO_BALANCE_MUST_BE_ZERO: Outstanding balance of 20000. Please settle before checkout.",
    )
    .stdout_has("[3] payment smith: ok, paid 5000 into folio folio-1, balance 15000");
}

#[test]
fn illegal_room_transition_lists_allowed_targets() {
    Project::hotel(
        r#"
[[steps]]
action = "room_status"
room = "101"
status = "checked_in"
"#,
    )
    .fdesk()
    .args(&["replay", "scenario.toml"])
    .passes()
    .stdout_has(
        "BUSINESS_RULE_ERROR INVALID_STATUS_TRANSITION: Invalid status transition from \"available\" to \"checked_in\". Allowed transitions: reserved, occupied, out_of_order, out_of_service, cleaning, inspecting",
    );
}

#[test]
fn cancelled_reservation_cannot_check_in() {
    Project::hotel(
        r#"
[[steps]]
action = "cancel"
reservation = "smith"
reason = "guest called"

[[steps]]
action = "check_in"
reservation = "smith"
room = "101"
"#,
    )
    .fdesk()
    .args(&["replay", "scenario.toml"])
    .passes()
    .stdout_has("[1] cancel smith: ok, res-1 cancelled, no room held")
    .stdout_has("[2] check_in smith -> 101: BUSINESS_RULE_ERROR TERMINAL_STATE_IMMUTABLE");
}

#[test]
fn blocking_a_room_needs_a_manager() {
    let steps = r#"
[[steps]]
action = "block"
room = "102"
reason = "burst pipe"
"#;
    Project::hotel(steps)
        .fdesk()
        .args(&["replay", "scenario.toml"])
        .passes()
        .stdout_has("FORBIDDEN: Operation 'room.block' requires one of")
        .stdout_has("Current role: staff");

    let project = Project::empty();
    project.file(
        "scenario.toml",
        &format!(
            "{}\n{steps}",
            HOTEL.replace("actor = \"clerk-1\"", "actor = \"gm-1\"\nrole = \"manager\"")
        ),
    );
    project
        .fdesk()
        .args(&["replay", "scenario.toml"])
        .passes()
        .stdout_has("[1] block 102: ok, room 102 available -> out_of_service");
}

#[test]
fn refusals_are_on_the_audit_trail() {
    let run = Project::hotel(
        r#"
[[steps]]
action = "no_show"
reservation = "smith"

[[steps]]
action = "cancel"
reservation = "smith"
"#,
    )
    .fdesk()
    .args(&["replay", "scenario.toml", "--format", "json"])
    .passes();
    let report = run.json();

    assert_eq!(report["steps"][0]["status"], "ok");
    assert_eq!(report["steps"][1]["status"], "error");
    assert_eq!(report["steps"][1]["rule"], "TERMINAL_STATE_IMMUTABLE");
    let last = report["audit"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["resource_id"], "res-1");
    assert_eq!(last["action"], "failed_operation");
}
