//! CLI error specs
//!
//! Bad input files stop the command with a non-zero exit and a message that
//! names the file, the cause and what to try.

use crate::prelude::*;

#[test]
fn no_subcommand_is_a_usage_error() {
    Project::empty().fdesk().fails().stderr_has("Usage");
}

#[test]
fn missing_scenario_is_reported() {
    Project::empty()
        .fdesk()
        .args(&["replay", "missing.toml"])
        .fails()
        .stderr_has("error: Cannot read scenario 'missing.toml'")
        .stderr_has("suggestions:");
}

#[test]
fn scenario_naming_unknown_room_is_refused() {
    let project = Project::hotel(
        r#"
[[steps]]
action = "check_in"
reservation = "smith"
room = "999"
"#,
    );
    project
        .fdesk()
        .args(&["replay", "scenario.toml"])
        .fails()
        .stderr_has("error: Invalid scenario 'scenario.toml'")
        .stderr_has("-> step 1 (check_in) names unknown room 999");
}

#[test]
fn unknown_step_action_is_refused() {
    let project = Project::hotel(
        r#"
[[steps]]
action = "teleport"
reservation = "smith"
"#,
    );
    project
        .fdesk()
        .args(&["replay", "scenario.toml"])
        .fails()
        .stderr_has("Invalid scenario");
}

#[test]
fn invalid_config_is_refused() {
    let project = Project::hotel("");
    project.file("desk.toml", "[locks]\ntimeout = \"0s\"\n");
    project
        .fdesk()
        .args(&["replay", "scenario.toml", "--config", "desk.toml"])
        .fails()
        .stderr_has("error: Invalid desk config 'desk.toml'")
        .stderr_has("locks.timeout must be greater than zero");
}

#[test]
fn unknown_config_section_is_refused() {
    let project = Project::hotel("");
    project.file("desk.toml", "[billing]\ncurrency = \"EUR\"\n");
    project
        .fdesk()
        .args(&["replay", "scenario.toml", "--config", "desk.toml"])
        .fails()
        .stderr_has("Invalid desk config");
}

#[test]
fn reservation_for_unknown_guest_cannot_be_seeded() {
    let project = Project::empty();
    project.file(
        "scenario.toml",
        &HOTEL.replace("guests = [\"guest-1\"]", "guests = []"),
    );
    project
        .fdesk()
        .args(&["replay", "scenario.toml"])
        .fails()
        .stderr_has("error: Cannot seed reservation 'smith'")
        .stderr_has("NOT_FOUND");
}

#[test]
fn unknown_transition_entity_is_a_usage_error() {
    Project::empty()
        .fdesk()
        .args(&["transitions", "folio"])
        .fails()
        .stderr_has("invalid value 'folio'");
}
