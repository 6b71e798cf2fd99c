//! Transition table specs

use crate::prelude::*;

#[test]
fn reservation_table_marks_terminal_states() {
    Project::empty()
        .fdesk()
        .args(&["transitions", "reservation"])
        .passes()
        .stdout_eq(
            "inquiry         -> confirmed
confirmed       -> checked_in, cancelled, no_show
checked_in      -> checked_out
checked_out     -> none (terminal state)
cancelled       -> none (terminal state)
no_show         -> none (terminal state)
",
        );
}

#[test]
fn room_table_as_json() {
    let run = Project::empty()
        .fdesk()
        .args(&["transitions", "room", "--format", "json"])
        .passes();
    let rows = run.json();
    let rows = rows.as_array().unwrap();

    assert_eq!(rows.len(), 8);
    assert_eq!(rows[0]["status"], "available");
    assert_eq!(
        rows[0]["allowed"],
        serde_json::json!([
            "reserved",
            "occupied",
            "out_of_order",
            "out_of_service",
            "cleaning",
            "inspecting"
        ])
    );
    assert_eq!(rows[1]["status"], "occupied");
    assert_eq!(rows[1]["allowed"], serde_json::json!(["dirty", "out_of_order"]));
    assert!(rows.iter().all(|row| row["terminal"] == false));
}
