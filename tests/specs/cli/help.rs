//! Help and version specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    Project::empty()
        .fdesk()
        .args(&["--help"])
        .passes()
        .stdout_has("replay")
        .stdout_has("transitions");
}

#[test]
fn replay_help_lists_options() {
    Project::empty()
        .fdesk()
        .args(&["replay", "--help"])
        .passes()
        .stdout_has("--config")
        .stdout_has("--format");
}

#[test]
fn version_is_reported() {
    Project::empty()
        .fdesk()
        .args(&["--version"])
        .passes()
        .stdout_has("fdesk 0.1.0");
}
