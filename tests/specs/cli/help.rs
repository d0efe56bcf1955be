//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_every_command() {
    Project::empty()
        .zb()
        .args(&["--help"])
        .passes()
        .stdout_has("barrier")
        .stdout_has("gate")
        .stdout_has("queue")
        .stdout_has("config");
}

#[test]
fn barrier_help_describes_variants() {
    Project::empty()
        .zb()
        .args(&["barrier", "--help"])
        .passes()
        .stdout_has("--quorum")
        .stdout_has("plain, double, restricted or nested")
        .stdout_has("--stage");
}

#[test]
fn queue_help_lists_roles() {
    Project::empty()
        .zb()
        .args(&["queue", "--help"])
        .passes()
        .stdout_has("produce")
        .stdout_has("consume");
}

#[test]
fn version_flag_prints_version() {
    Project::empty()
        .zb()
        .args(&["--version"])
        .passes()
        .stdout_has("zb ");
}
