//! Failure specs
//!
//! Invalid settings and unreachable services end with a non-zero exit
//! before any barrier state is created.

use crate::prelude::*;

#[test]
fn missing_subcommand_fails() {
    Project::empty().zb().fails().stderr_has("Usage");
}

#[test]
fn zero_quorum_fails_before_connecting() {
    Project::empty()
        .zb()
        .args(&["--endpoint", DEAD_ENDPOINT, "barrier", "--quorum", "0"])
        .fails()
        .stderr_has("quorum must be at least 1");
}

#[test]
fn restricted_without_subgroup_fails() {
    Project::empty()
        .zb()
        .args(&["barrier", "--variant", "restricted"])
        .fails()
        .stderr_has("requires a subgroup");
}

#[test]
fn nested_without_stages_fails() {
    Project::empty()
        .zb()
        .args(&["barrier", "--variant", "nested", "--subgroup", "g1"])
        .fails()
        .stderr_has("at least one stage");
}

#[test]
fn unknown_variant_fails() {
    Project::empty()
        .zb()
        .args(&["barrier", "--variant", "triple"])
        .fails()
        .stderr_has("unknown barrier variant");
}

#[test]
fn relative_root_fails() {
    Project::empty()
        .zb()
        .args(&["--root", "b1", "barrier"])
        .fails()
        .stderr_has("invalid root path");
}

#[test]
fn gate_with_relative_root_fails_before_connecting() {
    Project::empty()
        .zb()
        .args(&["--endpoint", DEAD_ENDPOINT, "--root", "b1", "gate"])
        .fails()
        .stderr_has("invalid root path 'b1'");
}

#[test]
fn queue_with_relative_path_fails_before_connecting() {
    Project::empty()
        .zb()
        .args(&["--endpoint", DEAD_ENDPOINT, "queue", "--path", "app1", "consume"])
        .fails()
        .stderr_has("invalid root path 'app1'");
}

#[test]
fn unreachable_endpoint_fails() {
    let project = Project::empty();
    project.file("zb.toml", "connect_timeout = \"1s\"\nquorum = 1\n");

    project
        .zb()
        .args(&["--config", "zb.toml", "--endpoint", DEAD_ENDPOINT, "barrier"])
        .fails()
        .stderr_has("connecting to 127.0.0.1:1");
}

#[test]
fn missing_config_file_fails() {
    Project::empty()
        .zb()
        .args(&["--config", "absent.toml", "config"])
        .fails()
        .stderr_has("absent.toml");
}
