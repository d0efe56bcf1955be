//! Configuration specs

use crate::prelude::*;

#[test]
fn defaults_are_printed_as_toml() {
    Project::empty()
        .zb()
        .args(&["config"])
        .passes()
        .stdout_has("endpoint = \"127.0.0.1:2181\"")
        .stdout_has("root = \"/b1\"")
        .stdout_has("quorum = 2")
        .stdout_has("variant = \"double\"");
}

#[test]
fn file_values_and_flag_overrides_merge() {
    let project = Project::empty();
    project.file(
        "zb.toml",
        "endpoint = \"zk1:2181,zk2:2181\"\nquorum = 3\nconnect_timeout = \"5s\"\n",
    );

    project
        .zb()
        .args(&["--config", "zb.toml", "--root", "/jobs", "config"])
        .passes()
        .stdout_has("endpoint = \"zk1:2181,zk2:2181\"")
        .stdout_has("root = \"/jobs\"")
        .stdout_has("quorum = 3")
        .stdout_has("connect_timeout = \"5s\"");
}

#[test]
fn check_rejects_invalid_file() {
    let project = Project::empty();
    project.file("zb.toml", "variant = \"nested\"\nsubgroup = \"g1\"\n");

    project
        .zb()
        .args(&["--config", "zb.toml", "config", "--check"])
        .fails()
        .stderr_has("at least one stage");
}

#[test]
fn unknown_keys_are_rejected() {
    let project = Project::empty();
    project.file("zb.toml", "quorom = 3\n");

    project
        .zb()
        .args(&["--config", "zb.toml", "config"])
        .fails()
        .stderr_has("quorom");
}

#[test]
fn round_trip_of_printed_config_is_stable() {
    let project = Project::empty();
    let printed = project.zb().args(&["config"]).passes().stdout().to_string();
    project.file("zb.toml", &printed);

    project
        .zb()
        .args(&["--config", "zb.toml", "config"])
        .passes()
        .stdout_eq(&printed);
}
