use crate::prelude::*;

#[test]
fn help_lists_all_subcommands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("status")
        .stdout_has("start")
        .stdout_has("stop");
}

#[test]
fn version_flag_reports_a_version() {
    cli().args(&["--version"]).passes();
}

#[test]
fn status_on_a_project_with_no_daemon_reports_not_running() {
    let project = Project::empty();
    project
        .devloop()
        .args(&["status"])
        .passes()
        .stdout_has("not running");
}

#[test]
fn stop_on_a_project_with_no_daemon_fails() {
    let project = Project::empty();
    project.devloop().args(&["stop"]).fails();
}
