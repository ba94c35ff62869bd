use crate::prelude::*;

#[test]
fn start_then_stop_round_trips_cleanly() {
    let project = Project::empty();

    project
        .devloop()
        .args(&["start", "."])
        .passes()
        .stdout_has("devloop started");

    assert!(project.wait_until_running(), "daemon never reported healthy: {}", project.daemon_log());
    assert!(project.pid_path().exists());
    assert!(project.heartbeat_path().exists());

    let index = project.index_json().expect("index.json should exist for an empty project");
    for tier in ["check_now", "mention_if_relevant", "deferred", "auto_fixed"] {
        assert_eq!(index[tier]["count"], 0);
    }

    project
        .devloop()
        .args(&["stop"])
        .passes()
        .stdout_has("devloop stopped");

    assert!(project.wait_until_stopped(), "pid file was not removed after stop");
    assert!(!project.heartbeat_path().exists());
}

#[test]
fn status_reflects_a_running_daemon() {
    let project = Project::empty();
    project.devloop().args(&["start", "."]).passes();
    assert!(project.wait_until_running());

    project
        .devloop()
        .args(&["status"])
        .passes()
        .stdout_has("devloop: running");

    project.devloop().args(&["stop"]).passes();
    assert!(project.wait_until_stopped());
}
