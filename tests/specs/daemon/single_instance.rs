use crate::prelude::*;

#[test]
fn second_start_is_rejected_with_exit_code_three() {
    let project = Project::empty();

    project.devloop().args(&["start", "."]).passes();
    assert!(project.wait_until_running(), "daemon never reported healthy: {}", project.daemon_log());

    let pid_before = std::fs::read_to_string(project.pid_path()).unwrap();
    let heartbeat_before = std::fs::read_to_string(project.heartbeat_path()).unwrap();

    project
        .devloop()
        .args(&["start", "."])
        .fails_with(3)
        .stderr_has("already running");

    // The first instance is untouched by the rejected second attempt.
    assert_eq!(std::fs::read_to_string(project.pid_path()).unwrap(), pid_before);
    assert!(std::fs::read_to_string(project.heartbeat_path()).unwrap() >= heartbeat_before);

    project.devloop().args(&["stop"]).passes();
    assert!(project.wait_until_stopped());
}
