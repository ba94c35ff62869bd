use crate::prelude::*;

/// A fake type checker that always reports one `error`-severity diagnostic,
/// simulating a syntax error being caught on save.
fn fake_type_checker_agents_json() -> &'static str {
    r#"{
        "agents": [
            {
                "type": "type_checker",
                "name": "fake-typecheck",
                "program": "sh",
                "args": ["-c", "echo '{file}:1: error: syntax error [syntax]'"],
                "triggers": ["file:save"]
            }
        ]
    }"#
}

#[test]
fn blocking_error_surfaces_in_the_immediate_tier() {
    let project = Project::empty();
    project.agents_config(fake_type_checker_agents_json());

    project.devloop().args(&["start", "."]).passes();
    assert!(project.wait_until_running(), "daemon never reported healthy: {}", project.daemon_log());

    project.file("src/sample.py", "");
    std::thread::sleep(std::time::Duration::from_millis(300));
    project.file("src/sample.py", "def broken(:\n");

    let immediate_has_one = wait_for(SPEC_WAIT_MAX_MS, || {
        project
            .tier_json("immediate.json")
            .map(|v| v["count"].as_u64() == Some(1))
            .unwrap_or(false)
    });
    assert!(immediate_has_one, "daemon log:\n{}", project.daemon_log());

    let index = project.index_json().unwrap();
    assert_eq!(index["check_now"]["count"], 1);
    assert_eq!(index["check_now"]["severity_breakdown"]["error"], 1);

    let immediate = project.tier_json("immediate.json").unwrap();
    let finding = &immediate["findings"][0];
    assert_eq!(finding["severity"], "error");
    assert_eq!(finding["blocking"], true);

    project.devloop().args(&["stop"]).passes();
    assert!(project.wait_until_stopped());
}
