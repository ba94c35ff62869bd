use crate::prelude::*;

/// A "linter" that is really just `sh -c echo`, producing one line of
/// compact `file:line:col: CODE message` output matching the format
/// `devloop-builtins` parses for real lint tools.
fn fake_linter_agents_json() -> &'static str {
    r#"{
        "agents": [
            {
                "type": "linter",
                "name": "fake-lint",
                "program": "sh",
                "args": ["-c", "echo '{file}:1:1: F401 unused import os'"],
                "triggers": ["file:save"],
                "autofix_advertised": true
            }
        ]
    }"#
}

#[test]
fn lint_finding_surfaces_in_the_relevant_tier() {
    let project = Project::empty();
    project.agents_config(fake_linter_agents_json());

    project.devloop().args(&["start", "."]).passes();
    assert!(project.wait_until_running(), "daemon never reported healthy: {}", project.daemon_log());

    // Create the file first, then overwrite its contents once the watcher
    // is live, so the collector observes a genuine `file:modified` (the
    // one that carries `file:save`) rather than only `file:created`.
    project.file("src/sample.py", "");
    std::thread::sleep(std::time::Duration::from_millis(300));
    project.file("src/sample.py", "import os\nprint(\"x\")\n");

    let relevant_has_one = wait_for(SPEC_WAIT_MAX_MS, || {
        project
            .tier_json("relevant.json")
            .map(|v| v["count"].as_u64() == Some(1))
            .unwrap_or(false)
    });
    assert!(relevant_has_one, "daemon log:\n{}", project.daemon_log());

    let index = project.index_json().unwrap();
    assert_eq!(index["mention_if_relevant"]["count"], 1);
    assert_eq!(index["check_now"]["count"], 0);

    let relevant = project.tier_json("relevant.json").unwrap();
    let finding = &relevant["findings"][0];
    assert_eq!(finding["category"], "lint_F401");
    assert_eq!(finding["auto_fixable"], true);
    assert_eq!(finding["line"], 1);

    project.devloop().args(&["stop"]).passes();
    assert!(project.wait_until_stopped());
}
