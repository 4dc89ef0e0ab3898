use mitsubishi2mqtt::logging;

/// Logging installs a global subscriber, so everything lives in one test.
#[test]
fn test_console_file_receives_events() {
    let dir = std::env::temp_dir().join(format!("m2mqtt-logging-{}", std::process::id()));
    let console = dir.join("console.log");
    std::fs::remove_dir_all(&dir).ok();

    logging::init(Some(&console)).unwrap();
    tracing::warn!(unit = "living", "heat pump not responding");

    let contents = std::fs::read_to_string(&console).unwrap();
    let separator = "=".repeat(49);
    assert_eq!(contents.matches(separator.as_str()).count(), 1);
    assert!(contents.find(separator.as_str()) < contents.find("heat pump not responding"));
    assert!(contents.contains("heat pump not responding"));
    assert!(contents.contains("unit=\"living\""));
    assert!(!contents.contains("\u{1b}["), "file output must not contain ANSI codes");

    // A second subscriber cannot be installed and leaves the file alone
    assert!(logging::init(None).is_err());
    assert!(logging::init(Some(&console)).is_err());
    let after = std::fs::read_to_string(&console).unwrap();
    assert_eq!(after.matches(separator.as_str()).count(), 1);

    std::fs::remove_dir_all(&dir).ok();
}
