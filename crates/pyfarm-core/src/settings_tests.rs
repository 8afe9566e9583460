use super::*;

#[test]
fn env_bool_falls_back_to_default_on_garbage() {
    std::env::set_var("PYFARM_TEST_BOOL_GARBAGE", "maybe");
    assert!(env_bool("PYFARM_TEST_BOOL_GARBAGE", true));
    assert!(!env_bool("PYFARM_TEST_BOOL_GARBAGE", false));
    std::env::remove_var("PYFARM_TEST_BOOL_GARBAGE");
}

#[test]
fn env_bool_parses_common_truthy_and_falsy_spellings() {
    std::env::set_var("PYFARM_TEST_BOOL_TRUE", "yes");
    assert!(env_bool("PYFARM_TEST_BOOL_TRUE", false));
    std::env::remove_var("PYFARM_TEST_BOOL_TRUE");

    std::env::set_var("PYFARM_TEST_BOOL_FALSE", "off");
    assert!(!env_bool("PYFARM_TEST_BOOL_FALSE", true));
    std::env::remove_var("PYFARM_TEST_BOOL_FALSE");
}

#[test]
fn env_duration_secs_falls_back_on_unparseable_value() {
    std::env::set_var("PYFARM_TEST_DURATION", "not-a-number");
    assert_eq!(
        env_duration_secs("PYFARM_TEST_DURATION", Duration::from_secs(42)),
        Duration::from_secs(42)
    );
    std::env::remove_var("PYFARM_TEST_DURATION");
}

#[test]
fn settings_from_env_uses_documented_defaults_when_unset() {
    std::env::remove_var("PYFARM_POLL_BUSY_AGENTS_INTERVAL");
    std::env::remove_var("PYFARM_POLL_IDLE_AGENTS_INTERVAL");
    let settings = Settings::from_env();
    assert_eq!(settings.poll_busy_agents_interval, Duration::from_secs(600));
    assert_eq!(settings.poll_idle_agents_interval, Duration::from_secs(3600));
    assert!(settings.prefer_running_jobs);
    assert!(!settings.use_total_ram_for_scheduling);
}
