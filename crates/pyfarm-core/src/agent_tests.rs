use super::*;

#[test]
fn available_ram_honors_use_total_flag() {
    let agent = Agent::builder().ram(4096).free_ram(1024).build();
    assert_eq!(agent.available_ram(true), 4096);
    assert_eq!(agent.available_ram(false), 1024);
}

#[test]
fn dispatch_address_for_remote_prefers_remote_ip() {
    let agent = Agent::builder()
        .use_address(UseAddress::Remote)
        .remote_ip("10.0.0.5")
        .build();
    assert_eq!(agent.dispatch_address().as_deref(), Some("10.0.0.5"));
}

#[test]
fn dispatch_address_for_hostname_ignores_remote_ip() {
    let agent = Agent::builder()
        .use_address(UseAddress::Hostname)
        .hostname("render-01")
        .remote_ip("10.0.0.5")
        .build();
    assert_eq!(agent.dispatch_address().as_deref(), Some("render-01"));
}

#[test]
fn dispatch_address_for_passive_is_none() {
    let agent = Agent::builder().use_address(UseAddress::Passive).build();
    assert_eq!(agent.dispatch_address(), None);
}

#[test]
fn online_and_running_are_available_offline_and_disabled_are_not() {
    assert!(AgentState::Online.is_available());
    assert!(AgentState::Running.is_available());
    assert!(!AgentState::Offline.is_available());
    assert!(!AgentState::Disabled.is_available());
}
