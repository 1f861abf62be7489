use std::collections::HashSet;
use std::path::PathBuf;

use super::*;

fn testdata(name: &str) -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata")).join(name)
}

#[test]
fn loads_well_formed_timers() {
    let timers = load_timers(&testdata("timers.csv")).expect("valid timers");
    assert_eq!(timers.len(), 2);
    assert_eq!(timers[0].name, "immediate_state");
}

#[test]
fn rejects_substring_timer_names() {
    let err = load_timers(&testdata("timers_substring.csv")).unwrap_err();
    assert!(matches!(err, ConfigurationError::TimerNameSubstring { .. }));
}

#[test]
fn loads_well_formed_states() {
    let states = load_states(&testdata("states.csv")).expect("valid states");
    assert_eq!(states.len(), 3);
    assert_eq!(states[0].name, "automat_on_air");
    assert_eq!(states[0].lamp_target.automat.main.color, TriColorLampColor::Green);
    // states.csv's studio_X_on_air row doesn't mention Y, so its Y target is zeroed.
    assert_eq!(states[1].lamp_target.y, StudioLampState::default());
}

#[test]
fn rejects_duplicate_state_names_case_insensitively() {
    let err = load_states(&testdata("states_duplicate_name.csv")).unwrap_err();
    assert!(matches!(err, ConfigurationError::DuplicateStateName { .. }));
}

#[test]
fn loads_well_formed_transitions() {
    let states = load_states(&testdata("states.csv")).unwrap();
    let names: HashSet<String> = states.iter().map(|s| s.name.clone()).collect();
    let timers = load_timers(&testdata("timers.csv")).unwrap();
    let timer_names: Vec<String> = timers.iter().map(|t| t.name.clone()).collect();

    let transitions = load_transitions(&testdata("transitions.csv"), &names, &timer_names).expect("valid transitions");
    assert_eq!(transitions.len(), 4);
}

#[test]
fn rejects_unknown_trigger() {
    let states = load_states(&testdata("states.csv")).unwrap();
    let names: HashSet<String> = states.iter().map(|s| s.name.clone()).collect();
    let timers = load_timers(&testdata("timers.csv")).unwrap();
    let timer_names: Vec<String> = timers.iter().map(|t| t.name.clone()).collect();

    let err = load_transitions(&testdata("transitions_unknown_trigger.csv"), &names, &timer_names).unwrap_err();
    assert!(matches!(err, ConfigurationError::UnknownTrigger { .. }));
}
