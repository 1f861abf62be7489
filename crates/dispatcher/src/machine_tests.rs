use super::*;
use crate::lamp::LampStateTarget;

fn state(name: &str) -> StateRow {
    StateRow { name: name.to_owned(), lamp_target: LampStateTarget::default() }
}

fn transition(trigger: &str, source: &str, dest: &str, switch_xy: bool) -> TransitionRow {
    TransitionRow { trigger: trigger.to_owned(), source: source.to_owned(), dest: dest.to_owned(), switch_xy }
}

fn sample_machine() -> Machine {
    let states = vec![state("automat_on_air"), state("studio_x_on_air"), state("studio_x_on_air_immediate")];
    let transitions = vec![
        transition("takeover_x", "automat_on_air", "studio_x_on_air", false),
        transition("immediate_x", "studio_x_on_air", "studio_x_on_air_immediate", false),
        transition("release_x", "studio_x_on_air", "automat_on_air", false),
    ];
    Machine::compile(states, transitions, "automat_on_air").expect("compiles")
}

#[test]
fn fires_legal_transition_and_advances_cursor() {
    let mut machine = sample_machine();
    let trigger = machine.trigger_id("takeover_x").unwrap();
    let outcome = machine.fire(trigger).expect("legal transition");

    assert_eq!(machine.state_name(outcome.previous), "automat_on_air");
    assert_eq!(machine.state_name(outcome.next), "studio_x_on_air");
    assert_eq!(machine.current(), outcome.next);
}

#[test]
fn rejects_illegal_transition_without_moving_cursor() {
    let mut machine = sample_machine();
    let release = machine.trigger_id("release_x").unwrap();
    let before = machine.current();

    let err = machine.fire(release).unwrap_err();
    assert_eq!(err.state, "automat_on_air");
    assert_eq!(err.trigger, "release_x");
    assert_eq!(machine.current(), before);
}

#[test]
fn can_fire_reports_legality_without_side_effects() {
    let machine = sample_machine();
    let takeover = machine.trigger_id("takeover_x").unwrap();
    let release = machine.trigger_id("release_x").unwrap();

    assert!(machine.can_fire(takeover));
    assert!(!machine.can_fire(release));
    assert_eq!(machine.current(), machine.state_id("automat_on_air").unwrap());
}

#[test]
fn restore_bypasses_transitions() {
    let mut machine = sample_machine();
    let immediate = machine.state_id("studio_x_on_air_immediate").unwrap();
    machine.restore(immediate);
    assert_eq!(machine.current(), immediate);
}
