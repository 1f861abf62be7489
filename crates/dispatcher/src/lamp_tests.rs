use super::*;

#[yare::parameterized(
    off = { LampState::Off, None },
    on = { LampState::On, None },
    blink = { LampState::Blink, Some(2.0) },
    blink_fast = { LampState::BlinkFast, Some(6.0) },
    blink_really_fast = { LampState::BlinkReallyFast, Some(10.0) },
)]
fn frequency_hz_matches_table(state: LampState, expected: Option<f64>) {
    assert_eq!(state.frequency_hz(), expected);
}

#[test]
fn ignoring_immediate_zeroes_immediate_channel_only() {
    let mut target = LampStateTarget::default();
    target.x.main = TriColorLampState::new(LampState::On, TriColorLampColor::Green);
    target.x.immediate = TriColorLampState::new(LampState::Blink, TriColorLampColor::Red);

    let stripped = target.ignoring_immediate();
    assert_eq!(stripped.x.main, target.x.main);
    assert_eq!(stripped.x.immediate, TriColorLampState::off());
}

#[test]
fn ignoring_immediate_considers_targets_equal_when_only_immediate_differs() {
    let mut a = LampStateTarget::default();
    a.x.main = TriColorLampState::new(LampState::On, TriColorLampColor::Green);
    a.x.immediate = TriColorLampState::new(LampState::Blink, TriColorLampColor::Red);

    let mut b = a;
    b.x.immediate = TriColorLampState::off();

    assert_ne!(a, b);
    assert_eq!(a.ignoring_immediate(), b.ignoring_immediate());
}
