use super::*;

fn sid(n: u16) -> StudioId {
    StudioId::for_test(n)
}

#[test]
fn trigger_name_uses_x_y_other_suffix() {
    let slots = RoleSlots::new(Some(sid(1)), Some(sid(2)));
    assert_eq!(slots.trigger_name(ButtonEvent { studio: sid(1), button: Button::Takeover }), "takeover_X");
    assert_eq!(slots.trigger_name(ButtonEvent { studio: sid(2), button: Button::Release }), "release_Y");
    assert_eq!(slots.trigger_name(ButtonEvent { studio: sid(3), button: Button::Immediate }), "immediate_other");
}

#[test]
fn trigger_name_uses_x_suffix_when_x_slot_is_empty() {
    let slots = RoleSlots::default();
    assert_eq!(slots.trigger_name(ButtonEvent { studio: sid(1), button: Button::Takeover }), "takeover_X");
}

#[test]
fn trigger_name_uses_y_suffix_when_x_is_taken_and_y_slot_is_empty() {
    let slots = RoleSlots::new(Some(sid(1)), None);
    assert_eq!(slots.trigger_name(ButtonEvent { studio: sid(2), button: Button::Takeover }), "takeover_Y");
}

#[test]
fn bind_incoming_prefers_x_then_y() {
    let mut slots = RoleSlots::default();
    slots.bind_incoming(sid(1));
    assert_eq!(slots.x, Some(sid(1)));

    slots.bind_incoming(sid(2));
    assert_eq!(slots.y, Some(sid(2)));

    // Already bound studios are left alone.
    slots.bind_incoming(sid(1));
    assert_eq!(slots.x, Some(sid(1)));
    assert_eq!(slots.y, Some(sid(2)));
}

#[test]
fn bind_incoming_is_noop_when_both_slots_full() {
    let mut slots = RoleSlots::new(Some(sid(1)), Some(sid(2)));
    slots.bind_incoming(sid(3));
    assert_eq!(slots, RoleSlots::new(Some(sid(1)), Some(sid(2))));
}

#[test]
fn apply_switch_promotes_y_into_x_and_clears_y() {
    let mut slots = RoleSlots::new(Some(sid(1)), Some(sid(2)));
    slots.apply_switch();
    assert_eq!(slots, RoleSlots::new(Some(sid(2)), None));
}

#[test]
fn release_clears_whichever_slot_held_the_studio() {
    let mut slots = RoleSlots::new(Some(sid(1)), Some(sid(2)));
    slots.release(sid(1));
    assert_eq!(slots, RoleSlots::new(None, Some(sid(2))));
}

#[tokio::test]
async fn submit_is_received_in_order() {
    let (binder, mut rx) = RoleBinder::new(1);
    binder.submit(ButtonEvent { studio: sid(1), button: Button::Takeover }).await.unwrap();
    let received = rx.recv().await.unwrap();
    assert_eq!(received.studio, sid(1));
    assert_eq!(received.button, Button::Takeover);
}
