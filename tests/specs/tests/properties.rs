//! Property tests over the compiled state graph and the role-slot
//! bookkeeping: sequences of arbitrary triggers/button events should
//! never panic and should never leave the role slots double-booked.

use std::path::PathBuf;

use proptest::prelude::*;
use studio_dispatcher::machine::Machine;
use studio_dispatcher::role_binder::RoleSlots;
use studio_dispatcher::studio::StudioId;
use studio_dispatcher::tables;

const TRIGGER_NAMES: &[&str] = &[
    "next_hour",
    "takeover_X",
    "takeover_Y",
    "takeover_other",
    "release_X",
    "release_Y",
    "release_other",
    "immediate_X",
    "immediate_Y",
    "immediate_other",
    "immediate_state_timeout",
    "immediate_release_timeout",
    "no_such_trigger",
];

fn tables_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../crates/dispatcher/tables"))
}

fn compiled_machine() -> Machine {
    let dir = tables_dir();
    let timers = tables::load_timers(&dir.join("timers.csv")).expect("valid timers table");
    let states = tables::load_states(&dir.join("states.csv")).expect("valid states table");
    let state_names: std::collections::HashSet<String> = states.iter().map(|s| s.name.clone()).collect();
    let timer_names: Vec<String> = timers.iter().map(|t| t.name.clone()).collect();
    let transitions =
        tables::load_transitions(&dir.join("transitions.csv"), &state_names, &timer_names).expect("valid transitions table");
    Machine::compile(states, transitions, "automat_on_air").expect("machine compiles")
}

proptest! {
    /// P1: any sequence of triggers fired against the compiled canonical
    /// graph either advances the cursor to a legal destination or leaves
    /// it untouched — it never panics and the cursor is always resolvable
    /// back to a state name.
    #[test]
    fn any_trigger_sequence_never_panics(indices in prop::collection::vec(0..TRIGGER_NAMES.len(), 0..64)) {
        let mut machine = compiled_machine();
        for idx in indices {
            let name = TRIGGER_NAMES[idx];
            if let Some(trigger) = machine.trigger_id(name) {
                let _ = machine.fire(trigger);
            }
            // Whether or not the fire succeeded, the cursor must always
            // resolve to a real state name.
            let _ = machine.state_name(machine.current());
        }
    }

    /// P2: regardless of how role slots are bound, swapped, and released,
    /// a single studio never simultaneously occupies both X and Y.
    #[test]
    fn role_slots_never_double_book_a_studio(ops in prop::collection::vec(0u8..4, 0..64), studio_ids in prop::collection::vec(0u16..4, 0..64)) {
        let mut slots = RoleSlots::default();
        for (op, raw_id) in ops.into_iter().zip(studio_ids) {
            let studio = StudioId::for_test(raw_id);
            match op {
                0 => slots.bind_incoming(studio),
                1 => slots.apply_switch(),
                2 => slots.release(studio),
                _ => {}
            }
            if let (Some(x), Some(y)) = (slots.x, slots.y) {
                prop_assert_ne!(x, y);
            }
        }
    }
}
