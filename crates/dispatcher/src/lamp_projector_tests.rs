use std::sync::Mutex;

use super::*;
use crate::lamp::{LampState, TriColorLampColor, TriColorLampState};
use crate::studio::DispatcherStudioDefinition;

#[derive(Default)]
struct RecordingSink {
    main: Mutex<Option<TriColorLampState>>,
    immediate: Mutex<Option<TriColorLampState>>,
}

impl LampSink for RecordingSink {
    fn set_main(&self, state: TriColorLampState) {
        *self.main.lock().unwrap() = Some(state);
    }

    fn set_immediate(&self, state: TriColorLampState) {
        *self.immediate.lock().unwrap() = Some(state);
    }
}

fn registry() -> StudioRegistry {
    StudioRegistry::new(
        DispatcherStudioDefinition::new("automat", 1),
        vec![
            DispatcherStudioDefinition::new("alpha", 2),
            DispatcherStudioDefinition::new("bravo", 3),
        ],
    )
    .unwrap()
}

#[test]
fn projects_role_specific_lamp_state_to_each_sink() {
    let registry = registry();
    let alpha = registry.by_name("alpha").unwrap();
    let bravo = registry.by_name("bravo").unwrap();
    let automat = registry.automat_id();

    let automat_sink = Arc::new(RecordingSink::default());
    let alpha_sink = Arc::new(RecordingSink::default());
    let bravo_sink = Arc::new(RecordingSink::default());

    let mut sinks: HashMap<StudioId, Arc<dyn LampSink>> = HashMap::new();
    sinks.insert(automat, automat_sink.clone());
    sinks.insert(alpha, alpha_sink.clone());
    sinks.insert(bravo, bravo_sink.clone());

    let mut target = LampStateTarget::default();
    target.automat.main = TriColorLampState::new(LampState::On, TriColorLampColor::Green);
    target.x.main = TriColorLampState::new(LampState::On, TriColorLampColor::Red);
    target.other.main = TriColorLampState::new(LampState::Off, TriColorLampColor::None);

    let projector = LampProjector::new(sinks, Observer::default());
    projector.project(&registry, &target, Some(alpha), None, "studio_alpha_on_air");

    assert_eq!(*automat_sink.main.lock().unwrap(), Some(target.automat.main));
    assert_eq!(*alpha_sink.main.lock().unwrap(), Some(target.x.main));
    // bravo is neither automat nor bound to x/y, so it gets "other".
    assert_eq!(*bravo_sink.main.lock().unwrap(), Some(target.other.main));
}

#[test]
fn missing_sink_is_skipped_without_panicking() {
    let registry = registry();
    let projector = LampProjector::new(HashMap::new(), Observer::default());
    projector.project(&registry, &LampStateTarget::default(), None, None, "automat_on_air");
}

#[test]
fn project_publishes_lamp_targets_updated() {
    let registry = registry();
    let observer = Observer::default();
    let mut events = observer.subscribe();
    let projector = LampProjector::new(HashMap::new(), observer);

    projector.project(&registry, &LampStateTarget::default(), None, None, "automat_on_air");

    let event = events.try_recv().unwrap();
    assert!(matches!(event, DispatcherEvent::LampTargetsUpdated { state, .. } if state == "automat_on_air"));
}
