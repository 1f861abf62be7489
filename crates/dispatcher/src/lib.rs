// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Studio dispatcher: the state-machine coordinator that decides which
//! studio is on air, mediates hour-boundary handovers and emergency
//! takeovers, and projects the result onto status lamps. The DSP client,
//! the button I/O backend, the lamp hardware backend, and the HTTP/
//! WebSocket surface are all external collaborators, reached only through
//! the traits this crate defines.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod lamp;
pub mod lamp_projector;
pub mod machine;
pub mod observer;
pub mod persistence;
pub mod role_binder;
pub mod selector;
pub mod studio;
pub mod tables;
pub mod timers;

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{DispatcherConfig, StudiosConfig};
use crate::dispatcher::{Dispatcher, DispatcherHandle};
use crate::lamp::LampSink;
use crate::machine::Machine;
use crate::persistence::PersistenceStore;
use crate::role_binder::RoleSlots;
use crate::selector::SelectorController;
use crate::studio::{DispatcherStudioDefinition, StudioId, StudioRegistry};

/// Build the studio registry, compile the state graph from the table
/// files, restore persisted state if any, and run the dispatcher until
/// shutdown. `selector` and `lamp_sinks` are the two hardware
/// collaborators the caller supplies (GPIO/SPI lamp output and the DSP's
/// UDP client are both out of scope for this crate).
pub async fn run<S: SelectorController>(
    config: DispatcherConfig,
    selector: Arc<S>,
    lamp_sinks: HashMap<StudioId, Arc<dyn LampSink>>,
) -> anyhow::Result<()> {
    let studios_config = StudiosConfig::load(&config.studios_config)?;
    let registry = StudioRegistry::new(
        DispatcherStudioDefinition::new(studios_config.automat_name, studios_config.automat_selector_value),
        studios_config
            .studios
            .into_iter()
            .map(|s| DispatcherStudioDefinition::new(s.name, s.selector_value))
            .collect(),
    )?;
    registry.validate_automat_range(config.position_count)?;

    let timers = tables::load_timers(&config.tables_dir.join("timers.csv"))?;
    let states = tables::load_states(&config.tables_dir.join("states.csv"))?;
    let state_names: std::collections::HashSet<String> = states.iter().map(|s| s.name.clone()).collect();
    let timer_names: Vec<String> = timers.iter().map(|t| t.name.clone()).collect();
    let transitions = tables::load_transitions(&config.tables_dir.join("transitions.csv"), &state_names, &timer_names)?;

    let machine = Machine::compile(states, transitions, &config.initial_state)?;
    let timer_durations: HashMap<String, std::time::Duration> = timers
        .into_iter()
        .map(|t| (t.name, std::time::Duration::from_secs_f64(t.timeout_seconds)))
        .collect();

    let lamp_projector = lamp_projector::LampProjector::new(lamp_sinks, observer::Observer::new(config.event_channel_capacity));
    let persistence = PersistenceStore::new(&config.state_file);

    let (mut dispatcher, handle) = Dispatcher::new(
        registry,
        machine,
        RoleSlots::default(),
        timer_durations,
        selector,
        lamp_projector,
        persistence,
        config.role_queue_capacity,
        config.event_channel_capacity,
    );
    dispatcher.restore_snapshot();

    let mut run_task = tokio::spawn(dispatcher.run());
    tokio::select! {
        res = &mut run_task => {
            res?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl-c, shutting down");
            handle.shutdown();
            run_task.await?;
        }
    }

    Ok(())
}
