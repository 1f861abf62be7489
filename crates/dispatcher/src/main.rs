// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Demo binary: wires the dispatcher library to in-memory stand-ins for
//! the DSP selector and the lamp hardware. A real deployment swaps these
//! for a UDP DSP client and a GPIO/SPI lamp backend — both out of scope
//! for this crate, reached only through [`studio_dispatcher::selector::SelectorController`]
//! and [`studio_dispatcher::lamp::LampSink`].

use std::collections::HashMap;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use studio_dispatcher::config::DispatcherConfig;
use studio_dispatcher::error::SelectorIoError;
use studio_dispatcher::lamp::{LampSink, TriColorLampState};
use studio_dispatcher::selector::SelectorController;
use studio_dispatcher::studio::StudioId;

/// Logs every position it's asked to route instead of talking to a DSP.
struct LoggingSelector;

impl SelectorController for LoggingSelector {
    async fn set_position(&self, selector_value: i32) -> Result<(), SelectorIoError> {
        info!(selector_value, "selector set (demo backend)");
        Ok(())
    }
}

/// Logs every lamp write instead of driving GPIO/SPI hardware.
struct LoggingLampSink {
    studio_name: String,
}

impl LampSink for LoggingLampSink {
    fn set_main(&self, state: TriColorLampState) {
        info!(studio = %self.studio_name, channel = "main", ?state, "lamp set (demo backend)");
    }

    fn set_immediate(&self, state: TriColorLampState) {
        info!(studio = %self.studio_name, channel = "immediate", ?state, "lamp set (demo backend)");
    }
}

#[tokio::main]
async fn main() {
    let config = DispatcherConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let lamp_sinks = match build_lamp_sinks(&config) {
        Ok(sinks) => sinks,
        Err(e) => {
            error!("fatal: {e:#}");
            std::process::exit(1);
        }
    };

    if let Err(e) = studio_dispatcher::run(config, Arc::new(LoggingSelector), lamp_sinks).await {
        error!("fatal: {e:#}");
        std::process::exit(1);
    }
}

/// Builds one logging lamp sink per configured studio (automat included),
/// ahead of registry construction so the demo doesn't need a second pass
/// over the studios config.
fn build_lamp_sinks(config: &DispatcherConfig) -> anyhow::Result<HashMap<StudioId, Arc<dyn LampSink>>> {
    use studio_dispatcher::config::StudiosConfig;
    use studio_dispatcher::studio::{DispatcherStudioDefinition, StudioRegistry};

    let studios_config = StudiosConfig::load(&config.studios_config)?;
    let registry = StudioRegistry::new(
        DispatcherStudioDefinition::new(studios_config.automat_name, studios_config.automat_selector_value),
        studios_config
            .studios
            .into_iter()
            .map(|s| DispatcherStudioDefinition::new(s.name, s.selector_value))
            .collect(),
    )?;

    let mut sinks: HashMap<StudioId, Arc<dyn LampSink>> = HashMap::new();
    for studio in registry.all_studios() {
        sinks.insert(studio.id(), Arc::new(LoggingLampSink { studio_name: studio.name().to_owned() }));
    }
    Ok(sinks)
}
