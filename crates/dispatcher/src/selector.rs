// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The DSP selector and its convergence loop (§4.4). Talking to the DSP
//! itself (the UDP client) is out of scope — this module only defines the
//! contract and the periodic reassertion pattern the dispatcher drives it
//! with.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::error::SelectorIoError;
use crate::observer::{DispatcherEvent, Observer};

/// External collaborator: the DSP's input selector. `set_position` is
/// expected to be idempotent — the convergence loop calls it on a timer
/// regardless of whether the last call is believed to have succeeded.
pub trait SelectorController: Send + Sync + 'static {
    /// Route the given selector value to air. Returns once the DSP has
    /// acknowledged (or NAK'd, or timed out).
    fn set_position(
        &self,
        selector_value: i32,
    ) -> impl std::future::Future<Output = Result<(), SelectorIoError>> + Send;
}

/// Holds the desired selector value and re-asserts it on the DSP every
/// `[300, 600)` seconds, the same jittered interval the original
/// implementation uses to survive a DSP that silently drops state.
pub struct SelectorConvergenceLoop<S: SelectorController> {
    controller: Arc<S>,
    observer: Observer,
}

impl<S: SelectorController> SelectorConvergenceLoop<S> {
    pub fn new(controller: Arc<S>, observer: Observer) -> Self {
        Self { controller, observer }
    }

    /// Push the new desired value immediately (called right after a
    /// transition settles), independent of the periodic reassertion.
    pub async fn push(&self, selector_value: i32) {
        self.reassert(selector_value).await;
    }

    /// Run until `cancel` fires, reasserting `current_selector_value()`
    /// on a jittered interval. `current_selector_value` is read fresh on
    /// every tick so a transition that lands mid-sleep is picked up on
    /// the next reassert instead of waiting a full cycle behind.
    pub async fn run(
        &self,
        current_selector_value: impl Fn() -> i32,
        cancel: CancellationToken,
    ) {
        loop {
            let delay = jittered_interval();
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("selector convergence loop shutting down");
                    return;
                }
                _ = tokio::time::sleep(delay) => {
                    self.reassert(current_selector_value()).await;
                }
            }
        }
    }

    async fn reassert(&self, selector_value: i32) {
        match self.controller.set_position(selector_value).await {
            Ok(()) => {
                self.observer.publish(DispatcherEvent::SelectorConverged { selector_value });
            }
            Err(e) => {
                tracing::warn!(selector_value, error = %e, "selector reassert failed");
                self.observer.publish(DispatcherEvent::SelectorIoFailed {
                    selector_value,
                    message: e.to_string(),
                });
            }
        }
    }
}

fn jittered_interval() -> Duration {
    let seconds = rand::rng().random_range(300..600);
    Duration::from_secs(seconds)
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;
