//! Pipeline workers, one per intent kind.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::handlers::Outcome;
use super::OidcEffects;
use crate::bus::ActionBus;
use crate::policy::{EffectPolicy, IntentKind};
use crate::traits::IdentityClient;
use crate::types::OidcAction;

pub(super) async fn run<C: IdentityClient + 'static>(
    effects: Arc<OidcEffects<C>>,
    kind: IntentKind,
    intents: mpsc::UnboundedReceiver<OidcAction>,
    bus: ActionBus,
) {
    match kind.policy() {
        EffectPolicy::LatestWins => run_latest_wins(effects, kind, intents, bus).await,
        EffectPolicy::Ordered => run_ordered(effects, kind, intents, bus).await,
    }
}

/// A newer intent drops the pending outcome future, cancelling its call
async fn run_latest_wins<C: IdentityClient + 'static>(
    effects: Arc<OidcEffects<C>>,
    kind: IntentKind,
    mut intents: mpsc::UnboundedReceiver<OidcAction>,
    bus: ActionBus,
) {
    let mut in_flight: Option<(Uuid, Outcome)> = None;

    loop {
        tokio::select! {
            biased;

            next = intents.recv() => {
                let Some(action) = next else { break };
                if let Some((superseded, _)) = in_flight.take() {
                    debug!(run_id = %superseded, intent = ?kind, "Cancelled by newer intent");
                }
                let run_id = Uuid::new_v4();
                in_flight = Some((run_id, effects.handle(action, run_id)));
            }

            actions = async {
                match in_flight.as_mut() {
                    Some((_, outcome)) => outcome.await,
                    None => std::future::pending().await,
                }
            } => {
                if let Some((run_id, _)) = in_flight.take() {
                    emit(&bus, kind, run_id, actions);
                }
            }
        }
    }
}

/// Every intent is handled to completion, in arrival order
async fn run_ordered<C: IdentityClient + 'static>(
    effects: Arc<OidcEffects<C>>,
    kind: IntentKind,
    mut intents: mpsc::UnboundedReceiver<OidcAction>,
    bus: ActionBus,
) {
    while let Some(action) = intents.recv().await {
        let run_id = Uuid::new_v4();
        let actions = effects.handle(action, run_id).await;
        emit(&bus, kind, run_id, actions);
    }
}

fn emit(bus: &ActionBus, kind: IntentKind, run_id: Uuid, actions: Vec<OidcAction>) {
    if !kind.dispatches() {
        return;
    }

    for action in actions {
        let tag = action.tag();
        if let Err(e) = bus.dispatch(action) {
            warn!(%run_id, intent = ?kind, action = tag, error = %e, "Failed to dispatch action");
            return;
        }
        debug!(%run_id, intent = ?kind, action = tag, "Dispatched action");
    }
}
