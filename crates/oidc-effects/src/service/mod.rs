//! Effects router implementation.

mod handlers;
mod pipeline;

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::bus::ActionBus;
use crate::policy::IntentKind;
use crate::traits::{Clock, IdentityClient, SystemClock};
use crate::types::OidcAction;

/// Queue feeding one pipeline worker
pub(crate) type IntentQueue = mpsc::UnboundedSender<OidcAction>;

/// Effect handlers bound to one identity library
pub struct OidcEffects<C: IdentityClient> {
    pub(crate) client: Arc<C>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl<C: IdentityClient + 'static> OidcEffects<C> {
    /// Create effects using the wall clock
    pub fn new(client: Arc<C>) -> Self {
        Self::with_clock(client, Arc::new(SystemClock))
    }

    pub fn with_clock(client: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self { client, clock }
    }

    /// Subscribe to `bus` and start one feeder and one worker per intent kind.
    ///
    /// Subscriptions are taken before this returns, so every action
    /// dispatched afterwards is seen by every feeder. Each kind has its own
    /// subscription and queue; a slow ordered backlog never delays another
    /// kind.
    pub fn spawn(self, bus: &ActionBus) -> EffectsHandle {
        let effects = Arc::new(self);
        let mut tasks = Vec::with_capacity(IntentKind::ALL.len() * 2);

        for kind in IntentKind::ALL {
            let inbound = bus.subscribe();
            let (tx, rx) = mpsc::unbounded_channel();
            tasks.push(tokio::spawn(feed(inbound, kind, tx)));
            tasks.push(tokio::spawn(pipeline::run(
                Arc::clone(&effects),
                kind,
                rx,
                bus.clone(),
            )));
        }

        debug!(workers = IntentKind::ALL.len(), "OIDC effects started");

        EffectsHandle { tasks }
    }
}

/// Handle to the running feeders and workers
pub struct EffectsHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl EffectsHandle {
    /// Whether any router task is still alive
    pub fn is_running(&self) -> bool {
        self.tasks.iter().any(|task| !task.is_finished())
    }

    /// Stop the router and all workers, cancelling in-flight calls
    pub async fn shutdown(self) {
        for task in &self.tasks {
            task.abort();
        }
        for task in self.tasks {
            let _ = task.await;
        }
        debug!("OIDC effects stopped");
    }
}

/// Forward actions of one intent kind from the bus to its worker queue
async fn feed(mut inbound: broadcast::Receiver<OidcAction>, kind: IntentKind, queue: IntentQueue) {
    loop {
        let action = match inbound.recv().await {
            Ok(action) => action,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, intent = ?kind, "Effects router lagged behind the action bus");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!(intent = ?kind, "Action bus closed, stopping effects router");
                break;
            }
        };

        if IntentKind::of(&action) != Some(kind) {
            continue;
        }

        if queue.send(action).is_err() {
            warn!(intent = ?kind, "Effect worker stopped, dropping intent");
            break;
        }
    }
}
