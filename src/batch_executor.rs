use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::watch::Receiver;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::request::{Request, Target};
use crate::results::RequestOutcome;

#[async_trait]
pub(crate) trait Executable {
    type Result;

    async fn execute(self) -> Self::Result;
}

/// Lifecycle of a run as seen by its workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
    Waiting,
    Go,
    Stop,
}

/// One worker: sends its share of request slots one after the other.
pub(crate) struct BatchExecutor<S> {
    id: usize,
    workers: usize,
    slots: S,
    target: Target,
    client: reqwest::Client,
    deadline: Instant,
    outcomes: UnboundedSender<RequestOutcome>,
}

impl<S> BatchExecutor<S>
where
    S: Iterator + Send,
{
    pub(crate) fn new(
        id: usize,
        workers: usize,
        slots: S,
        target: Target,
        client: reqwest::Client,
        deadline: Instant,
        outcomes: UnboundedSender<RequestOutcome>,
    ) -> Self {
        Self {
            id,
            workers,
            slots,
            target,
            client,
            deadline,
            outcomes,
        }
    }

    pub(crate) async fn start(self, mut signal: Receiver<Signal>) {
        info!("starting executor: {}", self.id);
        let started = signal.wait_for(|s| *s != Signal::Waiting).await.is_ok();
        if !started {
            return;
        }

        for (task_in_executor, _) in self.slots.enumerate() {
            if *signal.borrow() == Signal::Stop || Instant::now() >= self.deadline {
                break;
            }
            let request = Request::new(
                &self.target,
                self.id,
                task_in_executor,
                self.workers,
                &self.client,
            );
            let outcome = tokio::select! {
                outcome = request.execute() => outcome,
                _ = tokio::time::sleep_until(self.deadline) => break,
                _ = stopped(&mut signal) => break,
            };
            if self.outcomes.send(outcome).is_err() {
                break;
            }
        }
        debug!("executor {} done", self.id);
    }
}

async fn stopped(signal: &mut Receiver<Signal>) {
    // a dropped sender also ends the run
    let _ = signal.wait_for(|s| *s == Signal::Stop).await;
}
