use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::models::{CardInput, RegistrationForm};
use crate::services::checkout_service::SessionTable;
use crate::services::RegistrationService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerTimings {
    pub submit_delay: Duration,
    pub confirm_delay: Duration,
}

impl Default for SequencerTimings {
    fn default() -> Self {
        Self {
            submit_delay: Duration::from_millis(2000),
            confirm_delay: Duration::from_millis(1500),
        }
    }
}

/// A spawned callback that can be abandoned before it completes.
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self { handle: tokio::spawn(future) }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Drives a checkout from `processing(submitting)` to its end state.
///
/// No payment network is contacted; the two delays stand in for the submit
/// and confirm round trips. The only real call is the registration write.
#[derive(Clone)]
pub struct PaymentSequencer {
    registrations: Arc<RegistrationService>,
    timings: SequencerTimings,
}

impl PaymentSequencer {
    pub fn new(registrations: Arc<RegistrationService>, timings: SequencerTimings) -> Self {
        Self { registrations, timings }
    }

    pub fn registrations(&self) -> &RegistrationService {
        &self.registrations
    }

    pub fn start(&self, sessions: SessionTable, checkout_id: Uuid) -> ScheduledTask {
        let sequencer = self.clone();
        ScheduledTask::spawn(async move { sequencer.run(sessions, checkout_id).await })
    }

    async fn run(&self, sessions: SessionTable, checkout_id: Uuid) {
        tokio::time::sleep(self.timings.submit_delay).await;
        {
            let mut table = sessions.write().await;
            let Some(session) = table.get_mut(&checkout_id) else {
                return;
            };
            if let Err(e) = session.state.confirm() {
                warn!("Checkout {} left the submit phase early: {}", checkout_id, e);
                return;
            }
        }
        info!("Checkout {} confirming", checkout_id);

        tokio::time::sleep(self.timings.confirm_delay).await;
        let form = {
            let table = sessions.read().await;
            match table.get(&checkout_id) {
                Some(session) => session.form.clone(),
                None => return,
            }
        };

        let saved = self.registrations.save(form).await;

        let mut table = sessions.write().await;
        // dismissed while the write was in flight
        let Some(session) = table.get_mut(&checkout_id) else {
            return;
        };
        let outcome = match saved {
            Ok(company_id) => {
                let card_last_four = session.card.last_four();
                session.state.succeed(company_id, card_last_four).map(|_| {
                    session.form = RegistrationForm::default();
                    session.card = CardInput::new();
                })
            }
            Err(e) => session.state.fail(e.to_string()),
        };
        session.touch();
        match outcome {
            Ok(()) => info!("Checkout {} finished as {}", checkout_id, session.state.name()),
            Err(e) => warn!("Checkout {} could not finish: {}", checkout_id, e),
        }
    }
}
