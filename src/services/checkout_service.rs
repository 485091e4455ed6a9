use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use log::{info, warn};
use tokio::sync::RwLock;
use tokio::time::{Instant, MissedTickBehavior};
use uuid::Uuid;

use crate::models::{
    ApiError, CardInput, CardUpdate, CardView, CheckoutState, CheckoutView, RegistrationForm,
};
use crate::services::payment_sequencer::{PaymentSequencer, ScheduledTask};
use crate::utils::validation::validate_card;

/// How long finished and abandoned checkouts are kept around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionExpiry {
    /// `editing` sessions untouched for this long are dropped.
    pub idle_ttl: Duration,
    /// `succeeded` sessions keep their receipt this long.
    pub receipt_ttl: Duration,
    pub sweep_interval: Duration,
}

impl Default for SessionExpiry {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(30 * 60),
            receipt_ttl: Duration::from_secs(5 * 60),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

/// One open payment dialog.
pub struct CheckoutSession {
    pub form: RegistrationForm,
    pub card: CardInput,
    pub state: CheckoutState,
    task: Option<ScheduledTask>,
    touched: Instant,
}

impl CheckoutSession {
    fn new(form: RegistrationForm) -> Self {
        Self {
            form,
            card: CardInput::new(),
            state: CheckoutState::default(),
            task: None,
            touched: Instant::now(),
        }
    }

    pub(crate) fn touch(&mut self) {
        self.touched = Instant::now();
    }

    fn is_expired(&self, expiry: &SessionExpiry, now: Instant) -> bool {
        if self.state.is_processing() {
            return false;
        }
        let ttl = match self.state {
            CheckoutState::Succeeded { .. } => expiry.receipt_ttl,
            _ => expiry.idle_ttl,
        };
        now.saturating_duration_since(self.touched) >= ttl
    }
}

pub type SessionTable = Arc<RwLock<HashMap<Uuid, CheckoutSession>>>;

/// Drops expired sessions, returning how many were removed.
fn expire_sessions(
    sessions: &mut HashMap<Uuid, CheckoutSession>,
    expiry: &SessionExpiry,
    now: Instant,
) -> usize {
    let before = sessions.len();
    sessions.retain(|_, session| !session.is_expired(expiry, now));
    before - sessions.len()
}

async fn sweep_sessions(sessions: Weak<RwLock<HashMap<Uuid, CheckoutSession>>>, expiry: SessionExpiry) {
    let mut ticker = tokio::time::interval(expiry.sweep_interval.max(Duration::from_secs(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let Some(sessions) = sessions.upgrade() else {
            return;
        };
        let mut table = sessions.write().await;
        let expired = expire_sessions(&mut table, &expiry, Instant::now());
        if expired > 0 {
            info!("Expired {} checkout(s), {} still open", expired, table.len());
        }
    }
}

pub struct CheckoutService {
    sessions: SessionTable,
    sequencer: PaymentSequencer,
    sweeper: ScheduledTask,
}

impl CheckoutService {
    /// Must be called inside a tokio runtime; the expiry sweeper is spawned here.
    pub fn new(sequencer: PaymentSequencer, expiry: SessionExpiry) -> Self {
        let sessions: SessionTable = Arc::new(RwLock::new(HashMap::new()));
        let sweeper = ScheduledTask::spawn(sweep_sessions(Arc::downgrade(&sessions), expiry));
        Self {
            sessions,
            sequencer,
            sweeper,
        }
    }

    fn view(&self, checkout_id: Uuid, session: &CheckoutSession) -> CheckoutView {
        CheckoutView {
            checkout_id,
            state: session.state.clone(),
            amount_due: self.sequencer.registrations().registration_fee(),
            card: CardView::from(&session.card),
        }
    }

    /// Opens the payment step for a registration. Every missing required
    /// field is reported at once and no session is created.
    pub async fn open(&self, form: RegistrationForm) -> Result<CheckoutView, ApiError> {
        let errors = self.sequencer.registrations().validate(&form);
        if !errors.is_empty() {
            info!("Registration rejected with {} missing field(s)", errors.len());
            return Err(ApiError::Validation(errors));
        }

        let checkout_id = Uuid::new_v4();
        let session = CheckoutSession::new(form);
        let view = self.view(checkout_id, &session);
        self.sessions.write().await.insert(checkout_id, session);

        info!("Opened checkout {}", checkout_id);
        Ok(view)
    }

    pub async fn get(&self, checkout_id: Uuid) -> Result<CheckoutView, ApiError> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&checkout_id).ok_or_else(|| not_found(checkout_id))?;
        Ok(self.view(checkout_id, session))
    }

    pub async fn update_card(&self, checkout_id: Uuid, update: CardUpdate) -> Result<CheckoutView, ApiError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&checkout_id).ok_or_else(|| not_found(checkout_id))?;

        if !matches!(session.state, CheckoutState::Editing { .. }) {
            return Err(ApiError::Conflict(format!(
                "Card details cannot change while the checkout is {}",
                session.state.name()
            )));
        }

        session.card.apply(update);
        session.touch();
        Ok(self.view(checkout_id, session))
    }

    /// Validates the card and, if it passes, starts the payment sequence.
    pub async fn submit(&self, checkout_id: Uuid) -> Result<CheckoutView, ApiError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&checkout_id).ok_or_else(|| not_found(checkout_id))?;

        session.touch();
        session.state.begin(&session.card, validate_card).map_err(|e| {
            info!("Checkout {} not submitted: {}", checkout_id, e);
            e
        })?;

        session.task = Some(self.sequencer.start(self.sessions.clone(), checkout_id));
        info!("Checkout {} processing with card {}", checkout_id, session.card.masked_number());
        Ok(self.view(checkout_id, session))
    }

    /// Closes the dialog. A run in flight is abandoned, nothing is rolled back.
    pub async fn dismiss(&self, checkout_id: Uuid) -> Result<(), ApiError> {
        let session = self.sessions
            .write()
            .await
            .remove(&checkout_id)
            .ok_or_else(|| not_found(checkout_id))?;

        if let Some(task) = session.task {
            if !task.is_finished() {
                warn!("Checkout {} dismissed while {}", checkout_id, session.state.name());
            }
            task.cancel();
        }
        info!("Dismissed checkout {}", checkout_id);
        Ok(())
    }
}

impl Drop for CheckoutService {
    fn drop(&mut self) {
        self.sweeper.cancel();
    }
}

fn not_found(checkout_id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Checkout {} does not exist", checkout_id))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::card::CardField;
    use crate::models::checkout::ProcessingPhase;
    use crate::models::registration::RegistrationField;
    use crate::services::payment_sequencer::SequencerTimings;
    use crate::services::registration_service::tests::{complete_form, FailingStore};
    use crate::services::{InMemoryRecordStore, RegistrationService};
    use crate::traits::RecordStore;
    use std::time::Duration;

    pub fn checkout_service(store: Arc<dyn RecordStore>) -> CheckoutService {
        let registrations = Arc::new(RegistrationService::new(store, 99.0));
        CheckoutService::new(
            PaymentSequencer::new(registrations, SequencerTimings::default()),
            SessionExpiry::default(),
        )
    }

    pub async fn fill_valid_card(service: &CheckoutService, checkout_id: Uuid) {
        for (field, value) in [
            (CardField::Number, "4111 1111 1111 1111"),
            (CardField::Name, "Asha Patil"),
            (CardField::Expiry, "1225"),
            (CardField::Cvc, "123"),
        ] {
            service.update_card(checkout_id, CardUpdate::new(field, value)).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_open_requires_every_mandatory_field() {
        let service = checkout_service(Arc::new(InMemoryRecordStore::new()));
        let form = RegistrationForm {
            brand_name: "GreenLeaf".to_string(),
            website: "greenleaf.in".to_string(),
            ..Default::default()
        };

        match service.open(form).await {
            Err(ApiError::Validation(errors)) => {
                assert_eq!(errors.len(), 5);
                assert!(!errors.contains_key(&RegistrationField::BrandName));
                assert!(!errors.contains_key(&RegistrationField::Website));
            }
            other => panic!("expected validation error, got {:?}", other.map(|v| v.state)),
        }
    }

    #[tokio::test]
    async fn test_card_edits_are_normalized_in_view() {
        let service = checkout_service(Arc::new(InMemoryRecordStore::new()));
        let opened = service.open(complete_form()).await.unwrap();
        assert_eq!(opened.amount_due, 99.0);

        let view = service
            .update_card(opened.checkout_id, CardUpdate::new(CardField::Number, "41111111"))
            .await
            .unwrap();
        assert_eq!(view.card.number, "4111 1111");

        let view = service
            .update_card(opened.checkout_id, CardUpdate::new(CardField::Expiry, "0427"))
            .await
            .unwrap();
        assert_eq!(view.card.expiry, "04/27");
    }

    #[tokio::test]
    async fn test_invalid_card_blocks_processing() {
        let service = checkout_service(Arc::new(InMemoryRecordStore::new()));
        let checkout_id = service.open(complete_form()).await.unwrap().checkout_id;
        fill_valid_card(&service, checkout_id).await;
        service.update_card(checkout_id, CardUpdate::new(CardField::Name, "")).await.unwrap();

        let err = service.submit(checkout_id).await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter cardholder name");

        let view = service.get(checkout_id).await.unwrap();
        assert_eq!(
            view.state,
            CheckoutState::Editing { error: Some("Please enter cardholder name".to_string()) }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequence_runs_through_both_delays_and_saves() {
        let store = InMemoryRecordStore::new();
        let service = checkout_service(Arc::new(store.clone()));
        let checkout_id = service.open(complete_form()).await.unwrap().checkout_id;
        fill_valid_card(&service, checkout_id).await;

        let view = service.submit(checkout_id).await.unwrap();
        assert_eq!(view.state, CheckoutState::Processing { phase: ProcessingPhase::Submitting });

        // second submit while processing is refused
        assert!(matches!(service.submit(checkout_id).await, Err(ApiError::Conflict(_))));
        assert!(matches!(
            service.update_card(checkout_id, CardUpdate::new(CardField::Cvc, "999")).await,
            Err(ApiError::Conflict(_))
        ));

        tokio::time::sleep(Duration::from_millis(2001)).await;
        let view = service.get(checkout_id).await.unwrap();
        assert_eq!(view.state, CheckoutState::Processing { phase: ProcessingPhase::Confirming });
        assert_eq!(store.len().await, 0);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let view = service.get(checkout_id).await.unwrap();
        let company_id = match view.state {
            CheckoutState::Succeeded { company_id, card_last_four } => {
                assert_eq!(card_last_four, "1111");
                company_id
            }
            other => panic!("expected success, got {:?}", other),
        };
        assert_eq!(view.card.number, "");

        let record = store.get(&format!("companies/{}", company_id)).await.unwrap();
        assert_eq!(record.form.company_name, "GreenLeaf Agro");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_abandons_pending_run() {
        let store = InMemoryRecordStore::new();
        let service = checkout_service(Arc::new(store.clone()));
        let checkout_id = service.open(complete_form()).await.unwrap().checkout_id;
        fill_valid_card(&service, checkout_id).await;
        service.submit(checkout_id).await.unwrap();

        tokio::time::sleep(Duration::from_millis(2500)).await;
        service.dismiss(checkout_id).await.unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(store.len().await, 0);
        assert!(matches!(service.get(checkout_id).await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_failure_returns_to_editing() {
        let service = checkout_service(Arc::new(FailingStore));
        let checkout_id = service.open(complete_form()).await.unwrap().checkout_id;
        fill_valid_card(&service, checkout_id).await;
        service.submit(checkout_id).await.unwrap();

        tokio::time::sleep(Duration::from_millis(3600)).await;
        let view = service.get(checkout_id).await.unwrap();
        assert_eq!(
            view.state,
            CheckoutState::Editing { error: Some("Error saving data: PERMISSION_DENIED".to_string()) }
        );
        // the form and card survive so the user can retry
        assert_eq!(view.card.number, "4111 1111 1111 1111");
    }

    #[tokio::test]
    async fn test_unknown_checkout() {
        let service = checkout_service(Arc::new(InMemoryRecordStore::new()));
        assert!(matches!(service.get(Uuid::new_v4()).await, Err(ApiError::NotFound(_))));
        assert!(matches!(service.dismiss(Uuid::new_v4()).await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_and_abandoned_checkouts_are_swept() {
        let store = InMemoryRecordStore::new();
        let service = checkout_service(Arc::new(store.clone()));

        let mut paid = Vec::new();
        for _ in 0..3 {
            let checkout_id = service.open(complete_form()).await.unwrap().checkout_id;
            fill_valid_card(&service, checkout_id).await;
            service.submit(checkout_id).await.unwrap();
            paid.push(checkout_id);
        }
        for _ in 0..2 {
            service.open(complete_form()).await.unwrap();
        }

        tokio::time::sleep(Duration::from_millis(3600)).await;
        assert_eq!(service.sessions.read().await.len(), 5);
        // the receipt is still readable right after success
        let view = service.get(paid[0]).await.unwrap();
        assert_eq!(view.state.name(), "succeeded");
        assert_eq!(view.card.number, "");

        tokio::time::sleep(Duration::from_secs(60 * 60)).await;
        assert!(service.sessions.read().await.is_empty());
        assert!(matches!(service.get(paid[0]).await, Err(ApiError::NotFound(_))));
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_card_edits_keep_checkout_alive() {
        let service = checkout_service(Arc::new(InMemoryRecordStore::new()));
        let checkout_id = service.open(complete_form()).await.unwrap().checkout_id;

        tokio::time::sleep(Duration::from_secs(25 * 60)).await;
        service.update_card(checkout_id, CardUpdate::new(CardField::Name, "Asha")).await.unwrap();

        tokio::time::sleep(Duration::from_secs(25 * 60)).await;
        assert!(service.get(checkout_id).await.is_ok());

        tokio::time::sleep(Duration::from_secs(10 * 60)).await;
        assert!(matches!(service.get(checkout_id).await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_processing_checkouts_are_never_expired() {
        let expiry = SessionExpiry::default();
        let mut sessions = HashMap::new();

        let mut processing = CheckoutSession::new(complete_form());
        processing.state = CheckoutState::Processing { phase: ProcessingPhase::Confirming };
        let processing_id = Uuid::new_v4();
        sessions.insert(processing_id, processing);

        let mut done = CheckoutSession::new(RegistrationForm::default());
        done.state = CheckoutState::Succeeded {
            company_id: "k1".to_string(),
            card_last_four: "1111".to_string(),
        };
        sessions.insert(Uuid::new_v4(), done);
        sessions.insert(Uuid::new_v4(), CheckoutSession::new(complete_form()));

        let now = Instant::now();
        assert_eq!(expire_sessions(&mut sessions, &expiry, now + Duration::from_secs(60)), 0);
        assert_eq!(expire_sessions(&mut sessions, &expiry, now + expiry.receipt_ttl), 1);
        assert_eq!(expire_sessions(&mut sessions, &expiry, now + expiry.idle_ttl), 1);
        assert_eq!(expire_sessions(&mut sessions, &expiry, now + Duration::from_secs(86_400)), 0);
        assert!(sessions.contains_key(&processing_id));
    }
}
