use std::sync::Arc;

use chrono::Utc;
use log::{error, info};

use crate::models::{ApiError, CompanyRecord, ErrorMap, RegistrationForm};
use crate::traits::RecordStore;
use crate::utils::unique_id::generate_unique_id;
use crate::utils::validation::validate_registration;

pub const COMPANIES_COLLECTION: &str = "companies";

pub struct RegistrationService {
    store: Arc<dyn RecordStore>,
    registration_fee: f64,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn RecordStore>, registration_fee: f64) -> Self {
        Self { store, registration_fee }
    }

    pub fn registration_fee(&self) -> f64 {
        self.registration_fee
    }

    pub fn validate(&self, form: &RegistrationForm) -> ErrorMap {
        validate_registration(form)
    }

    /// Writes the paid registration under a fresh key and returns the key's id.
    pub async fn save(&self, form: RegistrationForm) -> Result<String, ApiError> {
        let company_id = generate_unique_id();
        let key_path = format!("{}/{}", COMPANIES_COLLECTION, company_id);
        let record = CompanyRecord::new(form, Utc::now().timestamp_millis(), self.registration_fee);

        self.store.write_record(&key_path, &record).await.map_err(|e| {
            error!("Error saving data for {}: {}", key_path, e);
            ApiError::from(e)
        })?;

        info!("Saved registration {} for {}", key_path, record.form.company_name);
        Ok(company_id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::StoreError;
    use crate::services::InMemoryRecordStore;
    use async_trait::async_trait;

    pub struct FailingStore;

    #[async_trait]
    impl RecordStore for FailingStore {
        async fn write_record(&self, _key_path: &str, _record: &CompanyRecord) -> Result<(), StoreError> {
            Err(StoreError::Backend("PERMISSION_DENIED".to_string()))
        }
    }

    pub fn complete_form() -> RegistrationForm {
        RegistrationForm {
            company_name: "GreenLeaf Agro".to_string(),
            brand_name: "GreenLeaf".to_string(),
            registration_number: "U01100MH2020".to_string(),
            head_office_address: "16/B Market Road, Pune-411001".to_string(),
            phone_number: "9876543210".to_string(),
            email_address: "ops@greenleaf.in".to_string(),
            website: String::new(),
        }
    }

    #[tokio::test]
    async fn test_save_writes_completed_record() {
        let store = InMemoryRecordStore::new();
        let service = RegistrationService::new(Arc::new(store.clone()), 99.0);

        let company_id = service.save(complete_form()).await.unwrap();
        let record = store.get(&format!("companies/{}", company_id)).await.unwrap();

        assert_eq!(record.form, complete_form());
        assert_eq!(record.payment_status, "completed");
        assert_eq!(record.amount_paid, 99.0);
        assert!(record.timestamp > 0);
    }

    #[tokio::test]
    async fn test_save_surfaces_store_message() {
        let service = RegistrationService::new(Arc::new(FailingStore), 99.0);
        let err = service.save(complete_form()).await.unwrap_err();
        assert_eq!(err.to_string(), "Error saving data: PERMISSION_DENIED");
    }
}
