//! Patient records of the three clinic sources
//!
//! One service serves every clinic; the clinic's [`shared::PatientRules`]
//! decide which fields are required.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use shared::{validate_patient, Patient, PatientInput, SourceClinic};

use crate::error::{AppError, AppResult};
use crate::store::{PatientStore, Stores};

#[derive(Clone)]
pub struct PatientService {
    patients: Arc<dyn PatientStore>,
}

impl PatientService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            patients: stores.patients.clone(),
        }
    }

    /// Register a patient with `clinic`
    pub async fn register(&self, clinic: SourceClinic, input: PatientInput) -> AppResult<Patient> {
        let patient = Patient::register(clinic, input, Utc::now());
        validate_patient(&patient, &clinic.rules())?;

        let patient = self.patients.insert_patient(patient).await?;
        tracing::info!(patient_id = %patient.id, clinic = %clinic, "Patient registered");
        Ok(patient)
    }

    pub async fn list(&self, clinic: SourceClinic) -> AppResult<Vec<Patient>> {
        self.patients.list_patients(clinic).await
    }

    pub async fn get(&self, clinic: SourceClinic, id: Uuid) -> AppResult<Patient> {
        self.patients
            .find_patient(clinic, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Patient".to_string()))
    }

    pub async fn find_by_phone(&self, clinic: SourceClinic, phone: Option<&str>) -> AppResult<Patient> {
        let phone = phone
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::ValidationError("Phone number is required".to_string()))?;

        self.patients
            .find_patient_by_phone(clinic, phone)
            .await?
            .ok_or_else(|| AppError::NotFound("Patient".to_string()))
    }

    pub async fn update(&self, clinic: SourceClinic, id: Uuid, input: PatientInput) -> AppResult<Patient> {
        let patient = self
            .patients
            .update_patient(clinic, id, input)
            .await?
            .ok_or_else(|| AppError::NotFound("Patient".to_string()))?;

        tracing::info!(patient_id = %patient.id, clinic = %clinic, "Patient updated");
        Ok(patient)
    }

    pub async fn delete(&self, clinic: SourceClinic, id: Uuid) -> AppResult<()> {
        if !self.patients.delete_patient(clinic, id).await? {
            return Err(AppError::NotFound("Patient".to_string()));
        }
        tracing::info!(patient_id = %id, clinic = %clinic, "Patient deleted");
        Ok(())
    }
}
