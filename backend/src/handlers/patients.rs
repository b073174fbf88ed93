//! HTTP handlers for patient records of every clinic

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::{Patient, PatientInput, SourceClinic};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::PatientService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PhoneQuery {
    pub phone: Option<String>,
}

fn clinic_of(segment: &str) -> AppResult<SourceClinic> {
    segment
        .parse::<SourceClinic>()
        .map_err(|_| AppError::NotFound("Clinic".to_string()))
}

/// Register a patient
pub async fn register_patient(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(clinic): Path<String>,
    Json(input): Json<PatientInput>,
) -> AppResult<impl IntoResponse> {
    let clinic = clinic_of(&clinic)?;
    let service = PatientService::new(&state.stores);
    let patient = service.register(clinic, input).await?;
    tracing::debug!(user = %user.user_id, patient_id = %patient.id, "Registered by user");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Patient registered successfully",
            "patient": patient
        })),
    ))
}

/// List the patients of a clinic
pub async fn list_patients(
    State(state): State<AppState>,
    Path(clinic): Path<String>,
) -> AppResult<impl IntoResponse> {
    let clinic = clinic_of(&clinic)?;
    let service = PatientService::new(&state.stores);
    let patients = service.list(clinic).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Patients fetched successfully",
        "patients": patients
    })))
}

/// Look up a patient by phone number
pub async fn search_patient(
    State(state): State<AppState>,
    Path(clinic): Path<String>,
    Query(query): Query<PhoneQuery>,
) -> AppResult<Json<Patient>> {
    let clinic = clinic_of(&clinic)?;
    let service = PatientService::new(&state.stores);
    Ok(Json(service.find_by_phone(clinic, query.phone.as_deref()).await?))
}

/// Get a patient by id
pub async fn get_patient(
    State(state): State<AppState>,
    Path((clinic, patient_id)): Path<(String, Uuid)>,
) -> AppResult<Json<Patient>> {
    let clinic = clinic_of(&clinic)?;
    let service = PatientService::new(&state.stores);
    Ok(Json(service.get(clinic, patient_id).await?))
}

/// Update a patient
pub async fn update_patient(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((clinic, patient_id)): Path<(String, Uuid)>,
    Json(input): Json<PatientInput>,
) -> AppResult<impl IntoResponse> {
    let clinic = clinic_of(&clinic)?;
    let service = PatientService::new(&state.stores);
    let patient = service.update(clinic, patient_id, input).await?;
    tracing::debug!(user = %user.user_id, patient_id = %patient.id, "Updated by user");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Patient updated successfully",
        "patient": patient
    })))
}

/// Delete a patient
pub async fn delete_patient(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((clinic, patient_id)): Path<(String, Uuid)>,
) -> AppResult<impl IntoResponse> {
    let clinic = clinic_of(&clinic)?;
    let service = PatientService::new(&state.stores);
    service.delete(clinic, patient_id).await?;
    tracing::debug!(user = %user.user_id, patient_id = %patient_id, "Deleted by user");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Patient deleted successfully"
    })))
}
