//! Patient record tests
//!
//! Per-clinic validation rules, phone uniqueness, lookup, update and delete.

use clinic_pharmacy_backend::error::AppError;
use clinic_pharmacy_backend::services::PatientService;
use clinic_pharmacy_backend::store::Stores;
use shared::{PatientInput, SourceClinic, TreatmentItem};

fn strict_input(phone: &str) -> PatientInput {
    PatientInput {
        first_name: Some("Amina".to_string()),
        last_name: Some("Yusuf".to_string()),
        age: Some(34),
        gender: Some("Female".to_string()),
        phone: Some(phone.to_string()),
        address: Some("12 Market Road".to_string()),
        ..Default::default()
    }
}

fn clinic2_input(phone: &str) -> PatientInput {
    PatientInput {
        region: Some("Coast".to_string()),
        district: Some("Kilifi".to_string()),
        health_provider_type: Some("Health Center".to_string()),
        ..strict_input(phone)
    }
}

fn field_of(err: &AppError) -> Option<&str> {
    match err {
        AppError::Validation { field, .. } => Some(field.as_str()),
        _ => None,
    }
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_main_fills_medical_defaults() {
    let stores = Stores::memory();
    let patient = PatientService::new(&stores)
        .register(SourceClinic::Main, strict_input("0712345678"))
        .await
        .unwrap();

    assert_eq!(patient.source_clinic, SourceClinic::Main);
    assert_eq!(patient.diagnosis.as_deref(), Some("None"));
    assert_eq!(patient.allergies.as_deref(), Some("None"));
    assert!(patient.created_at.is_some());
}

#[tokio::test]
async fn test_register_main_requires_phone() {
    let stores = Stores::memory();
    let input = PatientInput {
        phone: None,
        ..strict_input("")
    };
    let err = PatientService::new(&stores)
        .register(SourceClinic::Main, input)
        .await
        .unwrap_err();
    assert_eq!(field_of(&err), Some("phone"));
}

#[tokio::test]
async fn test_register_main_rejects_out_of_range_age() {
    let stores = Stores::memory();
    let input = PatientInput {
        age: Some(130),
        ..strict_input("0712345678")
    };
    let err = PatientService::new(&stores)
        .register(SourceClinic::Main, input)
        .await
        .unwrap_err();
    assert_eq!(field_of(&err), Some("age"));
}

#[tokio::test]
async fn test_register_main_rejects_blank_medication() {
    let stores = Stores::memory();
    let input = PatientInput {
        treatment_plan: Some(vec![TreatmentItem::default()]),
        ..strict_input("0712345678")
    };
    let err = PatientService::new(&stores)
        .register(SourceClinic::Main, input)
        .await
        .unwrap_err();
    assert_eq!(field_of(&err), Some("treatmentPlan"));
}

#[tokio::test]
async fn test_register_clinic2_requires_location_and_provider() {
    let stores = Stores::memory();
    let service = PatientService::new(&stores);

    let err = service
        .register(SourceClinic::Clinic2, strict_input("0712345678"))
        .await
        .unwrap_err();
    assert_eq!(field_of(&err), Some("region"));

    let bad_provider = PatientInput {
        health_provider_type: Some("Pharmacy".to_string()),
        ..clinic2_input("0712345678")
    };
    let err = service
        .register(SourceClinic::Clinic2, bad_provider)
        .await
        .unwrap_err();
    assert_eq!(field_of(&err), Some("healthProviderType"));

    let patient = service
        .register(SourceClinic::Clinic2, clinic2_input("0712345678"))
        .await
        .unwrap();
    assert_eq!(patient.diagnosis.as_deref(), Some(""));
}

#[tokio::test]
async fn test_register_clinic3_is_permissive() {
    let stores = Stores::memory();
    let service = PatientService::new(&stores);

    let patient = service
        .register(SourceClinic::Clinic3, PatientInput::default())
        .await
        .unwrap();
    assert!(patient.first_name.is_none());
    assert!(patient.diagnosis.is_none());

    // malformed values are still rejected when present
    let err = service
        .register(
            SourceClinic::Clinic3,
            PatientInput {
                phone: Some("12ab".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(field_of(&err), Some("phone"));
}

#[tokio::test]
async fn test_duplicate_phone_is_a_conflict_within_a_clinic() {
    let stores = Stores::memory();
    let service = PatientService::new(&stores);

    service
        .register(SourceClinic::Main, strict_input("0712345678"))
        .await
        .unwrap();
    let err = service
        .register(SourceClinic::Main, strict_input("0712345678"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict { ref resource, .. } if resource == "phone"));

    // another clinic keeps its own phone book
    service
        .register(SourceClinic::Clinic3, strict_input("0712345678"))
        .await
        .unwrap();
}

// ============================================================================
// Lookup
// ============================================================================

#[tokio::test]
async fn test_find_by_phone() {
    let stores = Stores::memory();
    let service = PatientService::new(&stores);
    let registered = service
        .register(SourceClinic::Main, strict_input("0712345678"))
        .await
        .unwrap();

    let found = service
        .find_by_phone(SourceClinic::Main, Some("0712345678"))
        .await
        .unwrap();
    assert_eq!(found.id, registered.id);

    assert!(matches!(
        service.find_by_phone(SourceClinic::Main, Some("0799999999")).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.find_by_phone(SourceClinic::Clinic2, Some("0712345678")).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_find_by_phone_requires_a_phone() {
    let stores = Stores::memory();
    let service = PatientService::new(&stores);

    for phone in [None, Some(""), Some("   ")] {
        assert!(matches!(
            service.find_by_phone(SourceClinic::Main, phone).await,
            Err(AppError::ValidationError(_))
        ));
    }
}

#[tokio::test]
async fn test_patients_are_scoped_to_their_clinic() {
    let stores = Stores::memory();
    let service = PatientService::new(&stores);
    let patient = service
        .register(SourceClinic::Main, strict_input("0712345678"))
        .await
        .unwrap();

    assert!(service.get(SourceClinic::Main, patient.id).await.is_ok());
    assert!(matches!(
        service.get(SourceClinic::Clinic3, patient.id).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(service.list(SourceClinic::Main).await.unwrap().len(), 1);
    assert!(service.list(SourceClinic::Clinic2).await.unwrap().is_empty());
}

// ============================================================================
// Update and Delete
// ============================================================================

#[tokio::test]
async fn test_update_patient() {
    let stores = Stores::memory();
    let service = PatientService::new(&stores);
    let patient = service
        .register(SourceClinic::Main, strict_input("0712345678"))
        .await
        .unwrap();

    let updated = service
        .update(
            SourceClinic::Main,
            patient.id,
            PatientInput {
                address: Some("  7 Harbour Lane ".to_string()),
                diagnosis: Some("Malaria".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.address.as_deref(), Some("7 Harbour Lane"));
    assert_eq!(updated.diagnosis.as_deref(), Some("Malaria"));
    assert_eq!(updated.first_name, patient.first_name);
    assert_eq!(updated.created_at, patient.created_at);
}

#[tokio::test]
async fn test_invalid_update_leaves_record_unchanged() {
    let stores = Stores::memory();
    let service = PatientService::new(&stores);
    let patient = service
        .register(SourceClinic::Main, strict_input("0712345678"))
        .await
        .unwrap();

    let err = service
        .update(
            SourceClinic::Main,
            patient.id,
            PatientInput {
                age: Some(-3),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(field_of(&err), Some("age"));

    let stored = service.get(SourceClinic::Main, patient.id).await.unwrap();
    assert_eq!(stored.age, Some(34));
}

#[tokio::test]
async fn test_update_to_taken_phone_is_a_conflict() {
    let stores = Stores::memory();
    let service = PatientService::new(&stores);
    service
        .register(SourceClinic::Main, strict_input("0711111111"))
        .await
        .unwrap();
    let second = service
        .register(SourceClinic::Main, strict_input("0722222222"))
        .await
        .unwrap();

    let err = service
        .update(
            SourceClinic::Main,
            second.id,
            PatientInput {
                phone: Some("0711111111".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict { .. }));

    // keeping one's own phone is fine
    service
        .update(
            SourceClinic::Main,
            second.id,
            PatientInput {
                phone: Some("0722222222".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_update_unknown_patient() {
    let stores = Stores::memory();
    let err = PatientService::new(&stores)
        .update(SourceClinic::Main, uuid::Uuid::new_v4(), PatientInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_patient() {
    let stores = Stores::memory();
    let service = PatientService::new(&stores);
    let patient = service
        .register(SourceClinic::Clinic3, PatientInput::default())
        .await
        .unwrap();

    service.delete(SourceClinic::Clinic3, patient.id).await.unwrap();
    assert!(matches!(
        service.get(SourceClinic::Clinic3, patient.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.delete(SourceClinic::Clinic3, patient.id).await,
        Err(AppError::NotFound(_))
    ));
}
