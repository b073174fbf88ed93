//! Validation utilities for the Clinic Pharmacy Management backend
//!
//! Field checks return a static message; record-level checks return a
//! [`FieldViolation`] naming the offending field.

use rust_decimal::Decimal;

use crate::models::{InventoryItem, Patient, PatientRules};

/// A record-level validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldViolation {
    pub fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

fn check(field: &'static str, result: Result<(), &'static str>) -> Result<(), FieldViolation> {
    result.map_err(|message| FieldViolation::new(field, message))
}

// ============================================================================
// Pharmacy Validations
// ============================================================================

/// Validate an item name (at least 2 characters after trimming)
pub fn validate_item_name(name: &str) -> Result<(), &'static str> {
    if name.trim().chars().count() < 2 {
        return Err("Item name must be at least 2 characters");
    }
    Ok(())
}

/// Validate a required free-text field
pub fn validate_required(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Field is required");
    }
    Ok(())
}

/// Validate a stock count or reorder level
pub fn validate_stock_count(count: i32) -> Result<(), &'static str> {
    if count < 0 {
        return Err("Quantity cannot be negative");
    }
    Ok(())
}

/// Largest price a `NUMERIC(12,2)` column holds
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Largest profit a `NUMERIC(14,2)` column holds
pub const MAX_SALE_PROFIT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// Validate a cost or selling price
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price cannot be negative");
    }
    if price > MAX_PRICE {
        return Err("Price cannot exceed 9999999999.99");
    }
    Ok(())
}

/// Validate the quantity of a sale
pub fn validate_quantity_sold(quantity: i32) -> Result<(), &'static str> {
    if quantity < 1 {
        return Err("Quantity sold must be at least 1");
    }
    Ok(())
}

/// Validate a complete inventory item
pub fn validate_inventory_item(item: &InventoryItem) -> Result<(), FieldViolation> {
    check("itemName", validate_item_name(&item.item_name))?;
    check("category", validate_required(&item.category))?;
    check("quantityInStock", validate_stock_count(item.quantity_in_stock))?;
    check("reorderLevel", validate_stock_count(item.reorder_level))?;
    check("costPrice", validate_price(item.cost_price))?;
    check("sellingPrice", validate_price(item.selling_price))?;
    check("batchNumber", validate_required(&item.batch_number))?;
    check("supplier", validate_required(&item.supplier))?;
    check("location", validate_required(&item.location))?;
    Ok(())
}

// ============================================================================
// Patient Validations
// ============================================================================

pub const GENDERS: [&str; 3] = ["Male", "Female", "Other"];

pub const HEALTH_PROVIDER_TYPES: [&str; 5] = [
    "Public Hospital",
    "Private Hospital",
    "MCH",
    "Clinic",
    "Health Center",
];

/// Validate a phone number: 7 to 15 digits, nothing else
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let len = phone.len();
    if !(7..=15).contains(&len) || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err("Phone number must be between 7 and 15 digits");
    }
    Ok(())
}

/// Validate a person's name (at least 2 characters)
pub fn validate_person_name(name: &str) -> Result<(), &'static str> {
    if name.trim().chars().count() < 2 {
        return Err("Name must be at least 2 characters");
    }
    Ok(())
}

/// Validate an age in years
pub fn validate_age(age: i32) -> Result<(), &'static str> {
    if !(0..=120).contains(&age) {
        return Err("Age must be between 0 and 120");
    }
    Ok(())
}

pub fn validate_gender(gender: &str) -> Result<(), &'static str> {
    if !GENDERS.contains(&gender) {
        return Err("Gender must be Male, Female or Other");
    }
    Ok(())
}

pub fn validate_health_provider_type(kind: &str) -> Result<(), &'static str> {
    if !HEALTH_PROVIDER_TYPES.contains(&kind) {
        return Err("Unknown health provider type");
    }
    Ok(())
}

fn require<'a>(field: &'static str, value: &'a Option<String>) -> Result<&'a str, FieldViolation> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(FieldViolation::new(field, "Field is required")),
    }
}

/// Validate a patient against its clinic's rules
pub fn validate_patient(patient: &Patient, rules: &PatientRules) -> Result<(), FieldViolation> {
    if rules.strict_demographics {
        check("firstName", validate_person_name(require("firstName", &patient.first_name)?))?;
        check("lastName", validate_person_name(require("lastName", &patient.last_name)?))?;
        let age = patient
            .age
            .ok_or_else(|| FieldViolation::new("age", "Field is required"))?;
        check("age", validate_age(age))?;
        check("gender", validate_gender(require("gender", &patient.gender)?))?;
        check("phone", validate_phone(require("phone", &patient.phone)?))?;
        require("address", &patient.address)?;
    } else {
        // Loose sources still reject malformed values that are present
        if let Some(phone) = patient.phone.as_deref().filter(|p| !p.is_empty()) {
            check("phone", validate_phone(phone))?;
        }
        if let Some(age) = patient.age {
            check("age", validate_age(age))?;
        }
    }

    if rules.requires_location {
        require("region", &patient.region)?;
        require("district", &patient.district)?;
    }

    if rules.requires_provider_type {
        let kind = require("healthProviderType", &patient.health_provider_type)?;
        check("healthProviderType", validate_health_provider_type(kind))?;
    }

    if let Some(max) = rules.max_text_len {
        let texts = [
            ("medicalHistory", &patient.medical_history),
            ("currentMedications", &patient.current_medications),
            ("allergies", &patient.allergies),
            ("diagnosis", &patient.diagnosis),
            ("physicalExam", &patient.physical_exam),
            ("labResults", &patient.lab_results),
            ("reason", &patient.reason),
        ];
        for (field, value) in texts {
            if value.as_deref().map_or(0, |v| v.chars().count()) > max {
                return Err(FieldViolation::new(field, "Text is too long"));
            }
        }
        for item in &patient.treatment_plan {
            if item.medication.chars().count() > max {
                return Err(FieldViolation::new("treatmentPlan", "Text is too long"));
            }
        }
    }

    if rules.strict_demographics && patient.treatment_plan.iter().any(|t| t.medication.trim().is_empty()) {
        return Err(FieldViolation::new("treatmentPlan", "Medication is required"));
    }

    if patient.vaccinations.iter().any(|v| v.dose_number < 1) {
        return Err(FieldViolation::new("vaccinations", "Dose number must be at least 1"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PatientInput, SourceClinic, TreatmentItem};
    use chrono::Utc;

    fn strict_input() -> PatientInput {
        PatientInput {
            first_name: Some("Amina".to_string()),
            last_name: Some("Yusuf".to_string()),
            age: Some(34),
            gender: Some("Female".to_string()),
            phone: Some("0712345678".to_string()),
            address: Some("12 Market Road".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("1234567").is_ok());
        assert!(validate_phone("123456789012345").is_ok());
        assert!(validate_phone("123456").is_err());
        assert!(validate_phone("1234567890123456").is_err());
        assert!(validate_phone("07-123-4567").is_err());
    }

    #[test]
    fn test_validate_age() {
        assert!(validate_age(0).is_ok());
        assert!(validate_age(120).is_ok());
        assert!(validate_age(-1).is_err());
        assert!(validate_age(121).is_err());
    }

    #[test]
    fn test_validate_price_bounds() {
        use std::str::FromStr;

        assert!(validate_price(Decimal::ZERO).is_ok());
        assert!(validate_price(Decimal::from_str("9999999999.99").unwrap()).is_ok());
        assert_eq!(MAX_PRICE, Decimal::from_str("9999999999.99").unwrap());
        assert_eq!(MAX_SALE_PROFIT, Decimal::from_str("999999999999.99").unwrap());
        assert!(validate_price(Decimal::from_str("10000000000").unwrap()).is_err());
        assert!(validate_price(Decimal::MAX).is_err());
        assert!(validate_price(Decimal::from_str("-0.01").unwrap()).is_err());
    }

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Amoxicillin").is_ok());
        assert!(validate_item_name(" A ").is_err());
    }

    #[test]
    fn test_main_clinic_requires_demographics() {
        let rules = SourceClinic::Main.rules();
        let patient = Patient::register(SourceClinic::Main, strict_input(), Utc::now());
        assert!(validate_patient(&patient, &rules).is_ok());

        let mut missing = strict_input();
        missing.phone = None;
        let patient = Patient::register(SourceClinic::Main, missing, Utc::now());
        assert_eq!(validate_patient(&patient, &rules).unwrap_err().field, "phone");
    }

    #[test]
    fn test_main_clinic_rejects_unknown_gender() {
        let mut input = strict_input();
        input.gender = Some("male".to_string());
        let patient = Patient::register(SourceClinic::Main, input, Utc::now());
        let err = validate_patient(&patient, &SourceClinic::Main.rules()).unwrap_err();
        assert_eq!(err.field, "gender");
    }

    #[test]
    fn test_clinic2_requires_location_and_provider() {
        let rules = SourceClinic::Clinic2.rules();
        let patient = Patient::register(SourceClinic::Clinic2, strict_input(), Utc::now());
        assert_eq!(validate_patient(&patient, &rules).unwrap_err().field, "region");

        let mut input = strict_input();
        input.region = Some("Coast".to_string());
        input.district = Some("Kilifi".to_string());
        input.health_provider_type = Some("Clinic".to_string());
        let patient = Patient::register(SourceClinic::Clinic2, input, Utc::now());
        assert!(validate_patient(&patient, &rules).is_ok());
    }

    #[test]
    fn test_clinic3_is_loose() {
        let patient = Patient::register(SourceClinic::Clinic3, PatientInput::default(), Utc::now());
        assert!(validate_patient(&patient, &SourceClinic::Clinic3.rules()).is_ok());

        let input = PatientInput {
            phone: Some("abc".to_string()),
            ..Default::default()
        };
        let patient = Patient::register(SourceClinic::Clinic3, input, Utc::now());
        assert!(validate_patient(&patient, &SourceClinic::Clinic3.rules()).is_err());
    }

    #[test]
    fn test_main_clinic_text_limit_and_defaults() {
        let patient = Patient::register(SourceClinic::Main, strict_input(), Utc::now());
        assert_eq!(patient.diagnosis.as_deref(), Some("None"));

        let mut input = strict_input();
        input.diagnosis = Some("x".repeat(1001));
        let patient = Patient::register(SourceClinic::Main, input, Utc::now());
        let err = validate_patient(&patient, &SourceClinic::Main.rules()).unwrap_err();
        assert_eq!(err.field, "diagnosis");
    }

    #[test]
    fn test_treatment_plan_needs_medication_when_strict() {
        let mut input = strict_input();
        input.treatment_plan = Some(vec![TreatmentItem::default()]);
        let patient = Patient::register(SourceClinic::Main, input, Utc::now());
        let err = validate_patient(&patient, &SourceClinic::Main.rules()).unwrap_err();
        assert_eq!(err.field, "treatmentPlan");
    }
}
