//! Patient records across the clinic sources
//!
//! The clinics keep structurally similar records with different strictness.
//! Instead of one record type per clinic there is a single [`Patient`] tagged
//! with its [`SourceClinic`]; the per-clinic differences live in
//! [`PatientRules`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Physically separate patient source merged for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceClinic {
    Main,
    Clinic2,
    Clinic3,
}

impl SourceClinic {
    pub const ALL: [SourceClinic; 3] = [SourceClinic::Main, SourceClinic::Clinic2, SourceClinic::Clinic3];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceClinic::Main => "main",
            SourceClinic::Clinic2 => "clinic2",
            SourceClinic::Clinic3 => "clinic3",
        }
    }

    /// Validation rules applied to records of this clinic
    pub fn rules(&self) -> PatientRules {
        match self {
            SourceClinic::Main => PatientRules {
                strict_demographics: true,
                requires_location: false,
                requires_provider_type: false,
                medical_text_default: Some("None"),
                max_text_len: Some(1000),
            },
            SourceClinic::Clinic2 => PatientRules {
                strict_demographics: true,
                requires_location: true,
                requires_provider_type: true,
                medical_text_default: Some(""),
                max_text_len: None,
            },
            SourceClinic::Clinic3 => PatientRules::default(),
        }
    }
}

impl fmt::Display for SourceClinic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceClinic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(SourceClinic::Main),
            "clinic2" => Ok(SourceClinic::Clinic2),
            "clinic3" => Ok(SourceClinic::Clinic3),
            other => Err(format!("Unknown clinic source: {}", other)),
        }
    }
}

/// Per-clinic validation rules, expressed as data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatientRules {
    /// Names, age, gender, phone and address are required and checked
    pub strict_demographics: bool,
    /// Region and district are required
    pub requires_location: bool,
    /// Health provider type is required and must be a known kind
    pub requires_provider_type: bool,
    /// Value stored for missing medical text fields
    pub medical_text_default: Option<&'static str>,
    pub max_text_len: Option<usize>,
}

/// A single medication entry of a treatment plan
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TreatmentItem {
    pub medication: String,
    pub dosage: String,
    pub instructions: String,
}

/// A vaccination record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Vaccination {
    pub vaccine_name: String,
    pub dose_number: i32,
    pub date_given: Option<DateTime<Utc>>,
    pub administered_by: String,
    pub notes: String,
}

impl Default for Vaccination {
    fn default() -> Self {
        Self {
            vaccine_name: String::new(),
            dose_number: 1,
            date_given: None,
            administered_by: String::new(),
            notes: String::new(),
        }
    }
}

/// A patient record from any clinic source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub source_clinic: SourceClinic,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub region: Option<String>,
    pub district: Option<String>,
    pub health_provider_type: Option<String>,
    pub medical_history: Option<String>,
    pub current_medications: Option<String>,
    pub allergies: Option<String>,
    pub diagnosis: Option<String>,
    pub physical_exam: Option<String>,
    pub lab_results: Option<String>,
    pub treatment_plan: Vec<TreatmentItem>,
    pub vaccinations: Vec<Vaccination>,
    pub next_appointment: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    /// Imported legacy records may carry no creation timestamp
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Patient {
    /// Build a new record for `clinic`, filling the clinic's text defaults
    pub fn register(clinic: SourceClinic, input: PatientInput, now: DateTime<Utc>) -> Self {
        let mut patient = Self {
            id: Uuid::new_v4(),
            source_clinic: clinic,
            first_name: None,
            last_name: None,
            age: None,
            gender: None,
            phone: None,
            address: None,
            region: None,
            district: None,
            health_provider_type: None,
            medical_history: None,
            current_medications: None,
            allergies: None,
            diagnosis: None,
            physical_exam: None,
            lab_results: None,
            treatment_plan: Vec::new(),
            vaccinations: Vec::new(),
            next_appointment: None,
            reason: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        patient.apply(input, now);

        if let Some(default) = clinic.rules().medical_text_default {
            for field in [
                &mut patient.medical_history,
                &mut patient.current_medications,
                &mut patient.allergies,
                &mut patient.diagnosis,
                &mut patient.physical_exam,
                &mut patient.lab_results,
                &mut patient.reason,
            ] {
                if field.is_none() {
                    *field = Some(default.to_string());
                }
            }
        }
        patient
    }

    /// Apply the updatable fields present in `input`
    ///
    /// Identity, source clinic and creation time cannot be changed this way.
    pub fn apply(&mut self, input: PatientInput, now: DateTime<Utc>) {
        fn set(target: &mut Option<String>, value: Option<String>) {
            if let Some(v) = value {
                *target = Some(v.trim().to_string());
            }
        }

        set(&mut self.first_name, input.first_name);
        set(&mut self.last_name, input.last_name);
        if input.age.is_some() {
            self.age = input.age;
        }
        set(&mut self.gender, input.gender);
        set(&mut self.phone, input.phone);
        set(&mut self.address, input.address);
        set(&mut self.region, input.region);
        set(&mut self.district, input.district);
        set(&mut self.health_provider_type, input.health_provider_type);
        set(&mut self.medical_history, input.medical_history);
        set(&mut self.current_medications, input.current_medications);
        set(&mut self.allergies, input.allergies);
        set(&mut self.diagnosis, input.diagnosis);
        set(&mut self.physical_exam, input.physical_exam);
        set(&mut self.lab_results, input.lab_results);
        if let Some(plan) = input.treatment_plan {
            self.treatment_plan = plan;
        }
        if let Some(vaccinations) = input.vaccinations {
            self.vaccinations = vaccinations;
        }
        if input.next_appointment.is_some() {
            self.next_appointment = input.next_appointment;
        }
        set(&mut self.reason, input.reason);
        self.updated_at = Some(now);
    }
}

/// Registration and update payload; every field is optional on the wire
/// and the clinic's [`PatientRules`] decide what is required
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub region: Option<String>,
    pub district: Option<String>,
    pub health_provider_type: Option<String>,
    pub medical_history: Option<String>,
    pub current_medications: Option<String>,
    pub allergies: Option<String>,
    pub diagnosis: Option<String>,
    pub physical_exam: Option<String>,
    pub lab_results: Option<String>,
    pub treatment_plan: Option<Vec<TreatmentItem>>,
    pub vaccinations: Option<Vec<Vaccination>>,
    pub next_appointment: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}
