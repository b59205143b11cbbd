//! Patient demographics and clinical summary.

use serde::{Deserialize, Serialize};

use crate::registry::{shadow, FieldSet, Record, SealState};

/// A registered patient.
///
/// Identity and clinical text is kept in plaintext fields for application
/// code; only the `encrypted_*` shadow columns are persisted for those.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Patient {
    pub id: String,
    pub user_id: String,

    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_contact_number: Option<String>,
    pub email: Option<String>,
    pub diagnosis: Option<String>,
    pub alert: Option<String>,
    pub allergies: Option<String>,
    pub medical_history: Option<String>,
    pub current_medications: Option<String>,

    pub status: Option<String>,
    pub room: Option<String>,
    pub blood_type: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,

    #[serde(skip)]
    pub encrypted_full_name: Option<String>,
    #[serde(skip)]
    pub encrypted_gender: Option<String>,
    #[serde(skip)]
    pub encrypted_address: Option<String>,
    #[serde(skip)]
    pub encrypted_contact_number: Option<String>,
    #[serde(skip)]
    pub encrypted_emergency_contact: Option<String>,
    #[serde(skip)]
    pub encrypted_emergency_contact_number: Option<String>,
    #[serde(skip)]
    pub encrypted_email: Option<String>,
    #[serde(skip)]
    pub encrypted_diagnosis: Option<String>,
    #[serde(skip)]
    pub encrypted_alert: Option<String>,
    #[serde(skip)]
    pub encrypted_allergies: Option<String>,
    #[serde(skip)]
    pub encrypted_medical_history: Option<String>,
    #[serde(skip)]
    pub encrypted_current_medications: Option<String>,

    #[serde(skip)]
    pub seal: SealState,
}

impl Record for Patient {
    const KIND: &'static str = "patients";

    keyed_record!();

    fn sensitive_fields() -> FieldSet<Self> {
        FieldSet::new()
            .with(shadow!(Patient, full_name => encrypted_full_name))
            .with(shadow!(Patient, gender => encrypted_gender))
            .with(shadow!(Patient, address => encrypted_address))
            .with(shadow!(Patient, contact_number => encrypted_contact_number))
            .with(shadow!(Patient, emergency_contact => encrypted_emergency_contact))
            .with(shadow!(
                Patient,
                emergency_contact_number => encrypted_emergency_contact_number
            ))
            .with(shadow!(Patient, email => encrypted_email))
            .with(shadow!(Patient, diagnosis => encrypted_diagnosis))
            .with(shadow!(Patient, alert => encrypted_alert))
            .with(shadow!(Patient, allergies => encrypted_allergies))
            .with(shadow!(Patient, medical_history => encrypted_medical_history))
            .with(shadow!(Patient, current_medications => encrypted_current_medications))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FieldStorage;

    #[test]
    fn every_field_uses_a_shadow_column() {
        for field in Patient::sensitive_fields().iter() {
            assert!(matches!(field.storage(), FieldStorage::Shadow { .. }));
            assert_eq!(field.column(), format!("encrypted_{}", field.name()));
        }
    }

    #[test]
    fn shadow_columns_are_not_serialised() {
        let patient = Patient {
            id: "p-1".into(),
            full_name: Some("Maria Santos".into()),
            encrypted_full_name: Some("c2VjcmV0".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&patient).unwrap();
        assert_eq!(json["full_name"], "Maria Santos");
        assert!(json.get("encrypted_full_name").is_none());
        assert!(json.get("seal").is_none());
    }
}
