//! Vital-sign readings taken at a visit.

use serde::{Deserialize, Serialize};

use crate::registry::{overwrite, shadow, FieldSet, Record, SealState, SensitiveField};

/// One set of vital signs for a patient.
///
/// Numeric readings are typed in memory and persisted as ciphertext in the
/// `encrypted_*` text columns. A reading that does not parse after decryption
/// (including the access-denied sentinel) reads back as `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalSign {
    pub id: String,
    pub patient_id: String,
    pub recorded_at: Option<String>,

    pub temperature: Option<f64>,
    pub blood_pressure: Option<String>,
    pub heart_rate: Option<i32>,
    pub respiratory_rate: Option<i32>,
    pub spo2: Option<f64>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub notes: Option<String>,

    #[serde(skip)]
    pub encrypted_temperature: Option<String>,
    #[serde(skip)]
    pub encrypted_blood_pressure: Option<String>,
    #[serde(skip)]
    pub encrypted_heart_rate: Option<String>,
    #[serde(skip)]
    pub encrypted_respiratory_rate: Option<String>,
    #[serde(skip)]
    pub encrypted_spo2: Option<String>,
    #[serde(skip)]
    pub encrypted_weight: Option<String>,
    #[serde(skip)]
    pub encrypted_height: Option<String>,

    #[serde(skip)]
    pub seal: SealState,
}

macro_rules! numeric_shadow {
    ($field:ident => $column:ident) => {
        SensitiveField::<VitalSign>::shadow(
            stringify!($field),
            |r: &VitalSign| r.$field.map(|v| v.to_string()),
            |r: &mut VitalSign, v: Option<String>| {
                r.$field = v.and_then(|s| s.trim().parse().ok())
            },
            stringify!($column),
            |r: &VitalSign| r.$column.clone(),
            |r: &mut VitalSign, v: Option<String>| r.$column = v,
        )
    };
}

impl Record for VitalSign {
    const KIND: &'static str = "vital-signs";

    keyed_record!();

    fn sensitive_fields() -> FieldSet<Self> {
        FieldSet::new()
            .with(numeric_shadow!(temperature => encrypted_temperature))
            .with(shadow!(VitalSign, blood_pressure => encrypted_blood_pressure))
            .with(numeric_shadow!(heart_rate => encrypted_heart_rate))
            .with(numeric_shadow!(respiratory_rate => encrypted_respiratory_rate))
            .with(numeric_shadow!(spo2 => encrypted_spo2))
            .with(numeric_shadow!(weight => encrypted_weight))
            .with(numeric_shadow!(height => encrypted_height))
            .with(overwrite!(VitalSign, notes))
    }
}
