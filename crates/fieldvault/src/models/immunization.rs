//! Child immunization records and the public scheduling form.

use serde::{Deserialize, Serialize};

use crate::registry::{overwrite, FieldSet, Record, SealState};

/// Date and remarks for one vaccine dose.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dose {
    pub date: Option<String>,
    pub remarks: Option<String>,
}

/// The national infant immunization schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaccineSchedule {
    pub bcg: Dose,
    pub hepatitis_b: Dose,
    pub pentavalent_1: Dose,
    pub pentavalent_2: Dose,
    pub pentavalent_3: Dose,
    pub opv_1: Dose,
    pub opv_2: Dose,
    pub opv_3: Dose,
    pub ipv_1: Dose,
    pub ipv_2: Dose,
    pub pcv_1: Dose,
    pub pcv_2: Dose,
    pub pcv_3: Dose,
    pub mmr_1: Dose,
    pub mmr_2: Dose,
}

/// A child's immunization card. Every text field is overwritten in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImmunizationRecord {
    pub id: String,

    pub child_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub place_of_birth: Option<String>,
    pub address: Option<String>,
    pub mother_name: Option<String>,
    pub father_name: Option<String>,
    pub sex: Option<String>,
    pub birth_height: Option<String>,
    pub birth_weight: Option<String>,
    pub health_center: Option<String>,
    pub barangay: Option<String>,
    pub family_number: Option<String>,
    pub email: Option<String>,
    pub contact_number: Option<String>,

    pub doses: VaccineSchedule,

    #[serde(skip)]
    pub seal: SealState,
}

// Two entries per dose: `<dose>_date` and `<dose>_remarks`.
macro_rules! doses {
    ($set:expr; $($dose:ident),+ $(,)?) => {
        $set$(
            .with(overwrite!(
                ImmunizationRecord,
                concat!(stringify!($dose), "_date"),
                doses.$dose.date
            ))
            .with(overwrite!(
                ImmunizationRecord,
                concat!(stringify!($dose), "_remarks"),
                doses.$dose.remarks
            ))
        )+
    };
}

impl Record for ImmunizationRecord {
    const KIND: &'static str = "immunization-records";

    keyed_record!();

    fn sensitive_fields() -> FieldSet<Self> {
        let set = FieldSet::new()
            .with(overwrite!(ImmunizationRecord, child_name))
            .with(overwrite!(ImmunizationRecord, date_of_birth))
            .with(overwrite!(ImmunizationRecord, place_of_birth))
            .with(overwrite!(ImmunizationRecord, address))
            .with(overwrite!(ImmunizationRecord, mother_name))
            .with(overwrite!(ImmunizationRecord, father_name))
            .with(overwrite!(ImmunizationRecord, sex))
            .with(overwrite!(ImmunizationRecord, birth_height))
            .with(overwrite!(ImmunizationRecord, birth_weight))
            .with(overwrite!(ImmunizationRecord, health_center))
            .with(overwrite!(ImmunizationRecord, barangay))
            .with(overwrite!(ImmunizationRecord, family_number))
            .with(overwrite!(ImmunizationRecord, email))
            .with(overwrite!(ImmunizationRecord, contact_number));

        doses!(set;
            bcg, hepatitis_b,
            pentavalent_1, pentavalent_2, pentavalent_3,
            opv_1, opv_2, opv_3,
            ipv_1, ipv_2,
            pcv_1, pcv_2, pcv_3,
            mmr_1, mmr_2,
        )
    }
}

/// The short public form used to request an immunization appointment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImmunizationShortcutForm {
    pub id: String,

    pub child_name: Option<String>,
    pub mother_name: Option<String>,
    pub father_name: Option<String>,
    pub address: Option<String>,
    pub barangay: Option<String>,
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub notes: Option<String>,

    pub status: Option<String>,

    #[serde(skip)]
    pub seal: SealState,
}

impl Record for ImmunizationShortcutForm {
    const KIND: &'static str = "immunization-shortcuts";

    keyed_record!();

    fn sensitive_fields() -> FieldSet<Self> {
        FieldSet::new()
            .with(overwrite!(ImmunizationShortcutForm, child_name))
            .with(overwrite!(ImmunizationShortcutForm, mother_name))
            .with(overwrite!(ImmunizationShortcutForm, father_name))
            .with(overwrite!(ImmunizationShortcutForm, address))
            .with(overwrite!(ImmunizationShortcutForm, barangay))
            .with(overwrite!(ImmunizationShortcutForm, email))
            .with(overwrite!(ImmunizationShortcutForm, contact_number))
            .with(overwrite!(ImmunizationShortcutForm, preferred_date))
            .with(overwrite!(ImmunizationShortcutForm, preferred_time))
            .with(overwrite!(ImmunizationShortcutForm, notes))
    }
}
