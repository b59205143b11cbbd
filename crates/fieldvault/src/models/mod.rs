//! Health-center record types and their sensitive-field lists.
//!
//! | Kind                     | Type                         | Convention         |
//! |--------------------------|------------------------------|--------------------|
//! | `patients`               | [`Patient`]                  | shadow columns     |
//! | `vital-signs`            | [`VitalSign`]                | shadow + overwrite |
//! | `immunization-records`   | [`ImmunizationRecord`]       | overwrite          |
//! | `immunization-shortcuts` | [`ImmunizationShortcutForm`] | overwrite          |
//! | `heeadsss-assessments`   | [`HeeadsssAssessment`]       | overwrite          |
//! | `ncd-assessments`        | [`NcdRiskAssessment`]        | overwrite          |

// Every model keeps its key in `id` and its bookkeeping in `seal`.
macro_rules! keyed_record {
    () => {
        fn key(&self) -> &str {
            &self.id
        }

        fn set_key(&mut self, key: String) {
            self.id = key;
        }

        fn seal(&self) -> &$crate::registry::SealState {
            &self.seal
        }

        fn seal_mut(&mut self) -> &mut $crate::registry::SealState {
            &mut self.seal
        }
    };
}

pub mod assessment;
pub mod immunization;
pub mod patient;
pub mod vital_sign;

pub use assessment::{HeeadsssAssessment, NcdRiskAssessment};
pub use immunization::{Dose, ImmunizationRecord, ImmunizationShortcutForm, VaccineSchedule};
pub use patient::Patient;
pub use vital_sign::VitalSign;

use crate::registry::FieldRegistry;

/// Registry with every health-center record type registered.
pub fn standard_registry() -> FieldRegistry {
    FieldRegistry::builder()
        .register::<Patient>()
        .register::<VitalSign>()
        .register::<ImmunizationRecord>()
        .register::<ImmunizationShortcutForm>()
        .register::<HeeadsssAssessment>()
        .register::<NcdRiskAssessment>()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Record;

    #[test]
    fn standard_registry_covers_all_kinds() {
        let registry = standard_registry();
        assert_eq!(
            registry.kinds(),
            vec![
                "heeadsss-assessments",
                "immunization-records",
                "immunization-shortcuts",
                "ncd-assessments",
                "patients",
                "vital-signs",
            ]
        );
        assert!(registry.fields::<Patient>().is_some());
        assert!(registry.fields::<VitalSign>().is_some());
    }

    #[test]
    fn field_names_are_unique_per_kind() {
        fn check<T: Record>() {
            let set = T::sensitive_fields();
            let mut names: Vec<_> = set.names().collect();
            let total = names.len();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), total, "duplicate field in {}", T::KIND);
        }
        check::<Patient>();
        check::<VitalSign>();
        check::<ImmunizationRecord>();
        check::<ImmunizationShortcutForm>();
        check::<HeeadsssAssessment>();
        check::<NcdRiskAssessment>();
    }
}
