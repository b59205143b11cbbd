//! Adolescent (HEEADSSS) and non-communicable-disease risk assessments.
//!
//! Both are long questionnaires; identifying fields and free-text answers are
//! encrypted in place, yes/no flags and scores are not.

use serde::{Deserialize, Serialize};

use crate::registry::{overwrite, FieldSet, Record, SealState};

/// Home, Education, Eating, Activities, Drugs, Sexuality, Suicide, Safety
/// interview for adolescents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeeadsssAssessment {
    pub id: String,
    pub user_id: String,
    pub health_facility: Option<String>,
    pub family_no: Option<String>,
    pub age: Option<u32>,

    pub full_name: Option<String>,
    pub birthday: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub contact_number: Option<String>,

    pub home_environment: Option<String>,
    pub family_relationship: Option<String>,
    pub home_family_problems: Option<String>,
    pub school_performance: Option<String>,
    pub career_plans: Option<String>,
    pub diet_description: Option<String>,
    pub eating_body_image_satisfaction: Option<String>,
    pub hobbies: Option<String>,
    pub physical_activity: Option<String>,
    pub substance_type: Option<String>,
    pub drugs_alcohol_use: Option<String>,
    pub dating_relationships: Option<String>,
    pub sexual_orientation: Option<String>,
    pub sexuality_pregnancy: Option<String>,
    pub suicide_depression_feelings: Option<String>,
    pub suicide_self_harm_thoughts: Option<String>,
    pub safety_physical_abuse: Option<String>,
    pub personal_strengths: Option<String>,
    pub notes: Option<String>,

    pub assessed_by: Option<String>,

    #[serde(skip)]
    pub seal: SealState,
}

impl Record for HeeadsssAssessment {
    const KIND: &'static str = "heeadsss-assessments";

    keyed_record!();

    fn sensitive_fields() -> FieldSet<Self> {
        FieldSet::new()
            .with(overwrite!(HeeadsssAssessment, full_name))
            .with(overwrite!(HeeadsssAssessment, birthday))
            .with(overwrite!(HeeadsssAssessment, gender))
            .with(overwrite!(HeeadsssAssessment, address))
            .with(overwrite!(HeeadsssAssessment, contact_number))
            .with(overwrite!(HeeadsssAssessment, home_environment))
            .with(overwrite!(HeeadsssAssessment, family_relationship))
            .with(overwrite!(HeeadsssAssessment, home_family_problems))
            .with(overwrite!(HeeadsssAssessment, school_performance))
            .with(overwrite!(HeeadsssAssessment, career_plans))
            .with(overwrite!(HeeadsssAssessment, diet_description))
            .with(overwrite!(HeeadsssAssessment, eating_body_image_satisfaction))
            .with(overwrite!(HeeadsssAssessment, hobbies))
            .with(overwrite!(HeeadsssAssessment, physical_activity))
            .with(overwrite!(HeeadsssAssessment, substance_type))
            .with(overwrite!(HeeadsssAssessment, drugs_alcohol_use))
            .with(overwrite!(HeeadsssAssessment, dating_relationships))
            .with(overwrite!(HeeadsssAssessment, sexual_orientation))
            .with(overwrite!(HeeadsssAssessment, sexuality_pregnancy))
            .with(overwrite!(HeeadsssAssessment, suicide_depression_feelings))
            .with(overwrite!(HeeadsssAssessment, suicide_self_harm_thoughts))
            .with(overwrite!(HeeadsssAssessment, safety_physical_abuse))
            .with(overwrite!(HeeadsssAssessment, personal_strengths))
            .with(overwrite!(HeeadsssAssessment, notes))
    }
}

/// Non-communicable disease risk assessment (PhilPEN form). Field names follow
/// the Filipino form labels where the form uses them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NcdRiskAssessment {
    pub id: String,
    pub user_id: String,
    pub health_facility: Option<String>,
    pub family_no: Option<String>,

    pub address: Option<String>,
    pub barangay: Option<String>,
    pub telepono: Option<String>,
    pub kasarian: Option<String>,
    pub relihiyon: Option<String>,
    pub cancer_type: Option<String>,
    pub family_other_disease_details: Option<String>,
    pub smoking_status: Option<String>,
    pub alcohol_frequency: Option<String>,
    pub alcohol_consumption: Option<String>,
    pub exercise_duration: Option<String>,
    pub risk_status: Option<String>,

    pub has_diabetes: bool,
    pub has_hypertension: bool,
    pub has_cancer: bool,

    #[serde(skip)]
    pub seal: SealState,
}

impl Record for NcdRiskAssessment {
    const KIND: &'static str = "ncd-assessments";

    keyed_record!();

    fn sensitive_fields() -> FieldSet<Self> {
        FieldSet::new()
            .with(overwrite!(NcdRiskAssessment, address))
            .with(overwrite!(NcdRiskAssessment, barangay))
            .with(overwrite!(NcdRiskAssessment, telepono))
            .with(overwrite!(NcdRiskAssessment, kasarian))
            .with(overwrite!(NcdRiskAssessment, relihiyon))
            .with(overwrite!(NcdRiskAssessment, cancer_type))
            .with(overwrite!(NcdRiskAssessment, family_other_disease_details))
            .with(overwrite!(NcdRiskAssessment, smoking_status))
            .with(overwrite!(NcdRiskAssessment, alcohol_frequency))
            .with(overwrite!(NcdRiskAssessment, alcohol_consumption))
            .with(overwrite!(NcdRiskAssessment, exercise_duration))
            .with(overwrite!(NcdRiskAssessment, risk_status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heeadsss_flags_and_assessor_stay_plain() {
        let fields = HeeadsssAssessment::sensitive_fields();
        assert!(fields.get("full_name").is_some());
        assert!(fields.get("assessed_by").is_none());
        assert!(fields.get("age").is_none());
    }

    #[test]
    fn ncd_answers_are_listed_in_form_order() {
        let names: Vec<_> = NcdRiskAssessment::sensitive_fields().names().collect();
        assert_eq!(names.first(), Some(&"address"));
        assert_eq!(names.last(), Some(&"risk_status"));
        assert_eq!(names.len(), 12);
    }
}
