//! Canonical résumé record, the single shape every other module reads.
//!
//! Wire names are camelCase to match the extraction payload and the editor.
//! Every struct carries `#[serde(default)]`, so a partially specified entry (an
//! empty `{}` appended by the editor) deserializes to a fully-defaulted value.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::missing_points::MissingPointsReport;

/// Root record, owned by exactly one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResumeRecord {
    pub name: String,
    pub title: String,
    pub requisition_number: String,
    pub professional_summary: Vec<String>,
    pub summary_sections: Vec<Subsection>,
    /// Legacy mirror of `summary_sections`. Resolved once by the normalizer;
    /// renderers never read it.
    pub subsections: Vec<Subsection>,
    pub employment_history: Vec<EmploymentEntry>,
    pub education: Vec<EducationEntry>,
    pub certifications: Vec<CertificationEntry>,
    /// Legacy flat skill format: category name -> skills, in insertion order.
    pub technical_skills: IndexMap<String, Vec<String>>,
    pub skill_categories: Vec<SkillCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_points: Option<MissingPointsReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_stats: Option<TokenStats>,
}

impl ResumeRecord {
    /// True when either skill format has at least one category.
    pub fn has_skills(&self) -> bool {
        !self.technical_skills.is_empty() || !self.skill_categories.is_empty()
    }

    /// True when the summary section has points or titled groups.
    pub fn has_summary(&self) -> bool {
        !self.professional_summary.is_empty() || !self.summary_sections.is_empty()
    }
}

/// A titled group of bullet points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subsection {
    pub title: String,
    pub content: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmploymentEntry {
    pub company_name: String,
    pub role_name: String,
    pub work_period: String,
    pub location: String,
    pub description: String,
    pub project: String,
    pub customer: String,
    pub project_role: String,
    pub project_description: String,
    pub project_environment: String,
    pub client: String,
    pub key_technologies: String,
    pub environment: String,
    pub responsibilities: Vec<String>,
    pub achievements: Vec<String>,
    pub client_projects: Vec<ClientProject>,
    pub subsections: Vec<Subsection>,
    pub additional_fields: Map<String, Value>,
}

/// A sub-engagement inside one employment entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientProject {
    pub client_name: String,
    pub project_name: String,
    pub project_description: String,
    pub period: String,
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationEntry {
    pub degree: String,
    pub area_of_study: String,
    pub school: String,
    pub location: String,
    pub date: String,
    pub was_awarded: bool,
}

impl Default for EducationEntry {
    fn default() -> Self {
        Self {
            degree: String::new(),
            area_of_study: String::new(),
            school: String::new(),
            location: String::new(),
            date: String::new(),
            was_awarded: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CertificationEntry {
    pub name: String,
    pub issued_by: String,
    pub date_obtained: String,
    pub certification_number: String,
    pub expiration_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkillCategory {
    pub category_name: String,
    pub skills: Vec<String>,
    pub sub_categories: Vec<SkillSubcategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillSubcategory {
    pub name: String,
    pub skills: Vec<String>,
}

/// Extraction usage metrics. Display-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenStats {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub cost: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_deserializes_to_defaults() {
        let record: ResumeRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record, ResumeRecord::default());
        assert!(record.missing_points.is_none());
    }

    #[test]
    fn test_education_entry_defaults_to_awarded() {
        let entry: EducationEntry = serde_json::from_str(r#"{"degree": "BS"}"#).unwrap();
        assert!(entry.was_awarded);
        assert_eq!(entry.degree, "BS");
        assert!(EducationEntry::default().was_awarded);
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let record = ResumeRecord {
            requisition_number: "REQ-1".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["requisitionNumber"], "REQ-1");
        assert!(json["summarySections"].is_array());
        assert!(json["technicalSkills"].is_object());
        assert!(json.get("missingPoints").is_none());
    }

    #[test]
    fn test_technical_skills_keep_insertion_order() {
        let record: ResumeRecord = serde_json::from_str(
            r#"{"technicalSkills": {"Zeta": ["z"], "Alpha": ["a"], "Mid": []}}"#,
        )
        .unwrap();
        let keys: Vec<&str> = record.technical_skills.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_has_skills_and_summary() {
        let mut record = ResumeRecord::default();
        assert!(!record.has_skills());
        assert!(!record.has_summary());

        record.skill_categories.push(SkillCategory::default());
        record.summary_sections.push(Subsection::default());
        assert!(record.has_skills());
        assert!(record.has_summary());
    }
}
