//! Normalizer: raw extraction JSON to canonical `ResumeRecord`.
//!
//! The extraction model emits loosely-typed JSON in several historical shapes.
//! `normalize` coerces every field to its declared type and never fails: a
//! payload that cannot be read at all degrades to `ResumeRecord::default()`.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{
    CertificationEntry, ClientProject, EducationEntry, EmploymentEntry, MissingPointsReport,
    ResumeRecord, SkillCategory, SkillSubcategory, Subsection, TokenStats,
};

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("payload is not a JSON object (found {0})")]
    NotAnObject(&'static str),
}

/// A `final_data` message payload as delivered by the extraction stream.
///
/// `missing_points` travels beside the extraction data, not inside it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestPayload {
    #[serde(default)]
    pub data: Value,
    #[serde(default, rename = "missingPoints")]
    pub missing_points: Option<Value>,
}

/// Ingestion-boundary entry point: normalizes `data`, then attaches the
/// missing-points report verbatim.
pub fn normalize_payload(payload: &IngestPayload) -> ResumeRecord {
    let mut record = normalize(&payload.data);
    if let Some(points) = payload.missing_points.as_ref().filter(|v| !v.is_null()) {
        record.missing_points = Some(MissingPointsReport::new(points.clone()));
    }
    record
}

/// Converts arbitrary raw JSON into a record satisfying every model invariant.
pub fn normalize(raw: &Value) -> ResumeRecord {
    match try_normalize(raw) {
        Ok(record) => record,
        Err(e) => {
            warn!("Normalization failed, falling back to empty record: {e}");
            ResumeRecord::default()
        }
    }
}

fn try_normalize(raw: &Value) -> Result<ResumeRecord, NormalizeError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| NormalizeError::NotAnObject(json_kind(raw)))?;

    // Legacy bridge: a payload carrying only `subsections` feeds both fields.
    let (summary_sections, subsections) = match (
        obj.get("summarySections").and_then(Value::as_array),
        obj.get("subsections").and_then(Value::as_array),
    ) {
        (Some(sections), legacy) => (
            sections.iter().map(subsection).collect(),
            legacy
                .map(|arr| arr.iter().map(subsection).collect())
                .unwrap_or_default(),
        ),
        (None, Some(legacy)) => {
            let derived: Vec<Subsection> = legacy.iter().map(subsection).collect();
            debug!("Bridged {} legacy subsections into summarySections", derived.len());
            (derived.clone(), derived)
        }
        (None, None) => (Vec::new(), Vec::new()),
    };

    Ok(ResumeRecord {
        name: string_field(obj, "name"),
        title: string_field(obj, "title"),
        requisition_number: string_field(obj, "requisitionNumber"),
        professional_summary: string_list(obj.get("professionalSummary")),
        summary_sections,
        subsections,
        employment_history: objects(obj.get("employmentHistory"))
            .map(employment_entry)
            .collect(),
        education: objects(obj.get("education")).map(education_entry).collect(),
        certifications: objects(obj.get("certifications"))
            .map(certification_entry)
            .collect(),
        technical_skills: technical_skills(obj.get("technicalSkills")),
        skill_categories: objects(obj.get("skillCategories"))
            .map(skill_category)
            .collect(),
        missing_points: obj
            .get("missingPoints")
            .filter(|v| !v.is_null())
            .cloned()
            .map(MissingPointsReport::new),
        token_stats: obj.get("tokenStats").and_then(token_stats),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Entry coercion
// ────────────────────────────────────────────────────────────────────────────

fn employment_entry(obj: &Map<String, Value>) -> EmploymentEntry {
    EmploymentEntry {
        company_name: string_field(obj, "companyName"),
        role_name: string_field(obj, "roleName"),
        work_period: string_field(obj, "workPeriod"),
        location: string_field(obj, "location"),
        description: string_field(obj, "description"),
        project: string_field(obj, "project"),
        customer: string_field(obj, "customer"),
        project_role: string_field(obj, "projectRole"),
        project_description: string_field(obj, "projectDescription"),
        project_environment: string_field(obj, "projectEnvironment"),
        client: string_field(obj, "client"),
        key_technologies: string_field(obj, "keyTechnologies"),
        environment: string_field(obj, "environment"),
        responsibilities: responsibilities(obj.get("responsibilities")),
        achievements: string_list(obj.get("achievements")),
        client_projects: objects(obj.get("clientProjects"))
            .map(client_project)
            .collect(),
        subsections: obj
            .get("subsections")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().map(subsection).collect())
            .unwrap_or_default(),
        additional_fields: obj
            .get("additionalFields")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default(),
    }
}

fn client_project(obj: &Map<String, Value>) -> ClientProject {
    ClientProject {
        client_name: string_field(obj, "clientName"),
        project_name: string_field(obj, "projectName"),
        project_description: string_field(obj, "projectDescription"),
        period: string_field(obj, "period"),
        responsibilities: responsibilities(obj.get("responsibilities")),
    }
}

fn subsection(value: &Value) -> Subsection {
    Subsection {
        title: value.get("title").map(scalar_string).unwrap_or_default(),
        content: string_list(value.get("content")),
    }
}

fn education_entry(obj: &Map<String, Value>) -> EducationEntry {
    EducationEntry {
        degree: string_field(obj, "degree"),
        area_of_study: string_field(obj, "areaOfStudy"),
        school: string_field(obj, "school"),
        location: string_field(obj, "location"),
        date: string_field(obj, "date"),
        // Absent means awarded; an explicit value is cast.
        was_awarded: obj.get("wasAwarded").map(truthy).unwrap_or(true),
    }
}

fn certification_entry(obj: &Map<String, Value>) -> CertificationEntry {
    CertificationEntry {
        name: string_field(obj, "name"),
        issued_by: string_field(obj, "issuedBy"),
        date_obtained: string_field(obj, "dateObtained"),
        certification_number: string_field(obj, "certificationNumber"),
        expiration_date: string_field(obj, "expirationDate"),
    }
}

fn skill_category(obj: &Map<String, Value>) -> SkillCategory {
    SkillCategory {
        category_name: string_field(obj, "categoryName"),
        skills: skill_list(obj.get("skills")),
        sub_categories: objects(obj.get("subCategories"))
            .map(|sub| SkillSubcategory {
                name: string_field(sub, "name"),
                skills: skill_list(sub.get("skills")),
            })
            .collect(),
    }
}

fn technical_skills(value: Option<&Value>) -> IndexMap<String, Vec<String>> {
    value
        .and_then(Value::as_object)
        .map(|obj| {
            obj.iter()
                .map(|(category, skills)| (category.clone(), skill_list(Some(skills))))
                .collect()
        })
        .unwrap_or_default()
}

fn token_stats(value: &Value) -> Option<TokenStats> {
    let obj = value.as_object()?;
    let count = |key: &str| obj.get(key).and_then(Value::as_u64).unwrap_or(0);
    Some(TokenStats {
        prompt_tokens: count("promptTokens"),
        completion_tokens: count("completionTokens"),
        total_tokens: count("totalTokens"),
        cost: obj.get("cost").and_then(Value::as_f64).unwrap_or(0.0),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Scalar coercion
// ────────────────────────────────────────────────────────────────────────────

fn string_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key).map(scalar_string).unwrap_or_default()
}

/// Strings verbatim, numbers in decimal, `true` as text; everything else empty.
fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        _ => String::new(),
    }
}

fn scalar_element(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Arrays keep their scalar elements; anything else is an empty list.
fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(scalar_element).collect())
        .unwrap_or_default()
}

/// Like `string_list`, but a single non-empty scalar becomes a one-element list.
fn responsibilities(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(_)) => string_list(value),
        Some(scalar) => {
            let text = scalar_string(scalar);
            if text.is_empty() {
                Vec::new()
            } else {
                vec![text]
            }
        }
        None => Vec::new(),
    }
}

/// Skill lists also accept the editor's comma-separated form.
fn skill_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        other => string_list(other),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "" | "no" | "n" | "false" | "0"
        ),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Iterates the object elements of an array field, skipping anything else.
fn objects(value: Option<&Value>) -> impl Iterator<Item = &Map<String, Value>> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn renormalize(record: &ResumeRecord) -> ResumeRecord {
        normalize(&serde_json::to_value(record).unwrap())
    }

    #[test]
    fn test_empty_object_yields_full_defaults() {
        let record = normalize(&json!({}));
        assert_eq!(record, ResumeRecord::default());
        assert!(record.technical_skills.is_empty());
        assert!(record.education.is_empty());
        assert_eq!(record.name, "");
    }

    #[test]
    fn test_non_object_degrades_to_empty_record() {
        for raw in [json!(null), json!("resume"), json!([1, 2]), json!(42)] {
            assert_eq!(normalize(&raw), ResumeRecord::default());
        }
    }

    #[test]
    fn test_bare_string_responsibility_is_wrapped() {
        let record = normalize(&json!({"employmentHistory": [{"responsibilities": "Did X"}]}));
        assert_eq!(record.employment_history[0].responsibilities, vec!["Did X"]);
    }

    #[test]
    fn test_empty_or_invalid_responsibilities_default_to_empty() {
        let record = normalize(&json!({"employmentHistory": [
            {"responsibilities": ""},
            {"responsibilities": null},
            {"responsibilities": {"a": 1}},
        ]}));
        assert!(record
            .employment_history
            .iter()
            .all(|job| job.responsibilities.is_empty()));
    }

    #[test]
    fn test_client_project_responsibilities_are_coerced() {
        let record = normalize(&json!({"employmentHistory": [{
            "companyName": "Acme",
            "clientProjects": [{"clientName": "Globex", "responsibilities": "Built ETL"}]
        }]}));
        let project = &record.employment_history[0].client_projects[0];
        assert_eq!(project.client_name, "Globex");
        assert_eq!(project.responsibilities, vec!["Built ETL"]);
        assert_eq!(project.period, "");
    }

    #[test]
    fn test_legacy_subsections_bridge_into_summary_sections() {
        let record = normalize(&json!({"subsections": [{"title": "T", "content": ["a"]}]}));
        let expected = vec![Subsection {
            title: "T".to_string(),
            content: vec!["a".to_string()],
        }];
        assert_eq!(record.summary_sections, expected);
        assert_eq!(record.subsections, expected);
    }

    #[test]
    fn test_summary_sections_take_precedence_over_legacy() {
        let record = normalize(&json!({
            "summarySections": [{"title": "New", "content": "not a list"}],
            "subsections": [{"title": "Old"}]
        }));
        assert_eq!(record.summary_sections.len(), 1);
        assert_eq!(record.summary_sections[0].title, "New");
        assert!(record.summary_sections[0].content.is_empty());
        assert_eq!(record.subsections[0].title, "Old");
    }

    #[test]
    fn test_was_awarded_defaults_to_true_only_when_absent() {
        let record = normalize(&json!({"education": [
            {"degree": "BS"},
            {"degree": "MS", "wasAwarded": false},
            {"degree": "PhD", "wasAwarded": "No"},
            {"degree": "MBA", "wasAwarded": "yes"},
        ]}));
        let awarded: Vec<bool> = record.education.iter().map(|e| e.was_awarded).collect();
        assert_eq!(awarded, vec![true, false, false, true]);
    }

    #[test]
    fn test_skill_categories_are_coerced() {
        let record = normalize(&json!({"skillCategories": [{
            "categoryName": "Languages",
            "skills": ["Go", "Rust"],
            "subCategories": [{"name": "Scripting", "skills": "Python, Bash ,"}, "junk"]
        }]}));
        let category = &record.skill_categories[0];
        assert_eq!(category.skills, vec!["Go", "Rust"]);
        assert_eq!(category.sub_categories.len(), 1);
        assert_eq!(category.sub_categories[0].skills, vec!["Python", "Bash"]);
    }

    #[test]
    fn test_non_object_technical_skills_default_to_empty_map() {
        let record = normalize(&json!({"technicalSkills": ["Go"]}));
        assert!(record.technical_skills.is_empty());

        let record = normalize(&json!({"technicalSkills": {"Cloud": "AWS, GCP", "Db": [1, "Postgres"]}}));
        assert_eq!(record.technical_skills["Cloud"], vec!["AWS", "GCP"]);
        assert_eq!(record.technical_skills["Db"], vec!["1", "Postgres"]);
    }

    #[test]
    fn test_scalar_coercion_of_string_fields() {
        let record = normalize(&json!({
            "name": 7,
            "title": null,
            "certifications": [{"name": "CKA", "certificationNumber": 12345}],
            "professionalSummary": ["ok", null, 3, {"skip": true}]
        }));
        assert_eq!(record.name, "7");
        assert_eq!(record.title, "");
        assert_eq!(record.certifications[0].certification_number, "12345");
        assert_eq!(record.certifications[0].expiration_date, "");
        assert_eq!(record.professional_summary, vec!["ok", "3"]);
    }

    #[test]
    fn test_non_sequence_top_level_fields_default_to_empty() {
        let record = normalize(&json!({
            "employmentHistory": "none",
            "education": {"degree": "BS"},
            "certifications": 3,
            "professionalSummary": "single"
        }));
        assert!(record.employment_history.is_empty());
        assert!(record.education.is_empty());
        assert!(record.certifications.is_empty());
        assert!(record.professional_summary.is_empty());
    }

    #[test]
    fn test_missing_points_pass_through_verbatim() {
        let points = json!({"summary": ["a"], "experience": [], "clientProjects": [], "x": 1});
        let payload = IngestPayload {
            data: json!({"name": "Ada"}),
            missing_points: Some(points.clone()),
        };
        let record = normalize_payload(&payload);
        assert_eq!(record.name, "Ada");
        assert_eq!(serde_json::to_value(record.missing_points).unwrap(), points);
    }

    #[test]
    fn test_normalize_does_not_mutate_input() {
        let raw = json!({"subsections": [{"title": "T"}], "employmentHistory": [{"responsibilities": "x"}]});
        let before = raw.clone();
        let _ = normalize(&raw);
        assert_eq!(raw, before);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            json!({}),
            json!({"subsections": [{"title": "T", "content": ["a"]}]}),
            json!({
                "name": "Ada Lovelace",
                "summarySections": [{"title": "Leadership", "content": ["Led 5"]}],
                "employmentHistory": [{
                    "companyName": "Acme",
                    "responsibilities": "Did X",
                    "achievements": ["Won"],
                    "clientProjects": [{"clientName": "Globex", "responsibilities": ["a"]}],
                    "subsections": [{"title": "Tools", "content": ["Git"]}],
                    "additionalFields": {"visa": "H1B"}
                }],
                "education": [{"degree": "BS", "wasAwarded": "no"}],
                "technicalSkills": {"Cloud": "AWS, GCP"},
                "skillCategories": [{"categoryName": "Lang", "skills": "Go"}],
                "missingPoints": {"summary": ["x"]},
                "tokenStats": {"promptTokens": 10, "completionTokens": 5, "totalTokens": 15, "cost": 0.0001}
            }),
        ];
        for raw in inputs {
            let once = normalize(&raw);
            assert_eq!(renormalize(&once), once, "not idempotent for {raw}");
        }
    }
}
