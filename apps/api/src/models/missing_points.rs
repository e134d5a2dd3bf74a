//! Missing-points carrier.
//!
//! The extraction pipeline reports source content it detected but did not place
//! into the structured record. The core never computes or reshapes this report:
//! the supplied JSON is held verbatim and only read through lenient accessors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissingPointsReport(Value);

/// Per-category counts, as shown by a summary-display collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingPointsCounts {
    pub summary: usize,
    pub experience: usize,
    pub client_projects: usize,
    pub total: usize,
}

impl MissingPointsReport {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn summary(&self) -> Vec<&str> {
        self.points("summary")
    }

    pub fn experience(&self) -> Vec<&str> {
        self.points("experience")
    }

    pub fn client_projects(&self) -> Vec<&str> {
        self.points("clientProjects")
    }

    pub fn counts(&self) -> MissingPointsCounts {
        let summary = self.summary().len();
        let experience = self.experience().len();
        let client_projects = self.client_projects().len();
        MissingPointsCounts {
            summary,
            experience,
            client_projects,
            total: summary + experience + client_projects,
        }
    }

    fn points(&self, key: &str) -> Vec<&str> {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_counts_across_categories() {
        let report = MissingPointsReport::new(json!({
            "summary": ["Led a guild"],
            "experience": ["Mentored interns", "Ran on-call"],
            "clientProjects": []
        }));
        let counts = report.counts();
        assert_eq!(counts.summary, 1);
        assert_eq!(counts.experience, 2);
        assert_eq!(counts.client_projects, 0);
        assert_eq!(counts.total, 3);
    }

    #[test]
    fn test_malformed_categories_read_as_empty() {
        let report = MissingPointsReport::new(json!({"summary": "not a list"}));
        assert!(report.summary().is_empty());
        assert_eq!(report.counts().total, 0);
    }

    #[test]
    fn test_serializes_verbatim() {
        let raw = json!({"summary": [], "experience": ["x"], "extra": {"kept": true}});
        let report = MissingPointsReport::new(raw.clone());
        assert_eq!(serde_json::to_value(&report).unwrap(), raw);
    }
}
