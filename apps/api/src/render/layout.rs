//! Shared intermediate layout.
//!
//! `layout` walks a `ResumeRecord` once and resolves everything both outputs
//! must agree on: section order, per-field presence, fallback text and blank
//! filtering. The document and preview serializers only decide how a resolved
//! block looks.

use crate::models::{
    CertificationEntry, ClientProject, EducationEntry, EmploymentEntry, ResumeRecord,
};
use crate::render::style::{
    Column, CERTIFICATION_COLUMNS, EDUCATION_COLUMNS, EMPTY_CELL, FALLBACK_CATEGORY,
    FALLBACK_CLIENT_PROJECT, FALLBACK_COMPANY, FALLBACK_NAME, FALLBACK_ROLE, FALLBACK_SUBCATEGORY,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ResumeLayout {
    pub header: Header,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub title: String,
    pub requisition_number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Education,
    Certifications,
    EmploymentHistory,
    ProfessionalSummary,
    TechnicalSkills,
}

impl SectionKind {
    pub fn heading(self) -> &'static str {
        match self {
            SectionKind::Education => "Education:",
            SectionKind::Certifications => "Certifications and Certificates:",
            SectionKind::EmploymentHistory => "Employment History:",
            SectionKind::ProfessionalSummary => "Professional Summary",
            SectionKind::TechnicalSkills => "Technical Skills",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            SectionKind::Education => "education",
            SectionKind::Certifications => "certifications",
            SectionKind::EmploymentHistory => "employment_history",
            SectionKind::ProfessionalSummary => "professional_summary",
            SectionKind::TechnicalSkills => "technical_skills",
        }
    }
}

/// A section with no blocks has no underlying data.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Table(TableBlock),
    Employment(Box<EmploymentBlock>),
    Bullets(BulletList),
    /// Bold title line above a group of bullets.
    Title(String),
    Skill(SkillLine),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    pub columns: &'static [Column],
    /// Data rows only; every row has one cell per column.
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletLevel {
    Primary,
    /// Under a client project.
    Nested,
}

impl BulletLevel {
    pub fn depth(self) -> usize {
        match self {
            BulletLevel::Primary => 0,
            BulletLevel::Nested => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulletList {
    pub level: BulletLevel,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillLine {
    pub label: String,
    pub skills: Vec<String>,
    /// Subcategory line under a hierarchical category.
    pub nested: bool,
}

impl SkillLine {
    pub fn joined_skills(&self) -> String {
        self.skills.join(", ")
    }

    /// The whole line as both outputs read it, e.g. `Languages: Go, Rust`.
    pub fn text(&self) -> String {
        format!("{}: {}", self.label, self.joined_skills())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmploymentBlock {
    pub company: String,
    pub period: String,
    pub role: String,
    pub location: String,
    pub details: Vec<Detail>,
    pub client_projects: Vec<ClientProjectBlock>,
    pub responsibilities: Vec<String>,
    pub groups: Vec<Group>,
    pub key_technologies: Option<String>,
    pub environment: Option<String>,
    pub achievements: Vec<String>,
}

/// A `Label: value` line. `emphasis` renders the value bold as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
    pub label: &'static str,
    pub value: String,
    pub emphasis: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientProjectBlock {
    pub heading: String,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub responsibilities: Vec<String>,
}

/// A titled employment subsection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub title: String,
    pub items: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

pub fn layout(record: &ResumeRecord) -> ResumeLayout {
    ResumeLayout {
        header: Header {
            name: or_fallback(&record.name, FALLBACK_NAME),
            title: clean(&record.title),
            requisition_number: clean(&record.requisition_number),
        },
        sections: vec![
            Section {
                kind: SectionKind::Education,
                blocks: table(EDUCATION_COLUMNS, record.education.iter().map(education_row)),
            },
            Section {
                kind: SectionKind::Certifications,
                blocks: table(
                    CERTIFICATION_COLUMNS,
                    record.certifications.iter().map(certification_row),
                ),
            },
            Section {
                kind: SectionKind::EmploymentHistory,
                blocks: record
                    .employment_history
                    .iter()
                    .map(|entry| Block::Employment(Box::new(employment(entry))))
                    .collect(),
            },
            Section {
                kind: SectionKind::ProfessionalSummary,
                blocks: summary_blocks(record),
            },
            Section {
                kind: SectionKind::TechnicalSkills,
                blocks: skill_blocks(record),
            },
        ],
    }
}

fn table(columns: &'static [Column], rows: impl Iterator<Item = Vec<String>>) -> Vec<Block> {
    let rows: Vec<Vec<String>> = rows.collect();
    if rows.is_empty() {
        return Vec::new();
    }
    vec![Block::Table(TableBlock { columns, rows })]
}

fn education_row(entry: &EducationEntry) -> Vec<String> {
    vec![
        clean(&entry.degree),
        clean(&entry.area_of_study),
        clean(&entry.school),
        clean(&entry.location),
        if entry.was_awarded { "Yes" } else { "No" }.to_string(),
        or_fallback(&entry.date, EMPTY_CELL),
    ]
}

fn certification_row(entry: &CertificationEntry) -> Vec<String> {
    vec![
        clean(&entry.name),
        clean(&entry.issued_by),
        clean(&entry.date_obtained),
        or_fallback(&entry.certification_number, EMPTY_CELL),
        or_fallback(&entry.expiration_date, EMPTY_CELL),
    ]
}

fn employment(entry: &EmploymentEntry) -> EmploymentBlock {
    let details = [
        ("Project:", &entry.project, true),
        ("Project Role:", &entry.project_role, true),
        ("Project Description:", &entry.project_description, false),
        ("Project Environment:", &entry.project_environment, false),
        ("Client:", &entry.client, false),
        ("Customer:", &entry.customer, false),
        ("Description:", &entry.description, false),
    ]
    .into_iter()
    .filter_map(|(label, value, emphasis)| {
        present(value).map(|value| Detail {
            label,
            value,
            emphasis,
        })
    })
    .collect();

    let groups = entry
        .subsections
        .iter()
        .filter_map(|s| {
            present(&s.title).map(|title| Group {
                title,
                items: non_blank(&s.content),
            })
        })
        .collect();

    EmploymentBlock {
        company: or_fallback(&entry.company_name, FALLBACK_COMPANY),
        period: clean(&entry.work_period),
        role: or_fallback(&entry.role_name, FALLBACK_ROLE),
        location: clean(&entry.location),
        details,
        client_projects: entry.client_projects.iter().map(client_project).collect(),
        responsibilities: non_blank(&entry.responsibilities),
        groups,
        key_technologies: present(&entry.key_technologies),
        environment: present(&entry.environment),
        achievements: non_blank(&entry.achievements),
    }
}

fn client_project(project: &ClientProject) -> ClientProjectBlock {
    let heading = match (present(&project.client_name), present(&project.project_name)) {
        (Some(client), Some(name)) => format!("{client} - {name}"),
        (Some(one), None) | (None, Some(one)) => one,
        (None, None) => FALLBACK_CLIENT_PROJECT.to_string(),
    };
    ClientProjectBlock {
        heading,
        duration: present(&project.period),
        description: present(&project.project_description),
        responsibilities: non_blank(&project.responsibilities),
    }
}

fn summary_blocks(record: &ResumeRecord) -> Vec<Block> {
    let mut blocks = Vec::new();
    if !record.has_summary() {
        return blocks;
    }
    if !record.professional_summary.is_empty() {
        blocks.push(Block::Bullets(BulletList {
            level: BulletLevel::Primary,
            items: clean_all(&record.professional_summary),
        }));
    }
    for section in &record.summary_sections {
        blocks.push(Block::Title(clean(&section.title)));
        if !section.content.is_empty() {
            blocks.push(Block::Bullets(BulletList {
                level: BulletLevel::Primary,
                items: clean_all(&section.content),
            }));
        }
    }
    blocks
}

fn skill_blocks(record: &ResumeRecord) -> Vec<Block> {
    if !record.has_skills() {
        return Vec::new();
    }
    let legacy = record
        .technical_skills
        .iter()
        .map(|(category, skills)| SkillLine {
            label: clean(category),
            skills: clean_all(skills),
            nested: false,
        });

    let hierarchical = record.skill_categories.iter().flat_map(|category| {
        let head = SkillLine {
            label: or_fallback(&category.category_name, FALLBACK_CATEGORY),
            skills: clean_all(&category.skills),
            nested: false,
        };
        let subs = category.sub_categories.iter().map(|sub| SkillLine {
            label: or_fallback(&sub.name, FALLBACK_SUBCATEGORY),
            skills: clean_all(&sub.skills),
            nested: true,
        });
        std::iter::once(head).chain(subs)
    });

    legacy.chain(hierarchical).map(Block::Skill).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn or_fallback(value: &str, fallback: &str) -> String {
    present(value).unwrap_or_else(|| fallback.to_string())
}

fn present(value: &str) -> Option<String> {
    let value = clean(value);
    (!value.trim().is_empty()).then_some(value)
}

fn non_blank(items: &[String]) -> Vec<String> {
    items.iter().filter_map(|item| present(item)).collect()
}

/// Every record string reaching either output goes through here. Characters
/// XML 1.0 does not allow in text are dropped.
fn clean(value: &str) -> String {
    value.chars().filter(|&c| is_xml_char(c)).collect()
}

fn clean_all(items: &[String]) -> Vec<String> {
    items.iter().map(|item| clean(item)).collect()
}

fn is_xml_char(c: char) -> bool {
    !matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}
