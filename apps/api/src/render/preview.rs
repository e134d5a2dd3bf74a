//! Preview serializer: the display tree for on-screen and print rendering.
//!
//! Sections without data are omitted. Everything else mirrors the document
//! because both come from the same `ResumeLayout`.

use serde::Serialize;

use crate::models::{MissingPointsReport, ResumeRecord, TokenStats};
use crate::render::layout::{layout, Block, BulletList, EmploymentBlock, ResumeLayout};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewTree {
    pub header: PreviewHeader,
    pub sections: Vec<PreviewSection>,
    /// Forwarded for the missing-points display, never used for layout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_points: Option<MissingPointsReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_stats: Option<TokenStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewHeader {
    pub name: String,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub requisition_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewSection {
    pub kind: &'static str,
    pub heading: &'static str,
    pub nodes: Vec<PreviewNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PreviewNode {
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Entry {
        heading: String,
        #[serde(skip_serializing_if = "String::is_empty")]
        period: String,
        subheading: String,
        #[serde(skip_serializing_if = "String::is_empty")]
        location: String,
    },
    Field {
        label: String,
        value: String,
        emphasis: bool,
    },
    Label {
        text: String,
    },
    Subheading {
        text: String,
    },
    Note {
        text: String,
        italic: bool,
    },
    Bullets {
        level: usize,
        items: Vec<String>,
    },
    Skill {
        /// `category` and `skills` joined into the displayed line.
        text: String,
        category: String,
        skills: String,
        nested: bool,
    },
}

pub fn render(record: &ResumeRecord) -> PreviewTree {
    let mut tree = from_layout(&layout(record));
    tree.missing_points = record.missing_points.clone();
    tree.token_stats = record.token_stats.clone();
    tree
}

pub fn from_layout(layout: &ResumeLayout) -> PreviewTree {
    PreviewTree {
        header: PreviewHeader {
            name: layout.header.name.clone(),
            title: layout.header.title.clone(),
            requisition_number: layout.header.requisition_number.clone(),
        },
        sections: layout
            .sections
            .iter()
            .filter(|section| !section.is_empty())
            .map(|section| PreviewSection {
                kind: section.kind.key(),
                heading: section.kind.heading(),
                nodes: section.blocks.iter().flat_map(nodes).collect(),
            })
            .collect(),
        missing_points: None,
        token_stats: None,
    }
}

fn nodes(block: &Block) -> Vec<PreviewNode> {
    match block {
        Block::Table(table) => vec![PreviewNode::Table {
            columns: table.columns.iter().map(|c| c.label()).collect(),
            rows: table.rows.clone(),
        }],
        Block::Employment(entry) => employment(entry),
        Block::Bullets(list) => vec![bullets(list)],
        Block::Title(title) if title.trim().is_empty() => Vec::new(),
        Block::Title(title) => vec![PreviewNode::Subheading { text: title.clone() }],
        Block::Skill(line) => vec![PreviewNode::Skill {
            text: line.text(),
            category: line.label.clone(),
            skills: line.joined_skills(),
            nested: line.nested,
        }],
    }
}

fn employment(entry: &EmploymentBlock) -> Vec<PreviewNode> {
    let mut nodes = vec![PreviewNode::Entry {
        heading: entry.company.clone(),
        period: entry.period.clone(),
        subheading: entry.role.clone(),
        location: entry.location.clone(),
    }];

    nodes.extend(entry.details.iter().map(|detail| PreviewNode::Field {
        label: detail.label.to_string(),
        value: detail.value.clone(),
        emphasis: detail.emphasis,
    }));

    if !entry.client_projects.is_empty() {
        nodes.push(label("Client Projects:"));
        for project in &entry.client_projects {
            nodes.push(PreviewNode::Subheading {
                text: project.heading.clone(),
            });
            if let Some(period) = &project.duration {
                nodes.push(PreviewNode::Note {
                    text: format!("Duration: {period}"),
                    italic: true,
                });
            }
            if let Some(description) = &project.description {
                nodes.push(PreviewNode::Note {
                    text: description.clone(),
                    italic: false,
                });
            }
            if !project.responsibilities.is_empty() {
                nodes.push(PreviewNode::Bullets {
                    level: 1,
                    items: project.responsibilities.clone(),
                });
            }
        }
    }

    if !entry.responsibilities.is_empty() {
        nodes.push(label("Responsibilities"));
        nodes.push(primary(&entry.responsibilities));
    }

    for group in &entry.groups {
        nodes.push(label(&format!("{}:", group.title)));
        if !group.items.is_empty() {
            nodes.push(primary(&group.items));
        }
    }

    for (name, value) in [
        ("Key Technologies/Skills:", &entry.key_technologies),
        ("Environment:", &entry.environment),
    ] {
        if let Some(value) = value {
            nodes.push(PreviewNode::Field {
                label: name.to_string(),
                value: value.clone(),
                emphasis: false,
            });
        }
    }

    if !entry.achievements.is_empty() {
        nodes.push(label("Achievements:"));
        nodes.push(primary(&entry.achievements));
    }
    nodes
}

fn bullets(list: &BulletList) -> PreviewNode {
    PreviewNode::Bullets {
        level: list.level.depth(),
        items: list.items.clone(),
    }
}

fn primary(items: &[String]) -> PreviewNode {
    PreviewNode::Bullets {
        level: 0,
        items: items.to_vec(),
    }
}

fn label(text: &str) -> PreviewNode {
    PreviewNode::Label {
        text: text.to_string(),
    }
}
