//! DOCX serializer for a `ResumeLayout`.
//!
//! Unlike the preview, every section is emitted: empty tables get a single
//! spanning `-` row and empty employment/skills get a placeholder line.

use std::io::Cursor;

use docx_rs::{
    AbstractNumbering, AlignmentType, Docx, IndentLevel, Level, LevelJc, LevelText, LineSpacing,
    NumberFormat, Numbering, NumberingId, PageMargin, Paragraph, Run, RunFonts, Shading,
    SpecialIndentType, Start, Table, TableBorders, TableCell, TableRow, VAlignType, WidthType,
};
use thiserror::Error;
use tracing::debug;

use crate::models::ResumeRecord;
use crate::render::layout::{
    layout, Block, BulletLevel, BulletList, ClientProjectBlock, EmploymentBlock, Header,
    ResumeLayout, Section, SectionKind, SkillLine, TableBlock,
};
use crate::render::style::{
    Column, ACCENT_COLOR, BODY_COLOR, BODY_FONT, BODY_SIZE, BULLET_INDENT, CERTIFICATION_COLUMNS,
    CONTENT_WIDTH, EDUCATION_COLUMNS, EMPTY_CELL, FALLBACK_FILE_STEM, HEADER_SHADING,
    HEADING_SIZE, NAME_SIZE, NESTED_BULLET_INDENT, NESTED_SIZE, NO_EMPLOYMENT, NO_SKILLS,
    PAGE_MARGIN, REQUISITION_LABEL, REQUISITION_VALUE_INDENT, TABLE_HEADER_FONT,
    TABLE_HEADER_SIZE, TITLE_LABEL,
};

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const BULLET_NUMBERING: usize = 1;
const BULLET_HANGING: i32 = 250;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to package document: {0}")]
    Package(String),
}

/// Builds the complete document. Nothing is returned unless packaging succeeds.
pub fn build(record: &ResumeRecord) -> Result<Vec<u8>, DocumentError> {
    serialize(&layout(record))
}

/// `"{name}.docx"`, or `Resume.docx` when the record has no name.
pub fn document_file_name(record: &ResumeRecord) -> String {
    let stem = record.name.trim();
    let stem = if stem.is_empty() { FALLBACK_FILE_STEM } else { stem };
    format!("{stem}.docx")
}

pub fn serialize(layout: &ResumeLayout) -> Result<Vec<u8>, DocumentError> {
    let mut docx = Docx::new()
        .page_margin(
            PageMargin::new()
                .top(PAGE_MARGIN)
                .bottom(PAGE_MARGIN)
                .left(PAGE_MARGIN)
                .right(PAGE_MARGIN),
        )
        .add_abstract_numbering(bullet_numbering())
        .add_numbering(Numbering::new(BULLET_NUMBERING, BULLET_NUMBERING));

    docx = header(docx, &layout.header);
    for section in &layout.sections {
        docx = docx.add_paragraph(heading(section.kind));
        docx = section_body(docx, section);
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| DocumentError::Package(e.to_string()))?;

    let bytes = buffer.into_inner();
    debug!("Packaged document ({} bytes)", bytes.len());
    Ok(bytes)
}

// ────────────────────────────────────────────────────────────────────────────
// Header
// ────────────────────────────────────────────────────────────────────────────

fn header(docx: Docx, header: &Header) -> Docx {
    let name = Paragraph::new()
        .align(AlignmentType::Center)
        .add_run(accent(&header.name, NAME_SIZE));

    let title = Paragraph::new()
        .add_run(accent(TITLE_LABEL, HEADING_SIZE))
        .add_run(body(&header.title, BODY_SIZE));

    let requisition_label = Paragraph::new()
        .align(AlignmentType::Right)
        .add_run(accent(REQUISITION_LABEL, HEADING_SIZE));
    let requisition_value = Paragraph::new()
        .align(AlignmentType::Left)
        .indent(Some(REQUISITION_VALUE_INDENT), None, None, None)
        .add_run(body(&header.requisition_number, BODY_SIZE));

    let half = CONTENT_WIDTH / 2;
    let row = TableRow::new(vec![
        TableCell::new()
            .width(half, WidthType::Dxa)
            .add_paragraph(title),
        TableCell::new()
            .width(half, WidthType::Dxa)
            .add_paragraph(requisition_label)
            .add_paragraph(requisition_value),
    ]);

    docx.add_paragraph(name).add_table(borderless(vec![row]))
}

fn heading(kind: SectionKind) -> Paragraph {
    let (before, after) = match kind {
        SectionKind::Education => (200, 200),
        SectionKind::TechnicalSkills => (400, 0),
        _ => (400, 200),
    };
    Paragraph::new()
        .line_spacing(spacing(before, after))
        .add_run(accent(kind.heading(), HEADING_SIZE))
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

fn section_body(mut docx: Docx, section: &Section) -> Docx {
    if section.is_empty() {
        return match section.kind {
            SectionKind::Education => docx.add_table(placeholder_table(EDUCATION_COLUMNS)),
            SectionKind::Certifications => docx.add_table(placeholder_table(CERTIFICATION_COLUMNS)),
            SectionKind::EmploymentHistory => docx.add_paragraph(plain_line(NO_EMPLOYMENT)),
            SectionKind::TechnicalSkills => docx.add_paragraph(plain_line(NO_SKILLS)),
            SectionKind::ProfessionalSummary => docx,
        };
    }

    let mut employment_seen = false;
    for block in &section.blocks {
        docx = match block {
            Block::Table(table) => docx.add_table(data_table(table)),
            Block::Employment(entry) => {
                if employment_seen {
                    docx = docx.add_paragraph(Paragraph::new());
                }
                employment_seen = true;
                employment(docx, entry)
            }
            Block::Bullets(list) => bullets(docx, list),
            Block::Title(title) => docx.add_paragraph(
                Paragraph::new()
                    .line_spacing(spacing(200, 100))
                    .add_run(body(title, BODY_SIZE).bold()),
            ),
            Block::Skill(line) => docx.add_paragraph(skill_line(line)),
        };
    }
    docx
}

fn skill_line(line: &SkillLine) -> Paragraph {
    let paragraph = Paragraph::new()
        .add_run(body(&format!("{}: ", line.label), BODY_SIZE).bold())
        .add_run(body(&line.joined_skills(), BODY_SIZE));
    if line.nested {
        paragraph
            .line_spacing(spacing(120, 0))
            .indent(Some(BULLET_INDENT), None, None, None)
    } else {
        paragraph
    }
}

fn employment(mut docx: Docx, entry: &EmploymentBlock) -> Docx {
    docx = docx
        .add_table(split_row(&entry.company, &entry.period))
        .add_table(split_row(&entry.role, &entry.location));

    for detail in &entry.details {
        let value = body(&format!(" {}", detail.value), BODY_SIZE);
        let value = if detail.emphasis { value.bold() } else { value };
        docx = docx.add_paragraph(
            Paragraph::new()
                .add_run(body(detail.label, BODY_SIZE).bold())
                .add_run(value),
        );
    }

    if !entry.client_projects.is_empty() {
        docx = docx.add_paragraph(label("Client Projects:"));
        for project in &entry.client_projects {
            docx = client_project(docx, project);
        }
    }

    if !entry.responsibilities.is_empty() {
        docx = docx.add_paragraph(label("Responsibilities"));
        docx = bullets(docx, &primary(&entry.responsibilities));
    }

    for group in &entry.groups {
        docx = docx.add_paragraph(label(&format!("{}:", group.title)));
        docx = bullets(docx, &primary(&group.items));
    }

    for (name, value) in [
        ("Key Technologies/Skills:", &entry.key_technologies),
        ("Environment:", &entry.environment),
    ] {
        if let Some(value) = value {
            docx = docx.add_paragraph(
                Paragraph::new()
                    .line_spacing(spacing(200, 0))
                    .add_run(body(name, BODY_SIZE).bold())
                    .add_run(body(&format!(" {value}"), BODY_SIZE)),
            );
        }
    }

    if !entry.achievements.is_empty() {
        docx = docx.add_paragraph(label("Achievements:"));
        docx = bullets(docx, &primary(&entry.achievements));
    }
    docx
}

fn client_project(mut docx: Docx, project: &ClientProjectBlock) -> Docx {
    docx = docx.add_paragraph(
        Paragraph::new()
            .line_spacing(spacing(120, 0))
            .add_run(body(&project.heading, NESTED_SIZE).bold()),
    );
    if let Some(period) = &project.duration {
        docx = docx.add_paragraph(
            Paragraph::new().add_run(body(&format!("Duration: {period}"), NESTED_SIZE).italic()),
        );
    }
    if let Some(description) = &project.description {
        docx = docx.add_paragraph(Paragraph::new().add_run(body(description, NESTED_SIZE)));
    }
    bullets(
        docx,
        &BulletList {
            level: BulletLevel::Nested,
            items: project.responsibilities.clone(),
        },
    )
}

fn bullets(docx: Docx, list: &BulletList) -> Docx {
    let (indent, size) = match list.level {
        BulletLevel::Primary => (BULLET_INDENT, BODY_SIZE),
        BulletLevel::Nested => (NESTED_BULLET_INDENT, NESTED_SIZE),
    };
    list.items.iter().fold(docx, |docx, item| {
        docx.add_paragraph(
            Paragraph::new()
                .numbering(
                    NumberingId::new(BULLET_NUMBERING),
                    IndentLevel::new(list.level.depth()),
                )
                .indent(
                    Some(indent),
                    Some(SpecialIndentType::Hanging(BULLET_HANGING)),
                    None,
                    None,
                )
                .add_run(body(item, size)),
        )
    })
}

fn primary(items: &[String]) -> BulletList {
    BulletList {
        level: BulletLevel::Primary,
        items: items.to_vec(),
    }
}

fn bullet_numbering() -> AbstractNumbering {
    let level = |depth: usize, glyph: &str, indent: i32| {
        Level::new(
            depth,
            Start::new(1),
            NumberFormat::new("bullet"),
            LevelText::new(glyph),
            LevelJc::new("left"),
        )
        .indent(
            Some(indent),
            Some(SpecialIndentType::Hanging(BULLET_HANGING)),
            None,
            None,
        )
    };
    AbstractNumbering::new(BULLET_NUMBERING)
        .add_level(level(0, "•", BULLET_INDENT))
        .add_level(level(1, "◦", NESTED_BULLET_INDENT))
}

// ────────────────────────────────────────────────────────────────────────────
// Tables
// ────────────────────────────────────────────────────────────────────────────

fn data_table(table: &TableBlock) -> Table {
    let mut rows = vec![header_row(table.columns)];
    rows.extend(table.rows.iter().map(|cells| {
        TableRow::new(
            cells
                .iter()
                .zip(table.columns)
                .map(|(text, column)| {
                    TableCell::new()
                        .width(column.width_dxa(), WidthType::Dxa)
                        .add_paragraph(centered(text))
                })
                .collect(),
        )
    }));
    grid_table(table.columns, rows)
}

fn placeholder_table(columns: &'static [Column]) -> Table {
    let placeholder = TableRow::new(vec![TableCell::new()
        .width(CONTENT_WIDTH, WidthType::Dxa)
        .grid_span(columns.len())
        .add_paragraph(centered(EMPTY_CELL))]);
    grid_table(columns, vec![header_row(columns), placeholder])
}

fn grid_table(columns: &[Column], rows: Vec<TableRow>) -> Table {
    Table::new(rows)
        .set_grid(columns.iter().map(Column::width_dxa).collect())
        .width(CONTENT_WIDTH, WidthType::Dxa)
}

fn header_row(columns: &[Column]) -> TableRow {
    TableRow::new(
        columns
            .iter()
            .map(|column| {
                let mut paragraph = Paragraph::new()
                    .align(AlignmentType::Center)
                    .add_run(table_header_run(column.title).bold());
                if let Some(hint) = column.hint {
                    paragraph = paragraph.add_run(table_header_run(hint));
                }
                TableCell::new()
                    .width(column.width_dxa(), WidthType::Dxa)
                    .shading(Shading::new().fill(HEADER_SHADING))
                    .vertical_align(VAlignType::Center)
                    .add_paragraph(paragraph)
            })
            .collect(),
    )
}

/// Borderless two-cell row: `left` in the first cell, `right` right-aligned.
fn split_row(left: &str, right: &str) -> Table {
    let half = CONTENT_WIDTH / 2;
    borderless(vec![TableRow::new(vec![
        TableCell::new()
            .width(half, WidthType::Dxa)
            .add_paragraph(Paragraph::new().add_run(accent(left, HEADING_SIZE))),
        TableCell::new().width(half, WidthType::Dxa).add_paragraph(
            Paragraph::new()
                .align(AlignmentType::Right)
                .add_run(accent(right, HEADING_SIZE)),
        ),
    ])])
}

fn borderless(rows: Vec<TableRow>) -> Table {
    let half = CONTENT_WIDTH / 2;
    Table::new(rows)
        .set_grid(vec![half, half])
        .width(CONTENT_WIDTH, WidthType::Dxa)
        .set_borders(TableBorders::new().clear_all())
}

// ────────────────────────────────────────────────────────────────────────────
// Runs
// ────────────────────────────────────────────────────────────────────────────

fn body(text: &str, size: usize) -> Run {
    Run::new()
        .add_text(text)
        .size(size)
        .color(BODY_COLOR)
        .fonts(RunFonts::new().ascii(BODY_FONT).hi_ansi(BODY_FONT))
}

fn accent(text: &str, size: usize) -> Run {
    Run::new()
        .add_text(text)
        .bold()
        .size(size)
        .color(ACCENT_COLOR)
        .fonts(RunFonts::new().ascii(BODY_FONT).hi_ansi(BODY_FONT))
}

fn table_header_run(text: &str) -> Run {
    Run::new()
        .add_text(text)
        .size(TABLE_HEADER_SIZE)
        .color(BODY_COLOR)
        .fonts(RunFonts::new().ascii(TABLE_HEADER_FONT).hi_ansi(TABLE_HEADER_FONT))
}

fn centered(text: &str) -> Paragraph {
    Paragraph::new()
        .align(AlignmentType::Center)
        .add_run(Run::new().add_text(text))
}

fn label(text: &str) -> Paragraph {
    Paragraph::new()
        .line_spacing(spacing(200, 0))
        .add_run(body(text, BODY_SIZE).bold())
}

fn plain_line(text: &str) -> Paragraph {
    Paragraph::new().add_run(body(text, BODY_SIZE))
}

fn spacing(before: u32, after: u32) -> LineSpacing {
    let spacing = LineSpacing::new().before(before);
    if after > 0 {
        spacing.after(after)
    } else {
        spacing
    }
}
