// Formatting constants shared by the document and preview serializers.
// Sizes are in half-points, spacing and indents in twentieths of a point.

pub const ACCENT_COLOR: &str = "0F3E78";
pub const BODY_COLOR: &str = "000000";
pub const HEADER_SHADING: &str = "D1D5DB";

pub const BODY_FONT: &str = "Calibri";
pub const TABLE_HEADER_FONT: &str = "Arial";

/// Half an inch on every side.
pub const PAGE_MARGIN: i32 = 720;
/// Letter width minus both margins, in dxa.
pub const CONTENT_WIDTH: usize = 10_800;

pub const NAME_SIZE: usize = 36;
pub const HEADING_SIZE: usize = 28;
pub const BODY_SIZE: usize = 22;
pub const NESTED_SIZE: usize = 20;
pub const TABLE_HEADER_SIZE: usize = 20;

pub const BULLET_INDENT: i32 = 350;
pub const NESTED_BULLET_INDENT: i32 = 450;
pub const REQUISITION_VALUE_INDENT: i32 = 1200;

// ────────────────────────────────────────────────────────────────────────────
// Fallback text
// ────────────────────────────────────────────────────────────────────────────

pub const FALLBACK_NAME: &str = "Full Name";
pub const FALLBACK_COMPANY: &str = "Company";
pub const FALLBACK_ROLE: &str = "Role";
pub const FALLBACK_CLIENT_PROJECT: &str = "Client Project";
pub const FALLBACK_CATEGORY: &str = "Category";
pub const FALLBACK_SUBCATEGORY: &str = "Subcategory";
pub const FALLBACK_FILE_STEM: &str = "Resume";

pub const EMPTY_CELL: &str = "-";
pub const NO_EMPLOYMENT: &str = "No employment history";
pub const NO_SKILLS: &str = "No skills provided";

pub const TITLE_LABEL: &str = "Title/Role: ";
pub const REQUISITION_LABEL: &str = "VectorVMS Requisition Number: ";

// ────────────────────────────────────────────────────────────────────────────
// Table columns
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub title: &'static str,
    /// Non-bold suffix run, e.g. " (MM/YY)".
    pub hint: Option<&'static str>,
    pub width_pct: usize,
}

impl Column {
    const fn new(title: &'static str, hint: Option<&'static str>, width_pct: usize) -> Self {
        Self {
            title,
            hint,
            width_pct,
        }
    }

    pub fn width_dxa(&self) -> usize {
        CONTENT_WIDTH * self.width_pct / 100
    }

    /// Title and hint as one line.
    pub fn label(&self) -> String {
        format!("{}{}", self.title, self.hint.unwrap_or_default())
    }
}

pub const EDUCATION_COLUMNS: &[Column] = &[
    Column::new("Degree", Some(" (AA/AS, BA/BS, MA/MS/MBA, PhD, JD)"), 15),
    Column::new("Area of Study", None, 15),
    Column::new("School/College/University", None, 20),
    Column::new("Location", None, 15),
    Column::new("Was the degree awarded?", Some(" (Yes/No)"), 15),
    Column::new("OPTIONAL: Date", Some(" (MM/YY)"), 20),
];

pub const CERTIFICATION_COLUMNS: &[Column] = &[
    Column::new("Certification", None, 25),
    Column::new("Issued By", None, 20),
    Column::new("Date Obtained", Some(" (MM/YY)"), 15),
    Column::new("Certification Number", Some(" (If Applicable)"), 20),
    Column::new("Expiration Date", Some(" (If Applicable)"), 20),
];
