pub mod missing_points;
pub mod resume;

pub use missing_points::{MissingPointsCounts, MissingPointsReport};
pub use resume::{
    CertificationEntry, ClientProject, EducationEntry, EmploymentEntry, ResumeRecord,
    SkillCategory, SkillSubcategory, Subsection, TokenStats,
};
