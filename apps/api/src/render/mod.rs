// Rendering: one shared layout pass, serialized to a DOCX artifact or a preview tree.

pub mod docx;
pub mod handlers;
pub mod layout;
pub mod preview;
pub mod style;
