//! Record edits: index-addressed replace, insert and remove on a `ResumeRecord`.
//!
//! Edits are pure: `apply_edit` takes the current record by reference and
//! returns a new one. Paths are JSON pointers into the record's wire shape
//! (`/employmentHistory/0/responsibilities/2`, `/technicalSkills/Cloud`).
//!
//! Every result is re-read through the typed model, so an edit that would break
//! a model invariant (a bare-string `responsibilities`, an unknown field) is
//! rejected instead of stored. Partial entries such as `{}` are completed with
//! defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::{ResumeRecord, SkillCategory};

/// Top-level fields the editor may not touch: the missing-points carrier and
/// token stats come from ingestion, and the legacy `subsections` mirror is
/// resolved once by the normalizer.
const READ_ONLY_FIELDS: &[&str] = &["missingPoints", "tokenStats", "subsections"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RecordEdit {
    /// Replace the value at `path`. Creates the key when the parent is a map.
    Set { path: String, value: Value },
    /// Insert into the list at `path`; appends when `index` is absent.
    Insert {
        path: String,
        #[serde(default)]
        index: Option<usize>,
        value: Value,
    },
    /// Remove a list element by index or a map entry by key.
    Remove { path: String },
    /// Create an empty skill category. `nested` selects the hierarchical format.
    AddSkillCategory {
        name: String,
        #[serde(default)]
        nested: bool,
    },
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error("invalid path '{0}': paths are JSON pointers such as /employmentHistory/0")]
    InvalidPath(String),

    #[error("path '{0}' does not exist")]
    PathNotFound(String),

    #[error("'{0}' is read-only")]
    ReadOnly(String),

    #[error("'{0}' is not a list")]
    NotAList(String),

    #[error("index {index} is out of bounds for '{path}' (length {len})")]
    OutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("edit at '{path}' does not fit the record shape: {reason}")]
    Shape { path: String, reason: String },

    #[error("skill category name cannot be blank")]
    BlankCategory,

    #[error("skill category '{0}' already exists")]
    DuplicateCategory(String),
}

/// Applies a single edit, returning the edited copy.
pub fn apply_edit(record: &ResumeRecord, edit: &RecordEdit) -> Result<ResumeRecord, EditError> {
    match edit {
        RecordEdit::AddSkillCategory { name, nested } => add_skill_category(record, name, *nested),
        RecordEdit::Set { path, value } => {
            let mut tree = to_tree(record, path)?;
            set(&mut tree, path, value.clone())?;
            from_tree(tree, path).map(|(next, _)| next)
        }
        RecordEdit::Insert { path, index, value } => {
            let mut tree = to_tree(record, path)?;
            insert(&mut tree, path, *index, value.clone())?;
            from_tree(tree, path).map(|(next, _)| next)
        }
        RecordEdit::Remove { path } => {
            let mut tree = to_tree(record, path)?;
            let removed_key = remove(&mut tree, path)?;
            let (next, rebuilt) = from_tree(tree, path)?;
            // A struct field comes back defaulted; only map entries really go away.
            if removed_key && rebuilt.pointer(path).is_some() {
                return Err(EditError::Shape {
                    path: path.clone(),
                    reason: "a record field cannot be removed".to_string(),
                });
            }
            Ok(next)
        }
    }
}

/// Applies edits in order. Either all apply or the error of the first failing
/// edit is returned.
pub fn apply_edits(record: &ResumeRecord, edits: &[RecordEdit]) -> Result<ResumeRecord, EditError> {
    edits
        .iter()
        .try_fold(record.clone(), |current, edit| apply_edit(&current, edit))
}

// ────────────────────────────────────────────────────────────────────────────
// Pointer operations
// ────────────────────────────────────────────────────────────────────────────

fn set(tree: &mut Value, path: &str, value: Value) -> Result<(), EditError> {
    let (parent_path, key) = split_parent(path)?;
    match parent_mut(tree, parent_path)? {
        Value::Object(map) => {
            map.insert(key, value);
            Ok(())
        }
        Value::Array(items) => {
            let index = parse_index(&key, path)?;
            let len = items.len();
            let slot = items.get_mut(index).ok_or_else(|| EditError::OutOfBounds {
                path: parent_path.to_string(),
                index,
                len,
            })?;
            *slot = value;
            Ok(())
        }
        _ => Err(EditError::PathNotFound(path.to_string())),
    }
}

fn insert(
    tree: &mut Value,
    path: &str,
    index: Option<usize>,
    value: Value,
) -> Result<(), EditError> {
    let target = tree
        .pointer_mut(path)
        .ok_or_else(|| EditError::PathNotFound(path.to_string()))?;
    let items = target
        .as_array_mut()
        .ok_or_else(|| EditError::NotAList(path.to_string()))?;

    let len = items.len();
    match index {
        Some(index) if index > len => Err(EditError::OutOfBounds {
            path: path.to_string(),
            index,
            len,
        }),
        Some(index) => {
            items.insert(index, value);
            Ok(())
        }
        None => {
            items.push(value);
            Ok(())
        }
    }
}

/// Returns true when a map key (rather than a list element) was removed.
fn remove(tree: &mut Value, path: &str) -> Result<bool, EditError> {
    let (parent_path, key) = split_parent(path)?;
    match parent_mut(tree, parent_path)? {
        Value::Object(map) => map
            .shift_remove(&key)
            .map(|_| true)
            .ok_or_else(|| EditError::PathNotFound(path.to_string())),
        Value::Array(items) => {
            let index = parse_index(&key, path)?;
            if index >= items.len() {
                return Err(EditError::OutOfBounds {
                    path: parent_path.to_string(),
                    index,
                    len: items.len(),
                });
            }
            items.remove(index);
            Ok(false)
        }
        _ => Err(EditError::PathNotFound(path.to_string())),
    }
}

fn parent_mut<'a>(tree: &'a mut Value, parent_path: &str) -> Result<&'a mut Value, EditError> {
    tree.pointer_mut(parent_path)
        .ok_or_else(|| EditError::PathNotFound(parent_path.to_string()))
}

/// Splits `/a/b/c` into (`/a/b`, `c`), unescaping the last token.
fn split_parent(path: &str) -> Result<(&str, String), EditError> {
    let (parent, token) = path
        .rsplit_once('/')
        .filter(|(_, token)| !token.is_empty())
        .ok_or_else(|| EditError::InvalidPath(path.to_string()))?;
    Ok((parent, token.replace("~1", "/").replace("~0", "~")))
}

fn parse_index(token: &str, path: &str) -> Result<usize, EditError> {
    token
        .parse::<usize>()
        .map_err(|_| EditError::InvalidPath(path.to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Typed round trip
// ────────────────────────────────────────────────────────────────────────────

fn to_tree(record: &ResumeRecord, path: &str) -> Result<Value, EditError> {
    if !path.starts_with('/') || path.len() < 2 {
        return Err(EditError::InvalidPath(path.to_string()));
    }
    let field = path[1..].split('/').next().unwrap_or_default();
    if READ_ONLY_FIELDS.contains(&field) {
        return Err(EditError::ReadOnly(format!("/{field}")));
    }
    serde_json::to_value(record).map_err(|e| shape_error(path, e))
}

/// Reads the edited tree back as a record. Missing fields may be filled with
/// defaults, but every value in the tree must survive the typed round trip, so
/// unknown keys and mistyped values are rejected.
fn from_tree(tree: Value, path: &str) -> Result<(ResumeRecord, Value), EditError> {
    let record: ResumeRecord =
        serde_json::from_value(tree.clone()).map_err(|e| shape_error(path, e))?;
    let rebuilt = serde_json::to_value(&record).map_err(|e| shape_error(path, e))?;
    if !covers(&rebuilt, &tree) {
        return Err(EditError::Shape {
            path: path.to_string(),
            reason: "the result contains fields a résumé record does not have".to_string(),
        });
    }
    Ok((record, rebuilt))
}

/// True when every value in `partial` appears at the same place in `full`.
fn covers(full: &Value, partial: &Value) -> bool {
    match (full, partial) {
        (Value::Object(full), Value::Object(partial)) => partial
            .iter()
            .all(|(key, value)| full.get(key).is_some_and(|f| covers(f, value))),
        (Value::Array(full), Value::Array(partial)) => {
            full.len() == partial.len() && full.iter().zip(partial).all(|(f, p)| covers(f, p))
        }
        _ => full == partial,
    }
}

fn shape_error(path: &str, e: serde_json::Error) -> EditError {
    EditError::Shape {
        path: path.to_string(),
        reason: e.to_string(),
    }
}

fn add_skill_category(
    record: &ResumeRecord,
    name: &str,
    nested: bool,
) -> Result<ResumeRecord, EditError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EditError::BlankCategory);
    }

    let mut next = record.clone();
    if nested {
        next.skill_categories.push(SkillCategory {
            category_name: name.to_string(),
            ..Default::default()
        });
    } else {
        if next.technical_skills.contains_key(name) {
            return Err(EditError::DuplicateCategory(name.to_string()));
        }
        next.technical_skills.insert(name.to_string(), Vec::new());
    }
    Ok(next)
}
