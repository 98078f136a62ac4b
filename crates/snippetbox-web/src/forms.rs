//! Snippet creation form and its validation rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Maximum title length in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// Accepted expiry periods, in days.
pub const EXPIRY_CHOICES: [i64; 3] = [1, 7, 365];

/// Expiry preselected on a blank form.
pub const DEFAULT_EXPIRES: i64 = 365;

/// Raw fields from a `application/x-www-form-urlencoded` submission.
///
/// Missing fields deserialize as empty strings. `expires` stays textual here;
/// the handler decides whether it is an integer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnippetCreateInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub expires: String,
}

/// Snippet creation form as shown to and submitted by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnippetCreateForm {
    pub title: String,
    pub content: String,
    pub expires: i64,
    /// Field name to human readable message.
    pub field_errors: BTreeMap<String, String>,
}

impl Default for SnippetCreateForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            expires: DEFAULT_EXPIRES,
            field_errors: BTreeMap::new(),
        }
    }
}

impl SnippetCreateForm {
    /// Build a form from submitted values and check every rule.
    ///
    /// Rules are independent; all violations are reported together.
    pub fn validate(title: String, content: String, expires: i64) -> Self {
        let mut field_errors = BTreeMap::new();

        if title.trim().is_empty() {
            field_errors.insert("title".to_string(), "This field cannot be blank".to_string());
        } else if title.chars().count() > MAX_TITLE_CHARS {
            field_errors.insert(
                "title".to_string(),
                format!("This field cannot contain more than {MAX_TITLE_CHARS} characters"),
            );
        }

        if content.trim().is_empty() {
            field_errors.insert(
                "content".to_string(),
                "This field cannot be blank".to_string(),
            );
        }

        if !EXPIRY_CHOICES.contains(&expires) {
            field_errors.insert(
                "expires".to_string(),
                "This field must equal 1, 7, or 365".to_string(),
            );
        }

        Self {
            title,
            content,
            expires,
            field_errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty()
    }
}
