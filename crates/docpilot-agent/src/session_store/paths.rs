//! Document path allocation.

use std::path::{Path, PathBuf};

use docpilot_models::DocType;

/// Maximum length of a title slug.
pub const MAX_SLUG_LEN: usize = 48;

/// `<docs_dir>/<doc_type>/<title-slug>-<suffix>.md`
pub fn document_path(docs_dir: &Path, doc_type: DocType, title: &str, suffix: &str) -> PathBuf {
    docs_dir
        .join(doc_type.as_str())
        .join(format!("{}-{}.md", slugify(title), suffix))
}

/// Lowercase ASCII slug with single dashes, at most [`MAX_SLUG_LEN`] chars.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len().min(MAX_SLUG_LEN));
    let mut pending_dash = false;

    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }

    slug.truncate(MAX_SLUG_LEN);
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}
