//! Helpers for pulling structured pieces out of free-form model text.

/// Removes a surrounding Markdown code fence, if the whole text is fenced.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "markdown", ...) on the opening line
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Returns the first balanced `{ ... }` object in `text`.
///
/// Braces inside JSON strings are ignored.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Returns the trimmed content between `<tag>` and `</tag>`.
pub fn extract_tag<'a>(text: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = text.find(&open)? + open.len();
    let end = text[start..].find(&close).map_or(text.len(), |idx| start + idx);
    Some(text[start..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\nbody\n```"), "body");
        assert_eq!(strip_code_fences("  plain  "), "plain");
    }

    #[test]
    fn test_extract_json_object_with_commentary() {
        let text = "Sure! Here is the decision: {\"action\": \"continue_doc\", \"reason\": \"uses {braces}\"} hope that helps";
        assert_eq!(
            extract_json_object(text),
            Some("{\"action\": \"continue_doc\", \"reason\": \"uses {braces}\"}")
        );
    }

    #[test]
    fn test_extract_json_object_nested_and_unbalanced() {
        assert_eq!(extract_json_object("{\"a\": {\"b\": 1}}"), Some("{\"a\": {\"b\": 1}}"));
        assert_eq!(extract_json_object("{\"a\": 1"), None);
        assert_eq!(extract_json_object("no json here"), None);
    }

    #[test]
    fn test_extract_tag() {
        let text = "<document>\n# Title\n</document>\n<question>Who?</question>";
        assert_eq!(extract_tag(text, "document"), Some("# Title"));
        assert_eq!(extract_tag(text, "question"), Some("Who?"));
        assert_eq!(extract_tag(text, "missing"), None);
        // Unterminated tags run to the end of the text
        assert_eq!(extract_tag("<question> Why? ", "question"), Some("Why?"));
    }
}
