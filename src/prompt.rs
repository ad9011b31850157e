use crate::error::{PipelineError, Result};
use crate::types::Variables;

/// Render a template, replacing `{name}` placeholders with values from
/// `variables`.
///
/// Substitution is a single left-to-right pass: inserted values are never
/// rescanned, so generated text containing braces passes through untouched.
/// Braces that do not enclose a valid name (ASCII letters, digits, `_`) are
/// copied literally.
pub fn render(template: &str, variables: &Variables) -> Result<String> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match placeholder_at(after) {
            Some(name) => {
                let value = variables
                    .get(name)
                    .ok_or_else(|| PipelineError::MissingVariable {
                        variable: name.to_string(),
                    })?;
                rendered.push_str(value);
                rest = &after[name.len() + 1..];
            }
            None => {
                rendered.push('{');
                rest = after;
            }
        }
    }

    rendered.push_str(rest);
    Ok(rendered)
}

/// Distinct placeholder names in `template`, in order of first appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match placeholder_at(after) {
            Some(name) => {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
                rest = &after[name.len() + 1..];
            }
            None => rest = after,
        }
    }

    names
}

/// If `text` starts with `name}`, return `name`.
fn placeholder_at(text: &str) -> Option<&str> {
    let end = text.find('}')?;
    let name = &text[..end];
    let valid = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_');
    valid.then_some(name)
}

/// Create a numbered list from items (1-indexed).
pub fn numbered_list(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic() {
        let vars = Variables::new()
            .insert("name", "Alice")
            .insert("topic", "data");
        let result = render("Hello {name}, write about {topic}", &vars).unwrap();
        assert_eq!(result, "Hello Alice, write about data");
    }

    #[test]
    fn test_render_no_placeholders() {
        let result = render("static prompt", &Variables::new()).unwrap();
        assert_eq!(result, "static prompt");
    }

    #[test]
    fn test_render_repeated_placeholder() {
        let vars = Variables::new().insert("x", "1");
        assert_eq!(render("{x}+{x}", &vars).unwrap(), "1+1");
    }

    #[test]
    fn test_render_missing_variable() {
        let vars = Variables::new().insert("name", "Bob");
        match render("{name} and {missing}", &vars) {
            Err(PipelineError::MissingVariable { variable }) => assert_eq!(variable, "missing"),
            other => panic!("Expected MissingVariable, got {:?}", other),
        }
    }

    #[test]
    fn test_render_values_are_not_rescanned() {
        let vars = Variables::new()
            .insert("post", "use {topic} here")
            .insert("topic", "rust");
        let result = render("Post: {post}", &vars).unwrap();
        assert_eq!(result, "Post: use {topic} here");
    }

    #[test]
    fn test_render_leaves_non_placeholder_braces() {
        let vars = Variables::new().insert("k", "v");
        let result = render("json {\"a\": 1} {} { k } {k}", &vars).unwrap();
        assert_eq!(result, "json {\"a\": 1} {} { k } v");
    }

    #[test]
    fn test_render_unclosed_brace() {
        let vars = Variables::new().insert("k", "v");
        assert_eq!(render("{k} {open", &vars).unwrap(), "v {open");
    }

    #[test]
    fn test_render_multibyte_text() {
        let vars = Variables::new().insert("topic", "путешествия");
        let result = render("Тема: {topic} - ok", &vars).unwrap();
        assert_eq!(result, "Тема: путешествия - ok");
    }

    #[test]
    fn test_placeholders_order_and_dedup() {
        let names = placeholders("{blog_post} then {style}, again {blog_post} {not valid}");
        assert_eq!(names, vec!["blog_post".to_string(), "style".to_string()]);
    }

    #[test]
    fn test_numbered_list() {
        let items = vec![
            "First".to_string(),
            "Second".to_string(),
            "Third".to_string(),
        ];
        let result = numbered_list(&items);
        assert_eq!(result, "1. First\n2. Second\n3. Third");
    }

    #[test]
    fn test_numbered_list_empty() {
        let result = numbered_list(&[]);
        assert_eq!(result, "");
    }
}
