use serde::Deserialize;

/// Extract the first balanced top-level JSON object embedded in `text`.
/// Handles objects wrapped in surrounding prose and braces inside string
/// literals.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strip markdown code fences from a model response.
pub fn strip_code_fences(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Fields AI models sometimes emit as a bare string and sometimes as an
/// array. Normalized to a list exactly once, at parse time.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_from_surrounding_prose() {
        let text = r#"Here is the data: {"entities":[],"summary":"x"} hope that helps!"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"entities":[],"summary":"x"}"#)
        );
    }

    #[test]
    fn handles_nested_objects() {
        let text = r#"prefix {"a": {"b": {"c": 1}}, "d": 2} suffix"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"a": {"b": {"c": 1}}, "d": 2}"#)
        );
    }

    #[test]
    fn braces_inside_strings_do_not_confuse_the_scanner() {
        let text = r#"{"note": "a } inside \" a string {", "n": 1}"#;
        let extracted = extract_json_object(text).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(extracted).unwrap();
        assert_eq!(parsed["n"], 1);
    }

    #[test]
    fn returns_none_without_an_object() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("unbalanced { object"), None);
    }

    #[test]
    fn strips_code_fences() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("{}"), "{}");
    }

    #[test]
    fn one_or_many_normalizes_both_shapes() {
        let one: OneOrMany<String> = serde_json::from_str(r#""signal""#).unwrap();
        assert_eq!(one.into_vec(), vec!["signal".to_string()]);

        let many: OneOrMany<String> = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(many.into_vec(), vec!["a".to_string(), "b".to_string()]);

        let default: OneOrMany<String> = OneOrMany::default();
        assert!(default.into_vec().is_empty());
    }
}
