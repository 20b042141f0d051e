use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::SqlScriptError;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^${}]+)\}").expect("placeholder pattern is valid"));

/// Substitute `${name}` placeholders in script text.
///
/// Returns the input borrowed and unchanged when `properties` is absent or no
/// placeholder occurs. A placeholder referencing an undefined name fails the
/// task instead of passing through silently; a script with an unresolved
/// value must never reach the database.
///
/// # Errors
///
/// Returns `SqlScriptError::ConfigError` naming the first undefined
/// placeholder.
pub fn expand<'a>(
    text: &'a str,
    properties: Option<&HashMap<String, String>>,
) -> Result<Cow<'a, str>, SqlScriptError> {
    let Some(properties) = properties else {
        return Ok(Cow::Borrowed(text));
    };

    let mut out: Option<String> = None;
    let mut last = 0;
    for found in PLACEHOLDER.find_iter(text) {
        let name = &text[found.start() + 2..found.end() - 1];
        let Some(value) = properties.get(name) else {
            return Err(SqlScriptError::ConfigError(format!(
                "undefined property '${{{name}}}' in SQL script"
            )));
        };
        let buf = out.get_or_insert_with(|| String::with_capacity(text.len()));
        buf.push_str(&text[last..found.start()]);
        buf.push_str(value);
        last = found.end();
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&text[last..]);
            Ok(Cow::Owned(buf))
        }
        None => Ok(Cow::Borrowed(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn replaces_placeholders() {
        let properties = props(&[("x", "1"), ("table", "users")]);
        let res = expand("SELECT ${x} FROM ${table}", Some(&properties)).unwrap();
        assert_eq!(res, "SELECT 1 FROM users");
    }

    #[test]
    fn borrows_when_nothing_to_do() {
        let properties = props(&[("x", "1")]);
        let res = expand("SELECT 1", Some(&properties)).unwrap();
        assert!(matches!(res, Cow::Borrowed(_)));

        let res = expand("SELECT ${x}", None).unwrap();
        assert!(matches!(res, Cow::Borrowed(_)));
        assert_eq!(res, "SELECT ${x}");
    }

    #[test]
    fn undefined_placeholder_fails_fast() {
        let properties = props(&[("x", "1")]);
        let err = expand("SELECT ${y}", Some(&properties)).unwrap_err();
        match err {
            SqlScriptError::ConfigError(msg) => assert!(msg.contains("${y}")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn repeated_placeholders_all_expand() {
        let properties = props(&[("id", "7")]);
        let res = expand("SELECT ${id}, ${id}", Some(&properties)).unwrap();
        assert_eq!(res, "SELECT 7, 7");
    }
}
