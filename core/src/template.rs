//! Placeholder substitution for resource templates.
//!
//! A template is plain text with `{{ name }}` placeholders. Rendering
//! replaces every placeholder with the value bound to `name`; there are no
//! filters, conditionals or loops. Whitespace inside the braces is ignored.
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeMap;
//! use etcd_schema_core::render;
//!
//! let mut values = BTreeMap::new();
//! values.insert("hostname".to_string(), "web1".to_string());
//! values.insert("ip".to_string(), "10.0.0.5".to_string());
//!
//! let text = render("/hosts/{{ hostname }}/ip: {{ip}}\n", &values).unwrap();
//! assert_eq!(text, "/hosts/web1/ip: 10.0.0.5\n");
//! ```

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(.*?)\}\}").expect("static regex must compile"));
static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_.-]*$").expect("static regex must compile")
});

/// Values available to a template, keyed by placeholder name.
pub type Values = BTreeMap<String, String>;

/// Template rendering failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A placeholder names a value that was not supplied.
    #[error("line {line}: undefined value '{name}'")]
    UndefinedValue { name: String, line: usize },
    /// The text between the braces is not a name.
    #[error("line {line}: invalid placeholder '{{{{{text}}}}}'")]
    InvalidPlaceholder { text: String, line: usize },
    /// `{{` without a closing `}}` on the same line.
    #[error("line {line}: unterminated placeholder")]
    Unterminated { line: usize },
}

/// Fills every placeholder in `template` from `values`.
///
/// # Errors
///
/// Fails on the first placeholder that is malformed, unterminated or bound
/// to no value. Nothing is returned on failure.
pub fn render(template: &str, values: &Values) -> Result<String, RenderError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER_RE.captures_iter(template) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_literal(&mut out, template, last, whole.start())?;

        let line = line_of(template, whole.start());
        let name = inner.as_str().trim();
        if !NAME_RE.is_match(name) {
            return Err(RenderError::InvalidPlaceholder {
                text: inner.as_str().to_string(),
                line,
            });
        }
        let value = values.get(name).ok_or_else(|| RenderError::UndefinedValue {
            name: name.to_string(),
            line,
        })?;
        out.push_str(value);
        last = whole.end();
    }

    push_literal(&mut out, template, last, template.len())?;
    Ok(out)
}

fn push_literal(
    out: &mut String,
    template: &str,
    start: usize,
    end: usize,
) -> Result<(), RenderError> {
    let literal = &template[start..end];
    if let Some(pos) = literal.find("{{") {
        return Err(RenderError::Unterminated {
            line: line_of(template, start + pos),
        });
    }
    out.push_str(literal);
    Ok(())
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}
