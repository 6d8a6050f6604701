//! The [`Template`] entity: a named, parameterized prompt definition.
//!
//! ## Placeholders
//!
//! A prompt contains named slots written as `{key}`. The same key may appear
//! any number of times. Literal braces are written doubled (`{{` and `}}`),
//! and an unterminated `{` is kept as literal text.
//!
//! ```text
//! "beautiful {landscape_type} landscape, {time_of_day}"
//!            ^^^^^^^^^^^^^^^^            ^^^^^^^^^^^^^
//! ```
//!
//! ## Records
//!
//! On disk a template is a flat JSON object. `name`, `description` and
//! `prompt` are required; everything else falls back to its default when
//! absent or `null`:
//!
//! | Field | Default |
//! |---|---|
//! | `negative_prompt` | `""` |
//! | `style` | `"general"` |
//! | `parameters` | `{}` |
//! | `tags` | `[]` |

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Style assigned to templates that don't declare one.
pub const DEFAULT_STYLE: &str = "general";

/// Fields a record must carry to be accepted.
const REQUIRED_FIELDS: &[&str] = &["name", "description", "prompt"];

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Missing required template variable: {0}")]
    MissingVariable(String),
    #[error("Invalid template record: {0}")]
    InvalidRecord(String),
    #[error("Failed to persist template record {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single generation-parameter override.
///
/// Records store these as plain JSON numbers or strings. Integers stay
/// integers so `num_inference_steps = 30` round-trips as `30`, not `30.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Parse a CLI-style value: integer, then float, then free text.
    pub fn parse(raw: &str) -> Self {
        if let Ok(i) = raw.parse::<i64>() {
            ParamValue::Integer(i)
        } else if let Ok(f) = raw.parse::<f64>() {
            ParamValue::Float(f)
        } else {
            ParamValue::Text(raw.to_string())
        }
    }

    /// Numeric view of the value. Text yields `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Integer(i) => Some(*i as f64),
            ParamValue::Float(f) => Some(*f),
            ParamValue::Text(_) => None,
        }
    }

}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Integer(i) => write!(f, "{i}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

/// Parameter overrides keyed by name. Ordered so records serialize stably.
pub type Parameters = BTreeMap<String, ParamValue>;

fn default_style() -> String {
    DEFAULT_STYLE.to_string()
}

/// A reusable prompt definition with generation hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Unique key within a store.
    pub name: String,
    pub description: String,
    /// Prompt text with `{key}` placeholders.
    pub prompt: String,
    #[serde(default)]
    pub negative_prompt: String,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default)]
    pub parameters: Parameters,
    /// Display order is preserved; matching ignores order.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Template {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            prompt: prompt.into(),
            negative_prompt: String::new(),
            style: default_style(),
            parameters: Parameters::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = negative_prompt.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Distinct placeholder keys, in order of first appearance.
    pub fn placeholders(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for segment in parse_segments(&self.prompt) {
            if let Segment::Placeholder(key) = segment
                && !keys.iter().any(|k| k == key)
            {
                keys.push(key.to_string());
            }
        }
        keys
    }

    /// Substitute every `{key}` in the prompt.
    ///
    /// Every placeholder is checked; the first one without a value is
    /// reported as [`TemplateError::MissingVariable`]. Extra entries in
    /// `variables` are ignored.
    pub fn format_prompt(&self, variables: &HashMap<String, String>) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.prompt.len());
        for segment in parse_segments(&self.prompt) {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Escaped(c) => out.push(c),
                Segment::Placeholder(key) => match variables.get(key) {
                    Some(value) => out.push_str(value),
                    None => return Err(TemplateError::MissingVariable(key.to_string())),
                },
            }
        }
        Ok(out)
    }

    /// Flat record used for persistence.
    pub fn to_record(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "prompt": self.prompt,
            "negative_prompt": self.negative_prompt,
            "style": self.style,
            "parameters": self.parameters,
            "tags": self.tags,
        })
    }

    /// Rebuild a template from a record.
    ///
    /// Fails with [`TemplateError::InvalidRecord`] when the record is not an
    /// object, a required field is absent, or a field has the wrong type.
    pub fn from_record(record: &serde_json::Value) -> Result<Self, TemplateError> {
        let object = record
            .as_object()
            .ok_or_else(|| TemplateError::InvalidRecord("record is not a JSON object".into()))?;

        for field in REQUIRED_FIELDS {
            match object.get(*field) {
                None | Some(serde_json::Value::Null) => {
                    return Err(TemplateError::InvalidRecord(format!(
                        "missing required field '{field}'"
                    )));
                }
                Some(_) => {}
            }
        }

        // Nulls in optional fields mean "use the default".
        let cleaned: serde_json::Map<String, serde_json::Value> = object
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let template: Template = serde_json::from_value(serde_json::Value::Object(cleaned))
            .map_err(|e| TemplateError::InvalidRecord(e.to_string()))?;

        validate_name(&template.name)?;
        Ok(template)
    }
}

/// A name must work as a single file name: non-empty, no path separators,
/// no `..` and no leading `.`.
pub fn validate_name(name: &str) -> Result<(), TemplateError> {
    let problem = if name.trim().is_empty() {
        "must not be empty"
    } else if name.contains(['/', '\\', '\0']) {
        "must not contain path separators"
    } else if name.contains("..") {
        "must not contain '..'"
    } else if name.starts_with('.') {
        "must not start with '.'"
    } else {
        return Ok(());
    };
    Err(TemplateError::InvalidRecord(format!("name '{name}' {problem}")))
}

/// One lexical piece of a prompt.
#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Literal(&'a str),
    /// `{{` or `}}` collapsed to a single brace.
    Escaped(char),
    Placeholder(&'a str),
}

fn parse_segments(prompt: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let bytes = prompt.as_bytes();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' | b'}' if bytes.get(i + 1) == Some(&bytes[i]) => {
                if literal_start < i {
                    segments.push(Segment::Literal(&prompt[literal_start..i]));
                }
                segments.push(Segment::Escaped(bytes[i] as char));
                i += 2;
                literal_start = i;
            }
            b'{' => match prompt[i + 1..].find(['{', '}']) {
                Some(offset) if bytes[i + 1 + offset] == b'}' => {
                    if literal_start < i {
                        segments.push(Segment::Literal(&prompt[literal_start..i]));
                    }
                    let end = i + 1 + offset;
                    segments.push(Segment::Placeholder(&prompt[i + 1..end]));
                    i = end + 1;
                    literal_start = i;
                }
                _ => i += 1,
            },
            _ => i += 1,
        }
    }

    if literal_start < prompt.len() {
        segments.push(Segment::Literal(&prompt[literal_start..]));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn sample() -> Template {
        Template::new("sample", "A sample", "photo of {subject} at {place}")
            .with_negative_prompt("blurry")
            .with_style("realistic")
            .with_tags(["photo", "test"])
            .with_parameter("guidance_scale", 7.5)
            .with_parameter("num_inference_steps", 30i64)
            .with_parameter("scheduler", "ddim")
    }

    #[test]
    fn new_uses_defaults() {
        let t = Template::new("a", "b", "c");
        assert_eq!(t.negative_prompt, "");
        assert_eq!(t.style, "general");
        assert!(t.parameters.is_empty());
        assert!(t.tags.is_empty());
    }

    #[test]
    fn format_substitutes_all_placeholders() {
        let out = sample()
            .format_prompt(&vars(&[("subject", "a cat"), ("place", "dusk")]))
            .unwrap();
        assert_eq!(out, "photo of a cat at dusk");
        assert!(!out.contains('{'));
    }

    #[test]
    fn format_repeated_placeholder() {
        let t = Template::new("r", "", "{x} and {x} again");
        let out = t.format_prompt(&vars(&[("x", "echo")])).unwrap();
        assert_eq!(out, "echo and echo again");
    }

    #[test]
    fn format_ignores_unused_variables() {
        let out = sample()
            .format_prompt(&vars(&[("subject", "s"), ("place", "p"), ("extra", "e")]))
            .unwrap();
        assert_eq!(out, "photo of s at p");
    }

    #[test]
    fn format_reports_missing_variable() {
        let err = sample()
            .format_prompt(&vars(&[("subject", "a cat")]))
            .unwrap_err();
        assert!(matches!(err, TemplateError::MissingVariable(k) if k == "place"));
    }

    #[test]
    fn format_reports_first_missing_in_prompt_order() {
        let err = sample().format_prompt(&HashMap::new()).unwrap_err();
        assert!(matches!(err, TemplateError::MissingVariable(k) if k == "subject"));
    }

    #[test]
    fn format_handles_escaped_braces() {
        let t = Template::new("e", "", "{{literal}} {x}");
        let out = t.format_prompt(&vars(&[("x", "v")])).unwrap();
        assert_eq!(out, "{literal} v");
    }

    #[test]
    fn unterminated_brace_is_literal() {
        let t = Template::new("u", "", "open { brace {x}");
        // "{ brace {x}" - the first brace hits another '{' before '}' and stays literal
        let out = t.format_prompt(&vars(&[("x", "v")])).unwrap();
        assert_eq!(out, "open { brace v");
    }

    #[test]
    fn placeholders_in_first_appearance_order() {
        let t = Template::new("p", "", "{b} {a} {b}");
        assert_eq!(t.placeholders(), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn record_round_trip_is_lossless() {
        let t = sample();
        let back = Template::from_record(&t.to_record()).unwrap();
        assert_eq!(back, t);
        assert_eq!(
            back.parameters.get("num_inference_steps"),
            Some(&ParamValue::Integer(30))
        );
    }

    #[test]
    fn record_round_trip_through_json_text() {
        let t = sample();
        let text = serde_json::to_string_pretty(&t.to_record()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(Template::from_record(&value).unwrap(), t);
    }

    #[test]
    fn from_record_fills_defaults() {
        let record = serde_json::json!({
            "name": "minimal",
            "description": "only required fields",
            "prompt": "a {thing}",
        });
        let t = Template::from_record(&record).unwrap();
        assert_eq!(t.negative_prompt, "");
        assert_eq!(t.style, DEFAULT_STYLE);
        assert!(t.parameters.is_empty());
        assert!(t.tags.is_empty());
    }

    #[test]
    fn from_record_treats_null_as_default() {
        let record = serde_json::json!({
            "name": "n",
            "description": "d",
            "prompt": "p",
            "style": null,
            "tags": null,
        });
        let t = Template::from_record(&record).unwrap();
        assert_eq!(t.style, DEFAULT_STYLE);
        assert!(t.tags.is_empty());
    }

    #[test]
    fn from_record_requires_each_field() {
        for missing in REQUIRED_FIELDS {
            let mut record = sample().to_record();
            record.as_object_mut().unwrap().remove(*missing);
            let err = Template::from_record(&record).unwrap_err();
            assert!(
                matches!(&err, TemplateError::InvalidRecord(msg) if msg.contains(missing)),
                "expected InvalidRecord for {missing}, got {err:?}"
            );
        }
    }

    #[test]
    fn from_record_rejects_wrong_types() {
        let record = serde_json::json!({
            "name": "n",
            "description": "d",
            "prompt": "p",
            "tags": "not-a-list",
        });
        assert!(matches!(
            Template::from_record(&record),
            Err(TemplateError::InvalidRecord(_))
        ));
    }

    #[test]
    fn from_record_rejects_non_object() {
        let record = serde_json::json!(["name"]);
        assert!(matches!(
            Template::from_record(&record),
            Err(TemplateError::InvalidRecord(_))
        ));
    }

    #[test]
    fn from_record_rejects_path_like_names() {
        for name in ["../victim", "a/b", "a\\b", "..", ".hidden", "  "] {
            let record = serde_json::json!({"name": name, "description": "d", "prompt": "p"});
            assert!(
                matches!(Template::from_record(&record), Err(TemplateError::InvalidRecord(_))),
                "accepted {name:?}"
            );
        }
    }

    #[test]
    fn validate_name_accepts_plain_names() {
        for name in ["product_photography", "my-template", "v1.2", "Neon City"] {
            assert!(validate_name(name).is_ok(), "rejected {name:?}");
        }
    }

    #[test]
    fn param_value_parse() {
        assert_eq!(ParamValue::parse("42"), ParamValue::Integer(42));
        assert_eq!(ParamValue::parse("7.5"), ParamValue::Float(7.5));
        assert_eq!(ParamValue::parse("ddim"), ParamValue::Text("ddim".into()));
        assert_eq!(ParamValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(ParamValue::Text("x".into()).as_f64(), None);
    }
}
