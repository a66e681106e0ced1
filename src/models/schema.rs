//! Argument schema declared in prompt frontmatter
//!
//! A document may describe the flags it accepts and a trailing free-text
//! capture (`rest`). The schema is descriptive: the resolver exposes it and
//! callers validate a raw argument string against it before handing the
//! prompt to the host.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use super::error::{PalError, PalResult};
use crate::parser::tokens::tokenize;

/// Value type of a declared flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    #[serde(alias = "bool")]
    Boolean,
    #[serde(alias = "int")]
    Integer,
    #[serde(alias = "number")]
    Float,
    #[default]
    #[serde(alias = "str")]
    String,
}

impl ArgType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgType::Boolean => "boolean",
            ArgType::Integer => "integer",
            ArgType::Float => "float",
            ArgType::String => "string",
        }
    }

    /// Coerce raw text into a typed value, never silently
    pub fn coerce(&self, field: &str, raw: &str) -> PalResult<ArgValue> {
        let invalid = || {
            PalError::argument(
                field,
                format!("expected {} value, got '{}'", self.as_str(), raw),
            )
        };

        match self {
            ArgType::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Ok(ArgValue::Bool(true)),
                "false" | "no" | "0" | "off" => Ok(ArgValue::Bool(false)),
                _ => Err(invalid()),
            },
            ArgType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(ArgValue::Integer)
                .map_err(|_| invalid()),
            ArgType::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(ArgValue::Float)
                .ok_or_else(invalid),
            ArgType::String => Ok(ArgValue::String(raw.to_string())),
        }
    }
}

/// A parsed argument value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl ArgValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ArgValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgValue::Float(f) => Some(*f),
            ArgValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Bool(b) => write!(f, "{}", b),
            ArgValue::Integer(i) => write!(f, "{}", i),
            ArgValue::Float(v) => write!(f, "{}", v),
            ArgValue::String(s) => f.write_str(s),
        }
    }
}

/// A named flag, e.g. `-t/--tags <string>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagSpec {
    /// Field name in the parsed result
    pub name: String,

    /// Single-character alias without the dash
    #[serde(default)]
    pub short: Option<String>,

    /// Long alias without dashes (defaults to `name`)
    #[serde(default)]
    pub long: Option<String>,

    #[serde(rename = "type", default)]
    pub arg_type: ArgType,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub default: Option<serde_yaml::Value>,

    #[serde(default)]
    pub description: Option<String>,
}

impl FlagSpec {
    pub fn long_name(&self) -> &str {
        self.long.as_deref().unwrap_or(&self.name)
    }

    /// Usage form, e.g. `-t, --tags <string>`
    pub fn usage(&self) -> String {
        let mut usage = match &self.short {
            Some(short) => format!("-{}, --{}", short, self.long_name()),
            None => format!("--{}", self.long_name()),
        };
        if self.arg_type != ArgType::Boolean {
            usage.push_str(&format!(" <{}>", self.arg_type.as_str()));
        }
        usage
    }

    fn default_value(&self) -> PalResult<Option<ArgValue>> {
        let Some(default) = &self.default else {
            return Ok(None);
        };

        let raw = match default {
            serde_yaml::Value::String(s) => s.clone(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Null => return Ok(None),
            other => {
                return Err(PalError::argument(
                    &self.name,
                    format!("unsupported default value: {:?}", other),
                ))
            }
        };

        self.arg_type.coerce(&self.name, &raw).map(Some)
    }
}

/// Trailing free-text capture after the flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestSpec {
    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub description: Option<String>,
}

/// Structured argument contract of a prompt document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArgumentSchema {
    pub flags: Vec<FlagSpec>,
    pub rest: Option<RestSpec>,
}

/// Result of validating an argument string against a schema
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedArguments {
    pub values: BTreeMap<String, ArgValue>,
    pub rest: Option<String>,
}

impl ParsedArguments {
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(ArgValue::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.rest.is_none()
    }
}

impl ArgumentSchema {
    pub fn new(flags: Vec<FlagSpec>, rest: Option<RestSpec>) -> Self {
        Self { flags, rest }
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty() && self.rest.is_none()
    }

    /// Check the schema itself: unique names and aliases, coercible defaults
    pub fn check(&self) -> Result<(), String> {
        let mut names = HashSet::new();
        let mut shorts = HashSet::new();
        let mut longs = HashSet::new();

        for flag in &self.flags {
            if flag.name.trim().is_empty() {
                return Err("argument with empty name".to_string());
            }
            if flag.name == "rest" {
                return Err("'rest' is reserved for the trailing text".to_string());
            }
            if !names.insert(flag.name.as_str()) {
                return Err(format!("duplicate argument '{}'", flag.name));
            }
            if let Some(short) = &flag.short {
                if short.chars().count() != 1 {
                    return Err(format!(
                        "short alias for '{}' must be one character, got '{}'",
                        flag.name, short
                    ));
                }
                if !shorts.insert(short.as_str()) {
                    return Err(format!("duplicate short flag '-{}'", short));
                }
            }
            if !longs.insert(flag.long_name()) {
                return Err(format!("duplicate long flag '--{}'", flag.long_name()));
            }
            if flag.required && flag.default.is_some() {
                return Err(format!(
                    "argument '{}' is required and also has a default",
                    flag.name
                ));
            }
            flag.default_value().map_err(|e| e.to_string())?;
        }

        Ok(())
    }

    fn find_long(&self, long: &str) -> Option<&FlagSpec> {
        self.flags.iter().find(|f| f.long_name() == long)
    }

    fn find_short(&self, short: &str) -> Option<&FlagSpec> {
        self.flags.iter().find(|f| f.short.as_deref() == Some(short))
    }

    /// Validate a raw argument string
    ///
    /// Flags are read from the front; the first non-flag token starts the
    /// trailing text, which is kept verbatim (outer whitespace trimmed).
    pub fn validate(&self, args: &str) -> PalResult<ParsedArguments> {
        let tokens = tokenize(args);
        let mut values = BTreeMap::new();
        let mut rest_start = None;
        let mut i = 0;

        while i < tokens.len() {
            let token = &tokens[i];

            if token.text == "--" && !token.quoted {
                rest_start = tokens.get(i + 1).map(|t| t.start);
                break;
            }
            if !looks_like_flag(token.text.as_str(), token.quoted) {
                rest_start = Some(token.start);
                break;
            }

            let (spec, inline_value) = if let Some(long) = token.text.strip_prefix("--") {
                let (name, inline) = match long.split_once('=') {
                    Some((name, value)) => (name, Some(value)),
                    None => (long, None),
                };
                (self.find_long(name), inline)
            } else {
                (self.find_short(&token.text[1..]), None)
            };

            let spec = spec.ok_or_else(|| PalError::argument(&token.text, "unknown flag"))?;

            let value = match (spec.arg_type, inline_value) {
                (ArgType::Boolean, None) => ArgValue::Bool(true),
                (arg_type, Some(raw)) => arg_type.coerce(&spec.name, raw)?,
                (arg_type, None) => {
                    i += 1;
                    let raw = tokens.get(i).ok_or_else(|| {
                        PalError::argument(
                            &spec.name,
                            format!("flag {} expects a {} value", token.text, arg_type.as_str()),
                        )
                    })?;
                    arg_type.coerce(&spec.name, &raw.text)?
                }
            };

            values.insert(spec.name.clone(), value);
            i += 1;
        }

        let rest = rest_start.map(|start| args[start..].trim()).unwrap_or("");

        match &self.rest {
            None if !rest.is_empty() => {
                return Err(PalError::argument(
                    "rest",
                    format!("unexpected argument '{}'", rest),
                ))
            }
            Some(spec) if spec.required && rest.is_empty() => {
                let what = spec.description.as_deref().unwrap_or("input text");
                return Err(PalError::argument(
                    "rest",
                    format!("missing required {}", what),
                ));
            }
            _ => {}
        }

        for flag in &self.flags {
            if values.contains_key(&flag.name) {
                continue;
            }
            if flag.required {
                return Err(PalError::argument(
                    &flag.name,
                    format!("required flag --{} is missing", flag.long_name()),
                ));
            }
            if let Some(default) = flag.default_value()? {
                values.insert(flag.name.clone(), default);
            } else if flag.arg_type == ArgType::Boolean {
                values.insert(flag.name.clone(), ArgValue::Bool(false));
            }
        }

        Ok(ParsedArguments {
            values,
            rest: if self.rest.is_some() && !rest.is_empty() {
                Some(rest.to_string())
            } else {
                None
            },
        })
    }

    /// One line per flag plus the trailing text, for help output
    pub fn usage_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .flags
            .iter()
            .map(|flag| {
                let mut line = format!("`{}`", flag.usage());
                if flag.required {
                    line.push_str(" (required)");
                }
                if let Some(desc) = &flag.description {
                    line.push_str(&format!(" - {}", desc));
                }
                line
            })
            .collect();

        if let Some(rest) = &self.rest {
            let mut line = if rest.required {
                "`<text>` (required)".to_string()
            } else {
                "`[text]`".to_string()
            };
            if let Some(desc) = &rest.description {
                line.push_str(&format!(" - {}", desc));
            }
            lines.push(line);
        }

        lines
    }
}

fn looks_like_flag(text: &str, quoted: bool) -> bool {
    if quoted || !text.starts_with('-') || text == "-" {
        return false;
    }
    // Negative numbers are text, not flags
    text.parse::<f64>().is_err()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes_schema() -> ArgumentSchema {
        ArgumentSchema::new(
            vec![
                FlagSpec {
                    name: "tags".to_string(),
                    short: Some("t".to_string()),
                    long: None,
                    arg_type: ArgType::String,
                    required: false,
                    default: None,
                    description: Some("Comma separated tags".to_string()),
                },
                FlagSpec {
                    name: "limit".to_string(),
                    short: Some("n".to_string()),
                    long: None,
                    arg_type: ArgType::Integer,
                    required: false,
                    default: Some(serde_yaml::Value::Number(10.into())),
                    description: None,
                },
                FlagSpec {
                    name: "pinned".to_string(),
                    short: Some("p".to_string()),
                    long: None,
                    arg_type: ArgType::Boolean,
                    required: false,
                    default: None,
                    description: None,
                },
            ],
            Some(RestSpec {
                required: true,
                description: Some("note content".to_string()),
            }),
        )
    }

    #[test]
    fn test_short_flag_and_rest() {
        let parsed = notes_schema()
            .validate("-t work,meeting Today's standup notes")
            .unwrap();
        assert_eq!(parsed.get_str("tags"), Some("work,meeting"));
        assert_eq!(parsed.rest.as_deref(), Some("Today's standup notes"));
        assert_eq!(parsed.get("limit"), Some(&ArgValue::Integer(10)));
        assert_eq!(parsed.get("pinned"), Some(&ArgValue::Bool(false)));
    }

    #[test]
    fn test_long_flags_and_inline_values() {
        let parsed = notes_schema()
            .validate("--tags=a,b --limit 3 --pinned body text")
            .unwrap();
        assert_eq!(parsed.get_str("tags"), Some("a,b"));
        assert_eq!(parsed.get("limit").and_then(ArgValue::as_i64), Some(3));
        assert_eq!(parsed.get("pinned").and_then(ArgValue::as_bool), Some(true));
        assert_eq!(parsed.rest.as_deref(), Some("body text"));
    }

    #[test]
    fn test_quoted_flag_value_is_unquoted() {
        let parsed = notes_schema()
            .validate(r#"-t "deep work" "quoted  body""#)
            .unwrap();
        assert_eq!(parsed.get_str("tags"), Some("deep work"));
        assert_eq!(parsed.rest.as_deref(), Some(r#""quoted  body""#));
    }

    #[test]
    fn test_rest_is_verbatim_inside() {
        let parsed = notes_schema().validate("  keep   inner  spacing  ").unwrap();
        assert_eq!(parsed.rest.as_deref(), Some("keep   inner  spacing"));
    }

    #[test]
    fn test_required_rest_missing() {
        let err = notes_schema().validate("-t work").unwrap_err();
        assert_eq!(err.field(), Some("rest"));
    }

    #[test]
    fn test_unknown_flag() {
        let err = notes_schema().validate("-x body").unwrap_err();
        assert_eq!(err.field(), Some("-x"));
        let err = notes_schema().validate("--nope body").unwrap_err();
        assert_eq!(err.field(), Some("--nope"));
    }

    #[test]
    fn test_integer_coercion_failure() {
        let err = notes_schema().validate("-n abc body").unwrap_err();
        assert_eq!(err.field(), Some("limit"));
        assert!(err.to_string().contains("integer"));
    }

    #[test]
    fn test_flag_missing_value() {
        let err = notes_schema().validate("-t").unwrap_err();
        assert_eq!(err.field(), Some("tags"));
    }

    #[test]
    fn test_double_dash_ends_flags() {
        let parsed = notes_schema().validate("-- -t is text").unwrap();
        assert_eq!(parsed.rest.as_deref(), Some("-t is text"));
        assert!(parsed.get("tags").is_none());
    }

    #[test]
    fn test_negative_number_starts_rest() {
        let parsed = notes_schema().validate("-5 degrees").unwrap();
        assert_eq!(parsed.rest.as_deref(), Some("-5 degrees"));
    }

    #[test]
    fn test_no_rest_declared_rejects_text() {
        let schema = ArgumentSchema::new(notes_schema().flags, None);
        let err = schema.validate("-t a stray").unwrap_err();
        assert_eq!(err.field(), Some("rest"));
        assert!(schema.validate("-t a").is_ok());
    }

    #[test]
    fn test_required_flag() {
        let mut schema = notes_schema();
        schema.flags[0].required = true;
        let err = schema.validate("body").unwrap_err();
        assert_eq!(err.field(), Some("tags"));
    }

    #[test]
    fn test_check_rejects_duplicate_alias() {
        let mut schema = notes_schema();
        schema.flags[1].short = Some("t".to_string());
        assert!(schema.check().is_err());
        assert!(notes_schema().check().is_ok());
    }

    #[test]
    fn test_check_rejects_bad_default() {
        let mut schema = notes_schema();
        schema.flags[1].default = Some(serde_yaml::Value::String("ten".to_string()));
        assert!(schema.check().is_err());
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(
            ArgType::Float.coerce("ratio", "0.5").unwrap(),
            ArgValue::Float(0.5)
        );
        assert!(ArgType::Float.coerce("ratio", "half").is_err());
    }
}
