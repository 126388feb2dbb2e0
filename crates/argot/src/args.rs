//! Positional/option argument declarations and their validators.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// A custom validation predicate. `Err` carries a human-readable reason.
pub type Validator = Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// Declared value type; each one implies an automatic validator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    #[default]
    Str,
    Int,
    Uint,
    Float,
    Bool,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown argument type `{0}`")]
pub struct UnknownArgType(pub String);

impl FromStr for ArgType {
    type Err = UnknownArgType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "str" | "string" => Ok(Self::Str),
            "int" | "integer" => Ok(Self::Int),
            "uint" => Ok(Self::Uint),
            "float" => Ok(Self::Float),
            "bool" | "boolean" => Ok(Self::Bool),
            "file" => Ok(Self::File),
            other => Err(UnknownArgType(other.to_string())),
        }
    }
}

impl ArgType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::File => "file",
        }
    }

    /// Run the validator implied by this type.
    ///
    /// `File` performs a blocking existence check on the filesystem.
    pub fn check(self, value: &str) -> Result<(), String> {
        match self {
            Self::Str => Ok(()),
            Self::Int => value
                .parse::<i64>()
                .map(|_| ())
                .map_err(|e| format!("`{value}` is not a valid integer: {e}")),
            Self::Uint => value
                .parse::<u64>()
                .map(|_| ())
                .map_err(|e| format!("`{value}` is not a positive integer: {e}")),
            Self::Float => value
                .parse::<f64>()
                .map(|_| ())
                .map_err(|e| format!("`{value}` is not a valid float: {e}")),
            Self::Bool => match value {
                "true" | "false" => Ok(()),
                _ => Err(format!("`{value}` is not a valid boolean")),
            },
            Self::File => {
                if Path::new(value).exists() {
                    Ok(())
                } else {
                    Err(format!("no such file or directory: `{value}`"))
                }
            }
        }
    }
}

/// A declared argument: a command positional or the value of an option.
#[derive(Clone, Default)]
pub struct ArgDef {
    name: String,
    help: String,
    display: Option<String>,
    arg_type: ArgType,
    required: bool,
    variadic: bool,
    valid_values: Vec<String>,
    default_value: Option<String>,
    validators: Vec<Validator>,
    pattern: Option<Regex>,
}

impl ArgDef {
    /// Create an argument from its declaration.
    ///
    /// - `<name>` is required, `[name]` or a bare `name` is optional
    /// - `<int:port>` declares a type (`str`, `int`, `uint`, `float`, `bool`, `file`)
    /// - `<files...>` is variadic
    ///
    /// A `prefix:` that is not a known type is kept as part of the name.
    pub fn new(decl: &str) -> Self {
        let decl = decl.trim();
        let (mut name, required) = if let Some(inner) =
            decl.strip_prefix('<').and_then(|s| s.strip_suffix('>'))
        {
            (inner, true)
        } else if let Some(inner) = decl.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            (inner, false)
        } else {
            (decl, false)
        };

        let mut arg_type = ArgType::Str;
        if let Some((prefix, rest)) = name.split_once(':') {
            if let Ok(t) = prefix.parse::<ArgType>() {
                arg_type = t;
                name = rest;
            }
        }

        let variadic = name.ends_with("...");
        let name = name.trim_end_matches("...");

        Self {
            name: name.to_string(),
            arg_type,
            required,
            variadic,
            ..Default::default()
        }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn variadic(mut self, variadic: bool) -> Self {
        self.variadic = variadic;
        self
    }

    pub fn arg_type(mut self, arg_type: ArgType) -> Self {
        self.arg_type = arg_type;
        self
    }

    /// Restrict values to a set, compared case-insensitively.
    pub fn valid_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.valid_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Value used when no token is available.
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn validator<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(f));
        self
    }

    pub fn pattern(mut self, re: Regex) -> Self {
        self.pattern = Some(re);
        self
    }

    /// Override how the argument is shown in help and error output.
    pub fn display_as(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    pub fn get_type(&self) -> ArgType {
        self.arg_type
    }

    pub fn get_valid_values(&self) -> &[String] {
        &self.valid_values
    }

    pub fn get_default(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn get_pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    /// Canonical display form, e.g. `<image-name>` or `[files...]`.
    pub fn display_name(&self) -> String {
        if let Some(display) = &self.display {
            return display.clone();
        }
        let (open, close) = if self.required { ('<', '>') } else { ('[', ']') };
        let dots = if self.variadic { "..." } else { "" };
        format!("{open}{}{dots}{close}", self.name.replace('_', "-"))
    }

    /// Whether `key` names this argument, by plain name or display form.
    pub fn is_named(&self, key: &str) -> bool {
        self.name == key || self.display_name() == key
    }

    /// Validate a bound value.
    ///
    /// Order: allowed set, type validator, custom validators, regex. The
    /// first failure's reason is returned.
    pub fn check(&self, value: &str) -> Result<(), String> {
        if !self.valid_values.is_empty()
            && !self.valid_values.iter().any(|v| v.eq_ignore_ascii_case(value))
        {
            return Err(format!(
                "Expected one of: {}",
                self.valid_values.join(", ")
            ));
        }

        self.arg_type.check(value)?;
        for validator in &self.validators {
            validator(value)?;
        }

        if let Some(re) = &self.pattern {
            if !re.is_match(value) {
                return Err(format!(
                    "`{value}` does not match the pattern `{}`",
                    re.as_str()
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ArgDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgDef")
            .field("name", &self.name)
            .field("help", &self.help)
            .field("display", &self.display)
            .field("arg_type", &self.arg_type)
            .field("required", &self.required)
            .field("variadic", &self.variadic)
            .field("valid_values", &self.valid_values)
            .field("default_value", &self.default_value)
            .field("validators", &self.validators.len())
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .finish()
    }
}
