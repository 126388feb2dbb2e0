//! Serializable model of an argot command tree.
//!
//! A manifest stores a whole CLI surface as JSON so it can be checked, parsed
//! against and rendered without compiling the declarations into a program.
//! [`CommandSchema::to_command`] turns the data model into an
//! [`argot::Command`].

use argot::{ArgDef, ArgType, Command, FlagDef, OptionDef, Settings, UnknownArgType};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Current manifest layout.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to decode manifest: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported manifest format version {0} (expected {expected})", expected = FORMAT_VERSION)]
    UnsupportedVersion(u32),
    #[error("command `{command}`: invalid pattern for argument `{argument}`: {source}")]
    InvalidPattern {
        command: String,
        argument: String,
        #[source]
        source: regex::Error,
    },
    #[error("command `{command}`: {source}")]
    UnknownType {
        command: String,
        #[source]
        source: UnknownArgType,
    },
    #[error("command `{command}`: `{form}` is declared more than once")]
    DuplicateForm { command: String, form: String },
    #[error("command `{command}`: every flag and option needs a short or long form")]
    MissingForm { command: String },
    #[error("command `{command}`: short form `{form}` must be a single character")]
    InvalidShort { command: String, form: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ArgSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub variadic: bool,
    /// One of `str`, `int`, `uint`, `float`, `bool`, `file`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub possible_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Overrides the `<name>` form shown in help and errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct FlagSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
    #[serde(default)]
    pub global: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct OptionSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument: Option<ArgSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct CommandSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author: String,
    /// Printed at the bottom of the help output.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub discussion: String,
    /// Replaces the generated usage line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    /// Help section this command is listed under in its parent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<ArgSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<FlagSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<CommandSchema>,
    /// Only read on the root command.
    #[serde(default, skip_serializing_if = "is_default_settings")]
    pub settings: Settings,
}

fn is_default_settings(settings: &Settings) -> bool {
    *settings == Settings::default()
}

impl CommandSchema {
    /// Build the command tree rooted at this schema.
    pub fn to_command(&self) -> Result<Command, SchemaError> {
        self.build(true)
    }

    fn build(&self, root: bool) -> Result<Command, SchemaError> {
        let mut cmd = if root {
            Command::app(&self.name).settings(self.settings.clone())
        } else {
            Command::new(&self.name)
        };
        cmd = cmd
            .help(&self.help)
            .version(&self.version)
            .author(&self.author)
            .discussion(&self.discussion);
        if let Some(usage) = &self.usage {
            cmd = cmd.usage(usage);
        }
        if let Some(group) = &self.group {
            cmd = cmd.group(group);
        }
        for alias in &self.aliases {
            cmd = cmd.alias(alias);
        }

        // built-in forms count as taken
        let mut taken: HashSet<String> = cmd
            .get_flags()
            .iter()
            .flat_map(|f| [f.get_short(), f.get_long()])
            .flatten()
            .map(str::to_string)
            .collect();

        for flag in &self.flags {
            let decl = self.forms(flag.short.as_deref(), flag.long.as_deref(), &mut taken)?;
            cmd = cmd.add_flag(FlagDef::from_decl(&decl, flag.help.as_str()).global(flag.global));
        }

        for opt in &self.options {
            let decl = self.forms(opt.short.as_deref(), opt.long.as_deref(), &mut taken)?;
            let mut def = OptionDef::from_decl(&decl, opt.help.as_str(), opt.required);
            if let Some(arg) = &opt.argument {
                def = def.add_argument(self.arg(arg)?);
            }
            cmd = cmd.add_option(def);
        }

        for arg in &self.args {
            cmd = cmd.add_argument(self.arg(arg)?);
        }

        for sub in &self.subcommands {
            cmd = cmd.subcommand(sub.build(false)?);
        }

        Ok(cmd)
    }

    /// Normalize `short`/`long` into a `"-s --long"` declaration, rejecting
    /// forms already used in this command.
    fn forms(
        &self,
        short: Option<&str>,
        long: Option<&str>,
        taken: &mut HashSet<String>,
    ) -> Result<String, SchemaError> {
        let short = short.map(|s| format!("-{}", s.trim_start_matches('-')));
        let long = long.map(|l| format!("--{}", l.trim_start_matches('-')));

        if let Some(s) = &short {
            if s.chars().count() != 2 {
                return Err(SchemaError::InvalidShort {
                    command: self.name.clone(),
                    form: s.clone(),
                });
            }
        }

        let forms: Vec<String> = short.into_iter().chain(long).collect();
        if forms.is_empty() {
            return Err(SchemaError::MissingForm {
                command: self.name.clone(),
            });
        }
        for form in &forms {
            if !taken.insert(form.clone()) {
                return Err(SchemaError::DuplicateForm {
                    command: self.name.clone(),
                    form: form.clone(),
                });
            }
        }
        Ok(forms.join(" "))
    }

    fn arg(&self, schema: &ArgSchema) -> Result<ArgDef, SchemaError> {
        let mut arg = ArgDef::new(&schema.name)
            .help(schema.help.as_str())
            .required(schema.required)
            .variadic(schema.variadic)
            .valid_values(schema.possible_values.iter().cloned());

        if let Some(value_type) = &schema.value_type {
            let parsed = value_type
                .parse::<ArgType>()
                .map_err(|source| SchemaError::UnknownType {
                    command: self.name.clone(),
                    source,
                })?;
            arg = arg.arg_type(parsed);
        }
        if let Some(default) = &schema.default_value {
            arg = arg.default_value(default.as_str());
        }
        if let Some(pattern) = &schema.pattern {
            let re = Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
                command: self.name.clone(),
                argument: schema.name.clone(),
                source,
            })?;
            arg = arg.pattern(re);
        }
        if let Some(display) = &schema.value_name {
            arg = arg.display_as(display.as_str());
        }
        Ok(arg)
    }
}

/// Versioned JSON envelope around the root [`CommandSchema`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Manifest {
    pub format_version: u32,
    pub command: CommandSchema,
}

impl Manifest {
    pub fn new(command: CommandSchema) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            command,
        }
    }

    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let manifest: Self = serde_json::from_str(text)?;
        if manifest.format_version != FORMAT_VERSION {
            return Err(SchemaError::UnsupportedVersion(manifest.format_version));
        }
        Ok(manifest)
    }

    pub fn to_json_pretty(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn docker_json() -> serde_json::Value {
        json!({
            "format-version": 1,
            "command": {
                "name": "docker",
                "version": "0.1.0",
                "settings": { "show-command-aliases": true },
                "flags": [{ "short": "v", "long": "verbose", "global": true }],
                "subcommands": [{
                    "name": "image",
                    "aliases": ["i"],
                    "args": [{ "name": "image-name", "required": true }],
                    "options": [{
                        "short": "-p",
                        "long": "--port",
                        "required": true,
                        "argument": { "name": "port-number", "value-type": "int" }
                    }]
                }]
            }
        })
    }

    #[test]
    fn manifest_builds_a_parsable_tree() {
        let manifest = Manifest::from_json(&docker_json().to_string()).unwrap();
        let app = manifest.command.to_command().unwrap();
        assert!(app.get_settings().show_command_aliases);

        let m = argot::parse(&app, &["i", "nginx", "--port", "80", "-v"]).unwrap();
        assert_eq!(m.command_path(), ["docker", "image"]);
        assert_eq!(m.get_arg_value("<image-name>"), Ok("nginx"));
        assert!(m.contains_flag("verbose"));

        let err = argot::parse(&app, &["i", "nginx", "--port", "x"]).unwrap_err();
        assert_eq!(err.kind(), argot::ErrorKind::InvalidArgumentValue);
    }

    #[test]
    fn help_text_fields_reach_the_tree() {
        let manifest = Manifest::from_json(
            &json!({
                "format-version": 1,
                "command": {
                    "name": "docker",
                    "author": "Jane Roe",
                    "discussion": "Images are pulled on first use.",
                    "settings": { "include-help-subcommand": true },
                    "subcommands": [
                        { "name": "image", "group": "MANAGEMENT COMMANDS", "usage": "image <NAME>" },
                        { "name": "run" }
                    ]
                }
            })
            .to_string(),
        )
        .unwrap();
        let app = manifest.command.to_command().unwrap();
        assert_eq!(app.get_author(), "Jane Roe");
        assert_eq!(app.get_discussion(), "Images are pulled on first use.");

        let image = app.find_subcommand("image").unwrap();
        assert_eq!(image.get_group(), Some("MANAGEMENT COMMANDS"));
        assert_eq!(image.get_usage(), Some("image <NAME>"));

        let help = app.find_subcommand("help").unwrap();
        assert!(help.is_help_subcommand());
        assert_eq!(help.get_arguments()[0].get_valid_values(), ["image", "run"]);
    }

    #[test]
    fn round_trips_through_json() {
        let manifest = Manifest::from_json(&docker_json().to_string()).unwrap();
        let text = manifest.to_json_pretty().unwrap();
        assert_eq!(Manifest::from_json(&text).unwrap(), manifest);
        // defaults are left out
        assert!(!text.contains("\"help\""));
    }

    #[test]
    fn rejects_unknown_version() {
        let mut value = docker_json();
        value["format-version"] = json!(2);
        let err = Manifest::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedVersion(2)));
    }

    #[test]
    fn rejects_bad_pattern_and_type() {
        let schema = CommandSchema {
            name: "t".into(),
            args: vec![ArgSchema {
                name: "x".into(),
                pattern: Some("(".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let err = schema.to_command().unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));

        let schema = CommandSchema {
            name: "t".into(),
            args: vec![ArgSchema {
                name: "x".into(),
                value_type: Some("decimal".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let err = schema.to_command().unwrap_err();
        assert!(err.to_string().contains("unknown argument type `decimal`"));
    }

    #[test]
    fn rejects_duplicate_and_missing_forms() {
        let flag = |short: &str| FlagSchema {
            short: Some(short.into()),
            ..Default::default()
        };
        let schema = CommandSchema {
            name: "t".into(),
            flags: vec![flag("a"), flag("-a")],
            ..Default::default()
        };
        match schema.to_command().unwrap_err() {
            SchemaError::DuplicateForm { form, .. } => assert_eq!(form, "-a"),
            other => panic!("unexpected error: {other}"),
        }

        let schema = CommandSchema {
            name: "t".into(),
            flags: vec![flag("h")],
            ..Default::default()
        };
        assert!(matches!(
            schema.to_command().unwrap_err(),
            SchemaError::DuplicateForm { .. }
        ));

        let schema = CommandSchema {
            name: "t".into(),
            options: vec![OptionSchema::default()],
            ..Default::default()
        };
        assert!(matches!(
            schema.to_command().unwrap_err(),
            SchemaError::MissingForm { .. }
        ));

        let schema = CommandSchema {
            name: "t".into(),
            flags: vec![flag("ab")],
            ..Default::default()
        };
        assert!(matches!(
            schema.to_command().unwrap_err(),
            SchemaError::InvalidShort { .. }
        ));
    }
}
