//! Option declarations: a named switch with an optional value argument.

use crate::args::ArgDef;
use crate::flags::{derive_name, normalize_long, split_forms};

/// A named switch that carries at most one value argument.
#[derive(Debug, Clone, Default)]
pub struct OptionDef {
    name: String,
    short: Option<String>,
    long: Option<String>,
    help: String,
    required: bool,
    argument: Option<ArgDef>,
}

impl OptionDef {
    /// Create an option named `name` with long form `--name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            long: Some(normalize_long(&name)),
            name,
            ..Default::default()
        }
    }

    /// Create an option from a declaration such as `"-p --port <port-number>"`.
    pub fn from_decl(decl: &str, help: impl Into<String>, required: bool) -> Self {
        let (short, long) = split_forms(decl);
        let argument = decl
            .split_whitespace()
            .find(|w| !w.starts_with('-'))
            .map(ArgDef::new);
        Self {
            name: derive_name(short.as_deref(), long.as_deref()),
            short,
            long,
            help: help.into(),
            required,
            argument,
        }
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(format!("-{short}"));
        self
    }

    pub fn long(mut self, long: &str) -> Self {
        self.long = Some(normalize_long(long));
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Set the option's value argument from a declaration like `<port-number>`.
    pub fn argument(self, decl: &str) -> Self {
        self.add_argument(ArgDef::new(decl))
    }

    pub fn add_argument(mut self, arg: ArgDef) -> Self {
        self.argument = Some(arg);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_short(&self) -> Option<&str> {
        self.short.as_deref()
    }

    pub fn get_long(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn get_argument(&self) -> Option<&ArgDef> {
        self.argument.as_ref()
    }

    /// The declared argument list: empty or a single element.
    pub fn arguments(&self) -> &[ArgDef] {
        self.argument.as_slice()
    }

    /// Long form, else short form, else the plain name.
    pub fn display_name(&self) -> String {
        self.long
            .clone()
            .or_else(|| self.short.clone())
            .unwrap_or_else(|| self.name.clone())
    }

    pub fn matches_token(&self, token: &str) -> bool {
        self.short.as_deref() == Some(token) || self.long.as_deref() == Some(token)
    }

    pub fn is_named(&self, key: &str) -> bool {
        self.name == key || self.matches_token(key)
    }
}
