//! Flag declarations and the form helpers shared with options.

/// A boolean switch; presence is all that is recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagDef {
    name: String,
    short: Option<String>,
    long: Option<String>,
    help: String,
    global: bool,
}

impl FlagDef {
    /// Create a flag named `name` with long form `--name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            long: Some(normalize_long(&name)),
            name,
            ..Default::default()
        }
    }

    /// Create a flag from a declaration such as `"-v --verbose"`.
    ///
    /// Either form may be omitted. The name is the long form without dashes,
    /// or the short letter when there is no long form.
    pub fn from_decl(decl: &str, help: impl Into<String>) -> Self {
        let (short, long) = split_forms(decl);
        Self {
            name: derive_name(short.as_deref(), long.as_deref()),
            short,
            long,
            help: help.into(),
            global: false,
        }
    }

    /// The built-in `-h/--help` flag, inherited by every subcommand.
    pub fn help_flag() -> Self {
        Self::from_decl("-h --help", "Print out help information for the passed command")
            .global(true)
    }

    /// The built-in `-V/--version` flag of the root command.
    pub fn version_flag() -> Self {
        Self::from_decl("-V --version", "Print out version information")
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

    /// Propagate this flag to every descendant command.
    pub fn global(mut self, global: bool) -> Self {
        self.global = global;
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

    pub fn is_global(&self) -> bool {
        self.global
    }

    /// Whether a raw token is this flag's short or long form.
    pub fn matches_token(&self, token: &str) -> bool {
        self.short.as_deref() == Some(token) || self.long.as_deref() == Some(token)
    }

    /// Whether `key` names this flag, by name, short or long form.
    pub fn is_named(&self, key: &str) -> bool {
        self.name == key || self.matches_token(key)
    }
}

pub(crate) fn normalize_long(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("--") {
        trimmed.to_string()
    } else {
        format!("--{}", trimmed.trim_start_matches('-'))
    }
}

/// Split `"-p --port <x>"` into its short and long forms; other words are ignored.
pub(crate) fn split_forms(decl: &str) -> (Option<String>, Option<String>) {
    let mut short = None;
    let mut long = None;
    for word in decl.split_whitespace() {
        if word.starts_with("--") {
            long = Some(word.to_string());
        } else if word.starts_with('-') {
            short = Some(word.to_string());
        }
    }
    (short, long)
}

pub(crate) fn derive_name(short: Option<&str>, long: Option<&str>) -> String {
    long.or(short)
        .map(|s| s.trim_start_matches('-').to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_and_declaration_agree() {
        let built = FlagDef::new("help").short('h').help("The help flag");
        let declared = FlagDef::from_decl("-h --help", "The help flag");
        assert_eq!(built, declared);
    }

    #[test]
    fn short_only_declaration_uses_letter_as_name() {
        let flag = FlagDef::from_decl("-q", "Quiet");
        assert_eq!(flag.name(), "q");
        assert_eq!(flag.get_long(), None);
        assert!(flag.is_named("-q"));
        assert!(flag.is_named("q"));
    }

    #[test]
    fn help_flag_is_global() {
        let flag = FlagDef::help_flag();
        assert!(flag.is_global());
        assert!(flag.matches_token("-h"));
        assert!(flag.matches_token("--help"));
        assert!(!flag.matches_token("help"));
    }
}
