//! The declared command tree.

use crate::args::ArgDef;
use crate::flags::FlagDef;
use crate::options::OptionDef;
use crate::settings::Settings;

/// A node of the declared interface.
///
/// Commands own their children; there is no parent back-reference. The
/// parser tracks the path from the root while it walks the tokens.
#[derive(Debug, Clone, Default)]
pub struct Command {
    name: String,
    aliases: Vec<String>,
    help: String,
    version: String,
    author: String,
    discussion: String,
    usage: Option<String>,
    group: Option<String>,
    arguments: Vec<ArgDef>,
    flags: Vec<FlagDef>,
    options: Vec<OptionDef>,
    subcommands: Vec<Command>,
    settings: Settings,
    generated_help: bool,
}

impl Command {
    /// A command carrying the built-in help flag.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: vec![FlagDef::help_flag()],
            ..Default::default()
        }
    }

    /// A root command carrying the built-in help and version flags.
    pub fn app(name: impl Into<String>) -> Self {
        Self::new(name).add_flag(FlagDef::version_flag())
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Longer text printed at the bottom of the help output.
    pub fn discussion(mut self, discussion: impl Into<String>) -> Self {
        self.discussion = discussion.into();
        self
    }

    /// Replace the generated usage line, e.g. `"image [OPTIONS] <NAME>"`.
    ///
    /// The parent path is prepended unless the text already starts with it.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// List this command under its own section in the parent's help.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Declare a positional argument, e.g. `("<image-name>", "Image to use")`.
    pub fn argument(self, decl: &str, help: &str) -> Self {
        self.add_argument(ArgDef::new(decl).help(help))
    }

    /// Add a positional argument; a second argument with the same name is ignored.
    pub fn add_argument(mut self, arg: ArgDef) -> Self {
        if !self.arguments.iter().any(|a| a.name() == arg.name()) {
            self.arguments.push(arg);
        }
        self
    }

    /// Declare a flag, e.g. `("-v --verbose", "Verbose output")`.
    pub fn flag(self, decl: &str, help: &str) -> Self {
        self.add_flag(FlagDef::from_decl(decl, help))
    }

    /// Add a flag. A flag whose short or long form is already taken is ignored.
    pub fn add_flag(mut self, flag: FlagDef) -> Self {
        let taken = self.flags.iter().any(|f| {
            (flag.get_short().is_some() && f.get_short() == flag.get_short())
                || (flag.get_long().is_some() && f.get_long() == flag.get_long())
        });
        if !taken {
            self.flags.push(flag);
        }
        self
    }

    /// Declare an option, e.g. `("-p --port <port-number>", "Port to bind")`.
    pub fn option(self, decl: &str, help: &str) -> Self {
        self.add_option(OptionDef::from_decl(decl, help, false))
    }

    pub fn required_option(self, decl: &str, help: &str) -> Self {
        self.add_option(OptionDef::from_decl(decl, help, true))
    }

    /// Add an option. An option whose short or long form is already taken is ignored.
    pub fn add_option(mut self, opt: OptionDef) -> Self {
        let taken = self.options.iter().any(|o| {
            (opt.get_short().is_some() && o.get_short() == opt.get_short())
                || (opt.get_long().is_some() && o.get_long() == opt.get_long())
        });
        if !taken {
            self.options.push(opt);
        }
        self
    }

    pub fn subcommand(mut self, cmd: Command) -> Self {
        self.subcommands.push(cmd);
        self.sync_help_subcommand();
        self
    }

    /// Configure parser behavior. Only the root command's settings are read.
    pub fn settings(mut self, settings: Settings) -> Self {
        if settings.disable_version_flag {
            self.flags.retain(|f| f.get_long() != Some("--version"));
        }
        self.settings = settings;
        self.sync_help_subcommand();
        self
    }

    /// Keep the generated `help <COMMAND>` child last and its allowed values
    /// in step with the sibling names.
    fn sync_help_subcommand(&mut self) {
        self.subcommands.retain(|c| !c.generated_help);
        if !self.settings.include_help_subcommand
            || self.subcommands.is_empty()
            || self.find_subcommand("help").is_some()
        {
            return;
        }

        let names: Vec<String> = self.subcommands.iter().map(|c| c.name.clone()).collect();
        let mut help = Command::new("help")
            .help("Print out help information for the passed command")
            .add_argument(
                ArgDef::new("<COMMAND>")
                    .help("The name of the command to output help for")
                    .valid_values(names),
            );
        help.generated_help = true;
        self.subcommands.push(help);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }

    pub fn get_version(&self) -> &str {
        &self.version
    }

    pub fn get_author(&self) -> &str {
        &self.author
    }

    pub fn get_discussion(&self) -> &str {
        &self.discussion
    }

    pub fn get_usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    pub fn get_group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Whether this is the `help` child added by `include-help-subcommand`.
    pub fn is_help_subcommand(&self) -> bool {
        self.generated_help
    }

    pub fn get_arguments(&self) -> &[ArgDef] {
        &self.arguments
    }

    pub fn get_flags(&self) -> &[FlagDef] {
        &self.flags
    }

    pub fn get_options(&self) -> &[OptionDef] {
        &self.options
    }

    pub fn get_subcommands(&self) -> &[Command] {
        &self.subcommands
    }

    pub fn get_settings(&self) -> &Settings {
        &self.settings
    }

    /// Whether `token` is this command's name or one of its aliases.
    pub fn is_named(&self, token: &str) -> bool {
        self.name == token || self.aliases.iter().any(|a| a == token)
    }

    pub fn find_subcommand(&self, token: &str) -> Option<&Command> {
        self.subcommands.iter().find(|c| c.is_named(token))
    }

    pub fn find_flag(&self, token: &str) -> Option<&FlagDef> {
        self.flags.iter().find(|f| f.matches_token(token))
    }

    pub fn find_option(&self, token: &str) -> Option<&OptionDef> {
        self.options.iter().find(|o| o.matches_token(token))
    }

    /// Walk `path` (names or aliases) down from this command.
    pub fn find_path<S: AsRef<str>>(&self, path: &[S]) -> Option<Vec<&Command>> {
        let mut out = vec![self];
        let mut current = self;
        for segment in path {
            current = current.find_subcommand(segment.as_ref())?;
            out.push(current);
        }
        Some(out)
    }

    /// How many positional tokens this command can bind.
    pub(crate) fn positional_capacity(&self) -> usize {
        if self.arguments.iter().any(ArgDef::is_variadic) {
            usize::MAX
        } else {
            self.arguments.len()
        }
    }

    /// Whether running this command without tokens makes no sense.
    pub fn is_expecting_values(&self) -> bool {
        !self.subcommands.is_empty()
            || self
                .arguments
                .iter()
                .any(|a| a.is_required() && a.get_default().is_none())
    }
}
