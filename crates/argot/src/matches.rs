//! The queryable outcome of a successful parse.

use crate::args::ArgDef;
use crate::command::Command;
use crate::flags::FlagDef;
use crate::options::OptionDef;
use indexmap::IndexMap;
use thiserror::Error;

/// Returned by value accessors when nothing was bound for a key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no value found for the provided argument: `{0}`")]
    Argument(String),
    #[error("no value found for the provided option: `{0}`")]
    Option(String),
}

#[derive(Debug, Clone)]
pub struct FlagMatch {
    flag: FlagDef,
    cursor_index: usize,
}

impl FlagMatch {
    pub fn flag(&self) -> &FlagDef {
        &self.flag
    }

    /// Token index of the first occurrence.
    pub fn cursor_index(&self) -> usize {
        self.cursor_index
    }
}

#[derive(Debug, Clone)]
pub struct OptionMatch {
    option: OptionDef,
    depth: usize,
    instance_count: usize,
    passed_args: Vec<ArgMatch>,
    cursor_index: Option<usize>,
}

impl OptionMatch {
    pub fn option(&self) -> &OptionDef {
        &self.option
    }

    /// Depth of the declaring command in the matched path; the root is 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// How many times the option appeared (a synthesized default counts once).
    pub fn instance_count(&self) -> usize {
        self.instance_count
    }

    pub fn passed_args(&self) -> &[ArgMatch] {
        &self.passed_args
    }

    /// Token index of the first occurrence; `None` when synthesized from a default.
    pub fn cursor_index(&self) -> Option<usize> {
        self.cursor_index
    }
}

#[derive(Debug, Clone)]
pub struct ArgMatch {
    raw_value: String,
    instance_of: ArgDef,
    cursor_index: Option<usize>,
}

impl ArgMatch {
    pub(crate) fn new(raw_value: String, instance_of: &ArgDef, cursor_index: Option<usize>) -> Self {
        Self {
            raw_value,
            instance_of: instance_of.clone(),
            cursor_index,
        }
    }

    pub fn value(&self) -> &str {
        &self.raw_value
    }

    pub fn argument(&self) -> &ArgDef {
        &self.instance_of
    }

    /// Index of the (first) token bound; `None` when the default was used.
    pub fn cursor_index(&self) -> Option<usize> {
        self.cursor_index
    }

    pub fn is_default(&self) -> bool {
        self.cursor_index.is_none()
    }
}

/// Everything one invocation matched.
///
/// Holds copies of the matched declarations, so it stays valid after the
/// declared command tree is dropped.
#[derive(Debug, Clone, Default)]
pub struct ParserMatches {
    raw_args: Vec<String>,
    positional_args: Vec<String>,
    matched_cmd: Command,
    matched_cmd_idx: Option<usize>,
    command_path: Vec<String>,
    flag_matches: IndexMap<String, FlagMatch>,
    option_matches: IndexMap<(usize, String), OptionMatch>,
    arg_matches: Vec<ArgMatch>,
}

impl ParserMatches {
    /// Number of raw tokens handed to the parser.
    pub fn raw_arg_count(&self) -> usize {
        self.raw_args.len()
    }

    pub fn raw_args(&self) -> &[String] {
        &self.raw_args
    }

    /// Tokens captured after `--`, or left over under `allow-positional-args`.
    pub fn positional_args(&self) -> &[String] {
        &self.positional_args
    }

    pub fn matched_command(&self) -> &Command {
        &self.matched_cmd
    }

    /// Token index of the matched subcommand; `None` means the root command.
    pub fn matched_command_index(&self) -> Option<usize> {
        self.matched_cmd_idx
    }

    /// Canonical names from the root to the matched command.
    pub fn command_path(&self) -> &[String] {
        &self.command_path
    }

    /// Whether a flag was passed, by name, short or long form.
    pub fn contains_flag(&self, key: &str) -> bool {
        self.flag_matches.values().any(|m| m.flag.is_named(key))
    }

    /// Whether an option was passed (or synthesized from a default), by name,
    /// short or long form.
    pub fn contains_option(&self, key: &str) -> bool {
        self.find_option(key).is_some()
    }

    /// Value bound to a command argument, by name or display form (`<file>`).
    pub fn get_arg_value(&self, key: &str) -> Result<&str, LookupError> {
        self.arg_matches
            .iter()
            .find(|m| m.instance_of.is_named(key))
            .map(ArgMatch::value)
            .ok_or_else(|| LookupError::Argument(key.to_string()))
    }

    /// First value passed to an option.
    pub fn get_option_value(&self, key: &str) -> Result<&str, LookupError> {
        self.find_option(key)
            .and_then(|m| m.passed_args.first())
            .map(ArgMatch::value)
            .ok_or_else(|| LookupError::Option(key.to_string()))
    }

    /// Every value passed to a repeated option, e.g. `-p 80 -p 90`.
    pub fn get_all_option_values(&self, key: &str) -> Vec<&str> {
        self.find_option(key)
            .map(|m| m.passed_args.iter().map(ArgMatch::value).collect())
            .unwrap_or_default()
    }

    pub fn option_instance_count(&self, key: &str) -> usize {
        self.find_option(key).map_or(0, |m| m.instance_count)
    }

    pub fn flag_matches(&self) -> impl Iterator<Item = &FlagMatch> {
        self.flag_matches.values()
    }

    pub fn option_matches(&self) -> impl Iterator<Item = &OptionMatch> {
        self.option_matches.values()
    }

    pub fn arg_matches(&self) -> &[ArgMatch] {
        &self.arg_matches
    }

    /// The match nearest the matched command wins when levels share a name.
    fn find_option(&self, key: &str) -> Option<&OptionMatch> {
        self.option_matches
            .values()
            .filter(|m| m.option.is_named(key))
            .max_by_key(|m| m.depth)
    }
}

impl ParserMatches {
    pub(crate) fn new(raw_args: Vec<String>, root: &Command) -> Self {
        Self {
            raw_args,
            command_path: vec![root.name().to_string()],
            ..Default::default()
        }
    }

    /// Record a flag; repeats keep the first occurrence.
    pub(crate) fn push_flag(&mut self, flag: &FlagDef, cursor_index: usize) {
        if !self.flag_matches.contains_key(flag.name()) {
            self.flag_matches.insert(
                flag.name().to_string(),
                FlagMatch {
                    flag: flag.clone(),
                    cursor_index,
                },
            );
        }
    }

    /// Whether the option declared at `depth` was matched.
    pub(crate) fn contains_option_at(&self, depth: usize, opt: &OptionDef) -> bool {
        self.option_matches
            .contains_key(&(depth, opt.name().to_string()))
    }

    /// Record an occurrence of the option declared at `depth`, accumulating
    /// into an existing match of the same declaration.
    pub(crate) fn push_option(
        &mut self,
        opt: &OptionDef,
        depth: usize,
        cursor_index: Option<usize>,
        args: Vec<ArgMatch>,
    ) {
        match self.option_matches.get_mut(&(depth, opt.name().to_string())) {
            Some(existing) => {
                existing.instance_count += 1;
                existing.passed_args.extend(args);
            }
            None => {
                self.option_matches.insert(
                    (depth, opt.name().to_string()),
                    OptionMatch {
                        option: opt.clone(),
                        depth,
                        instance_count: 1,
                        passed_args: args,
                        cursor_index,
                    },
                );
            }
        }
    }

    pub(crate) fn push_args(&mut self, args: Vec<ArgMatch>) {
        self.arg_matches.extend(args);
    }

    pub(crate) fn push_positional(&mut self, value: &str) {
        self.positional_args.push(value.to_string());
    }

    pub(crate) fn push_command(&mut self, name: &str) {
        self.command_path.push(name.to_string());
    }

    pub(crate) fn set_matched_command(&mut self, cmd: &Command, index: Option<usize>) {
        self.matched_cmd = cmd.clone();
        self.matched_cmd_idx = index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port_option() -> OptionDef {
        OptionDef::from_decl("-p --port <port-number>", "Port", false)
    }

    #[test]
    fn repeated_option_accumulates() {
        let root = Command::new("t");
        let opt = port_option();
        let arg = opt.get_argument().unwrap().clone();
        let mut m = ParserMatches::new(vec![], &root);
        m.push_option(&opt, 0, Some(0), vec![ArgMatch::new("80".into(), &arg, Some(1))]);
        m.push_option(&opt, 0, Some(2), vec![ArgMatch::new("90".into(), &arg, Some(3))]);

        assert_eq!(m.option_instance_count("port"), 2);
        assert_eq!(m.option_instance_count("-p"), 2);
        assert_eq!(m.get_option_value("--port"), Ok("80"));
        assert_eq!(m.get_all_option_values("port"), ["80", "90"]);
        assert_eq!(m.option_matches().next().unwrap().cursor_index(), Some(0));
    }

    #[test]
    fn missing_values_return_lookup_errors() {
        let m = ParserMatches::new(vec![], &Command::new("t"));
        assert_eq!(
            m.get_arg_value("<file>"),
            Err(LookupError::Argument("<file>".into()))
        );
        assert_eq!(
            m.get_option_value("--port"),
            Err(LookupError::Option("--port".into()))
        );
        assert!(m.get_all_option_values("--port").is_empty());
        assert_eq!(m.option_instance_count("--port"), 0);
    }

    #[test]
    fn option_without_value_is_present_but_has_no_value() {
        let opt = OptionDef::from_decl("-l --level [n]", "", false);
        let mut m = ParserMatches::new(vec![], &Command::new("t"));
        m.push_option(&opt, 0, Some(0), Vec::new());
        assert!(m.contains_option("level"));
        assert!(m.get_option_value("level").is_err());
    }

    #[test]
    fn same_name_at_two_depths_stays_apart() {
        let outer = port_option();
        let inner = OptionDef::from_decl("--port <n>", "", true);
        let outer_arg = outer.get_argument().unwrap().clone();
        let inner_arg = inner.get_argument().unwrap().clone();
        let mut m = ParserMatches::new(vec![], &Command::new("t"));
        m.push_option(&outer, 0, Some(0), vec![ArgMatch::new("80".into(), &outer_arg, Some(1))]);
        assert!(m.contains_option_at(0, &outer));
        assert!(!m.contains_option_at(1, &inner));

        m.push_option(&inner, 1, Some(3), vec![ArgMatch::new("90".into(), &inner_arg, Some(4))]);
        assert_eq!(m.option_matches().count(), 2);
        assert_eq!(m.get_option_value("port"), Ok("90"));
        assert_eq!(m.option_instance_count("port"), 1);
    }

    #[test]
    fn flags_are_recorded_once() {
        let flag = FlagDef::from_decl("-v --verbose", "");
        let mut m = ParserMatches::new(vec![], &Command::new("t"));
        m.push_flag(&flag, 0);
        m.push_flag(&flag, 1);
        assert_eq!(m.flag_matches().count(), 1);
        assert_eq!(m.flag_matches().next().unwrap().cursor_index(), 0);
        assert!(m.contains_flag("verbose"));
        assert!(m.contains_flag("-v"));
        assert!(!m.contains_flag("-x"));
    }
}
