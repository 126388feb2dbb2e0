//! The single forward pass over the raw tokens.
//!
//! For each unconsumed token, in order of precedence:
//! - after `--`, everything is positional
//! - a flag of the active command (or a global flag of an ancestor)
//! - an option of the active command, whose value(s) are bound immediately
//! - the `--` separator itself
//! - `--name=value`
//! - any other flag-like token: bundled short flags (`-abc`) or an error
//! - a subcommand name or alias
//! - a positional value, bound to the active command's arguments when the
//!   walk ends or a subcommand takes over

use crate::args::ArgDef;
use crate::command::Command;
use crate::error::{ParseError, ParseResult};
use crate::flags::FlagDef;
use crate::matches::{ArgMatch, ParserMatches};
use crate::options::OptionDef;
use crate::settings::Settings;
use crate::suggest;

/// Switches the parser into positional-only mode.
pub const SEPARATOR: &str = "--";

/// Tokens reserved for requesting help; they stop value binding without error.
pub fn is_help_token(token: &str) -> bool {
    token == "-h" || token == "--help"
}

/// A help token, or a bundle of short flags such as `-ah` that includes `h`.
fn requests_help(token: &str) -> bool {
    is_help_token(token)
        || (token.len() > 2
            && token.starts_with('-')
            && !token.starts_with("--")
            && token[1..].contains('h'))
}

/// Parse `argv` (without the program name) against `root`.
pub fn parse<S: AsRef<str>>(root: &Command, argv: &[S]) -> ParseResult<ParserMatches> {
    Parser::new(root).parse(argv)
}

/// Parser bound to a declared command tree.
///
/// Holds no per-invocation state, so one parser (or one tree shared between
/// threads) can serve any number of parses.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'c> {
    root: &'c Command,
}

impl<'c> Parser<'c> {
    pub fn new(root: &'c Command) -> Self {
        Self { root }
    }

    pub fn parse<S: AsRef<str>>(&self, argv: &[S]) -> ParseResult<ParserMatches> {
        let tokens: Vec<&str> = argv.iter().map(AsRef::as_ref).collect();
        tracing::debug!(command = self.root.name(), tokens = tokens.len(), "parsing");
        Walk::new(self.root, &tokens).run()
    }
}

/// A token that may be bound as an argument value.
#[derive(Debug, Clone, Copy)]
struct Candidate<'t> {
    index: usize,
    value: &'t str,
    /// The `value` half of `--name=value`; always accepted as a value.
    inline: bool,
}

struct Walk<'c, 't> {
    settings: &'c Settings,
    tokens: &'t [&'t str],
    consumed: Vec<bool>,
    active: &'c Command,
    ancestors: Vec<&'c Command>,
    cmd_idx: Option<usize>,
    positional_only: bool,
    pending: Vec<usize>,
    help_requested: bool,
    matches: ParserMatches,
}

impl<'c, 't> Walk<'c, 't> {
    fn new(root: &'c Command, tokens: &'t [&'t str]) -> Self {
        let help_requested = tokens
            .iter()
            .take_while(|t| **t != SEPARATOR)
            .any(|t| requests_help(t));
        Self {
            settings: root.get_settings(),
            tokens,
            consumed: vec![false; tokens.len()],
            active: root,
            ancestors: Vec::new(),
            cmd_idx: None,
            positional_only: false,
            pending: Vec::new(),
            help_requested,
            matches: ParserMatches::new(tokens.iter().map(|t| t.to_string()).collect(), root),
        }
    }

    fn run(mut self) -> ParseResult<ParserMatches> {
        for index in 0..self.tokens.len() {
            if !self.consumed[index] {
                self.classify(index)?;
            }
        }
        self.bind_positionals()?;
        self.audit()?;
        self.matches.set_matched_command(self.active, self.cmd_idx);
        Ok(self.matches)
    }

    fn classify(&mut self, index: usize) -> ParseResult<()> {
        let token = self.tokens[index];
        let active = self.active;

        if self.positional_only {
            self.consume(index);
            self.matches.push_positional(token);
            return Ok(());
        }

        if let Some(flag) = self.find_flag(token) {
            self.consume(index);
            self.record_flag(flag, index);
            return Ok(());
        }

        if let Some(opt) = active.find_option(token) {
            self.consume(index);
            return self.bind_option(opt, index, None);
        }

        if token == SEPARATOR {
            tracing::trace!(index, "entering positional-only mode");
            self.consume(index);
            self.positional_only = true;
            return Ok(());
        }

        if let Some((name, value)) = split_long_value(token) {
            self.consume(index);
            if let Some(opt) = active.find_option(name) {
                if opt.arguments().is_empty() {
                    return Err(ParseError::unresolved(
                        token,
                        format!("The option `{name}` does not take a value"),
                    ));
                }
                return self.bind_option(opt, index, Some(value));
            }
            if self.find_flag(name).is_some() {
                return Err(ParseError::unresolved(
                    token,
                    format!("The flag `{name}` does not take a value"),
                ));
            }
            return Err(ParseError::unknown_option(name).with_args([name, token]));
        }

        if self.is_flag_like(token) {
            return self.expand_bundle(index);
        }

        if let Some(sub) = active.find_subcommand(token) {
            self.consume(index);
            return self.enter_subcommand(sub, index);
        }

        self.queue_positional(index)
    }

    /// Flags of the active command, then global flags of its ancestors.
    fn find_flag(&self, token: &str) -> Option<&'c FlagDef> {
        let active: &'c Command = self.active;
        if let Some(flag) = active.find_flag(token) {
            return Some(flag);
        }
        self.ancestors
            .iter()
            .rev()
            .copied()
            .find_map(|cmd: &'c Command| cmd.find_flag(token).filter(|f| f.is_global()))
    }

    /// `-xyz` is three short flags; anything else flag-like is unknown.
    fn expand_bundle(&mut self, index: usize) -> ParseResult<()> {
        let token = self.tokens[index];
        let letters: Vec<char> = token.chars().skip(1).collect();
        if letters.len() < 2 || letters[0] == '-' {
            return Err(ParseError::unknown_option(token));
        }

        let mut flags = Vec::with_capacity(letters.len());
        for letter in letters {
            match self.find_flag(&format!("-{letter}")) {
                Some(flag) => flags.push(flag),
                None => return Err(ParseError::unknown_bundled_flag(letter, token)),
            }
        }

        self.consume(index);
        for flag in flags {
            self.record_flag(flag, index);
        }
        Ok(())
    }

    fn record_flag(&mut self, flag: &FlagDef, index: usize) {
        if flag.get_long() == Some("--help") {
            self.help_requested = true;
        }
        self.matches.push_flag(flag, index);
    }

    fn enter_subcommand(&mut self, sub: &'c Command, index: usize) -> ParseResult<()> {
        // The parent's positionals are only bound when some were given; a
        // subcommand taking over otherwise stands in for them, and only
        // their defaults are kept.
        if self.pending.is_empty() {
            self.bind_defaults()?;
        } else {
            self.bind_positionals()?;
        }
        tracing::debug!(command = sub.name(), index, "matched subcommand");
        self.ancestors.push(self.active);
        self.active = sub;
        self.cmd_idx = Some(index);
        self.matches.push_command(sub.name());
        Ok(())
    }

    fn queue_positional(&mut self, index: usize) -> ParseResult<()> {
        let token = self.tokens[index];
        let active = self.active;

        if self.pending.len() < active.positional_capacity() {
            self.pending.push(index);
            return Ok(());
        }

        if !active.get_subcommands().is_empty() {
            let suggestions = suggest::suggest(
                token,
                active.get_subcommands().iter().map(Command::name),
            );
            return Err(ParseError::unknown_command(token, suggestions));
        }

        if self.settings.allow_positional_args {
            self.consume(index);
            self.matches.push_positional(token);
            return Ok(());
        }

        Err(ParseError::unresolved(
            token,
            format!(
                "The command `{}` does not expect the value `{token}`",
                active.name()
            ),
        ))
    }

    fn bind_positionals(&mut self) -> ParseResult<()> {
        let candidates: Vec<Candidate<'t>> = std::mem::take(&mut self.pending)
            .into_iter()
            .map(|index| Candidate {
                index,
                value: self.tokens[index],
                inline: false,
            })
            .collect();
        let active: &'c Command = self.active;
        let bound = self.bind_arguments(active.get_arguments(), &candidates)?;
        self.matches.push_args(bound);
        Ok(())
    }

    fn bind_defaults(&mut self) -> ParseResult<()> {
        let active: &'c Command = self.active;
        let mut bound = Vec::new();
        for def in active.get_arguments() {
            let Some(default) = def.get_default() else {
                continue;
            };
            def.check(default)
                .map_err(|reason| ParseError::invalid_value(default, &def.display_name(), &reason))?;
            bound.push(ArgMatch::new(default.to_string(), def, None));
        }
        self.matches.push_args(bound);
        Ok(())
    }

    /// Depth of the active command below the root.
    fn depth(&self) -> usize {
        self.ancestors.len()
    }

    fn bind_option(
        &mut self,
        opt: &'c OptionDef,
        index: usize,
        inline: Option<&'t str>,
    ) -> ParseResult<()> {
        let mut candidates = Vec::new();
        if let Some(value) = inline {
            candidates.push(Candidate {
                index,
                value,
                inline: true,
            });
        }
        candidates.extend(self.following(index));

        let args = self.bind_arguments(opt.arguments(), &candidates)?;
        tracing::debug!(option = opt.name(), values = args.len(), "matched option");
        self.matches.push_option(opt, self.depth(), Some(index), args);
        Ok(())
    }

    /// Unconsumed tokens after `index`, up to the `--` separator.
    fn following(&self, index: usize) -> Vec<Candidate<'t>> {
        (index + 1..self.tokens.len())
            .take_while(|&i| self.tokens[i] != SEPARATOR)
            .filter(|&i| !self.consumed[i])
            .map(|i| Candidate {
                index: i,
                value: self.tokens[i],
                inline: false,
            })
            .collect()
    }

    fn bind_arguments(
        &mut self,
        defs: &'c [ArgDef],
        candidates: &[Candidate<'t>],
    ) -> ParseResult<Vec<ArgMatch>> {
        let mut bound = Vec::with_capacity(defs.len());
        let mut next = 0;

        for def in defs {
            let resolved = if def.is_variadic() {
                let mut parts = Vec::new();
                let mut first = None;
                for cand in &candidates[next.min(candidates.len())..] {
                    if self.is_value(cand) {
                        self.consume(cand.index);
                        first.get_or_insert(cand.index);
                        parts.push(cand.value);
                    }
                }
                next = candidates.len();
                match first {
                    Some(index) => Some((parts.join(" "), Some(index))),
                    None => self.fallback(def, None)?.map(|v| (v, None)),
                }
            } else {
                match candidates.get(next) {
                    Some(cand) if !cand.inline && is_help_token(cand.value) => break,
                    Some(cand) if self.is_value(cand) => {
                        next += 1;
                        self.consume(cand.index);
                        Some((cand.value.to_string(), Some(cand.index)))
                    }
                    other => self
                        .fallback(def, other.map(|c| c.value))?
                        .map(|v| (v, None)),
                }
            };

            let Some((value, cursor_index)) = resolved else {
                continue;
            };
            def.check(&value)
                .map_err(|reason| ParseError::invalid_value(&value, &def.display_name(), &reason))?;
            bound.push(ArgMatch::new(value, def, cursor_index));
        }

        Ok(bound)
    }

    /// No token for `def`: its default, an error if required, or nothing.
    fn fallback(&self, def: &ArgDef, found: Option<&str>) -> ParseResult<Option<String>> {
        if let Some(default) = def.get_default() {
            tracing::trace!(argument = def.name(), "using default value");
            return Ok(Some(default.to_string()));
        }
        if def.is_required() && !self.help_requested {
            return Err(ParseError::missing_argument(&def.display_name(), found));
        }
        Ok(None)
    }

    /// Required options of the matched command, unless help was requested.
    fn audit(&mut self) -> ParseResult<()> {
        if self.matches.contains_flag("--help") {
            return Ok(());
        }

        let active: &'c Command = self.active;
        let depth = self.depth();
        for opt in active.get_options().iter().filter(|o| o.is_required()) {
            if self.matches.contains_option_at(depth, opt) {
                continue;
            }
            let default = opt
                .get_argument()
                .and_then(|arg| arg.get_default().map(|value| (arg, value)));
            let Some((arg, value)) = default else {
                return Err(ParseError::missing_option(&opt.display_name()));
            };
            arg.check(value)
                .map_err(|reason| ParseError::invalid_value(value, &arg.display_name(), &reason))?;
            tracing::trace!(option = opt.name(), "required option filled from default");
            self.matches.push_option(
                opt,
                depth,
                None,
                vec![ArgMatch::new(value.to_string(), arg, None)],
            );
        }
        Ok(())
    }

    fn is_flag_like(&self, token: &str) -> bool {
        if token == "-" || !token.starts_with('-') {
            return false;
        }
        !(self.settings.allow_negative_numbers && is_number(&token[1..]))
    }

    fn is_value(&self, cand: &Candidate<'_>) -> bool {
        cand.inline || (!self.consumed[cand.index] && !self.is_flag_like(cand.value))
    }

    fn consume(&mut self, index: usize) {
        self.consumed[index] = true;
    }
}

/// Split `--name=value` on the first `=`.
fn split_long_value(token: &str) -> Option<(&str, &str)> {
    if !token.starts_with("--") {
        return None;
    }
    let (name, value) = token.split_once('=')?;
    (name.len() > 2).then_some((name, value))
}

fn is_number(s: &str) -> bool {
    let mut digits = false;
    let mut dot = false;
    for c in s.chars() {
        match c {
            '0'..='9' => digits = true,
            '.' if !dot => dot = true,
            _ => return false,
        }
    }
    digits
}
