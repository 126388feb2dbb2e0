//! Printable summaries of a parse outcome.

use argot::{ErrorKind, ParseError, ParserMatches};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MatchReport {
    pub command_path: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_index: Option<usize>,
    pub flags: Vec<String>,
    pub options: IndexMap<String, Vec<String>>,
    pub args: IndexMap<String, String>,
    pub positional: Vec<String>,
}

impl From<&ParserMatches> for MatchReport {
    fn from(m: &ParserMatches) -> Self {
        Self {
            command_path: m.command_path().to_vec(),
            command_index: m.matched_command_index(),
            flags: m.flag_matches().map(|f| f.flag().name().to_string()).collect(),
            options: m
                .option_matches()
                .map(|o| {
                    let values = o.passed_args().iter().map(|a| a.value().to_string()).collect();
                    (o.option().name().to_string(), values)
                })
                .collect(),
            args: m
                .arg_matches()
                .iter()
                .map(|a| (a.argument().name().to_string(), a.value().to_string()))
                .collect(),
            positional: m.positional_args().to_vec(),
        }
    }
}

impl MatchReport {
    /// Human-readable form, one section per kind of match.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "command: {}", self.command_path.join(" "));
        if !self.flags.is_empty() {
            let _ = writeln!(out, "flags: {}", self.flags.join(", "));
        }
        if !self.options.is_empty() {
            let _ = writeln!(out, "options:");
            for (name, values) in &self.options {
                let _ = writeln!(out, "  {name} = {}", values.join(", "));
            }
        }
        if !self.args.is_empty() {
            let _ = writeln!(out, "args:");
            for (name, value) in &self.args {
                let _ = writeln!(out, "  {name} = {value}");
            }
        }
        if !self.positional.is_empty() {
            let _ = writeln!(out, "positional: {}", self.positional.join(" "));
        }
        out
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub exit_code: i32,
    pub message: String,
    pub context: String,
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl From<&ParseError> for ErrorReport {
    fn from(err: &ParseError) -> Self {
        Self {
            kind: err.kind(),
            exit_code: err.exit_code(),
            message: err.message().to_string(),
            context: err.context().to_string(),
            args: err.args().to_vec(),
            suggestions: err.suggestions().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argot::Command;

    fn app() -> Command {
        Command::app("docker").subcommand(
            Command::new("image")
                .argument("<image-name>", "")
                .flag("-a --all", "")
                .option("-p --port <int:port>", ""),
        )
    }

    #[test]
    fn report_lists_every_match() {
        let m = argot::parse(&app(), &["image", "nginx", "-a", "-p", "80", "-p", "90"]).unwrap();
        let report = MatchReport::from(&m);
        assert_eq!(report.command_path, ["docker", "image"]);
        assert_eq!(report.command_index, Some(0));
        assert_eq!(report.flags, ["all"]);
        assert_eq!(report.options["port"], ["80", "90"]);
        assert_eq!(report.args["image-name"], "nginx");

        let text = report.render();
        assert!(text.contains("command: docker image\n"));
        assert!(text.contains("  port = 80, 90\n"));
        assert!(!text.contains("positional"));
    }

    #[test]
    fn error_report_serializes_kind() {
        let err = argot::parse(&app(), &["imgae"]).unwrap_err();
        let value = serde_json::to_value(ErrorReport::from(&err)).unwrap();
        assert_eq!(value["kind"], "UnknownCommand");
        assert_eq!(value["exit-code"], 40);
        assert_eq!(value["suggestions"][0], "image");
    }
}
