//! Plain-text help, version and error output.

use crate::args::ArgDef;
use crate::command::Command;
use crate::error::ParseError;
use crate::flags::FlagDef;
use crate::options::OptionDef;
use crate::settings::Settings;

/// Printed after every rendered error.
pub const HINT: &str = "Run a COMMAND with --help for detailed usage information";

const WRAP_WIDTH: usize = 60;

/// One row of a help section: the invocation form and its description.
trait HelpItem {
    fn left(&self) -> String;
    fn right(&self) -> String;
}

impl HelpItem for ArgDef {
    fn left(&self) -> String {
        self.display_name()
    }

    fn right(&self) -> String {
        let mut out = self.help_text().trim().to_string();
        if !self.get_valid_values().is_empty() {
            push_note(&mut out, &format!("[possible values: {}]", self.get_valid_values().join(", ")));
        }
        if let Some(default) = self.get_default() {
            push_note(&mut out, &format!("(default: {default})"));
        }
        out
    }
}

impl HelpItem for FlagDef {
    fn left(&self) -> String {
        forms(self.get_short(), self.get_long())
    }

    fn right(&self) -> String {
        self.help_text().trim().to_string()
    }
}

impl HelpItem for OptionDef {
    fn left(&self) -> String {
        let mut out = forms(self.get_short(), self.get_long());
        if let Some(arg) = self.get_argument() {
            out.push(' ');
            out.push_str(&arg.display_name());
        }
        out
    }

    fn right(&self) -> String {
        let mut out = self.help_text().trim().to_string();
        if self.is_required() {
            push_note(&mut out, "(required)");
        }
        if let Some(default) = self.get_argument().and_then(ArgDef::get_default) {
            push_note(&mut out, &format!("(default: {default})"));
        }
        out
    }
}

impl HelpItem for Command {
    fn left(&self) -> String {
        self.name().to_string()
    }

    fn right(&self) -> String {
        self.help_text().trim().to_string()
    }
}

fn forms(short: Option<&str>, long: Option<&str>) -> String {
    match (short, long) {
        (Some(s), Some(l)) => format!("{s}, {l}"),
        (Some(s), None) => s.to_string(),
        // keep long-only forms aligned with `-x, --long` rows
        (None, Some(l)) => format!("    {l}"),
        (None, None) => String::new(),
    }
}

fn push_note(out: &mut String, note: &str) {
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(note);
}

fn section<T: HelpItem>(out: &mut String, title: &str, items: &[&T], sort: bool) {
    if items.is_empty() {
        return;
    }
    let mut rows: Vec<(String, String)> = items.iter().map(|i| (i.left(), i.right())).collect();
    if sort {
        rows.sort_by(|a, b| a.0.trim_start().cmp(b.0.trim_start()));
    }

    out.push_str(&format!("\n{title}:\n"));
    let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    for (left, help) in rows {
        if help.is_empty() {
            out.push_str(&format!("    {left}\n"));
        } else {
            out.push_str(&format!("    {left:width$}    {help}\n"));
        }
    }
}

/// Render help for the last command of `path`, a chain from the root.
///
/// Global flags declared on ancestors are listed with the command's own
/// flags unless a flag with the same form shadows them.
pub fn help(path: &[&Command], settings: &Settings) -> String {
    let Some((cmd, ancestors)) = path.split_last() else {
        return String::new();
    };

    let mut flags: Vec<&FlagDef> = cmd.get_flags().iter().collect();
    for ancestor in ancestors.iter().rev() {
        for flag in ancestor.get_flags().iter().filter(|f| f.is_global()) {
            let shadowed = flags.iter().any(|f| {
                (flag.get_short().is_some() && f.get_short() == flag.get_short())
                    || (flag.get_long().is_some() && f.get_long() == flag.get_long())
            });
            if !shadowed {
                flags.push(flag);
            }
        }
    }

    let mut out = String::new();
    if !cmd.help_text().trim().is_empty() {
        out.push_str(cmd.help_text().trim());
        out.push('\n');
    }
    if !cmd.get_author().trim().is_empty() {
        out.push_str(cmd.get_author().trim());
        out.push('\n');
    }

    let prefix = ancestors.iter().map(|c| c.name()).collect::<Vec<_>>().join(" ");
    let usage = match cmd.get_usage() {
        Some(custom) if prefix.is_empty() || custom.starts_with(&prefix) => custom.to_string(),
        Some(custom) => format!("{prefix} {custom}"),
        None => {
            let mut usage: Vec<&str> = path.iter().map(|c| c.name()).collect();
            if !flags.is_empty() {
                usage.push("[FLAGS]");
            }
            if !cmd.get_options().is_empty() {
                usage.push("[OPTIONS]");
            }
            if !cmd.get_arguments().is_empty() {
                usage.push("<ARGS>");
            }
            if !cmd.get_subcommands().is_empty() {
                usage.push("<SUBCOMMAND>");
            }
            usage.join(" ")
        }
    };
    out.push_str(&format!("\nUSAGE:\n    {usage}\n"));

    if settings.show_command_aliases && !cmd.get_aliases().is_empty() {
        out.push_str(&format!("\nALIASES:\n    {}\n", cmd.get_aliases().join(", ")));
    }

    let sort = settings.sort_items_alphabetically;
    let args: Vec<&ArgDef> = cmd.get_arguments().iter().collect();
    let options: Vec<&OptionDef> = cmd.get_options().iter().collect();
    section(&mut out, "ARGS", &args, sort);
    section(&mut out, "FLAGS", &flags, sort);
    section(&mut out, "OPTIONS", &options, sort);

    let (groups, ungrouped) = group_subcommands(cmd);
    if groups.is_empty() {
        section(&mut out, "SUBCOMMANDS", &ungrouped, sort);
    } else {
        for (title, members) in &groups {
            section(&mut out, title, members, sort);
        }
        section(&mut out, "OTHER COMMANDS", &ungrouped, sort);
    }

    if !cmd.get_discussion().trim().is_empty() {
        out.push_str("\nDISCUSSION:\n");
        for line in wrap(cmd.get_discussion(), WRAP_WIDTH) {
            out.push_str(&format!("    {line}\n"));
        }
    }

    if !cmd.get_subcommands().is_empty() {
        out.push('\n');
        out.push_str(HINT);
        out.push('\n');
    }
    out
}

/// Subcommands by group, in order of first appearance, plus the ungrouped rest.
fn group_subcommands(cmd: &Command) -> (Vec<(&str, Vec<&Command>)>, Vec<&Command>) {
    let mut groups: Vec<(&str, Vec<&Command>)> = Vec::new();
    let mut ungrouped = Vec::new();
    for sub in cmd.get_subcommands() {
        let Some(group) = sub.get_group() else {
            ungrouped.push(sub);
            continue;
        };
        match groups.iter_mut().find(|(title, _)| *title == group) {
            Some((_, members)) => members.push(sub),
            None => groups.push((group, vec![sub])),
        }
    }
    (groups, ungrouped)
}

/// Render a version message: `name version`, or just the name, followed by
/// the author when one is set.
pub fn version(cmd: &Command) -> String {
    let mut out = if cmd.get_version().trim().is_empty() {
        format!("{}\n", cmd.name())
    } else {
        format!("{} {}\n", cmd.name(), cmd.get_version().trim())
    };
    if !cmd.get_author().trim().is_empty() {
        out.push_str(cmd.get_author().trim());
        out.push('\n');
    }
    out
}

/// Render a parse failure for a terminal.
pub fn error(err: &ParseError) -> String {
    let mut out = format!("error:  {}\n", err.message());
    if !err.context().trim().is_empty() {
        out.push('\n');
        for line in wrap(err.context(), WRAP_WIDTH) {
            out.push_str(&format!("    {line}\n"));
        }
    }
    out.push('\n');
    out.push_str(HINT);
    out.push('\n');
    out
}

/// Greedy word wrap; words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn image_cli() -> Command {
        Command::app("docker")
            .help("A container runtime")
            .version("1.2.0")
            .flag("-v --verbose", "Verbose output")
            .subcommand(
                Command::new("image")
                    .alias("i")
                    .help("Manage images")
                    .argument("<image-name>", "The image to use")
                    .argument("[tag]", "")
                    .option("-p --port <int:port-number>", "Port to expose"),
            )
    }

    #[test]
    fn help_lists_sections_and_usage() {
        let app = image_cli();
        let text = help(&[&app], app.get_settings());
        assert!(text.starts_with("A container runtime\n"));
        assert!(text.contains("USAGE:\n    docker [FLAGS] <SUBCOMMAND>\n"));
        assert!(text.contains("FLAGS:\n"));
        assert!(text.contains("-v, --verbose"));
        assert!(text.contains("SUBCOMMANDS:\n"));
        assert!(text.contains("image"));
        assert!(text.contains(HINT));
        assert!(!text.contains("OPTIONS:"));
    }

    #[test]
    fn subcommand_help_shows_path_and_inherited_help_flag() {
        let app = image_cli();
        let path = app.find_path(&["image"]).unwrap();
        let text = help(&path, app.get_settings());
        assert!(text.contains("USAGE:\n    docker image [FLAGS] [OPTIONS] <ARGS>\n"));
        assert!(text.contains("<image-name>"));
        assert!(text.contains("-p, --port <port-number>"));
        // one row for -h, --help despite being declared on both levels
        assert_eq!(text.matches("-h, --help").count(), 1);
        // root-only, non-global
        assert!(!text.contains("--verbose"));
        assert!(!text.contains("ALIASES"));
    }

    #[test]
    fn columns_are_aligned() {
        let cmd = Command::new("t")
            .flag("-a --all", "All")
            .flag("-q --quiet-mode", "Quiet");
        let text = help(&[&cmd], cmd.get_settings());
        let starts: Vec<usize> = text
            .lines()
            .filter(|l| l.starts_with("    -"))
            .filter_map(|l| l.find("All").or_else(|| l.find("Quiet")).or_else(|| l.find("Print")))
            .collect();
        assert_eq!(starts.len(), 3);
        assert!(starts.windows(2).all(|w| w[0] == w[1]), "{text}");
    }

    #[test]
    fn aliases_and_sorting_follow_settings() {
        let settings = Settings {
            show_command_aliases: true,
            sort_items_alphabetically: true,
            ..Default::default()
        };
        let cmd = Command::new("image")
            .alias("i")
            .alias("img")
            .subcommand(Command::new("rm"))
            .subcommand(Command::new("build"));
        let text = help(&[&cmd], &settings);
        assert!(text.contains("ALIASES:\n    i, img\n"));
        let build = text.find("    build").unwrap();
        let rm = text.find("    rm").unwrap();
        assert!(build < rm);
    }

    #[test]
    fn defaults_and_required_are_noted() {
        let cmd = Command::new("t")
            .add_argument(ArgDef::new("[level]").help("Level").default_value("3"))
            .required_option("--out <file>", "Output");
        let text = help(&[&cmd], cmd.get_settings());
        assert!(text.contains("Level (default: 3)"));
        assert!(text.contains("Output (required)"));
        assert!(text.contains("    --out <file>"));
    }

    #[test]
    fn version_falls_back_to_name() {
        assert_eq!(version(&image_cli()), "docker 1.2.0\n");
        assert_eq!(version(&Command::new("bare")), "bare\n");
        assert_eq!(
            version(&image_cli().author("Jane Roe <jane@example.com>")),
            "docker 1.2.0\nJane Roe <jane@example.com>\n"
        );
    }

    #[test]
    fn author_and_discussion_are_shown() {
        let cmd = Command::app("tool")
            .help("Does things")
            .author("Jane Roe")
            .discussion(
                "Values are read from the environment first and the command line \
                 second, so flags always win over exported variables.",
            );
        let text = help(&[&cmd], cmd.get_settings());
        assert!(text.starts_with("Does things\nJane Roe\n"), "{text}");
        let discussion = text.find("DISCUSSION:\n").unwrap();
        assert!(discussion > text.find("FLAGS:").unwrap());
        let body: Vec<&str> = text[discussion..].lines().skip(1).collect();
        assert!(body.len() >= 2, "{text}");
        assert!(body.iter().all(|l| l.starts_with("    ") && l.len() <= WRAP_WIDTH + 4));
    }

    #[test]
    fn custom_usage_replaces_generated_line() {
        let app = Command::app("docker").subcommand(
            Command::new("image")
                .usage("image [OPTIONS] <NAME>")
                .argument("<name>", ""),
        );
        let path = app.find_path(&["image"]).unwrap();
        let text = help(&path, app.get_settings());
        assert!(text.contains("USAGE:\n    docker image [OPTIONS] <NAME>\n"), "{text}");

        let app = Command::app("docker").subcommand(Command::new("ps").usage("docker ps [-a]"));
        let path = app.find_path(&["ps"]).unwrap();
        assert!(help(&path, app.get_settings()).contains("USAGE:\n    docker ps [-a]\n"));
    }

    #[test]
    fn grouped_subcommands_get_their_own_sections() {
        let app = Command::app("docker")
            .subcommand(Command::new("image").group("MANAGEMENT COMMANDS"))
            .subcommand(Command::new("run"))
            .subcommand(Command::new("volume").group("MANAGEMENT COMMANDS"));
        let text = help(&[&app], app.get_settings());
        assert!(!text.contains("SUBCOMMANDS:"), "{text}");
        let management = text.find("MANAGEMENT COMMANDS:\n").unwrap();
        let other = text.find("OTHER COMMANDS:\n").unwrap();
        assert!(management < other);
        assert!(text[management..other].contains("image"));
        assert!(text[management..other].contains("volume"));
        assert!(text[other..].contains("run"));
    }

    #[test]
    fn help_subcommand_is_listed() {
        let app = Command::app("docker")
            .settings(Settings {
                include_help_subcommand: true,
                ..Default::default()
            })
            .subcommand(Command::new("image"));
        let text = help(&[&app], app.get_settings());
        assert!(text.contains("    help "), "{text}");
        assert!(text.contains("Print out help information for the passed command"));
    }

    #[test]
    fn error_wraps_context_and_ends_with_hint() {
        let err = ParseError::new(
            ErrorKind::UnknownCommand,
            "no such subcommand found: `invalid`",
            "The subcommand `invalid` could not be resolved, did you mean `container`? \
             Check the list of subcommands with the help flag.",
        );
        let text = error(&err);
        assert!(text.starts_with("error:  no such subcommand found: `invalid`\n"));
        assert!(text.trim_end().ends_with(HINT));
        for line in text.lines().filter(|l| l.starts_with("    ")) {
            assert!(line.len() <= WRAP_WIDTH + 4, "{line}");
        }
        assert!(text.contains("`container`?"));
    }

    #[test]
    fn wrap_keeps_long_words_whole() {
        assert_eq!(wrap("aaa bbb ccc", 7), ["aaa bbb", "ccc"]);
        assert_eq!(wrap("abcdefghij x", 4), ["abcdefghij", "x"]);
        assert!(wrap("   ", 10).is_empty());
    }
}
