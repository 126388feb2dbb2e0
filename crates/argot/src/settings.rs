//! Parser and help switches, configured on the root command.

use serde::{Deserialize, Serialize};

/// Behavior switches read from the root command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Treat tokens like `-5` or `-2.5` as values instead of options.
    pub allow_negative_numbers: bool,
    /// Collect surplus positional tokens instead of failing with
    /// `UnresolvedArgument`.
    pub allow_positional_args: bool,
    /// Leave out the `-V/--version` flag on the root command.
    pub disable_version_flag: bool,
    /// Add a `help <COMMAND>` subcommand to a root that has subcommands.
    pub include_help_subcommand: bool,
    /// Render an ALIASES section in help output.
    pub show_command_aliases: bool,
    /// Print the matched command's help after an error.
    pub show_help_on_all_errors: bool,
    /// Sort help sections alphabetically instead of declaration order.
    pub sort_items_alphabetically: bool,
}
