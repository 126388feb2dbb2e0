//! Command-line argument parsing for nested subcommand trees.
//!
//! Declare the interface once as a [`Command`] tree, then parse any number of
//! token lists against it:
//!
//! ```
//! use argot::Command;
//!
//! let app = Command::app("docker").subcommand(
//!     Command::new("image")
//!         .argument("<image-name>", "The image to use")
//!         .option("-p --port <int:port-number>", "Port to expose"),
//! );
//!
//! let matches = argot::parse(&app, &["image", "nginx", "--port=8080"]).unwrap();
//! assert_eq!(matches.command_path(), ["docker", "image"]);
//! assert_eq!(matches.get_arg_value("image-name"), Ok("nginx"));
//! assert_eq!(matches.get_option_value("--port"), Ok("8080"));
//! ```
//!
//! The parser never prints or exits. Failures come back as a [`ParseError`]
//! that [`render::error`] turns into terminal output and whose
//! [`exit_code`](ParseError::exit_code) a binary may exit with.

pub mod args;
pub mod command;
pub mod error;
pub mod flags;
pub mod matches;
pub mod options;
pub mod parser;
pub mod render;
pub mod settings;
pub mod suggest;

pub use args::{ArgDef, ArgType, UnknownArgType, Validator};
pub use command::Command;
pub use error::{ErrorKind, ParseError, ParseResult};
pub use flags::FlagDef;
pub use matches::{ArgMatch, FlagMatch, LookupError, OptionMatch, ParserMatches};
pub use options::OptionDef;
pub use parser::{Parser, parse};
pub use settings::Settings;
