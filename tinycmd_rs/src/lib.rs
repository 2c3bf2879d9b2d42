//! # tinycmd
//!
//! **Declarative command-line parsing engine** - declare your syntax as a
//! sequence of typed option/argument/command calls and let the engine do
//! the matching, instead of hand-rolling an argument loop.
//!
//! ## Features
//!
//! - **Typed extraction** - options and positionals parse straight into
//!   `String`, the numeric widths, `bool`, `char`, `PathBuf`, decimals,
//!   timestamps, or `Option<T>` of any of them
//! - **Nested subcommands** - each command level scopes its own options;
//!   flags after the verb belong to the child, never the parent
//! - **Last-wins repeats** - `-v --verbose -v` is fine for scalars, and
//!   list declarations collect every occurrence in order
//! - **Reserved help** - `-h`/`--help` works at every nesting level and
//!   renders the deepest matched command's page
//! - **Precise errors** - the first problem wins and names its
//!   declaration, with "did you mean" suggestions for botched commands
//!
//! ## Quick Start
//!
//! ```rust
//! use tinycmd::{CommandLine, Outcome};
//!
//! let args = ["serve", "--port", "8080"];
//!
//! let mut cli = CommandLine::new("mytool", args).about("An example tool");
//! let verbose = cli.flag(('v', "verbose"), "Enable verbose output");
//! cli.command("serve", "Start the server", |cmd| {
//!     let port: u16 = cmd.option("port", |o| o.default(3000).help("Port to bind"));
//!     cmd.handler(move || {
//!         assert_eq!(port, 8080);
//!     });
//! });
//!
//! assert!(!verbose);
//! assert_eq!(cli.run(), Outcome::HandledByChild);
//! ```
//!
//! Parse outcomes map to conventional exit codes via
//! [`Outcome::exit_code`]; the engine itself never touches the process.

// ============================================================================
// Core Modules
// ============================================================================

/// Typed value conversion: the [`ArgValue`] trait and its built-in impls.
pub mod convert;

/// Per-declaration configuration ([`Decl`]) and option naming ([`OptionKey`]).
pub mod decl;

/// Help metadata collected during a parse, plus the default page renderer.
pub mod help;

/// Parse outcomes and the user-facing error taxonomy.
pub mod outcome;

/// The fluent parsing surface: [`CommandLine`].
pub mod parser;

mod tokens;

// ============================================================================
// Re-exports
// ============================================================================

pub use convert::ArgValue;
pub use decl::{Decl, OptionKey};
pub use help::{CommandHelp, EntryHelp, HelpInfo, render};
pub use outcome::{Outcome, UserError};
pub use parser::CommandLine;
