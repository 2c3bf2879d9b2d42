//! The fluent parsing surface.
//!
//! A [`CommandLine`] is created over the raw tokens and driven by a
//! sequence of declaration calls: each `option`/`argument` call matches and
//! consumes its tokens immediately and returns the typed value, `command`
//! recurses into a nested configuration when its verb is the next token,
//! and `finish`/`run` classify what happened. Once a parse is decided
//! (error, help, matched child), every later call degrades to a guarded
//! no-op that still returns a value (default or zero), so straight-line
//! configuration code never has to branch on parse state.

use std::io::Write;
use std::mem;

use tracing::{debug, trace};

use crate::convert::{ArgValue, ConverterRegistry};
use crate::decl::{Decl, OptionKey};
use crate::help::{self, EntryHelp, HelpInfo};
use crate::outcome::{Outcome, UserError};
use crate::tokens::{Occurrence, TokenStore};

/// Where a resolved option value came from.
enum ValueSource {
    /// Inline suffix of the occurrence token, starting at this byte offset.
    Inline { token: usize, start: usize },
    /// The separate token consumed right after the occurrence.
    Token(usize),
    /// Bare flag occurrence; no text to parse.
    Presence,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    /// Declarations at the current level still match and extract.
    Active,
    /// A nested command matched; the rest of this configuration is inert.
    Interrupted,
}

/// A single in-progress parse. Created fresh per argument vector, never
/// shared or reused.
///
/// The lifetime parameter bounds the handler closures stored via
/// [`CommandLine::handler`].
pub struct CommandLine<'h> {
    tokens: TokenStore,
    info: HelpInfo,
    converters: ConverterRegistry,
    phase: Phase,
    error: Option<UserError>,
    help_requested: bool,
    handled_by_child: bool,
    handler: Option<Box<dyn FnOnce() + 'h>>,
    // Per-level flags, saved and restored around each command descent.
    help_checked: bool,
    list_argument_seen: bool,
}

impl<'h> CommandLine<'h> {
    /// Start a parse over explicit tokens. `program` is the executable name
    /// shown in help output.
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let tokens = TokenStore::tokenize(args.into_iter().map(Into::into).collect());
        CommandLine {
            tokens,
            info: HelpInfo::new(program.into()),
            converters: ConverterRegistry::default(),
            phase: Phase::Active,
            error: None,
            help_requested: false,
            handled_by_child: false,
            handler: None,
            help_checked: false,
            list_argument_seen: false,
        }
    }

    /// Start a parse over the process arguments, with `argv[0]` stripped.
    pub fn from_env(program: impl Into<String>) -> Self {
        Self::new(program, std::env::args().skip(1))
    }

    /// Description paragraph shown at the top of the help page.
    pub fn about(mut self, text: impl Into<String>) -> Self {
        self.info.about = Some(text.into());
        self
    }

    /// Register a conversion override consulted before the built-in
    /// parsing for `T`, at every level of this parse.
    pub fn converter<T: ArgValue>(mut self, parse: impl Fn(&str) -> Option<T> + 'static) -> Self {
        self.converters.register(parse);
        self
    }

    /// Declared-shape metadata collected so far. After `-h`/`--help` this
    /// keeps filling in while extraction stays off, which is what the help
    /// renderer consumes.
    pub fn help_info(&self) -> &HelpInfo {
        &self.info
    }

    // ------------------------------------------------------------------
    // Options
    // ------------------------------------------------------------------

    /// Declare a scalar option. Repeated occurrences are allowed and the
    /// last one (by token position, whatever its spelling) wins. Returns
    /// the extracted value; the configured default when absent; the type's
    /// zero value once the parse is already decided.
    pub fn option<'k, T: ArgValue>(
        &mut self,
        key: impl Into<OptionKey<'k>>,
        config: impl FnOnce(Decl<T>) -> Decl<T>,
    ) -> T {
        if !self.extracting_or_describing() {
            return T::fallback();
        }
        let key = key.into();
        let mut decl = config(Decl::new());
        self.collect_option(&key, &decl, T::is_flag(), false);
        if !self.extracting() {
            return T::fallback();
        }

        let mut last: Option<(Occurrence, ValueSource)> = None;
        let mut from = 0;
        while let Some(occ) = self.tokens.next_occurrence(key.alias(), key.long(), from) {
            from = occ.token + 1;
            match self.resolve_value::<T>(occ) {
                Ok(source) => last = Some((occ, source)),
                Err(error) => {
                    self.fail(error);
                    return T::fallback();
                }
            }
        }

        match last {
            Some((occ, source)) => match self.parse_source::<T>(occ, &source) {
                Ok(value) => value,
                Err(error) => {
                    self.fail(error);
                    T::fallback()
                }
            },
            None if decl.required => {
                self.fail(UserError::OptionMissing {
                    name: key.display(),
                });
                T::fallback()
            }
            None => decl.take_default().unwrap_or_else(T::fallback),
        }
    }

    /// Declare a repeatable option; all occurrences are collected in token
    /// order, each parsed individually.
    pub fn option_list<'k, T: ArgValue>(
        &mut self,
        key: impl Into<OptionKey<'k>>,
        config: impl FnOnce(Decl<Vec<T>>) -> Decl<Vec<T>>,
    ) -> Vec<T> {
        if !self.extracting_or_describing() {
            return Vec::new();
        }
        let key = key.into();
        let mut decl = config(Decl::new());
        self.collect_option(&key, &decl, T::is_flag(), true);
        if !self.extracting() {
            return Vec::new();
        }

        let mut items = Vec::new();
        let mut from = 0;
        while let Some(occ) = self.tokens.next_occurrence(key.alias(), key.long(), from) {
            from = occ.token + 1;
            let parsed = self
                .resolve_value::<T>(occ)
                .and_then(|source| self.parse_source::<T>(occ, &source));
            match parsed {
                Ok(value) => items.push(value),
                Err(error) => {
                    self.fail(error);
                    return Vec::new();
                }
            }
        }

        if !items.is_empty() {
            return items;
        }
        if decl.required {
            self.fail(UserError::OptionMissing {
                name: key.display(),
            });
            return Vec::new();
        }
        decl.take_default().unwrap_or_default()
    }

    /// Boolean option shorthand: present ⇒ `true`, `=false`/`=0` are
    /// explicit overrides, absent ⇒ `false`.
    pub fn flag<'k>(&mut self, key: impl Into<OptionKey<'k>>, help: &str) -> bool {
        self.option(key, |decl| decl.help(help))
    }

    // ------------------------------------------------------------------
    // Positional arguments
    // ------------------------------------------------------------------

    /// Declare a positional argument, bound to the next unconsumed token.
    /// Declaration order determines binding order.
    ///
    /// # Panics
    ///
    /// If an argument list was already declared at this level.
    pub fn argument<T: ArgValue>(&mut self, config: impl FnOnce(Decl<T>) -> Decl<T>) -> T {
        if !self.extracting_or_describing() {
            return T::fallback();
        }
        assert!(
            !self.list_argument_seen,
            "scalar arguments must be declared before an argument list"
        );
        let mut decl = config(Decl::new());
        self.collect_argument(&decl, false);
        if !self.extracting() {
            return T::fallback();
        }

        match self.bind_argument::<T>(&decl.display_placeholder()) {
            Some(Ok(value)) => value,
            Some(Err(error)) => {
                self.fail(error);
                T::fallback()
            }
            None if decl.required => {
                self.fail(UserError::ArgumentMissing {
                    name: decl.display_placeholder(),
                });
                T::fallback()
            }
            None => decl.take_default().unwrap_or_else(T::fallback),
        }
    }

    /// Declare a greedy trailing argument list; it binds every remaining
    /// unconsumed token in order. Must come after all scalar arguments at
    /// this level.
    pub fn argument_list<T: ArgValue>(
        &mut self,
        config: impl FnOnce(Decl<Vec<T>>) -> Decl<Vec<T>>,
    ) -> Vec<T> {
        if !self.extracting_or_describing() {
            return Vec::new();
        }
        self.list_argument_seen = true;
        let mut decl = config(Decl::new());
        self.collect_argument(&decl, true);
        if !self.extracting() {
            return Vec::new();
        }

        let placeholder = decl.display_placeholder();
        let mut items = Vec::new();
        loop {
            match self.bind_argument::<T>(&placeholder) {
                Some(Ok(value)) => items.push(value),
                Some(Err(error)) => {
                    self.fail(error);
                    return Vec::new();
                }
                None => break,
            }
        }

        if !items.is_empty() {
            return items;
        }
        if decl.required {
            self.fail(UserError::ArgumentMissing { name: placeholder });
            return Vec::new();
        }
        decl.take_default().unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Commands, checks, handlers
    // ------------------------------------------------------------------

    /// Declare a nested command. If the next unconsumed token equals
    /// `name`, it is consumed and `config` runs against the remaining
    /// tokens as its own level; everything declared after this call at the
    /// current level is then skipped. Declare options before commands:
    /// global flags must precede the verb.
    pub fn command(
        &mut self,
        name: &str,
        summary: &str,
        config: impl FnOnce(&mut CommandLine<'h>),
    ) -> &mut Self {
        self.command_impl(name, summary, false, config)
    }

    /// A command omitted from help output; matching is unaffected.
    pub fn hidden_command(
        &mut self,
        name: &str,
        config: impl FnOnce(&mut CommandLine<'h>),
    ) -> &mut Self {
        self.command_impl(name, "", true, config)
    }

    fn command_impl(
        &mut self,
        name: &str,
        summary: &str,
        hidden: bool,
        config: impl FnOnce(&mut CommandLine<'h>),
    ) -> &mut Self {
        if self.phase != Phase::Active {
            return self;
        }
        if !hidden {
            self.info.add_command(name, summary);
        }
        if self.error.is_some() {
            return self;
        }
        self.probe_help();
        if self.error.is_some() {
            return self;
        }

        let Some(index) = self.tokens.next_unconsumed() else {
            return self;
        };
        if self.tokens.text(index) != name {
            return self;
        }

        self.tokens.consume(index);
        debug!(command = name, token = index, "descending into nested command");
        self.info.enter_command(name, summary);
        // A matched child owns the parse; whatever handler this level
        // stored is out.
        self.handler = None;
        self.handled_by_child = true;

        let parent_help_checked = mem::replace(&mut self.help_checked, false);
        let parent_list_seen = mem::replace(&mut self.list_argument_seen, false);
        config(self);
        self.help_checked = parent_help_checked;
        self.list_argument_seen = parent_list_seen;
        self.phase = Phase::Interrupted;
        self
    }

    /// Validate already-extracted values. The predicate runs only while
    /// the parse is clean, never after an error, and never when help was
    /// requested.
    pub fn check(&mut self, predicate: impl FnOnce() -> bool, message: &str) -> &mut Self {
        if self.phase != Phase::Active || self.error.is_some() {
            return self;
        }
        self.probe_help();
        if self.help_requested || self.error.is_some() {
            return self;
        }
        if !predicate() {
            self.fail(UserError::CheckFailed {
                message: message.to_string(),
            });
        }
        self
    }

    /// Store the closure [`CommandLine::run`] invokes when this level owns
    /// the parse. A nested command that matches afterwards replaces it with
    /// its own.
    pub fn handler(&mut self, handler: impl FnOnce() + 'h) -> &mut Self {
        if self.phase != Phase::Active || self.error.is_some() {
            return self;
        }
        self.probe_help();
        if self.help_requested || self.error.is_some() {
            return self;
        }
        self.handler = Some(Box::new(handler));
        self
    }

    // ------------------------------------------------------------------
    // Completion
    // ------------------------------------------------------------------

    /// Conclude the parse and classify it. Any stored handler is dropped
    /// unrun; use [`CommandLine::run`] to have it invoked.
    pub fn finish(mut self) -> Outcome {
        self.conclude()
    }

    /// Conclude the parse and act on the outcome: invoke the stored handler
    /// on success, render the help page when requested, print the error and
    /// contextual help otherwise. Writes to stdout/stderr; see
    /// [`CommandLine::run_with`] for injected sinks.
    pub fn run(self) -> Outcome {
        let width = help::terminal_width();
        self.run_with(width, &mut std::io::stdout(), &mut std::io::stderr())
    }

    /// [`CommandLine::run`] with explicit wrap width and output sinks, for
    /// embedding and tests.
    pub fn run_with(mut self, width: usize, out: &mut dyn Write, err: &mut dyn Write) -> Outcome {
        let outcome = self.conclude();
        match &outcome {
            Outcome::HelpRequested => {
                let mut page = String::new();
                help::render(&self.info, width, &mut page);
                let _ = out.write_all(page.as_bytes());
            }
            Outcome::Error(error) => {
                let mut page = String::new();
                help::render(&self.info, width, &mut page);
                let _ = write!(err, "Error: {error}\n\n{page}");
            }
            Outcome::Success | Outcome::HandledByChild => {
                if let Some(handler) = self.handler.take() {
                    handler();
                }
            }
        }
        outcome
    }

    fn conclude(&mut self) -> Outcome {
        // Covers configurations whose declarations never probed (or that
        // have no declarations at all).
        if self.error.is_none() && !self.help_requested {
            self.probe_help();
        }

        let outcome = if self.help_requested {
            Outcome::HelpRequested
        } else if let Some(error) = self.error.take() {
            Outcome::Error(error)
        } else if let Some(index) = self.tokens.next_unconsumed() {
            Outcome::Error(self.unknown_token_error(index))
        } else if self.handled_by_child {
            Outcome::HandledByChild
        } else {
            Outcome::Success
        };
        debug!(?outcome, "parse concluded");
        outcome
    }

    fn unknown_token_error(&self, index: usize) -> UserError {
        let token = self.tokens.text(index);
        if !token.starts_with('-') {
            if let Some(suggestion) = self.closest_command(token) {
                return UserError::UnknownCommand {
                    token: token.to_string(),
                    suggestion,
                };
            }
        }
        UserError::UnknownOption {
            token: token.to_string(),
        }
    }

    /// Closest declared command within Levenshtein distance 2, if any.
    /// Distance 0 is excluded: an exact leftover means the command was
    /// declared but could no longer match, and suggesting it back would
    /// just be noise.
    fn closest_command(&self, input: &str) -> Option<String> {
        let input = input.to_lowercase();
        let mut best: Option<(usize, &str)> = None;
        for command in &self.info.commands {
            let distance = strsim::levenshtein(&input, &command.name);
            if (1..=2).contains(&distance) && best.is_none_or(|(d, _)| distance < d) {
                best = Some((distance, &command.name));
            }
        }
        best.map(|(_, name)| name.to_string())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn extracting_or_describing(&self) -> bool {
        self.phase == Phase::Active
    }

    /// True when this declaration should actually match tokens. Runs the
    /// per-level help probe, so extraction never sees a help token as a
    /// plain value.
    fn extracting(&mut self) -> bool {
        if self.error.is_some() {
            return false;
        }
        self.probe_help();
        !self.help_requested && self.error.is_none()
    }

    /// `-h`/`--help` is reserved at every level and checked before any
    /// user-declared matching there, exactly once (re-probing is a no-op).
    fn probe_help(&mut self) {
        if self.help_checked {
            return;
        }
        self.help_checked = true;
        if self.help_requested || self.error.is_some() {
            return;
        }

        let mut requested = None;
        let mut from = 0;
        while let Some(occ) = self.tokens.next_occurrence(Some('h'), Some("help"), from) {
            from = occ.token + 1;
            self.tokens.consume(occ.token);
            let token = self.tokens.text(occ.token);
            match inline_value(token, occ.name_len) {
                None => requested = Some(true),
                Some(raw) => match self.converters.parse::<bool>(raw) {
                    Some(value) => requested = Some(value),
                    None => {
                        let name = token[..occ.name_len].to_string();
                        self.fail(UserError::OptionValueInvalid { name });
                        return;
                    }
                },
            }
        }

        if requested == Some(true) {
            debug!("help token consumed; extraction off, describe pass continues");
            self.help_requested = true;
        }
    }

    fn fail(&mut self, error: UserError) {
        // First failure wins; the parse surfaces one problem per run.
        if self.error.is_none() {
            debug!(%error, "parse failed");
            self.error = Some(error);
        }
    }

    /// Consume one occurrence and locate its value. Every occurrence of a
    /// scalar option goes through here so repeats are fully consumed even
    /// though only the last is parsed.
    fn resolve_value<T: ArgValue>(&mut self, occ: Occurrence) -> Result<ValueSource, UserError> {
        self.tokens.consume(occ.token);

        if occ.name_len < self.tokens.text(occ.token).len() {
            let rest = &self.tokens.text(occ.token)[occ.name_len..];
            let start = if rest.starts_with('=') {
                occ.name_len + 1
            } else {
                occ.name_len
            };
            trace!(token = occ.token, "inline option value");
            return Ok(ValueSource::Inline {
                token: occ.token,
                start,
            });
        }

        if T::is_flag() {
            return Ok(ValueSource::Presence);
        }

        let next = occ.token + 1;
        if next >= self.tokens.len() || self.tokens.is_consumed(next) {
            let name = self.tokens.text(occ.token)[..occ.name_len].to_string();
            return Err(UserError::ValueExpected { name });
        }
        self.tokens.consume(next);
        trace!(token = occ.token, value = next, "separate value token");
        Ok(ValueSource::Token(next))
    }

    fn parse_source<T: ArgValue>(
        &self,
        occ: Occurrence,
        source: &ValueSource,
    ) -> Result<T, UserError> {
        let text = match source {
            ValueSource::Presence => return Ok(T::present()),
            ValueSource::Inline { token, start } => &self.tokens.text(*token)[*start..],
            ValueSource::Token(index) => self.tokens.text(*index),
        };
        self.converters.parse::<T>(text).ok_or_else(|| {
            let name = self.tokens.text(occ.token)[..occ.name_len].to_string();
            UserError::OptionValueInvalid { name }
        })
    }

    /// Bind the next unconsumed token as a positional. `None` when the
    /// vector is exhausted.
    fn bind_argument<T: ArgValue>(&mut self, placeholder: &str) -> Option<Result<T, UserError>> {
        let index = self.tokens.next_unconsumed()?;
        self.tokens.consume(index);
        let text = self.tokens.text(index);
        trace!(token = index, "positional bound");
        Some(self.converters.parse::<T>(text).ok_or_else(|| {
            UserError::ArgumentValueInvalid {
                name: placeholder.to_string(),
            }
        }))
    }

    fn collect_option<T>(&mut self, key: &OptionKey<'_>, decl: &Decl<T>, flag: bool, list: bool) {
        if decl.hidden {
            return;
        }
        self.info.add_entry(EntryHelp {
            alias: key.alias(),
            long: key.long().map(str::to_string),
            placeholder: decl.placeholder.clone(),
            summary: decl.summary.clone(),
            required: decl.required,
            repeated: list,
            flag,
            positional: false,
        });
    }

    fn collect_argument<T>(&mut self, decl: &Decl<T>, list: bool) {
        if decl.hidden {
            return;
        }
        self.info.add_entry(EntryHelp {
            alias: None,
            long: None,
            placeholder: decl.placeholder.clone(),
            summary: decl.summary.clone(),
            required: decl.required,
            repeated: list,
            flag: false,
            positional: true,
        });
    }
}

/// Inline value portion of an occurrence token, if any, with the leading
/// `=` stripped.
fn inline_value(token: &str, name_len: usize) -> Option<&str> {
    if name_len >= token.len() {
        return None;
    }
    let rest = &token[name_len..];
    Some(rest.strip_prefix('=').unwrap_or(rest))
}
