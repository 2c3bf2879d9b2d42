//! Per-declaration configuration.
//!
//! A [`Decl`] describes one requested option or argument: help text,
//! placeholder, default, required and hidden flags. It is built by the
//! closure passed to each declaration call and discarded when the call
//! returns. [`OptionKey`] is how a named option is addressed: alias, long
//! name, or both, converted from `'x'`, `"name"`, or `('x', "name")`.

/// How one option is spelled on the command line.
#[derive(Debug, Clone, Copy)]
pub struct OptionKey<'k> {
    alias: Option<char>,
    long: Option<&'k str>,
}

impl<'k> OptionKey<'k> {
    pub(crate) fn alias(&self) -> Option<char> {
        self.alias
    }

    pub(crate) fn long(&self) -> Option<&'k str> {
        self.long
    }

    /// User-facing spelling, preferring the long name.
    pub(crate) fn display(&self) -> String {
        match (self.long, self.alias) {
            (Some(name), _) => format!("--{name}"),
            (None, Some(alias)) => format!("-{alias}"),
            (None, None) => unreachable!("keys are validated on construction"),
        }
    }

    fn validated(self) -> Self {
        if self.alias.is_none() && self.long.is_none() {
            panic!("option declared without an alias or a long name");
        }
        if self.alias == Some('-') {
            panic!("'-' is not a valid option alias");
        }
        if let Some(name) = self.long {
            if name.is_empty() || name.starts_with('-') {
                panic!("long option name {name:?} must be non-empty and given without dashes");
            }
        }
        self
    }
}

impl From<char> for OptionKey<'static> {
    fn from(alias: char) -> Self {
        OptionKey {
            alias: Some(alias),
            long: None,
        }
        .validated()
    }
}

impl<'k> From<&'k str> for OptionKey<'k> {
    fn from(long: &'k str) -> Self {
        OptionKey {
            alias: None,
            long: Some(long),
        }
        .validated()
    }
}

impl<'k> From<(char, &'k str)> for OptionKey<'k> {
    fn from((alias, long): (char, &'k str)) -> Self {
        OptionKey {
            alias: Some(alias),
            long: Some(long),
        }
        .validated()
    }
}

enum DefaultValue<T> {
    Value(T),
    Factory(Box<dyn FnOnce() -> T>),
}

/// Configuration for a single declaration call.
pub struct Decl<T> {
    pub(crate) summary: Option<String>,
    pub(crate) placeholder: Option<String>,
    pub(crate) required: bool,
    pub(crate) hidden: bool,
    default: Option<DefaultValue<T>>,
}

impl<T> Decl<T> {
    pub(crate) fn new() -> Self {
        Decl {
            summary: None,
            placeholder: None,
            required: false,
            hidden: false,
            default: None,
        }
    }

    /// One-line description shown in help output.
    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.summary = Some(text.into());
        self
    }

    /// Display name for the value in help output and in "required" and
    /// "can't be parsed" messages for positional arguments.
    pub fn placeholder(mut self, name: impl Into<String>) -> Self {
        self.placeholder = Some(name.into());
        self
    }

    /// Absence becomes a parse error naming this declaration.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Omit from help output; matching is unaffected.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Value returned when the declaration is absent.
    pub fn default(mut self, value: T) -> Self {
        self.default = Some(DefaultValue::Value(value));
        self
    }

    /// Lazily computed default; the factory runs at most once, and only
    /// when the declaration is absent on a clean parse.
    pub fn default_with(mut self, factory: impl FnOnce() -> T + 'static) -> Self {
        self.default = Some(DefaultValue::Factory(Box::new(factory)));
        self
    }

    pub(crate) fn take_default(&mut self) -> Option<T> {
        self.default.take().map(|default| match default {
            DefaultValue::Value(value) => value,
            DefaultValue::Factory(factory) => factory(),
        })
    }

    pub(crate) fn display_placeholder(&self) -> String {
        self.placeholder.clone().unwrap_or_else(|| "argument".to_string())
    }
}
