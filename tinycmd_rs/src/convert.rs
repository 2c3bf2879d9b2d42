//! Typed value conversion.
//!
//! [`ArgValue`] covers the built-in kinds: text, boolean, character, the
//! integer and float widths, high-precision decimal, timestamps, and
//! `Option<T>` of any of them. Each parse additionally carries a
//! [`ConverterRegistry`] of per-type overrides that are consulted before
//! the trait impl, so embedders can reinterpret any kind (or add their own
//! types by implementing the trait).

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;

/// A type extractable from a command-line token.
pub trait ArgValue: Sized + 'static {
    /// Parse one raw token (or inline slice). `None` means the text does
    /// not form a value of this type; the engine turns that into a
    /// user-facing parse error naming the declaration.
    fn try_parse(text: &str) -> Option<Self>;

    /// Returned when the declaration is absent, optional, and carries no
    /// configured default.
    fn fallback() -> Self;

    /// Flag-shaped types resolve from bare presence, without a value token.
    fn is_flag() -> bool {
        false
    }

    /// Value produced by a bare flag occurrence. Only consulted when
    /// [`ArgValue::is_flag`] returns true.
    fn present() -> Self {
        Self::fallback()
    }
}

impl ArgValue for String {
    fn try_parse(text: &str) -> Option<Self> {
        Some(text.to_owned())
    }

    fn fallback() -> Self {
        String::new()
    }
}

impl ArgValue for PathBuf {
    fn try_parse(text: &str) -> Option<Self> {
        Some(PathBuf::from(text))
    }

    fn fallback() -> Self {
        PathBuf::new()
    }
}

impl ArgValue for bool {
    /// Accepts `true`/`false` case-insensitively, plus `1`/`0`.
    fn try_parse(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("true") || text == "1" {
            Some(true)
        } else if text.eq_ignore_ascii_case("false") || text == "0" {
            Some(false)
        } else {
            None
        }
    }

    fn fallback() -> Self {
        false
    }

    fn is_flag() -> bool {
        true
    }

    fn present() -> Self {
        true
    }
}

impl ArgValue for char {
    fn try_parse(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(ch),
            _ => None,
        }
    }

    fn fallback() -> Self {
        '\0'
    }
}

macro_rules! impl_from_str_kind {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ArgValue for $ty {
                fn try_parse(text: &str) -> Option<Self> {
                    text.parse().ok()
                }

                fn fallback() -> Self {
                    Default::default()
                }
            }
        )+
    };
}

impl_from_str_kind!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, Decimal,
);

impl ArgValue for DateTime<Utc> {
    /// RFC 3339 first, then `Y-m-d H:M:S` (with `T` or space), then a bare
    /// date taken as midnight UTC.
    fn try_parse(text: &str) -> Option<Self> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.with_timezone(&Utc));
        }
        for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
                return Some(naive.and_utc());
            }
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .map(|date| date.and_time(NaiveTime::MIN).and_utc())
    }

    fn fallback() -> Self {
        Self::default()
    }
}

impl ArgValue for NaiveDate {
    fn try_parse(text: &str) -> Option<Self> {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
    }

    fn fallback() -> Self {
        Self::default()
    }
}

impl<T: ArgValue> ArgValue for Option<T> {
    fn try_parse(text: &str) -> Option<Self> {
        T::try_parse(text).map(Some)
    }

    fn fallback() -> Self {
        None
    }

    fn is_flag() -> bool {
        T::is_flag()
    }

    fn present() -> Self {
        Some(T::present())
    }
}

type ParseFn<T> = Rc<dyn Fn(&str) -> Option<T>>;

/// Per-parser conversion overrides, keyed by requested type and checked
/// before the trait impl. Instance state, never process-global.
#[derive(Default)]
pub(crate) struct ConverterRegistry {
    overrides: HashMap<TypeId, Box<dyn Any>>,
}

impl ConverterRegistry {
    pub(crate) fn register<T: ArgValue>(&mut self, parse: impl Fn(&str) -> Option<T> + 'static) {
        self.overrides
            .insert(TypeId::of::<T>(), Box::new(Rc::new(parse) as ParseFn<T>));
    }

    /// Parse `text` as `T`, preferring a registered override.
    pub(crate) fn parse<T: ArgValue>(&self, text: &str) -> Option<T> {
        match self.overrides.get(&TypeId::of::<T>()) {
            Some(entry) => {
                // Entries are only ever inserted under their own TypeId.
                let parse = entry
                    .downcast_ref::<ParseFn<T>>()
                    .expect("registry entry matches its key type");
                parse(text)
            }
            None => T::try_parse(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_accepts_words_and_digits() {
        assert_eq!(bool::try_parse("true"), Some(true));
        assert_eq!(bool::try_parse("True"), Some(true));
        assert_eq!(bool::try_parse("1"), Some(true));
        assert_eq!(bool::try_parse("false"), Some(false));
        assert_eq!(bool::try_parse("FALSE"), Some(false));
        assert_eq!(bool::try_parse("0"), Some(false));
        assert_eq!(bool::try_parse("yes"), None);
        assert_eq!(bool::try_parse(""), None);
    }

    #[test]
    fn char_requires_exactly_one() {
        assert_eq!(char::try_parse("a"), Some('a'));
        assert_eq!(char::try_parse("ß"), Some('ß'));
        assert_eq!(char::try_parse("ab"), None);
        assert_eq!(char::try_parse(""), None);
    }

    #[test]
    fn integers_cover_their_ranges() {
        assert_eq!(i64::try_parse("9223372036854775807"), Some(i64::MAX));
        assert_eq!(i64::try_parse("-9223372036854775808"), Some(i64::MIN));
        assert_eq!(u64::try_parse("18446744073709551615"), Some(u64::MAX));
        assert_eq!(u8::try_parse("256"), None);
        assert_eq!(i32::try_parse("abc"), None);
    }

    #[test]
    fn decimal_keeps_precision() {
        let value = Decimal::try_parse("0.1234567891234567891234567").expect("decimal");
        assert_eq!(value.to_string(), "0.1234567891234567891234567");
    }

    #[test]
    fn timestamps_accept_common_shapes() {
        let rfc = <DateTime<Utc>>::try_parse("2024-05-01T10:30:00Z").expect("rfc3339");
        assert_eq!(rfc.to_rfc3339(), "2024-05-01T10:30:00+00:00");
        assert!(<DateTime<Utc>>::try_parse("2024-05-01 10:30:00").is_some());
        let midnight = <DateTime<Utc>>::try_parse("2024-05-01").expect("bare date");
        assert_eq!(midnight.to_rfc3339(), "2024-05-01T00:00:00+00:00");
        assert!(<DateTime<Utc>>::try_parse("yesterday").is_none());
        assert!(NaiveDate::try_parse("1997-01-20").is_some());
    }

    #[test]
    fn optional_wraps_any_kind() {
        assert_eq!(<Option<i32>>::try_parse("7"), Some(Some(7)));
        assert_eq!(<Option<i32>>::try_parse("x"), None);
        assert_eq!(<Option<i32>>::fallback(), None);
        assert!(<Option<bool>>::is_flag());
        assert_eq!(<Option<bool>>::present(), Some(true));
    }

    #[test]
    fn registry_override_takes_precedence() {
        let mut registry = ConverterRegistry::default();
        assert_eq!(registry.parse::<u32>("17"), Some(17));

        registry.register(|text: &str| {
            text.strip_prefix("0x")
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
        });
        assert_eq!(registry.parse::<u32>("0x10"), Some(16));
        // The override replaces the built-in path entirely.
        assert_eq!(registry.parse::<u32>("17"), None);
        // Other types keep their built-in parsing.
        assert_eq!(registry.parse::<i32>("17"), Some(17));
    }
}
