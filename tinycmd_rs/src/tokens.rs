//! Argv tokenization, consumption tracking, and the name-sorted option
//! occurrence index.
//!
//! Every argv entry is one token (quoting is the shell's job). Option-like
//! tokens are indexed once at tokenize time, sorted by name, so every
//! declared option resolves its occurrences with a binary-search range
//! instead of a scan over the whole vector.

use tracing::trace;

/// Option-like tokens carry a leading `-` and at least one more character.
/// Note `"-"` alone is a positional and `"-91"` counts as option-like; a
/// dash-prefixed token that matches no declaration is still bindable as a
/// positional.
pub(crate) fn is_option_like(text: &str) -> bool {
    text.len() > 1 && text.starts_with('-')
}

/// One `-x` occurrence: the owning token and the alias character.
#[derive(Debug, Clone, Copy)]
struct ShortEntry {
    alias: char,
    token: usize,
}

/// One `--name[=value]` occurrence: the owning token and the byte offset
/// where the name portion ends (the `=` position, or the token length).
#[derive(Debug, Clone, Copy)]
struct LongEntry {
    name_end: usize,
    token: usize,
}

/// A matched occurrence handed to the extraction engine. `name_len` is the
/// byte length of the name portion including its dashes, so the inline
/// value (if any) starts right after it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Occurrence {
    pub(crate) token: usize,
    pub(crate) name_len: usize,
}

pub(crate) struct TokenStore {
    tokens: Vec<String>,
    consumed: Vec<bool>,
    shorts: Vec<ShortEntry>,
    longs: Vec<LongEntry>,
}

impl TokenStore {
    pub(crate) fn tokenize(tokens: Vec<String>) -> Self {
        let mut shorts = Vec::new();
        let mut longs = Vec::new();

        for (index, token) in tokens.iter().enumerate() {
            if !is_option_like(token) {
                continue;
            }
            if token.len() > 2 && token.as_bytes()[1] == b'-' {
                let name_end = token.find('=').unwrap_or(token.len());
                longs.push(LongEntry {
                    name_end,
                    token: index,
                });
            } else {
                // Single-dash spelling: the name portion is exactly one
                // character; anything after it is an inline value.
                let alias = token[1..]
                    .chars()
                    .next()
                    .expect("option-like token has a second character");
                shorts.push(ShortEntry {
                    alias,
                    token: index,
                });
            }
        }

        shorts.sort_by(|a, b| a.alias.cmp(&b.alias).then(a.token.cmp(&b.token)));
        longs.sort_by(|a, b| {
            tokens[a.token][2..a.name_end]
                .cmp(&tokens[b.token][2..b.name_end])
                .then(a.token.cmp(&b.token))
        });

        trace!(
            tokens = tokens.len(),
            short = shorts.len(),
            long = longs.len(),
            "tokenized argument vector"
        );

        let consumed = vec![false; tokens.len()];
        TokenStore {
            tokens,
            consumed,
            shorts,
            longs,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tokens.len()
    }

    pub(crate) fn text(&self, index: usize) -> &str {
        &self.tokens[index]
    }

    pub(crate) fn is_consumed(&self, index: usize) -> bool {
        self.consumed[index]
    }

    /// Irreversible; consumed tokens are invisible to all later matching.
    pub(crate) fn consume(&mut self, index: usize) {
        self.consumed[index] = true;
    }

    /// Lowest-index unconsumed token. Used for positional binding, command
    /// probes, and leftover detection.
    pub(crate) fn next_unconsumed(&self) -> Option<usize> {
        (0..self.tokens.len()).find(|&i| !self.consumed[i])
    }

    /// The positional frontier: the lowest-index unconsumed token that is
    /// not option-like, or the end of the vector. Option lookups never
    /// reach past it, which is what keeps a parent level from stealing
    /// options that belong to a subcommand further right.
    pub(crate) fn frontier(&self) -> usize {
        (0..self.tokens.len())
            .find(|&i| !self.consumed[i] && !is_option_like(&self.tokens[i]))
            .unwrap_or(self.tokens.len())
    }

    /// The first unconsumed occurrence of the given alias and/or long name
    /// at token index `from` or later, stopping at the positional frontier.
    /// Callers walk occurrences by advancing `from` past each result; the
    /// frontier is recomputed per call so consuming a value token opens up
    /// the occurrences behind it.
    pub(crate) fn next_occurrence(
        &self,
        alias: Option<char>,
        long: Option<&str>,
        from: usize,
    ) -> Option<Occurrence> {
        let frontier = self.frontier();
        let mut best: Option<Occurrence> = None;

        if let Some(alias) = alias {
            let lo = self.shorts.partition_point(|e| e.alias < alias);
            let hi = self.shorts.partition_point(|e| e.alias <= alias);
            // Entries within one name range ascend by token index.
            for entry in &self.shorts[lo..hi] {
                if entry.token >= frontier {
                    break;
                }
                if entry.token < from || self.consumed[entry.token] {
                    continue;
                }
                best = Some(Occurrence {
                    token: entry.token,
                    name_len: 1 + entry.alias.len_utf8(),
                });
                break;
            }
        }

        if let Some(name) = long {
            let lo = self.longs.partition_point(|e| self.long_name(e) < name);
            let hi = self.longs.partition_point(|e| self.long_name(e) <= name);
            for entry in &self.longs[lo..hi] {
                if entry.token >= frontier {
                    break;
                }
                if entry.token < from || self.consumed[entry.token] {
                    continue;
                }
                // Both spellings compete on raw token position.
                if best.is_none_or(|b| entry.token < b.token) {
                    best = Some(Occurrence {
                        token: entry.token,
                        name_len: entry.name_end,
                    });
                }
                break;
            }
        }

        if let Some(occ) = best {
            trace!(token = occ.token, name_len = occ.name_len, "option occurrence");
        }
        best
    }

    fn long_name<'t>(&'t self, entry: &LongEntry) -> &'t str {
        &self.tokens[entry.token][2..entry.name_end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(args: &[&str]) -> TokenStore {
        TokenStore::tokenize(args.iter().map(|s| s.to_string()).collect())
    }

    fn all_occurrences(store: &TokenStore, alias: Option<char>, long: Option<&str>) -> Vec<usize> {
        let mut out = Vec::new();
        let mut from = 0;
        while let Some(occ) = store.next_occurrence(alias, long, from) {
            out.push(occ.token);
            from = occ.token + 1;
        }
        out
    }

    #[test]
    fn classifies_option_like_tokens() {
        assert!(is_option_like("-v"));
        assert!(is_option_like("--value"));
        assert!(is_option_like("-91"));
        assert!(is_option_like("--"));
        assert!(!is_option_like("-"));
        assert!(!is_option_like("value"));
        assert!(!is_option_like(""));
    }

    #[test]
    fn merges_spellings_in_token_order() {
        let s = store(&["--value=1", "-v", "--value"]);
        let occs = all_occurrences(&s, Some('v'), Some("value"));
        assert_eq!(occs, vec![0, 1, 2]);
        assert_eq!(s.next_occurrence(Some('v'), Some("value"), 0).unwrap().name_len, 7);
        assert_eq!(s.next_occurrence(Some('v'), Some("value"), 1).unwrap().name_len, 2);
    }

    #[test]
    fn short_and_long_with_same_name_do_not_collide() {
        let s = store(&["-x", "--x"]);
        assert_eq!(all_occurrences(&s, Some('x'), None), vec![0]);
        assert_eq!(all_occurrences(&s, None, Some("x")), vec![1]);
        assert_eq!(all_occurrences(&s, Some('x'), Some("x")), vec![0, 1]);
    }

    #[test]
    fn lookup_ignores_consumed_tokens() {
        let mut s = store(&["-v", "-v"]);
        assert_eq!(all_occurrences(&s, Some('v'), None), vec![0, 1]);
        s.consume(0);
        assert_eq!(all_occurrences(&s, Some('v'), None), vec![1]);
    }

    #[test]
    fn frontier_bounds_the_lookup() {
        let mut s = store(&["-a", "cmd", "-b"]);
        assert_eq!(s.frontier(), 1);
        assert!(s.next_occurrence(Some('b'), None, 0).is_none());
        s.consume(1);
        assert_eq!(s.frontier(), 3);
        assert_eq!(all_occurrences(&s, Some('b'), None), vec![2]);
    }

    #[test]
    fn consuming_a_value_token_moves_the_frontier() {
        // "-v 1 --value test": the second occurrence only becomes visible
        // once the first value token is consumed.
        let mut s = store(&["-v", "1", "--value", "test"]);
        assert_eq!(all_occurrences(&s, Some('v'), Some("value")), vec![0]);
        s.consume(0);
        s.consume(1);
        assert_eq!(all_occurrences(&s, Some('v'), Some("value")), vec![2]);
    }

    #[test]
    fn next_unconsumed_walks_forward() {
        let mut s = store(&["a", "b"]);
        assert_eq!(s.next_unconsumed(), Some(0));
        s.consume(0);
        assert_eq!(s.next_unconsumed(), Some(1));
        s.consume(1);
        assert_eq!(s.next_unconsumed(), None);
    }

    #[test]
    fn name_lookup_is_exact() {
        // "--valuex" and "--valu" must not match "value".
        let s = store(&["--valuex", "--value", "--valu"]);
        assert_eq!(all_occurrences(&s, None, Some("value")), vec![1]);
    }

    #[test]
    fn inline_separator_bounds_the_name() {
        let s = store(&["--value=--value"]);
        let occ = s.next_occurrence(None, Some("value"), 0).unwrap();
        assert_eq!(occ.name_len, 7);
    }
}
