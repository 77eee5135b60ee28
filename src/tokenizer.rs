//! Splitting of preference expressions into `label=value` tokens.
//!
//! An expression is a comma-separated list of directives. Each directive is
//! split at its first `=` into a label and a value, both trimmed of spaces and
//! horizontal tabs. Directives without `=` are dropped. Nothing here can fail:
//! any byte sequence, valid UTF-8 or not, yields a (possibly empty) sequence
//! of tokens.
//!
//! # Example
//!
//! ```
//! use usage_prefs::tokenizer::Tokenizer;
//!
//! let tokens: Vec<_> = Tokenizer::new("tdm = y, junk, genai=n")
//!     .map(|t| (t.label_str().unwrap(), t.value_str().unwrap()))
//!     .collect();
//! assert_eq!(tokens, [("tdm", "y"), ("genai", "n")]);
//! ```

/// The default processing budget, in bytes of expression text.
pub const DEFAULT_BUDGET: usize = 1000;

/// One `label=value` directive, trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    label: &'a [u8],
    value: &'a [u8],
}

impl<'a> Token<'a> {
    /// Returns the raw label bytes.
    pub fn label(&self) -> &'a [u8] {
        self.label
    }

    /// Returns the raw value bytes.
    pub fn value(&self) -> &'a [u8] {
        self.value
    }

    /// Returns the label if it is valid UTF-8.
    pub fn label_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.label).ok()
    }

    /// Returns the value if it is valid UTF-8.
    pub fn value_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.value).ok()
    }
}

/// A lazy iterator over the tokens of one expression.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    input: &'a [u8],
    /// Offset of the next directive, or `None` once the input is consumed.
    pos: Option<usize>,
    budget: Option<usize>,
    exhausted_budget: bool,
    /// Bytes inspected while looking for directive boundaries.
    scanned: usize,
}

impl<'a> Tokenizer<'a> {
    /// Tokenizes `input` with no budget.
    pub fn new(input: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Self {
            input: input.as_ref(),
            pos: Some(0),
            budget: None,
            exhausted_budget: false,
            scanned: 0,
        }
    }

    /// Limits processing to directives that end within the first `budget`
    /// bytes of the input.
    ///
    /// A directive crossing the cutoff is dropped rather than truncated, and
    /// ends tokenization.
    pub fn with_budget(mut self, budget: Option<usize>) -> Self {
        self.budget = budget;
        self
    }

    /// Returns `true` once tokenization stopped because of the budget.
    pub fn exhausted_budget(&self) -> bool {
        self.exhausted_budget
    }

    /// Returns the next raw directive, honoring the budget.
    ///
    /// With a budget, the search for the closing comma never looks past the
    /// cutoff, so the work done is bounded by the budget rather than the
    /// input length.
    fn next_directive(&mut self) -> Option<&'a [u8]> {
        let start = self.pos?;
        let rest = &self.input[start..];
        let window = match self.budget {
            Some(budget) => &rest[..rest.len().min(budget.saturating_sub(start) + 1)],
            None => rest,
        };
        let found = window.iter().position(|&c| c == b',');
        self.scanned += found.map_or(window.len(), |i| i + 1);

        let (end, next) = match found {
            Some(i) => (start + i, Some(start + i + 1)),
            None if window.len() == rest.len() => (self.input.len(), None),
            // The directive runs past the cutoff.
            None => (start + window.len(), None),
        };
        if self.budget.is_some_and(|budget| end > budget) {
            self.pos = None;
            self.exhausted_budget = true;
            return None;
        }
        self.pos = next;
        Some(&self.input[start..end])
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            let directive = self.next_directive()?;
            if let Some(token) = split_directive(directive) {
                return Some(token);
            }
            tracing::trace!(
                directive = %String::from_utf8_lossy(directive),
                "dropping directive without '='"
            );
        }
    }
}

fn split_directive(directive: &[u8]) -> Option<Token<'_>> {
    let eq = directive.iter().position(|&c| c == b'=')?;
    Some(Token {
        label: trim(&directive[..eq]),
        value: trim(&directive[eq + 1..]),
    })
}

fn is_blank(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

/// Strips leading and trailing spaces and horizontal tabs.
pub(crate) fn trim(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&c| !is_blank(c)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|&c| !is_blank(c)).map_or(start, |i| i + 1);
    &bytes[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(tokenizer: Tokenizer<'_>) -> Vec<(String, String)> {
        tokenizer
            .map(|t| {
                (
                    String::from_utf8_lossy(t.label()).into_owned(),
                    String::from_utf8_lossy(t.value()).into_owned(),
                )
            })
            .collect()
    }

    fn strs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected
            .iter()
            .map(|(l, v)| (l.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_simple() {
        assert_eq!(
            pairs(Tokenizer::new("tdm=y,ai=n")),
            strs(&[("tdm", "y"), ("ai", "n")])
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(pairs(Tokenizer::new("")).is_empty());
        assert!(pairs(Tokenizer::new(",,,")).is_empty());
        assert!(pairs(Tokenizer::new("no equals here")).is_empty());
    }

    #[test]
    fn test_trims_space_and_tab_only() {
        assert_eq!(
            pairs(Tokenizer::new(" \ttdm \t=\t y  ")),
            strs(&[("tdm", "y")])
        );
        // Other whitespace is kept and makes the token meaningless later.
        assert_eq!(
            pairs(Tokenizer::new("tdm=y\n")),
            strs(&[("tdm", "y\n")])
        );
    }

    #[test]
    fn test_split_at_first_equals() {
        assert_eq!(
            pairs(Tokenizer::new("tdm=y=n")),
            strs(&[("tdm", "y=n")])
        );
        assert_eq!(pairs(Tokenizer::new("=y")), strs(&[("", "y")]));
        assert_eq!(pairs(Tokenizer::new("tdm=")), strs(&[("tdm", "")]));
    }

    #[test]
    fn test_drops_directives_without_equals() {
        assert_eq!(
            pairs(Tokenizer::new("x, tdm=y ,,y")),
            strs(&[("tdm", "y")])
        );
    }

    #[test]
    fn test_inner_space_is_kept() {
        assert_eq!(
            pairs(Tokenizer::new("gen ai = y")),
            strs(&[("gen ai", "y")])
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let input: &[u8] = &[0xff, b'=', b'y', b',', b't', b'd', b'm', b'=', 0xc3];
        let tokens: Vec<_> = Tokenizer::new(input).collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].label(), &[0xff]);
        assert_eq!(tokens[0].label_str(), None);
        assert_eq!(tokens[1].label_str(), Some("tdm"));
        assert_eq!(tokens[1].value_str(), None);
    }

    #[test]
    fn test_budget_drops_crossing_directive() {
        // "tdm=y," is 6 bytes; "ai=nope" ends at 13.
        let mut tokenizer = Tokenizer::new("tdm=y,ai=nope").with_budget(Some(10));
        assert_eq!(tokenizer.next().map(|t| t.label()), Some(&b"tdm"[..]));
        assert_eq!(tokenizer.next(), None);
        assert!(tokenizer.exhausted_budget());
    }

    #[test]
    fn test_budget_inclusive_end() {
        let tokenizer = Tokenizer::new("tdm=y,ai=n").with_budget(Some(10));
        assert_eq!(pairs(tokenizer), strs(&[("tdm", "y"), ("ai", "n")]));
    }

    #[test]
    fn test_budget_bounds_scanning() {
        let huge = vec![b'a'; 1 << 24];
        let mut tokenizer = Tokenizer::new(&huge).with_budget(Some(DEFAULT_BUDGET));
        assert_eq!(tokenizer.next(), None);
        assert!(tokenizer.exhausted_budget());
        assert!(tokenizer.scanned <= DEFAULT_BUDGET + 1);

        let mut many = "tdm=y,".repeat(1 << 20);
        many.push_str("ai=n");
        let mut tokenizer = Tokenizer::new(&many).with_budget(Some(DEFAULT_BUDGET));
        assert_eq!(tokenizer.by_ref().count(), DEFAULT_BUDGET / 6);
        assert!(tokenizer.exhausted_budget());
        assert!(tokenizer.scanned <= DEFAULT_BUDGET + 1);

        // Without a budget the whole input is read.
        let mut tokenizer = Tokenizer::new(&huge);
        assert_eq!(tokenizer.next(), None);
        assert_eq!(tokenizer.scanned, huge.len());
    }

    #[test]
    fn test_budget_zero() {
        let mut tokenizer = Tokenizer::new("tdm=y").with_budget(Some(0));
        assert_eq!(tokenizer.next(), None);
        assert!(tokenizer.exhausted_budget());

        // An empty expression never crosses any budget.
        let mut tokenizer = Tokenizer::new("").with_budget(Some(0));
        assert_eq!(tokenizer.next(), None);
        assert!(!tokenizer.exhausted_budget());
    }

    #[test]
    fn test_budget_stops_after_dropped_directives_too() {
        let long = format!("tdm=y,{},ai=n", "x".repeat(2000));
        let tokenizer = Tokenizer::new(&long).with_budget(Some(DEFAULT_BUDGET));
        assert_eq!(pairs(tokenizer), strs(&[("tdm", "y")]));
    }

    #[test]
    fn test_trim() {
        assert_eq!(trim(b""), b"");
        assert_eq!(trim(b" \t "), b"");
        assert_eq!(trim(b" a b\t"), b"a b");
    }
}
