//! Selection expressions typed while browsing
//!
//! Commas and whitespace are the same delimiter. Each token is a 1-based
//! index, an inclusive `low-high` range, or the keyword `all`. Bad tokens
//! and out-of-range indices are dropped one by one; they never invalidate
//! the rest of the expression.

use std::collections::BTreeSet;

/// Example expressions shown when a selection comes out empty
pub const EXAMPLES: &[(&str, &str)] = &[
    ("3", "a single package"),
    ("1,4,7", "several packages"),
    ("2-6", "an inclusive range"),
    ("1 3 5-8", "mix numbers and ranges"),
    ("all", "every package"),
    ("none", "back to the menu"),
];

/// What the user typed at the browse prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseInput {
    /// `none`, an empty line, or EOF
    Abort,
    /// Zero-based indices; may be empty when nothing usable was typed
    Selected(BTreeSet<usize>),
}

/// Classify one browse prompt answer for a list of `len` packages
pub fn parse_browse_input(line: Option<&str>, len: usize) -> BrowseInput {
    match line.map(str::trim) {
        None | Some("") => BrowseInput::Abort,
        Some(text) if text.eq_ignore_ascii_case("none") => BrowseInput::Abort,
        Some(text) => BrowseInput::Selected(parse_selection(text, len)),
    }
}

/// Parse an expression into zero-based indices below `len`
pub fn parse_selection(input: &str, len: usize) -> BTreeSet<usize> {
    let mut selected = BTreeSet::new();

    for token in input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        if token.eq_ignore_ascii_case("all") {
            selected.extend(0..len);
            continue;
        }
        if token.eq_ignore_ascii_case("none") {
            continue;
        }

        match token.split_once('-') {
            Some((low, high)) => {
                let (Ok(low), Ok(high)) = (low.parse::<usize>(), high.parse::<usize>()) else {
                    log::debug!("dropping unparsable range {:?}", token);
                    continue;
                };
                if low > high {
                    log::debug!("dropping reversed range {:?}", token);
                    continue;
                }
                let low = low.max(1);
                let high = high.min(len);
                selected.extend((low..=high).map(|n| n - 1));
            }
            None => match token.parse::<usize>() {
                Ok(n) if (1..=len).contains(&n) => {
                    selected.insert(n - 1);
                }
                _ => log::debug!("dropping selection token {:?}", token),
            },
        }
    }

    selected
}
