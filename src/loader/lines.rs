use std::borrow::Cow;

/// One cleaned line together with the 1-based number of the raw line it came
/// from (comment-only and blank lines still count).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line<'a> {
    pub text: Cow<'a, str>,
    pub number: usize,
}

/// Comment-aware line cleaner: a single forward pass over the source that
/// drops `#` comments, `/* */` block comments and blank lines, yielding only
/// lines with content left for the section parser.
///
/// Block comments may span lines; one flag carries that state between
/// iterations. Markers are matched rightmost-first and do not nest.
pub struct Lines<'a> {
    raw: std::str::Lines<'a>,
    number: usize,
    in_block_comment: bool,
}

impl<'a> Lines<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            raw: src.lines(),
            number: 0,
            in_block_comment: false,
        }
    }

    fn clean(&mut self, raw: &'a str) -> Option<Cow<'a, str>> {
        let mut line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        // `#` has no escape; the tail goes, even inside a block comment.
        if let Some(hash) = line.find('#') {
            line = line[..hash].trim();
        }

        if self.in_block_comment {
            // Everything through the rightmost `*/` still belongs to the
            // comment; without one the whole line does.
            let close = line.rfind("*/")?;
            self.in_block_comment = false;
            line = line[close + 2..].trim();
        } else if let Some(open) = line.find("/*") {
            self.in_block_comment = true;
            if let (Some(last_open), Some(close)) = (line.rfind("/*"), line.rfind("*/"))
                && last_open < close
            {
                // Opened and closed on the same line: splice out the comment.
                self.in_block_comment = false;
                let joined = format!("{}{}", &line[..open], &line[close + 2..]);
                let joined = joined.trim();
                if joined.is_empty() {
                    return None;
                }
                return Some(Cow::Owned(joined.to_owned()));
            }
            // The comment stays open past this line.
            line = line[..open].trim();
        }

        if line.is_empty() {
            None
        } else {
            Some(Cow::Borrowed(line))
        }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw = self.raw.next()?;
            self.number += 1;
            if let Some(text) = self.clean(raw) {
                return Some(Line {
                    text,
                    number: self.number,
                });
            }
        }
    }
}
