//! Shell-style glob patterns compiled to anchored regular expressions.
//!
//! Supported syntax: `*` (any run of non-`/` characters), `?` (one non-`/`
//! character), `[...]` classes with `!` or `^` negation and ranges, and `\`
//! to escape the next character.

use regex::Regex;

/// A compiled wildcard temperature pattern.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    pub(super) source: String,
    matcher: Option<Regex>,
}

impl GlobPattern {
    /// Compiles `pattern`. A malformed pattern is kept but never matches.
    pub fn new(pattern: &str) -> Self {
        Self {
            source: pattern.to_string(),
            matcher: to_regex(pattern).and_then(|re| Regex::new(&re).ok()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.matcher.is_some()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.matcher.as_ref().is_some_and(|re| re.is_match(name))
    }
}

fn to_regex(pattern: &str) -> Option<String> {
    let mut re = String::with_capacity(pattern.len() * 2 + 2);
    re.push('^');

    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => re.push_str("[^/]*"),
            '?' => re.push_str("[^/]"),
            '\\' => push_literal(&mut re, chars.next()?),
            '[' => {
                re.push('[');
                if matches!(chars.clone().next(), Some('!') | Some('^')) {
                    chars.next();
                    re.push('^');
                }

                let mut first = true;
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        // `]` right after the opening bracket is a literal
                        ']' if !first => {
                            closed = true;
                            break;
                        }
                        '\\' => push_class_char(&mut re, chars.next()?),
                        '-' if !first => re.push('-'),
                        c => push_class_char(&mut re, c),
                    }
                    first = false;
                }
                if !closed {
                    return None;
                }
                re.push(']');
            }
            c => push_literal(&mut re, c),
        }
    }

    re.push('$');
    Some(re)
}

fn push_literal(re: &mut String, c: char) {
    let mut buf = [0u8; 4];
    re.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

fn push_class_char(re: &mut String, c: char) {
    if matches!(c, '\\' | '[' | ']' | '^' | '-' | '&' | '~') {
        re.push('\\');
    }
    re.push(c);
}
