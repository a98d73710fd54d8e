//! Tolerant JSON syntax tree.
//!
//! Unlike `serde_json`, this parser never gives up on malformed input: it
//! accepts `//` and `/* */` comments and trailing commas, and recovers from
//! unexpected tokens by skipping ahead to the next `,` or closing bracket.
//! Each node records the byte extent of its source text so that editor
//! positions can be mapped back to paths.

/// Nesting beyond this depth is skipped without building nodes.
const MAX_DEPTH: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    Array,
    /// Object member; children are `[key, value]`, or just `[key]` when the
    /// value is missing.
    Property,
    String,
    Number,
    Boolean,
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    pub children: Vec<SyntaxNode>,
    /// Decoded contents of a string node.
    pub text: Option<String>,
}

impl SyntaxNode {
    fn leaf(kind: NodeKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            start,
            end,
            children: Vec::new(),
            text: None,
        }
    }

    /// Key and value of a property node.
    pub fn property_parts(&self) -> (Option<&SyntaxNode>, Option<&SyntaxNode>) {
        (self.children.first(), self.children.get(1))
    }
}

/// Parse `text` into a syntax tree; `None` when no value can be found at all.
pub fn parse_tree(text: &str) -> Option<SyntaxNode> {
    let mut parser = TolerantParser { input: text, pos: 0 };
    parser.skip_trivia();
    parser.parse_value(0)
}

struct TolerantParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TolerantParser<'a> {
    fn parse_value(&mut self, depth: usize) -> Option<SyntaxNode> {
        if depth > MAX_DEPTH {
            if matches!(self.peek(), Some(b'{' | b'[')) {
                self.skip_nested();
            }
            return None;
        }
        match self.peek()? {
            b'{' => Some(self.parse_object(depth)),
            b'[' => Some(self.parse_array(depth)),
            b'"' => Some(self.parse_string()),
            b'-' | b'0'..=b'9' => Some(self.parse_number()),
            b't' if self.eat_word("true") => Some(self.literal(NodeKind::Boolean, 4)),
            b'f' if self.eat_word("false") => Some(self.literal(NodeKind::Boolean, 5)),
            b'n' if self.eat_word("null") => Some(self.literal(NodeKind::Null, 4)),
            _ => None,
        }
    }

    fn literal(&self, kind: NodeKind, len: usize) -> SyntaxNode {
        SyntaxNode::leaf(kind, self.pos - len, self.pos)
    }

    fn parse_object(&mut self, depth: usize) -> SyntaxNode {
        let start = self.pos;
        self.pos += 1;
        let mut children = Vec::new();

        loop {
            self.skip_trivia();
            match self.peek() {
                None => break,
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                Some(b',') => {
                    self.pos += 1;
                    continue;
                }
                Some(b'"') => {
                    if let Some(property) = self.parse_property(depth) {
                        children.push(property);
                    }
                }
                Some(_) => self.recover(b'}'),
            }
            self.skip_trivia();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') | None => {}
                Some(_) => self.recover(b'}'),
            }
        }

        SyntaxNode {
            kind: NodeKind::Object,
            start,
            end: self.pos,
            children,
            text: None,
        }
    }

    fn parse_property(&mut self, depth: usize) -> Option<SyntaxNode> {
        let key = self.parse_string();
        self.skip_trivia();
        if self.peek() != Some(b':') {
            let (start, end) = (key.start, key.end);
            return Some(SyntaxNode {
                kind: NodeKind::Property,
                start,
                end,
                children: vec![key],
                text: None,
            });
        }
        self.pos += 1;
        self.skip_trivia();

        let start = key.start;
        let mut children = vec![key];
        match self.parse_value(depth + 1) {
            Some(value) => children.push(value),
            None => self.recover(b'}'),
        }
        let end = children.last().map_or(start, |n| n.end);
        Some(SyntaxNode {
            kind: NodeKind::Property,
            start,
            end,
            children,
            text: None,
        })
    }

    fn parse_array(&mut self, depth: usize) -> SyntaxNode {
        let start = self.pos;
        self.pos += 1;
        let mut children = Vec::new();

        loop {
            self.skip_trivia();
            match self.peek() {
                None => break,
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                Some(b',') => {
                    self.pos += 1;
                    continue;
                }
                Some(_) => match self.parse_value(depth + 1) {
                    Some(value) => children.push(value),
                    None => self.recover(b']'),
                },
            }
            self.skip_trivia();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') | None => {}
                Some(_) => self.recover(b']'),
            }
        }

        SyntaxNode {
            kind: NodeKind::Array,
            start,
            end: self.pos,
            children,
            text: None,
        }
    }

    /// Parse a string starting at `"`. An unterminated string runs to the end
    /// of its line.
    fn parse_string(&mut self) -> SyntaxNode {
        let start = self.pos;
        self.pos += 1;
        let mut text = String::new();
        let mut run = self.pos;

        loop {
            let Some(b) = self.peek() else {
                text.push_str(&self.input[run..self.pos]);
                break;
            };
            match b {
                b'"' => {
                    text.push_str(&self.input[run..self.pos]);
                    self.pos += 1;
                    break;
                }
                b'\n' | b'\r' => {
                    text.push_str(&self.input[run..self.pos]);
                    break;
                }
                b'\\' => {
                    text.push_str(&self.input[run..self.pos]);
                    self.pos += 1;
                    self.parse_escape(&mut text);
                    run = self.pos;
                }
                _ => self.pos += 1,
            }
        }

        SyntaxNode {
            kind: NodeKind::String,
            start,
            end: self.pos,
            children: Vec::new(),
            text: Some(text),
        }
    }

    fn parse_escape(&mut self, out: &mut String) {
        let Some(b) = self.peek() else {
            return;
        };
        let decoded = match b {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => {
                self.pos += 1;
                self.parse_unicode_escape(out);
                return;
            }
            _ => {
                // Unknown escape: keep the character itself.
                let c = self.input[self.pos..].chars().next().unwrap_or('\\');
                self.pos += c.len_utf8();
                out.push(c);
                return;
            }
        };
        self.pos += 1;
        out.push(decoded);
    }

    fn parse_unicode_escape(&mut self, out: &mut String) {
        let Some(high) = self.hex4() else {
            out.push(char::REPLACEMENT_CHARACTER);
            return;
        };
        if (0xD800..0xDC00).contains(&high) && self.input[self.pos..].starts_with("\\u") {
            let save = self.pos;
            self.pos += 2;
            if let Some(low) = self.hex4().filter(|l| (0xDC00..0xE000).contains(l)) {
                let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                out.push(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
                return;
            }
            self.pos = save;
        }
        out.push(char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER));
    }

    fn hex4(&mut self) -> Option<u32> {
        let digits = self.input.get(self.pos..self.pos + 4)?;
        let value = u32::from_str_radix(digits, 16).ok()?;
        self.pos += 4;
        Some(value)
    }

    fn parse_number(&mut self) -> SyntaxNode {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E') {
                self.pos += 1;
            } else {
                break;
            }
        }
        SyntaxNode::leaf(NodeKind::Number, start, self.pos)
    }

    fn eat_word(&mut self, word: &str) -> bool {
        let rest = &self.input.as_bytes()[self.pos..];
        let glued = matches!(rest.get(word.len()), Some(b) if b.is_ascii_alphanumeric() || *b == b'_');
        if rest.starts_with(word.as_bytes()) && !glued {
            self.pos += word.len();
            true
        } else {
            false
        }
    }

    /// Skip to the next `,` or `close` at the current nesting level. Nested
    /// brackets and strings are stepped over; a stray closer of the other
    /// kind is dropped.
    fn recover(&mut self, close: u8) {
        while let Some(b) = self.peek() {
            match b {
                b',' => return,
                _ if b == close => return,
                b'{' | b'[' => self.skip_nested(),
                b'"' => {
                    self.parse_string();
                }
                _ => self.pos += 1,
            }
        }
    }

    /// Step over a bracketed region without building nodes.
    fn skip_nested(&mut self) {
        let mut level = 0usize;
        while let Some(b) = self.peek() {
            match b {
                b'{' | b'[' => {
                    level += 1;
                    self.pos += 1;
                }
                b'}' | b']' => {
                    self.pos += 1;
                    level = level.saturating_sub(1);
                    if level == 0 {
                        return;
                    }
                }
                b'"' => {
                    self.parse_string();
                }
                _ => self.pos += 1,
            }
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            let rest = &self.input.as_bytes()[self.pos..];
            match rest {
                [b' ' | b'\t' | b'\n' | b'\r', ..] => self.pos += 1,
                [b'/', b'/', ..] => {
                    self.pos += rest.iter().position(|b| *b == b'\n').unwrap_or(rest.len());
                }
                [b'/', b'*', ..] => {
                    let body = &self.input[self.pos + 2..];
                    self.pos += body.find("*/").map_or(rest.len(), |i| i + 4);
                }
                _ => {
                    // A byte-order mark or non-breaking space counts as whitespace too.
                    let next = self.input[self.pos..].chars().next();
                    match next {
                        Some(c @ ('\u{feff}' | '\u{a0}')) => self.pos += c.len_utf8(),
                        _ => return,
                    }
                }
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }
}
