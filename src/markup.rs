//! Description markup parser – converts the form's rich-text field into a
//! small tree over a restricted tag set.
//!
//! Supported elements:
//! - Block: p, ul, ol, li
//! - Inline: b, i
//!
//! Anything else parses as [`Tag::Unknown`] and is kept in the tree so the
//! flattener can drop the whole subtree in one place.

// ---------------------------------------------------------------------------
// Markup types
// ---------------------------------------------------------------------------

/// The tag name of a description element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    P,
    Ul,
    Ol,
    Li,
    B,
    I,
    /// Catch-all for unrecognized tags. The subtree stays parsed but never
    /// contributes text or blocks.
    Unknown(String),
}

impl Tag {
    pub fn from_str(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "p" => Tag::P,
            "ul" => Tag::Ul,
            "ol" => Tag::Ol,
            "li" => Tag::Li,
            "b" => Tag::B,
            "i" => Tag::I,
            _ => Tag::Unknown(s.to_string()),
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Tag::B | Tag::I)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Tag::Ul | Tag::Ol)
    }
}

/// A node in the markup tree.
#[derive(Debug, Clone)]
pub enum MarkupNode {
    Element(ElementNode),
    Text(String),
}

/// An element node carrying its tag and children. Attributes are consumed by
/// the parser but not retained; nothing downstream reads them.
#[derive(Debug, Clone)]
pub struct ElementNode {
    pub tag: Tag,
    pub children: Vec<MarkupNode>,
}

impl ElementNode {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            children: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parser – simple recursive descent
// ---------------------------------------------------------------------------

/// Parse a description markup string into a list of nodes.
///
/// Hand-written for the restricted form input; a full HTML5 parser buys
/// nothing here. Malformed input degrades to whatever structure can be
/// recovered, never an error.
pub fn parse_markup(input: &str) -> Vec<MarkupNode> {
    let mut parser = Parser::new(input);
    parser.parse_nodes()
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Advance past the next character, if any.
    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    /// Consume `token` if the input continues with it.
    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn parse_nodes(&mut self) -> Vec<MarkupNode> {
        let mut nodes = Vec::new();
        loop {
            self.skip_inter_element_whitespace();
            if self.at_end() || self.rest().starts_with("</") {
                break;
            }
            if let Some(node) = self.parse_node() {
                nodes.push(node);
            }
        }
        nodes
    }

    fn parse_node(&mut self) -> Option<MarkupNode> {
        if self.eat("<!--") {
            match self.rest().find("-->") {
                Some(i) => self.pos += i + 3,
                None => self.pos = self.input.len(),
            }
            return None;
        }
        if self.rest().starts_with("<!") || self.rest().starts_with("<?") {
            // Doctype / processing instruction: skip past the closing '>'.
            match self.rest().find('>') {
                Some(i) => self.pos += i + 1,
                None => self.pos = self.input.len(),
            }
            return None;
        }
        if self.rest().starts_with('<') {
            Some(self.parse_element())
        } else {
            Some(self.parse_text())
        }
    }

    fn parse_text(&mut self) -> MarkupNode {
        let text = match self.rest().find('<') {
            Some(i) => &self.rest()[..i],
            None => self.rest(),
        };
        self.pos += text.len();
        MarkupNode::Text(decode_entities(text))
    }

    fn parse_element(&mut self) -> MarkupNode {
        self.bump(); // '<'
        let name = self.read_name();
        let mut elem = ElementNode::new(Tag::from_str(&name));

        self.skip_attributes();

        if self.eat("/>") {
            return MarkupNode::Element(elem);
        }
        self.eat(">");
        // Void elements (common editor output like <br>) take no children;
        // treating them as containers would swallow the rest of the input.
        if is_void(&name) {
            return MarkupNode::Element(elem);
        }

        elem.children = self.parse_nodes();

        // Closing tag.
        if self.eat("</") {
            self.read_name();
            self.skip_whitespace();
            self.eat(">");
        }

        MarkupNode::Element(elem)
    }

    /// Read a tag or attribute name (letters, digits, '-', '_').
    fn read_name(&mut self) -> String {
        let rest = self.rest();
        let end = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(rest.len());
        self.pos += end;
        rest[..end].to_string()
    }

    /// Consume everything up to the tag close without keeping any of it;
    /// the flattener only cares about text.
    fn skip_attributes(&mut self) {
        loop {
            self.skip_whitespace();
            if self.at_end() || self.rest().starts_with('>') || self.rest().starts_with("/>") {
                return;
            }
            let before = self.pos;
            self.read_name();
            self.skip_whitespace();
            if self.eat("=") {
                self.skip_whitespace();
                match self.peek() {
                    Some(q @ ('"' | '\'')) => {
                        self.bump();
                        match self.rest().find(q) {
                            Some(i) => self.pos += i + q.len_utf8(),
                            None => self.pos = self.input.len(),
                        }
                    }
                    _ => {
                        while let Some(c) = self.peek() {
                            if c.is_whitespace() || c == '>' || c == '/' {
                                break;
                            }
                            self.bump();
                        }
                    }
                }
            }
            // Junk inside a tag (a stray '!' or quote) must still advance
            // the cursor, or this loop never terminates.
            if self.pos == before {
                self.bump();
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Drop whitespace runs sitting between elements; whitespace that is
    /// part of text content stays put.
    fn skip_inter_element_whitespace(&mut self) {
        let saved = self.pos;
        self.skip_whitespace();
        if !self.at_end() && !self.rest().starts_with('<') {
            self.pos = saved;
        }
    }
}

/// HTML void elements that show up in rich-text output. None are in the
/// recognized tag set, but they must not be parsed as containers.
fn is_void(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "br" | "hr" | "img" | "input" | "meta" | "link"
    )
}

/// Decode the named entities rich-text editors emit, plus decimal character
/// references. Anything unrecognized passes through unchanged.
fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest[1..].find(';').and_then(|i| {
            let body = &rest[1..i + 1];
            let ch = match body {
                "amp" => '&',
                "lt" => '<',
                "gt" => '>',
                "quot" => '"',
                "apos" => '\'',
                "nbsp" => '\u{00A0}',
                _ => body
                    .strip_prefix('#')
                    .and_then(|digits| digits.parse::<u32>().ok())
                    .and_then(char::from_u32)?,
            };
            Some((ch, i + 2))
        });
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
