#![forbid(unsafe_code)]

//! A small CSS selector subset.
//!
//! Page markup marks term sources and anchors with classes and data
//! attributes, so the grammar only covers what that markup needs:
//!
//! ```text
//! selector  := compound (whitespace compound)*
//! compound  := (tag | '*')? (('.' ident) | ('#' ident) | attribute)*
//! attribute := '[' ident ( '=' (ident | quoted) )? ']'
//! ```
//!
//! Whitespace is the descendant combinator. `>`, `+`, `~`, `,` and pseudo
//! classes are rejected so a host never silently matches something broader
//! than the markup intended.
//!
//! Matching walks right-to-left and binds each ancestor compound to the
//! nearest qualifying ancestor. For descendant-only chains the greedy choice
//! is always safe.

use std::fmt;
use std::str::FromStr;

/// Error returned when a selector string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// The selector was empty or only whitespace.
    Empty,
    /// A character that cannot start or continue a component.
    UnexpectedChar { ch: char, offset: usize },
    /// A combinator or pseudo-class outside the supported subset.
    Unsupported { ch: char, offset: usize },
    /// `[` without a matching `]`, or an unterminated quoted value.
    UnterminatedAttribute { offset: usize },
    /// `.`, `#` or `[` not followed by a name.
    MissingName { offset: usize },
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty selector"),
            Self::UnexpectedChar { ch, offset } => {
                write!(f, "unexpected character {ch:?} at offset {offset}")
            }
            Self::Unsupported { ch, offset } => {
                write!(f, "unsupported selector syntax {ch:?} at offset {offset}")
            }
            Self::UnterminatedAttribute { offset } => {
                write!(f, "unterminated attribute selector starting at offset {offset}")
            }
            Self::MissingName { offset } => write!(f, "missing name at offset {offset}"),
        }
    }
}

impl std::error::Error for SelectorError {}

/// An attribute condition: presence, or exact value equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeMatch {
    /// Attribute name (ASCII-lowercased).
    pub name: String,
    /// Required value, or `None` for a presence test.
    pub value: Option<String>,
}

/// One compound selector: every condition must hold on the same element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Compound {
    /// Tag name (ASCII-lowercased), or `None` for any element.
    pub tag: Option<String>,
    /// Required id.
    pub id: Option<String>,
    /// Required classes.
    pub classes: Vec<String>,
    /// Required attributes.
    pub attributes: Vec<AttributeMatch>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attributes.is_empty()
    }

    /// Test this compound against a single element.
    pub fn matches<T: SelectorTarget + ?Sized>(&self, element: &T) -> bool {
        if let Some(tag) = &self.tag
            && !element.tag_name().eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if let Some(id) = &self.id
            && element.element_id() != Some(id.as_str())
        {
            return false;
        }
        if !self.classes.iter().all(|c| element.has_class(c)) {
            return false;
        }
        self.attributes.iter().all(|attr| {
            match (element.attribute(&attr.name), &attr.value) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
            }
        })
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tag) = &self.tag {
            f.write_str(tag)?;
        } else if self.is_empty() {
            f.write_str("*")?;
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        for attr in &self.attributes {
            match &attr.value {
                None => write!(f, "[{}]", attr.name)?,
                Some(value) => {
                    write!(f, "[{}=\"", attr.name)?;
                    for ch in value.chars() {
                        if ch == '"' || ch == '\\' {
                            f.write_str("\\")?;
                        }
                        write!(f, "{ch}")?;
                    }
                    f.write_str("\"]")?;
                }
            }
        }
        Ok(())
    }
}

/// Read-only view of an element, implemented by hosts that match selectors
/// themselves instead of delegating to a browser engine.
pub trait SelectorTarget {
    /// Tag name, any case.
    fn tag_name(&self) -> &str;
    /// The element's `id` attribute.
    fn element_id(&self) -> Option<&str>;
    /// Whether the class list contains `class`.
    fn has_class(&self, class: &str) -> bool;
    /// Attribute value by lowercase name.
    fn attribute(&self, name: &str) -> Option<&str>;
}

/// A parsed descendant-combinator chain. The last compound is the subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    compounds: Vec<Compound>,
}

impl Selector {
    /// Parse a selector string.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        Parser::new(input).parse()
    }

    /// Selector matching elements carrying `class`.
    #[must_use]
    pub fn class(class: impl Into<String>) -> Self {
        Self::from_compound(Compound {
            classes: vec![class.into()],
            ..Compound::default()
        })
    }

    /// Selector matching the element with `id`.
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::from_compound(Compound {
            id: Some(id.into()),
            ..Compound::default()
        })
    }

    /// Selector matching elements with attribute `name`, optionally equal to `value`.
    #[must_use]
    pub fn attribute(name: &str, value: Option<&str>) -> Self {
        Self::from_compound(Compound {
            attributes: vec![AttributeMatch {
                name: name.to_ascii_lowercase(),
                value: value.map(str::to_string),
            }],
            ..Compound::default()
        })
    }

    fn from_compound(compound: Compound) -> Self {
        Self {
            compounds: vec![compound],
        }
    }

    /// The compounds from outermost ancestor to subject.
    #[must_use]
    pub fn compounds(&self) -> &[Compound] {
        &self.compounds
    }

    /// The rightmost compound, which the matched element itself must satisfy.
    #[must_use]
    pub fn subject(&self) -> &Compound {
        // Parsing and the constructors never produce an empty chain.
        &self.compounds[self.compounds.len() - 1]
    }

    /// Test an element given its ancestors, nearest first.
    pub fn matches<'a, T>(&self, element: &'a T, ancestors: impl IntoIterator<Item = &'a T>) -> bool
    where
        T: SelectorTarget + ?Sized + 'a,
    {
        let Some((subject, rest)) = self.compounds.split_last() else {
            return false;
        };
        if !subject.matches(element) {
            return false;
        }
        let mut pending = rest.iter().rev().peekable();
        for ancestor in ancestors {
            match pending.peek() {
                None => break,
                Some(compound) if compound.matches(ancestor) => {
                    pending.next();
                }
                Some(_) => {}
            }
        }
        pending.peek().is_none()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, compound) in self.compounds.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{compound}")?;
        }
        Ok(())
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii()
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos > start
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        if self.pos == start {
            return Err(SelectorError::MissingName { offset: start });
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn parse(mut self) -> Result<Selector, SelectorError> {
        let mut compounds = Vec::new();
        self.skip_whitespace();
        while self.peek().is_some() {
            compounds.push(self.compound()?);
            self.skip_whitespace();
        }
        if compounds.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Selector { compounds })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let mut universal = false;

        match self.peek() {
            Some('*') => {
                self.bump();
                universal = true;
            }
            Some(ch) if ch.is_alphabetic() => {
                compound.tag = Some(self.ident()?.to_ascii_lowercase());
            }
            _ => {}
        }

        loop {
            let offset = self.pos;
            match self.peek() {
                None => break,
                Some(ch) if ch.is_whitespace() => break,
                Some('.') => {
                    self.bump();
                    compound.classes.push(self.ident()?);
                }
                Some('#') => {
                    self.bump();
                    compound.id = Some(self.ident()?);
                }
                Some('[') => {
                    self.bump();
                    compound.attributes.push(self.attribute(offset)?);
                }
                Some(ch @ ('>' | '+' | '~' | ',' | ':')) => {
                    return Err(SelectorError::Unsupported { ch, offset });
                }
                Some(ch) => return Err(SelectorError::UnexpectedChar { ch, offset }),
            }
        }

        if compound.is_empty() && !universal {
            let offset = self.pos;
            return match self.peek() {
                Some(ch) => Err(SelectorError::UnexpectedChar { ch, offset }),
                None => Err(SelectorError::Empty),
            };
        }
        Ok(compound)
    }

    fn attribute(&mut self, open: usize) -> Result<AttributeMatch, SelectorError> {
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();
        let value = match self.peek() {
            Some('=') => {
                self.bump();
                self.skip_whitespace();
                let value = match self.peek() {
                    Some(quote @ ('"' | '\'')) => {
                        self.bump();
                        self.quoted(quote, open)?
                    }
                    _ => self.ident()?,
                };
                self.skip_whitespace();
                Some(value)
            }
            _ => None,
        };
        match self.bump() {
            Some(']') => Ok(AttributeMatch { name, value }),
            Some(ch @ ('~' | '|' | '^' | '$' | '*')) => Err(SelectorError::Unsupported {
                ch,
                offset: self.pos - ch.len_utf8(),
            }),
            _ => Err(SelectorError::UnterminatedAttribute { offset: open }),
        }
    }

    fn quoted(&mut self, quote: char, open: usize) -> Result<String, SelectorError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(SelectorError::UnterminatedAttribute { offset: open }),
                Some('\\') => match self.bump() {
                    Some(escaped) => value.push(escaped),
                    None => return Err(SelectorError::UnterminatedAttribute { offset: open }),
                },
                Some(ch) if ch == quote => return Ok(value),
                Some(ch) => value.push(ch),
            }
        }
    }
}
