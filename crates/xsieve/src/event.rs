//! Lexical event model shared by the tokenizer adapter and the matching
//! engine.
//!
//! Attribute occurrences are represented as two explicit ticks: a `Declared`
//! tick that match states use to decide whether a window opens, followed by a
//! `Settled` tick that immediately closes it again (attributes do not nest).
//! The whole attribute bag of an element gets the same pair of ticks so that
//! attribute-set steps can react to one emission without double counting.

use std::fmt;

/// Qualified name as it appears lexically: optional namespace prefix plus
/// local part. Prefixes are compared textually; URI resolution is out of
/// scope for the dialect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(local: impl Into<String>) -> Self {
        Self { prefix: None, local: local.into() }
    }

    pub fn prefixed(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self { prefix: Some(prefix.into()), local: local.into() }
    }

    /// Split a lexical name on the first `:`.
    pub fn parse(text: &str) -> Self {
        match text.split_once(':') {
            Some((prefix, local)) => Self::prefixed(prefix, local),
            None => Self::new(text),
        }
    }

    /// The name as written in the document (`prefix:local` or `local`).
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local),
            None => self.local.clone(),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, "{prefix}:")?;
        }
        f.write_str(&self.local)
    }
}

/// One attribute as delivered on an `OpenComplete` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: QName::parse(&name.into()), value: value.into() }
    }
}

/// Which half of a doubled attribute emission a tick belongs to.
///
/// `Declared` is the "did we enter" observation, `Settled` the "did we
/// immediately exit" one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Declared,
    Settled,
}

/// A single tokenizer callback, in strict document order.
///
/// `OpenComplete` increments the shared depth counter only after every match
/// state (and the derived attribute ticks) saw it at the pre-increment depth;
/// `Close` decrements the counter before unmatch evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexicalEvent {
    /// Tag name seen, attributes still unknown.
    OpenStart { name: QName },
    /// Tag fully opened, attribute bag complete.
    OpenComplete { name: QName, attributes: Vec<Attribute> },
    /// One attribute occurrence, replayed from the owning element's bag.
    Attr { name: QName, value: String, phase: Phase },
    /// The whole attribute bag of the element just opened, in one shot.
    AttrBag { attributes: Vec<Attribute>, phase: Phase },
    /// Character data.
    Text { value: String },
    /// Closing tag.
    Close { name: QName },
}
