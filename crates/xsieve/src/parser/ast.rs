//! AST for the selector dialect: an ordered list of axis steps, produced once
//! per selector string and immutable afterwards.

use crate::event::QName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    SelfOrDescendant,
    Attribute,
    AttributeSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTest {
    /// `*` — any name, prefixed or not.
    Any,
    /// Literal local name; the step's prefix is matched separately.
    Name(String),
}

/// One `[@Attr="literal"]` equality test. All predicates of a step must hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub name: QName,
    pub value: String,
}

/// One path segment of a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisStep {
    pub axis: Axis,
    pub prefix: Option<String>,
    pub name: NameTest,
    pub predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// The selector exactly as written; used as the output-stream key.
    pub source: String,
    pub steps: Vec<AxisStep>,
}

impl Selector {
    /// Whether the final step selects attributes rather than an element
    /// subtree. Such selectors emit attribute maps instead of subtrees.
    pub fn is_attribute_selector(&self) -> bool {
        self.steps
            .last()
            .is_some_and(|step| matches!(step.axis, Axis::Attribute | Axis::AttributeSet))
    }
}
