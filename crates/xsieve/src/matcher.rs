//! Match states: the per-step runtime machines a selector chain is built of.
//!
//! Each state latches the depth at which it first matched (`entered_depth`)
//! and clears that latch when it unmatches, so sibling and descendant
//! re-entry both re-anchor correctly. States never mutate the shared depth
//! counter; the dispatcher passes it by value into every call.

use smallvec::SmallVec;

use crate::event::{Attribute, LexicalEvent, Phase, QName};
use crate::parser::ast::{Axis, AxisStep, NameTest, Predicate, Selector};

/// Name/namespace/predicate test shared by element states.
#[derive(Debug, Clone)]
pub struct ElementTest {
    prefix: Option<String>,
    name: NameTest,
    predicates: Vec<Predicate>,
}

impl ElementTest {
    fn accepts(&self, name: &QName, attributes: &[Attribute]) -> bool {
        if let NameTest::Name(local) = &self.name {
            if name.local != *local || name.prefix.as_deref() != self.prefix.as_deref() {
                return false;
            }
        }
        self.predicates
            .iter()
            .all(|p| attributes.iter().any(|a| a.name == p.name && a.value == p.value))
    }
}

/// Name/namespace test for single-attribute states.
#[derive(Debug, Clone)]
pub struct AttributeTest {
    prefix: Option<String>,
    name: NameTest,
}

impl AttributeTest {
    fn accepts(&self, name: &QName) -> bool {
        match &self.name {
            NameTest::Any => true,
            NameTest::Name(local) => {
                name.local == *local && name.prefix.as_deref() == self.prefix.as_deref()
            }
        }
    }
}

#[derive(Debug)]
pub enum StateKind {
    /// Implicit root step; open from the start, never unmatches.
    Start,
    /// Matches an element opening exactly one level below the previous step.
    Child(ElementTest),
    /// Matches an element opening at any depth at or below the previous step.
    SelfOrDescendant(ElementTest),
    /// Matches one attribute of the element the previous step entered.
    Attribute(AttributeTest),
    /// Matches the whole attribute bag of that element in one shot.
    AttributeSet,
}

/// Where a matched state anchors the steps after it.
#[derive(Debug, Clone, Copy)]
pub struct Anchor {
    /// Depth at which direct children of the matched element open.
    pub child_depth: Option<usize>,
    /// Minimum depth for self-or-descendant matches, which is also the depth
    /// at which the matched element's own attributes are replayed.
    pub floor: Option<usize>,
}

#[derive(Debug)]
pub struct StepState {
    kind: StateKind,
    entered_depth: Option<usize>,
}

impl StepState {
    fn new(kind: StateKind) -> Self {
        Self { kind, entered_depth: None }
    }

    pub fn is_start(&self) -> bool {
        matches!(self.kind, StateKind::Start)
    }

    pub fn anchor(&self) -> Anchor {
        match self.kind {
            StateKind::Start => Anchor { child_depth: Some(0), floor: Some(0) },
            _ => Anchor {
                child_depth: self.entered_depth.map(|d| d + 1),
                floor: self.entered_depth,
            },
        }
    }

    /// Whether `event` at `depth` satisfies this step, given the anchor of
    /// the previous step. Latches `entered_depth` on the first true result.
    pub fn matches(&mut self, event: &LexicalEvent, depth: usize, prev: Anchor) -> bool {
        let hit = match (&self.kind, event) {
            (StateKind::Child(test), LexicalEvent::OpenComplete { name, attributes }) => {
                prev.child_depth == Some(depth) && test.accepts(name, attributes)
            }
            (StateKind::SelfOrDescendant(test), LexicalEvent::OpenComplete { name, attributes }) => {
                prev.floor.is_some_and(|floor| depth >= floor) && test.accepts(name, attributes)
            }
            (StateKind::Attribute(test), LexicalEvent::Attr { name, phase, .. }) => {
                *phase == Phase::Declared && prev.floor == Some(depth) && test.accepts(name)
            }
            (StateKind::AttributeSet, LexicalEvent::AttrBag { phase, .. }) => {
                *phase == Phase::Declared && prev.floor == Some(depth)
            }
            _ => false,
        };
        if hit && self.entered_depth.is_none() {
            self.entered_depth = Some(depth);
        }
        hit
    }

    /// Whether this step's open match is closed by `event` at `depth` (the
    /// dispatcher already decremented the counter for `Close` events).
    /// Element states close on the depth threshold; attribute states close on
    /// every settled tick, since attributes do not nest. Clears the latch.
    pub fn unmatches(&mut self, event: &LexicalEvent, depth: usize) -> bool {
        let hit = match (&self.kind, event) {
            (StateKind::Child(_) | StateKind::SelfOrDescendant(_), LexicalEvent::Close { .. }) => {
                self.entered_depth.is_some_and(|entered| depth <= entered)
            }
            (StateKind::Attribute(_), LexicalEvent::Attr { phase, .. })
            | (StateKind::AttributeSet, LexicalEvent::AttrBag { phase, .. }) => {
                *phase == Phase::Settled
            }
            _ => false,
        };
        if hit {
            self.entered_depth = None;
        }
        hit
    }
}

pub type StateChain = SmallVec<[StepState; 4]>;

/// Step-Chain Builder: one state per axis step, preceded by the implicit
/// Start state. States are linked by position; the previous state's anchor is
/// handed in by the signal composer on every tick.
pub fn build_chain(selector: &Selector) -> StateChain {
    let mut chain: StateChain = SmallVec::new();
    chain.push(StepState::new(StateKind::Start));
    for step in &selector.steps {
        chain.push(StepState::new(state_kind(step)));
    }
    chain
}

fn state_kind(step: &AxisStep) -> StateKind {
    let element_test = || ElementTest {
        prefix: step.prefix.clone(),
        name: step.name.clone(),
        predicates: step.predicates.clone(),
    };
    match step.axis {
        Axis::Child => StateKind::Child(element_test()),
        Axis::SelfOrDescendant => StateKind::SelfOrDescendant(element_test()),
        Axis::Attribute => StateKind::Attribute(AttributeTest {
            prefix: step.prefix.clone(),
            name: step.name.clone(),
        }),
        Axis::AttributeSet => StateKind::AttributeSet,
    }
}
