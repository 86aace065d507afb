//! Windowed assembler: carves the shared event stream into per-selector
//! windows and folds each window into one [`AssembledValue`].

use std::collections::BTreeMap;

use crate::engine::StreamError;
use crate::event::{LexicalEvent, Phase};
use crate::signal::SignalTick;

/// One reconstructed match: an element subtree or an attribute map.
///
/// Attribute-selector values have no `tag_name`; element values carry their
/// attributes inline, concatenated text and children in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledValue {
    pub tag_name: Option<String>,
    pub text: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<AssembledValue>,
}

impl AssembledValue {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Fold over the events of one open window.
#[derive(Debug)]
pub(crate) struct WindowFold {
    attribute_final: bool,
    /// Element stack; `stack[0]` is the window root while it is still open.
    stack: Vec<AssembledValue>,
    /// Set once the root element closed.
    complete: Option<AssembledValue>,
}

impl WindowFold {
    fn new(attribute_final: bool) -> Self {
        let stack = if attribute_final {
            // Attribute windows fold into a bare map from the start.
            vec![AssembledValue::default()]
        } else {
            Vec::new()
        };
        Self { attribute_final, stack, complete: None }
    }

    fn fold(&mut self, event: &LexicalEvent) -> Result<(), StreamError> {
        if self.attribute_final {
            return self.fold_attributes(event);
        }
        match event {
            LexicalEvent::OpenComplete { name, attributes } => {
                let mut value = AssembledValue {
                    tag_name: Some(name.qualified()),
                    ..AssembledValue::default()
                };
                for attribute in attributes {
                    value.attributes.insert(attribute.name.qualified(), attribute.value.clone());
                }
                self.stack.push(value);
                Ok(())
            }
            LexicalEvent::Text { value } => {
                let top = self
                    .stack
                    .last_mut()
                    .ok_or_else(|| StreamError::invariant("text event outside any open element"))?;
                top.text.push_str(value);
                Ok(())
            }
            LexicalEvent::Close { .. } => {
                let value = self
                    .stack
                    .pop()
                    .ok_or_else(|| StreamError::invariant("close event without open element"))?;
                match self.stack.last_mut() {
                    Some(parent) => parent.children.push(value),
                    None => self.complete = Some(value),
                }
                Ok(())
            }
            // Attributes already arrived inline on OpenComplete; folding the
            // replayed ticks as well would double-insert them.
            LexicalEvent::OpenStart { .. }
            | LexicalEvent::Attr { .. }
            | LexicalEvent::AttrBag { .. } => Ok(()),
        }
    }

    fn fold_attributes(&mut self, event: &LexicalEvent) -> Result<(), StreamError> {
        let map = self
            .stack
            .last_mut()
            .ok_or_else(|| StreamError::invariant("attribute window without value"))?;
        match event {
            // Only the declared tick inserts; the settled tick of the same
            // occurrence closes the window and must not insert again.
            LexicalEvent::Attr { name, value, phase: Phase::Declared } => {
                map.attributes.insert(name.qualified(), value.clone());
            }
            LexicalEvent::AttrBag { attributes, phase: Phase::Declared } => {
                for attribute in attributes {
                    map.attributes.insert(attribute.name.qualified(), attribute.value.clone());
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Collapse whatever was assembled so far into one value. Used both on
    /// normal close (the root already popped) and when a still-open window is
    /// force-closed at end of input.
    fn into_value(mut self) -> AssembledValue {
        if let Some(complete) = self.complete {
            return complete;
        }
        while self.stack.len() > 1 {
            // Unclosed nested elements fold into their parents as-is.
            if let Some(value) = self.stack.pop() {
                if let Some(parent) = self.stack.last_mut() {
                    parent.children.push(value);
                }
            }
        }
        self.stack.pop().unwrap_or_default()
    }
}

/// Per-selector windowing: opens a fold on the rising edge of the selector
/// signal, feeds it every event up to and including the falling edge, and
/// emits exactly one value per window.
#[derive(Debug)]
pub(crate) struct Windower {
    attribute_final: bool,
    active: Option<WindowFold>,
}

impl Windower {
    pub(crate) fn new(attribute_final: bool) -> Self {
        Self { attribute_final, active: None }
    }

    pub(crate) fn observe(
        &mut self,
        tick: SignalTick,
        event: &LexicalEvent,
    ) -> Result<Option<AssembledValue>, StreamError> {
        match self.active.as_mut() {
            None => {
                if tick.opened {
                    let mut fold = WindowFold::new(self.attribute_final);
                    fold.fold(event)?;
                    self.active = Some(fold);
                }
                Ok(None)
            }
            Some(fold) => {
                fold.fold(event)?;
                if tick.closed {
                    Ok(self.active.take().map(WindowFold::into_value))
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// End-of-input: a still-open window emits its partial value.
    pub(crate) fn force_close(&mut self) -> Option<AssembledValue> {
        self.active.take().map(WindowFold::into_value)
    }

    /// Terminal failure: a still-open window emits nothing.
    pub(crate) fn discard(&mut self) {
        self.active = None;
    }
}
