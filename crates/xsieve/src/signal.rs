//! Signal composer: folds the per-state match signals of one selector chain
//! into a single open/close boolean with edge information.
//!
//! Every state holds its signal between fires (true after a match, false
//! after an unmatch). The selector-level signal is the left-to-right AND over
//! the chain, seeded true by the Start state, so a step only reports open
//! while every ancestor step is simultaneously open.

use smallvec::SmallVec;

use crate::event::LexicalEvent;
use crate::matcher::{StateChain, build_chain};
use crate::parser::ast::Selector;

/// One observation of the combined selector signal.
#[derive(Debug, Clone, Copy)]
pub struct SignalTick {
    /// Combined signal after this event.
    pub open: bool,
    /// Rising edge: a window starts with this event.
    pub opened: bool,
    /// Falling edge: the window ends with this event.
    pub closed: bool,
}

#[derive(Debug)]
pub struct SignalChain {
    states: StateChain,
    signals: SmallVec<[bool; 4]>,
    open: bool,
}

impl SignalChain {
    pub fn new(selector: &Selector) -> Self {
        let states = build_chain(selector);
        let mut signals: SmallVec<[bool; 4]> = SmallVec::with_capacity(states.len());
        for state in &states {
            signals.push(state.is_start());
        }
        Self { states, signals, open: false }
    }

    /// Feed one lexical event at the dispatcher's current depth and report
    /// the combined signal with its edges.
    pub fn observe(&mut self, event: &LexicalEvent, depth: usize) -> SignalTick {
        let mut all_open = true;
        for index in 0..self.states.len() {
            let prev = if index == 0 {
                // Start carries its own anchor; it is never consulted.
                self.states[index].anchor()
            } else {
                self.states[index - 1].anchor()
            };
            let state = &mut self.states[index];
            if state.matches(event, depth, prev) {
                self.signals[index] = true;
            } else if state.unmatches(event, depth) {
                self.signals[index] = false;
            }
            all_open &= self.signals[index];
        }
        let was_open = self.open;
        self.open = all_open;
        SignalTick { open: all_open, opened: all_open && !was_open, closed: was_open && !all_open }
    }
}
