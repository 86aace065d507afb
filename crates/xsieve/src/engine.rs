//! Event fan-out and per-selector dispatch.
//!
//! One [`Extractor`] owns the central depth counter and every registered
//! selector evaluation. Each lexical event is observed exactly once per
//! evaluation, in arrival order; all derived work for an event finishes
//! before the next event is considered. The tokenizer is driven exactly once
//! regardless of how many selectors are registered.

use std::collections::{BTreeMap, VecDeque};

use crate::event::{Attribute, LexicalEvent, Phase, QName};
use crate::parser::{SelectorError, ast, parse_selector};
use crate::signal::SignalChain;
use crate::window::{AssembledValue, Windower};

/// Terminal failure of one selector output stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    /// Tokenizer-level failure (malformed input). Hits every stream.
    #[error("malformed input: {0}")]
    Malformed(String),
    /// Internal bookkeeping violation. Aborts only the affected stream.
    #[error("selector evaluation invariant violated: {0}")]
    Invariant(&'static str),
}

impl StreamError {
    pub fn malformed(message: impl Into<String>) -> Self {
        StreamError::Malformed(message.into())
    }

    pub(crate) fn invariant(message: &'static str) -> Self {
        StreamError::Invariant(message)
    }
}

/// One selector's evaluation: its state chain, its window and its output
/// queue. Failed evaluations stop observing events; the others continue.
#[derive(Debug)]
struct Evaluation {
    source: String,
    chain: SignalChain,
    windower: Windower,
    values: VecDeque<AssembledValue>,
    error: Option<StreamError>,
}

impl Evaluation {
    fn new(selector: &ast::Selector) -> Self {
        Self {
            source: selector.source.clone(),
            chain: SignalChain::new(selector),
            windower: Windower::new(selector.is_attribute_selector()),
            values: VecDeque::new(),
            error: None,
        }
    }

    fn observe(&mut self, event: &LexicalEvent, depth: usize) {
        if self.error.is_some() {
            return;
        }
        let tick = self.chain.observe(event, depth);
        match self.windower.observe(tick, event) {
            Ok(Some(value)) => {
                tracing::trace!(selector = %self.source, "window closed, value emitted");
                self.values.push_back(value);
            }
            Ok(None) => {}
            Err(error) => {
                tracing::debug!(selector = %self.source, %error, "selector stream aborted");
                self.windower.discard();
                self.error = Some(error);
            }
        }
    }

    fn fail(&mut self, error: StreamError) {
        if self.error.is_none() {
            self.windower.discard();
            self.error = Some(error);
        }
    }
}

/// Final per-selector output: every emitted value in document order, plus the
/// terminal error if the stream failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorResult {
    pub values: Vec<AssembledValue>,
    pub error: Option<StreamError>,
}

/// All selector outputs of one finished run, keyed by selector source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    results: BTreeMap<String, SelectorResult>,
}

impl Extraction {
    /// Values emitted for `selector`; empty for unknown selectors.
    pub fn values(&self, selector: &str) -> &[AssembledValue] {
        self.results.get(selector).map_or(&[], |result| result.values.as_slice())
    }

    pub fn result(&self, selector: &str) -> Option<&SelectorResult> {
        self.results.get(selector)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SelectorResult)> {
        self.results.iter().map(|(source, result)| (source.as_str(), result))
    }

    pub fn into_results(self) -> BTreeMap<String, SelectorResult> {
        self.results
    }
}

/// The matching engine: feeds shared lexical events through every registered
/// selector evaluation and collects one lazy output stream per selector.
#[derive(Debug)]
pub struct Extractor {
    depth: usize,
    evaluations: Vec<Evaluation>,
    ended: bool,
}

impl Extractor {
    /// Build the per-selector chains. A syntax error in any selector rejects
    /// the whole call. Duplicate selector strings share one output stream.
    pub fn new<I, S>(selectors: I) -> Result<Self, SelectorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut evaluations: Vec<Evaluation> = Vec::new();
        for source in selectors {
            let source = source.as_ref();
            if evaluations.iter().any(|eval| eval.source == source) {
                continue;
            }
            let selector = parse_selector(source)?;
            tracing::debug!(selector = %selector.source, steps = selector.steps.len(), "selector registered");
            evaluations.push(Evaluation::new(&selector));
        }
        Ok(Self { depth: 0, evaluations, ended: false })
    }

    /// Registered selector sources, in registration order.
    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.evaluations.iter().map(|eval| eval.source.as_str())
    }

    /// Feed one raw lexical event.
    ///
    /// `OpenComplete` additionally replays the attribute bag as doubled
    /// declared/settled ticks at the pre-increment depth and only then
    /// increments the depth counter; an element without attributes produces
    /// no ticks. `Close` decrements the counter before unmatch evaluation.
    /// Events after `finish`/`abort` are ignored.
    pub fn handle(&mut self, event: &LexicalEvent) {
        if self.ended {
            return;
        }
        match event {
            LexicalEvent::OpenComplete { attributes, .. } => {
                self.dispatch(event);
                if !attributes.is_empty() {
                    let bag = attributes.clone();
                    self.dispatch(&LexicalEvent::AttrBag { attributes: bag.clone(), phase: Phase::Declared });
                    self.dispatch(&LexicalEvent::AttrBag { attributes: bag, phase: Phase::Settled });
                    for attribute in attributes {
                        for phase in [Phase::Declared, Phase::Settled] {
                            self.dispatch(&LexicalEvent::Attr {
                                name: attribute.name.clone(),
                                value: attribute.value.clone(),
                                phase,
                            });
                        }
                    }
                }
                self.depth += 1;
            }
            LexicalEvent::Close { .. } => {
                if self.depth == 0 {
                    self.fail_all(StreamError::malformed("close event without matching open"));
                    return;
                }
                self.depth -= 1;
                self.dispatch(event);
            }
            _ => self.dispatch(event),
        }
    }

    /// Open an element: emits the open-start/open-complete pair and, through
    /// [`Extractor::handle`], the derived attribute ticks.
    pub fn open(&mut self, name: QName, attributes: Vec<Attribute>) {
        self.handle(&LexicalEvent::OpenStart { name: name.clone() });
        self.handle(&LexicalEvent::OpenComplete { name, attributes });
    }

    /// Convenience form of [`Extractor::open`] for string pairs.
    pub fn open_element(&mut self, name: &str, attributes: &[(&str, &str)]) {
        let attributes = attributes
            .iter()
            .map(|(name, value)| Attribute::new(*name, *value))
            .collect();
        self.open(QName::parse(name), attributes);
    }

    pub fn text(&mut self, value: &str) {
        self.handle(&LexicalEvent::Text { value: value.to_string() });
    }

    pub fn close_element(&mut self, name: &str) {
        self.handle(&LexicalEvent::Close { name: QName::parse(name) });
    }

    /// Pull the values emitted for `selector` so far. Unknown selectors
    /// drain nothing.
    pub fn drain(&mut self, selector: &str) -> Vec<AssembledValue> {
        self.evaluations
            .iter_mut()
            .find(|eval| eval.source == selector)
            .map(|eval| eval.values.drain(..).collect())
            .unwrap_or_default()
    }

    /// Tokenizer failure: every stream terminates with `error`; windows open
    /// at the point of failure emit nothing.
    pub fn abort(&mut self, error: StreamError) {
        tracing::debug!(%error, "extraction aborted");
        self.fail_all(error);
    }

    /// Explicit end of input: still-open windows are force-closed so their
    /// partial values are emitted, and every stream completes.
    pub fn finish(mut self) -> Extraction {
        self.ended = true;
        let mut results = BTreeMap::new();
        for eval in &mut self.evaluations {
            if eval.error.is_none() {
                if let Some(value) = eval.windower.force_close() {
                    tracing::debug!(selector = %eval.source, "window force-closed at end of input");
                    eval.values.push_back(value);
                }
            }
            results.insert(
                eval.source.clone(),
                SelectorResult {
                    values: eval.values.drain(..).collect(),
                    error: eval.error.clone(),
                },
            );
        }
        Extraction { results }
    }

    fn dispatch(&mut self, event: &LexicalEvent) {
        for eval in &mut self.evaluations {
            eval.observe(event, self.depth);
        }
    }

    fn fail_all(&mut self, error: StreamError) {
        self.ended = true;
        for eval in &mut self.evaluations {
            eval.fail(error.clone());
        }
    }
}
