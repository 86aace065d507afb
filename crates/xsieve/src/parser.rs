//! Selector string parsing.
//!
//! The grammar lives in `selector.pest`; this module walks the pest pairs and
//! builds the ordered [`ast::AxisStep`] list the chain builder consumes.
//! Errors are synchronous and reject the whole selector.

use pest::Parser;
use pest::iterators::Pair;

use crate::event::QName;

pub mod ast;

#[derive(pest_derive::Parser)]
#[grammar = "selector.pest"]
pub struct SelectorParser;

#[derive(Debug, thiserror::Error)]
pub enum SelectorError {
    #[error("selector {selector:?} is not valid: {source}")]
    Syntax {
        selector: String,
        #[source]
        source: Box<pest::error::Error<Rule>>,
    },
    #[error("selector {selector:?}: an attribute step must be the final step")]
    AttributeStepNotLast { selector: String },
    #[error("selector {selector:?}: attribute steps take the child separator, not `//`")]
    DescendantAttributeStep { selector: String },
}

/// Parse a selector string into its ordered step list.
pub fn parse_selector(input: &str) -> Result<ast::Selector, SelectorError> {
    let syntax = |source: pest::error::Error<Rule>| SelectorError::Syntax {
        selector: input.to_string(),
        source: Box::new(source),
    };
    let mut pairs = SelectorParser::parse(Rule::selector, input).map_err(syntax)?;
    let selector = pairs.next().expect("selector root");
    debug_assert_eq!(selector.as_rule(), Rule::selector);

    let mut steps: Vec<ast::AxisStep> = Vec::new();
    // Leading `/` (or nothing) means child-of-root; leading `//` means
    // self-or-descendant. A `//` separator turns the following step into a
    // self-or-descendant step.
    let mut descendant = false;
    for pair in selector.into_inner() {
        match pair.as_rule() {
            Rule::lead | Rule::sep => {
                descendant = matches!(first_inner_rule(&pair), Some(Rule::dslash));
            }
            Rule::segment => {
                if let Some(last) = steps.last() {
                    if matches!(last.axis, ast::Axis::Attribute | ast::Axis::AttributeSet) {
                        return Err(SelectorError::AttributeStepNotLast {
                            selector: input.to_string(),
                        });
                    }
                }
                steps.push(build_segment(&pair, descendant, input)?);
                descendant = false;
            }
            Rule::EOI => {}
            _ => unreachable!("unexpected rule under selector: {:?}", pair.as_rule()),
        }
    }
    Ok(ast::Selector { source: input.to_string(), steps })
}

fn first_inner_rule(pair: &Pair<Rule>) -> Option<Rule> {
    pair.clone().into_inner().next().map(|p| p.as_rule())
}

fn build_segment(
    pair: &Pair<Rule>,
    descendant: bool,
    input: &str,
) -> Result<ast::AxisStep, SelectorError> {
    let inner = pair.clone().into_inner().next().expect("segment inner");
    match inner.as_rule() {
        Rule::elem_test => Ok(build_elem_test(&inner, descendant)),
        Rule::attr_test => {
            if descendant {
                return Err(SelectorError::DescendantAttributeStep {
                    selector: input.to_string(),
                });
            }
            Ok(build_attr_test(&inner))
        }
        rule => unreachable!("unexpected rule under segment: {rule:?}"),
    }
}

fn build_elem_test(pair: &Pair<Rule>, descendant: bool) -> ast::AxisStep {
    let axis = if descendant { ast::Axis::SelfOrDescendant } else { ast::Axis::Child };
    let mut prefix = None;
    let mut name = ast::NameTest::Any;
    let mut predicates = Vec::new();
    for part in pair.clone().into_inner() {
        match part.as_rule() {
            Rule::name_test => (prefix, name) = build_name_test(&part),
            Rule::predicate => predicates.push(build_predicate(&part)),
            rule => unreachable!("unexpected rule under elem_test: {rule:?}"),
        }
    }
    ast::AxisStep { axis, prefix, name, predicates }
}

fn build_attr_test(pair: &Pair<Rule>) -> ast::AxisStep {
    let inner = pair.clone().into_inner().next().expect("attr_test inner");
    match inner.as_rule() {
        Rule::star => ast::AxisStep {
            axis: ast::Axis::AttributeSet,
            prefix: None,
            name: ast::NameTest::Any,
            predicates: Vec::new(),
        },
        Rule::qname => {
            let qname = QName::parse(inner.as_str());
            ast::AxisStep {
                axis: ast::Axis::Attribute,
                prefix: qname.prefix,
                name: ast::NameTest::Name(qname.local),
                predicates: Vec::new(),
            }
        }
        rule => unreachable!("unexpected rule under attr_test: {rule:?}"),
    }
}

fn build_name_test(pair: &Pair<Rule>) -> (Option<String>, ast::NameTest) {
    let inner = pair.clone().into_inner().next().expect("name_test inner");
    match inner.as_rule() {
        Rule::star => (None, ast::NameTest::Any),
        Rule::qname => {
            let qname = QName::parse(inner.as_str());
            (qname.prefix, ast::NameTest::Name(qname.local))
        }
        rule => unreachable!("unexpected rule under name_test: {rule:?}"),
    }
}

fn build_predicate(pair: &Pair<Rule>) -> ast::Predicate {
    let mut name = None;
    let mut value = String::new();
    for part in pair.clone().into_inner() {
        match part.as_rule() {
            Rule::qname => name = Some(QName::parse(part.as_str())),
            Rule::literal => {
                if let Some(content) = part.into_inner().next() {
                    value = content.as_str().to_string();
                }
            }
            rule => unreachable!("unexpected rule under predicate: {rule:?}"),
        }
    }
    ast::Predicate { name: name.expect("predicate attribute name"), value }
}
