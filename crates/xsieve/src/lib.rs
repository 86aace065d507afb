pub mod engine;
pub mod event;
pub mod matcher;
pub mod parser;
pub mod signal;
pub mod window;

pub use engine::{Extraction, Extractor, SelectorResult, StreamError};
pub use event::{Attribute, LexicalEvent, Phase, QName};
pub use parser::SelectorError;
pub use parser::SelectorParser;
pub use parser::parse_selector;
pub use window::AssembledValue;
