//! Tokenizer collaborator: adapts `quick-xml`'s pull reader into the lexical
//! event model of the `xsieve` engine and drives a whole document through it
//! in one forward pass.
//!
//! The reader is driven exactly once regardless of selector count; chunk
//! boundaries are absorbed by `BufRead`. A clean or truncated end of input
//! completes every stream (still-open windows emit their partial values);
//! malformed XML terminates every stream with the tokenizer error.

use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::Event;
use xsieve::{Attribute, Extraction, Extractor, QName, SelectorError, StreamError};

/// A selector engine fed from a `quick-xml` reader.
#[derive(Debug)]
pub struct XmlExtractor {
    inner: Extractor,
}

impl XmlExtractor {
    /// Build the engine for `selectors`. A syntax error in any selector
    /// rejects the whole call.
    pub fn new<I, S>(selectors: I) -> Result<Self, SelectorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self { inner: Extractor::new(selectors)? })
    }

    /// Run the document through the engine in a single forward pass and
    /// complete every stream.
    pub fn read_from<R: BufRead>(mut self, reader: R) -> Extraction {
        let mut xml = Reader::from_reader(reader);
        xml.config_mut().expand_empty_elements = true;

        let mut buf = Vec::new();
        loop {
            match step(&mut xml, &mut buf, &mut self.inner) {
                Ok(true) => {}
                // End of input, clean or truncated. The tokenizer does not
                // flag unclosed elements here; the engine force-closes
                // whatever is still open.
                Ok(false) => break,
                Err(error) => {
                    tracing::debug!(%error, "tokenizer failed, terminating all streams");
                    self.inner.abort(StreamError::malformed(error.to_string()));
                    break;
                }
            }
            buf.clear();
        }
        self.inner.finish()
    }
}

/// One-shot convenience: parse `selectors`, run `reader` through the engine
/// and return every selector's output.
pub fn extract<R, I, S>(reader: R, selectors: I) -> Result<Extraction, SelectorError>
where
    R: BufRead,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Ok(XmlExtractor::new(selectors)?.read_from(reader))
}

/// Pull one tokenizer event and feed it to the engine. Returns `Ok(false)`
/// at end of input.
fn step<R: BufRead>(
    xml: &mut Reader<R>,
    buf: &mut Vec<u8>,
    engine: &mut Extractor,
) -> Result<bool, quick_xml::Error> {
    match xml.read_event_into(buf)? {
        Event::Start(start) => {
            let name = QName::parse(&String::from_utf8_lossy(start.name().as_ref()));
            let mut attributes = Vec::new();
            for attribute in start.attributes() {
                let attribute = attribute?;
                let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
                let value = attribute.unescape_value()?.into_owned();
                attributes.push(Attribute { name: QName::parse(&key), value });
            }
            engine.open(name, attributes);
            Ok(true)
        }
        Event::End(end) => {
            engine.close_element(&String::from_utf8_lossy(end.name().as_ref()));
            Ok(true)
        }
        // Whitespace-only spans are inter-element indentation; real text
        // keeps its inner whitespace, including the spans around references.
        Event::Text(text) => {
            let value = text.decode()?;
            if !value.chars().all(char::is_whitespace) {
                engine.text(&value);
            }
            Ok(true)
        }
        // Entity and character references inside text arrive as their own
        // events; text events carry only the literal spans between them.
        Event::GeneralRef(reference) => {
            if let Some(ch) = reference.resolve_char_ref()? {
                engine.text(ch.encode_utf8(&mut [0u8; 4]));
            } else {
                let name = reference.decode()?;
                match quick_xml::escape::resolve_predefined_entity(&name) {
                    Some(resolved) => engine.text(resolved),
                    None => {
                        tracing::debug!(entity = %name, "unrecognized entity reference, terminating all streams");
                        engine.abort(StreamError::malformed(format!(
                            "unrecognized entity reference '&{name};'"
                        )));
                        return Ok(false);
                    }
                }
            }
            Ok(true)
        }
        Event::CData(cdata) => {
            engine.text(&String::from_utf8_lossy(cdata.as_ref()));
            Ok(true)
        }
        Event::Eof => Ok(false),
        // Declarations, comments, processing instructions and doctypes carry
        // no selectable content. Empty tags never reach us because the reader
        // expands them into a start/end pair.
        _ => Ok(true),
    }
}
