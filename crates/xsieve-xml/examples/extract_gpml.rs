//! Extract a few values from an inline GPML pathway document.
//!
//! Run with: `cargo run -p xsieve-xml --example extract_gpml`

use xsieve_xml::extract;

const DOC: &str = r#"<Pathway Name="New Pathway" Organism="http://pathvisio.org/GPML/2013a" Version="20170502">
  <DataNode GraphId="ea3e5" Type="GeneProduct">GENE1</DataNode>
  <DataNode GraphId="fe3b1" Type="Metabolite">ATP</DataNode>
</Pathway>"#;

fn main() {
    let selectors = ["/Pathway/@Name", "/Pathway/DataNode/@GraphId", "/Pathway/DataNode"];
    match extract(DOC.as_bytes(), selectors) {
        Ok(extraction) => {
            for (selector, result) in extraction.iter() {
                println!("{selector}:");
                for value in &result.values {
                    match &value.tag_name {
                        Some(tag) => println!("  <{tag}> text={:?} attrs={:?}", value.text, value.attributes),
                        None => println!("  {:?}", value.attributes),
                    }
                }
            }
        }
        Err(err) => eprintln!("selector error: {err}"),
    }
}
