//! Whole-document extraction through the quick-xml adapter.

use rstest::rstest;
use xsieve_xml::{XmlExtractor, extract};

const GPML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Pathway Name="New Pathway" Organism="http://pathvisio.org/GPML/2013a" Version="20170502">
  <!-- two gene products and a label -->
  <DataNode GraphId="ea3e5" Type="GeneProduct">
    <Graphics CenterX="100.0" CenterY="200.0"/>
  </DataNode>
  <DataNode GraphId="fe3b1" Type="Metabolite"/>
  <Label GraphId="aa001">caption</Label>
</Pathway>
"#;

#[rstest]
fn pathway_name_single_match() {
    let out = extract(GPML.as_bytes(), ["/Pathway/@Name"]).unwrap();
    let values = out.values("/Pathway/@Name");
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].attribute("Name"), Some("New Pathway"));
}

#[rstest]
fn graph_ids_in_document_order() {
    let out = extract(GPML.as_bytes(), ["/Pathway/DataNode/@GraphId"]).unwrap();
    let ids: Vec<_> = out
        .values("/Pathway/DataNode/@GraphId")
        .iter()
        .map(|v| v.attribute("GraphId").unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["ea3e5", "fe3b1"]);
}

#[rstest]
fn attribute_set_of_the_root_element() {
    let out = extract(GPML.as_bytes(), ["/Pathway/@*"]).unwrap();
    let values = out.values("/Pathway/@*");
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].attributes.len(), 3);
    assert_eq!(values[0].attribute("Version"), Some("20170502"));
}

#[rstest]
fn empty_elements_still_open_and_close_windows() {
    let out = extract(GPML.as_bytes(), ["/Pathway/DataNode"]).unwrap();
    let values = out.values("/Pathway/DataNode");
    assert_eq!(values.len(), 2);
    assert_eq!(values[0].children.len(), 1);
    assert!(values[1].children.is_empty());
}

#[rstest]
fn text_and_subtree_reconstruction() {
    let out = extract(GPML.as_bytes(), ["/Pathway/Label"]).unwrap();
    let values = out.values("/Pathway/Label");
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].text, "caption");
}

#[rstest]
fn many_selectors_single_tokenizer_pass() {
    let selectors =
        ["/Pathway/@Name", "/Pathway/@*", "/Pathway/DataNode", "/Pathway/DataNode/@*"];
    let combined = extract(GPML.as_bytes(), selectors).unwrap();
    for selector in selectors {
        let alone = extract(GPML.as_bytes(), [selector]).unwrap();
        assert_eq!(combined.values(selector), alone.values(selector), "selector {selector}");
    }
}

#[rstest]
fn prefixed_documents_match_prefixed_selectors() {
    let doc = r#"<gpml:Pathway xmlns:gpml="http://pathvisio.org/GPML/2013a" Name="n">
        <gpml:DataNode GraphId="x1"/>
    </gpml:Pathway>"#;
    let out = extract(doc.as_bytes(), ["/gpml:Pathway/gpml:DataNode/@GraphId"]).unwrap();
    let values = out.values("/gpml:Pathway/gpml:DataNode/@GraphId");
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].attribute("GraphId"), Some("x1"));
}

#[rstest]
fn entities_are_unescaped() {
    let doc = r#"<Pathway Name="A &amp; B"><Comment>1 &lt; 2</Comment></Pathway>"#;
    let out = extract(doc.as_bytes(), ["/Pathway/@Name", "/Pathway/Comment"]).unwrap();
    assert_eq!(out.values("/Pathway/@Name")[0].attribute("Name"), Some("A & B"));
    assert_eq!(out.values("/Pathway/Comment")[0].text, "1 < 2");
}

#[rstest]
fn character_references_resolve_in_text() {
    let doc = "<Pathway><Comment>&#65;&#x42;&gt;&quot;</Comment></Pathway>";
    let out = extract(doc.as_bytes(), ["/Pathway/Comment"]).unwrap();
    assert_eq!(out.values("/Pathway/Comment")[0].text, "AB>\"");
}

#[rstest]
fn unknown_entity_reference_is_malformed_input() {
    let doc = "<Pathway><Comment>&nosuch;</Comment></Pathway>";
    let out = extract(doc.as_bytes(), ["/Pathway/Comment"]).unwrap();
    let result = out.result("/Pathway/Comment").unwrap();
    assert!(result.error.is_some());
    assert!(result.values.is_empty());
}

#[rstest]
fn truncated_document_yields_best_effort_values() {
    let doc = r#"<Pathway Name="New Pathway"><DataNode GraphId="ea3e5">GENE1"#;
    let out = extract(doc.as_bytes(), ["/Pathway/@Name", "/Pathway/DataNode"]).unwrap();

    assert_eq!(out.values("/Pathway/@Name").len(), 1);
    let nodes = out.values("/Pathway/DataNode");
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].text, "GENE1");
    assert!(out.result("/Pathway/DataNode").unwrap().error.is_none());
}

#[rstest]
fn mismatched_end_tag_fails_every_stream() {
    let doc = r#"<Pathway Name="n"><DataNode GraphId="x"></Pathway>"#;
    let out = extract(doc.as_bytes(), ["/Pathway/@Name", "/Pathway/DataNode"]).unwrap();
    // The root attribute window completed before the tokenizer error, so its
    // value survives alongside the terminal failure.
    let name = out.result("/Pathway/@Name").unwrap();
    assert_eq!(name.values.len(), 1);
    assert!(name.error.is_some());
    assert!(out.result("/Pathway/DataNode").unwrap().error.is_some());
    // No partial value for the window that was open when the failure hit.
    assert!(out.values("/Pathway/DataNode").is_empty());
}

#[rstest]
fn selector_syntax_error_rejects_the_whole_call() {
    assert!(XmlExtractor::new(["/Pathway/@Name/oops"]).is_err());
    assert!(extract(GPML.as_bytes(), ["not a selector /"]).is_err());
}
