//! Many selectors sharing one event stream must behave exactly like each
//! selector run alone over a fresh pass of the same document.

use rstest::rstest;
use xsieve::{Extraction, Extractor};

const SELECTORS: [&str; 4] =
    ["/Pathway/@Name", "/Pathway/@*", "/Pathway/DataNode", "/Pathway/DataNode/@*"];

fn drive(ex: &mut Extractor) {
    ex.open_element("Pathway", &[("Name", "New Pathway"), ("Version", "20170502")]);
    ex.open_element("DataNode", &[("GraphId", "ea3e5")]);
    ex.text("GENE1");
    ex.close_element("DataNode");
    ex.open_element("DataNode", &[("GraphId", "fe3b1")]);
    ex.close_element("DataNode");
    ex.close_element("Pathway");
}

fn run(selectors: &[&str]) -> Extraction {
    let mut ex = Extractor::new(selectors).unwrap();
    drive(&mut ex);
    ex.finish()
}

#[rstest]
fn shared_prefixes_do_not_interfere() {
    let combined = run(&SELECTORS);
    for selector in SELECTORS {
        let alone = run(&[selector]);
        assert_eq!(combined.values(selector), alone.values(selector), "selector {selector}");
    }
}

#[rstest]
fn disjoint_selector_sets_union_to_one_run() {
    let first = run(&SELECTORS[..2]);
    let second = run(&SELECTORS[2..]);
    let union = run(&SELECTORS);
    for &selector in &SELECTORS[..2] {
        assert_eq!(union.values(selector), first.values(selector));
    }
    for &selector in &SELECTORS[2..] {
        assert_eq!(union.values(selector), second.values(selector));
    }
}

#[rstest]
fn duplicate_selectors_share_one_stream() {
    let mut ex = Extractor::new(["/Pathway/@Name", "/Pathway/@Name"]).unwrap();
    assert_eq!(ex.selectors().count(), 1);
    drive(&mut ex);
    assert_eq!(ex.finish().values("/Pathway/@Name").len(), 1);
}

#[rstest]
fn drain_is_incremental_and_lazy() {
    let mut ex = Extractor::new(["/Pathway/DataNode/@GraphId"]).unwrap();
    assert!(ex.drain("/Pathway/DataNode/@GraphId").is_empty());

    ex.open_element("Pathway", &[]);
    ex.open_element("DataNode", &[("GraphId", "ea3e5")]);
    ex.close_element("DataNode");
    let early = ex.drain("/Pathway/DataNode/@GraphId");
    assert_eq!(early.len(), 1);
    assert_eq!(early[0].attribute("GraphId"), Some("ea3e5"));

    ex.open_element("DataNode", &[("GraphId", "fe3b1")]);
    ex.close_element("DataNode");
    ex.close_element("Pathway");
    let rest = ex.finish();
    let values = rest.values("/Pathway/DataNode/@GraphId");
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].attribute("GraphId"), Some("fe3b1"));
}
