// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use proptest::prelude::*;

use super::{parse, strip_junos_prefix, strip_xmlns, Element};

#[test]
fn parses_nested_elements_with_text() -> anyhow::Result<()> {
    let tree = parse(
        "<rpc-reply><software-information><host-name>noob</host-name>\
         <package-information><name>junos</name></package-information>\
         </software-information></rpc-reply>",
    )?;
    assert_eq!(tree.name, "rpc-reply");
    let info = tree.child("software-information").ok_or_else(|| anyhow::anyhow!("no child"))?;
    assert_eq!(info.child_text("host-name"), Some("noob"));
    assert_eq!(
        info.child("package-information").and_then(|p| p.child_text("name")),
        Some("junos")
    );
    Ok(())
}

#[test]
fn parses_attributes_and_empty_elements() -> anyhow::Result<()> {
    let tree = parse(r#"<load-configuration-results action="override"><ok/></load-configuration-results>"#)?;
    assert_eq!(tree.attrs, vec![("action".to_string(), "override".to_string())]);
    assert!(tree.find("ok").is_some());
    Ok(())
}

#[test]
fn find_searches_depth_first() -> anyhow::Result<()> {
    let tree = parse("<a><b><c>deep</c></b><c>shallow</c></a>")?;
    assert_eq!(tree.find_text("c"), Some("deep"));
    Ok(())
}

#[test]
fn comments_and_declarations_are_skipped() -> anyhow::Result<()> {
    let tree = parse("<?xml version=\"1.0\"?><!-- banner --><reply><ok/></reply>")?;
    assert_eq!(tree.name, "reply");
    Ok(())
}

#[test]
fn rejects_unbalanced_documents() {
    assert!(parse("<a><b></a>").is_err());
    assert!(parse("no xml at all").is_err());
    assert!(parse("").is_err());
}

#[test]
fn escapes_text_on_the_wire() -> anyhow::Result<()> {
    let element = Element::new("configuration-text").with_text("set system host-name <noob>");
    let wire = element.to_xml()?;
    assert_eq!(
        wire,
        "<configuration-text>set system host-name &lt;noob&gt;</configuration-text>"
    );
    Ok(())
}

#[test]
fn wire_form_round_trips() -> anyhow::Result<()> {
    let element = Element::new("load-configuration")
        .with_attr("format", "text")
        .with_attr("action", "override")
        .with_child(Element::new("configuration-text").with_text("set system services ssh"));
    let reparsed = parse(&element.to_xml()?)?;
    assert_eq!(reparsed, element);
    Ok(())
}

#[test]
fn pretty_form_indents_children() -> anyhow::Result<()> {
    let element = Element::new("chassis-inventory")
        .with_child(Element::new("chassis").with_child(Element::new("description").with_text("EX2200")));
    let pretty = element.to_pretty_xml()?;
    assert!(pretty.contains("\n  <chassis>"));
    assert!(pretty.contains("\n    <description>"));
    Ok(())
}

#[test]
fn strips_namespace_declarations() {
    let line = r#"<rpc-reply xmlns="urn:ietf:params:xml:ns:netconf:base:1.0" attr="keep">"#;
    assert_eq!(strip_xmlns(line), r#"<rpc-reply attr="keep">"#);
}

#[test]
fn strips_prefixed_namespace_declarations() {
    let line = r#"<software-information xmlns:junos="http://xml.juniper.net/junos/12.1/junos">"#;
    assert_eq!(strip_xmlns(line), "<software-information>");
}

#[test]
fn strips_junos_prefixes_everywhere() {
    assert_eq!(
        strip_junos_prefix("<junos:chassis-inventory><junos:chassis>"),
        "<chassis-inventory><chassis>"
    );
}

proptest! {
    /// Stripping is idempotent: a second pass never changes the result.
    #[test]
    fn xmlns_strip_idempotent(input in ".{0,80}") {
        let once = strip_xmlns(&input);
        prop_assert_eq!(strip_xmlns(&once), once);
    }

    #[test]
    fn junos_strip_idempotent(input in ".{0,80}") {
        let once = strip_junos_prefix(&input);
        prop_assert_eq!(strip_junos_prefix(&once), once);
    }
}
