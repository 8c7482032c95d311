use super::*;
use crate::dom::MemoryDocument;

fn discovery() -> FieldDiscovery {
    FieldDiscovery::new(RuleSet::address_fields().unwrap())
}

#[test]
fn test_table_rules_match() {
    let doc = MemoryDocument::new();
    let c1 = doc.append_element(
        doc.root(),
        "div",
        &[("data-selenium-test", "property-input-address")],
    );
    let f1 = doc.append_element(c1, "input", &[("type", "text")]);
    doc.append_element(c1, "input", &[("type", "hidden")]);

    let c2 = doc.append_element(doc.root(), "div", &[("data-test-id", "address-input-wrapper")]);
    let f2 = doc.append_element(c2, "input", &[]);

    let c3 = doc.append_element(
        doc.root(),
        "div",
        &[("class", "private-form__control-wrapper"), ("data-field", "address")],
    );
    let f3 = doc.append_element(c3, "input", &[]);

    let mut discovery = discovery();
    let mut found = discovery.scan(&doc);
    found.sort_by_key(|m| m.input);
    assert_eq!(
        found,
        vec![
            FieldMatch { container: c1, input: f1 },
            FieldMatch { container: c2, input: f2 },
            FieldMatch { container: c3, input: f3 },
        ]
    );
}

#[test]
fn test_fallback_infers_container() {
    let doc = MemoryDocument::new();
    let group = doc.append_element(doc.root(), "div", &[("class", "form-group")]);
    let span = doc.append_element(group, "span", &[]);
    let field = doc.append_element(
        span,
        "input",
        &[("data-selenium-test", "property-input-address_2")],
    );

    let bare = doc.append_element(doc.root(), "section", &[]);
    let orphan = doc.append_element(
        bare,
        "input",
        &[("data-selenium-test", "property-input-address")],
    );

    let found = discovery().scan(&doc);
    assert!(found.contains(&FieldMatch { container: group, input: field }));
    assert!(found.contains(&FieldMatch { container: bare, input: orphan }));
}

#[test]
fn test_rescan_is_idempotent() {
    let doc = MemoryDocument::new();
    let c = doc.append_element(doc.root(), "div", &[("data-test-id", "address-input-wrapper")]);
    doc.append_element(c, "input", &[]);

    let mut discovery = discovery();
    assert_eq!(discovery.scan(&doc).len(), 1);
    assert!(discovery.scan(&doc).is_empty());
    assert_eq!(discovery.processed_count(), 1);
}

#[test]
fn test_field_matched_by_two_rules_reported_once() {
    let doc = MemoryDocument::new();
    let c = doc.append_element(doc.root(), "div", &[("data-test-id", "address-input-wrapper")]);
    let field = doc.append_element(
        c,
        "input",
        &[("data-selenium-test", "property-input-address")],
    );

    let mut discovery = discovery();
    let found = discovery.scan(&doc);
    assert_eq!(found, vec![FieldMatch { container: c, input: field }]);
}

#[test]
fn test_marked_nodes_are_skipped() {
    let doc = MemoryDocument::new();
    let c = doc.append_element(doc.root(), "div", &[("data-test-id", "address-input-wrapper")]);
    doc.append_element(c, "input", &[(MARKER_ATTR, "overlay")]);

    assert!(discovery().scan(&doc).is_empty());
}

#[test]
fn test_detached_then_reattached_node_is_not_reprocessed() {
    let doc = MemoryDocument::new();
    let c = doc.append_element(doc.root(), "div", &[("data-test-id", "address-input-wrapper")]);
    let field = doc.append_element(c, "input", &[]);

    let mut discovery = discovery();
    assert_eq!(discovery.scan(&doc).len(), 1);

    doc.remove(field);
    doc.append_child(c, field);
    assert!(discovery.scan(&doc).is_empty());

    // Same attributes, new identity: a fresh field.
    let replacement = doc.append_element(c, "input", &[]);
    assert_eq!(
        discovery.scan(&doc),
        vec![FieldMatch { container: c, input: replacement }]
    );
}

#[test]
fn test_processed_set_never_duplicates_under_mutation_sequences() {
    let doc = MemoryDocument::new();
    let mut discovery = discovery();
    let mut reported = Vec::new();

    for round in 0..5 {
        let c = doc.append_element(doc.root(), "div", &[("data-test-id", "address-input-wrapper")]);
        doc.append_element(c, "input", &[]);
        if round % 2 == 0 {
            let g = doc.append_element(doc.root(), "div", &[("data-field", "x")]);
            doc.append_element(g, "input", &[("data-selenium-test", "property-input-address")]);
        }
        for _ in 0..3 {
            reported.extend(discovery.scan(&doc).into_iter().map(|m| m.input));
        }
    }

    let unique: HashSet<_> = reported.iter().copied().collect();
    assert_eq!(unique.len(), reported.len());
    assert_eq!(reported.len(), 8);
    assert_eq!(discovery.processed_count(), 8);
}

#[test]
fn test_relevance_predicate() {
    let doc = MemoryDocument::new();
    let discovery = discovery();

    let text = doc.append_element(doc.root(), "p", &[]);
    assert!(!discovery.is_relevant(&doc, &[MutationRecord { target: doc.root(), added: vec![text] }]));

    let c = doc.append_element(doc.root(), "div", &[("data-test-id", "address-input-wrapper")]);
    assert!(discovery.is_relevant(&doc, &[MutationRecord { target: doc.root(), added: vec![c] }]));

    let outer = doc.append_element(doc.root(), "div", &[]);
    let inner = doc.append_element(outer, "div", &[]);
    doc.append_element(inner, "input", &[("data-selenium-test", "property-input-address")]);
    assert!(discovery.is_relevant(&doc, &[MutationRecord { target: doc.root(), added: vec![outer] }]));

    let ours = doc.append_element(doc.root(), "div", &[(MARKER_ATTR, "wrapper")]);
    doc.append_element(ours, "input", &[("data-selenium-test", "property-input-address")]);
    assert!(!discovery.is_relevant(&doc, &[MutationRecord { target: doc.root(), added: vec![ours] }]));
}

#[test]
fn test_processed_nodes_are_not_relevant() {
    let doc = MemoryDocument::new();
    let c = doc.append_element(doc.root(), "div", &[("data-test-id", "address-input-wrapper")]);
    let field = doc.append_element(c, "input", &[("data-selenium-test", "property-input-address")]);

    let mut discovery = discovery();
    discovery.scan(&doc);
    assert!(!discovery.is_relevant(&doc, &[MutationRecord { target: c, added: vec![field] }]));
}

#[test]
fn test_selectors_cover_rules_and_fallback() {
    let rules = RuleSet::address_fields().unwrap();
    assert_eq!(rules.selectors().count(), 8);
}
