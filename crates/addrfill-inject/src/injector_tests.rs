use super::*;
use std::cell::Cell;

use tokio::task::LocalSet;

use crate::dom::MemoryDocument;
use crate::test_support::{host_form, loader, settle, source, FakeSource};

struct Page {
    doc: Rc<MemoryDocument>,
    source: Rc<FakeSource>,
    injector: Rc<FieldInjector>,
    container: NodeId,
    field: NodeId,
}

fn page(fail: bool) -> Page {
    let doc = Rc::new(MemoryDocument::new());
    let (container, field) = host_form(&doc);
    let source = source(fail);
    let dyn_doc: Rc<dyn Document> = doc.clone();
    let injector = FieldInjector::new(dyn_doc, loader(&source), AutocompleteOptions::default());
    Page {
        doc,
        source,
        injector,
        container,
        field,
    }
}

impl Page {
    fn inject(&self) -> Rc<OverlayBinding> {
        self.injector.inject(&FieldMatch {
            container: self.container,
            input: self.field,
        })
    }

    /// Count the `input` events the host page's own bindings observe.
    fn host_inputs(&self) -> Rc<Cell<usize>> {
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        self.doc.add_listener(
            self.field,
            EventKind::Input,
            Rc::new(move |_| counter.set(counter.get() + 1)),
        );
        count
    }
}

#[test]
fn test_inject_builds_wrapper_and_overlay() {
    let p = page(false);
    p.doc.set_value(p.field, "1 Old Rd");
    let label = p.doc.children(p.container)[0];

    let b = p.inject();

    assert_eq!(p.doc.children(p.container), vec![label, b.wrapper()]);
    assert_eq!(p.doc.children(b.wrapper()), vec![p.field, b.overlay()]);
    assert_eq!(p.doc.attribute(b.wrapper(), MARKER_ATTR).as_deref(), Some("wrapper"));
    assert_eq!(p.doc.attribute(b.overlay(), MARKER_ATTR).as_deref(), Some("overlay"));
    assert_eq!(p.doc.inline_style(b.wrapper(), "position").as_deref(), Some("relative"));
    assert_eq!(p.doc.inline_style(b.overlay(), "position").as_deref(), Some("absolute"));
    assert_eq!(p.doc.inline_style(b.overlay(), "font-size").as_deref(), Some("14px"));
    assert_eq!(p.doc.inline_style(b.overlay(), "padding-left").as_deref(), Some("8px"));
    assert_eq!(p.doc.value(b.overlay()), "1 Old Rd");

    assert_eq!(p.doc.computed_style(p.field, "color").as_deref(), Some("transparent"));
    assert_eq!(p.doc.computed_style(p.field, "caret-color").as_deref(), Some("transparent"));
    assert_eq!(b.mode(), BindingMode::Overlay);
    assert_eq!(b.guard(), SyncGuard::Idle);
}

#[test]
fn test_overlay_typing_writes_original_once() {
    let p = page(false);
    let b = p.inject();
    let host_inputs = p.host_inputs();
    let original_before = p.doc.value_writes(p.field);
    let overlay_before = p.doc.value_writes(b.overlay());

    p.doc.type_text(b.overlay(), "12 Elm");

    assert_eq!(p.doc.value(p.field), "12 Elm");
    assert_eq!(p.doc.value_writes(p.field) - original_before, 1);
    // Only the user's own keystroke touched the overlay.
    assert_eq!(p.doc.value_writes(b.overlay()) - overlay_before, 1);
    assert_eq!(host_inputs.get(), 1);
    assert_eq!(b.guard(), SyncGuard::Idle);
}

#[test]
fn test_original_typing_writes_overlay_once() {
    let p = page(false);
    let b = p.inject();
    let overlay_before = p.doc.value_writes(b.overlay());
    let original_before = p.doc.value_writes(p.field);

    p.doc.type_text(p.field, "99 Oak");

    assert_eq!(p.doc.value(b.overlay()), "99 Oak");
    assert_eq!(p.doc.value_writes(b.overlay()) - overlay_before, 1);
    assert_eq!(p.doc.value_writes(p.field) - original_before, 1);
}

#[test]
fn test_alternating_writes_never_loop() {
    let p = page(false);
    let b = p.inject();
    let host_inputs = p.host_inputs();

    for i in 0..20 {
        let (from, to) = if i % 2 == 0 {
            (b.overlay(), p.field)
        } else {
            (p.field, b.overlay())
        };
        let before = p.doc.value_writes(to);
        p.doc.type_text(from, &format!("value {}", i));
        assert_eq!(p.doc.value_writes(to) - before, 1);
        assert_eq!(p.doc.value(to), format!("value {}", i));
    }

    // Ten synthetic events from overlay writes, ten from the user typing directly.
    assert_eq!(host_inputs.get(), 20);
}

#[test]
fn test_paste_syncs() {
    let p = page(false);
    let b = p.inject();

    p.doc.paste(b.overlay(), "500 Pine St");
    assert_eq!(p.doc.value(p.field), "500 Pine St");
}

#[test]
fn test_sync_short_circuits_while_guarded() {
    let p = page(false);
    let b = p.inject();

    b.guard.set(SyncGuard::Writing(Side::Original));
    assert!(!b.sync_from(&*p.doc, Side::Overlay));
    assert!(!b.write_address(&*p.doc, "x"));
    b.guard.set(SyncGuard::Idle);
    assert!(b.sync_from(&*p.doc, Side::Overlay));
}

#[tokio::test]
async fn test_focus_attaches_widget_and_selection_writes_both_fields() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let p = page(false);
            let b = p.inject();
            let host_inputs = p.host_inputs();

            p.doc.focus(b.overlay());
            settle().await;

            assert_eq!(b.mode(), BindingMode::Autocomplete);
            assert_eq!(
                p.source.library.options.borrow()[0],
                AutocompleteOptions::default()
            );

            p.source
                .library
                .select(b.overlay(), "123 Main St, Springfield, IL 62701, USA");
            assert_eq!(p.doc.value(p.field), "123 Main St, Springfield, IL 62701, USA");
            assert_eq!(p.doc.value(b.overlay()), "123 Main St, Springfield, IL 62701, USA");
            assert_eq!(host_inputs.get(), 1);

            // Refocusing does not attach a second widget or reload.
            p.doc.focus(b.overlay());
            settle().await;
            assert_eq!(p.source.library.attached(), 1);
            assert_eq!(p.source.loads.get(), 1);
        })
        .await;
}

#[tokio::test]
async fn test_library_loaded_once_per_page() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let p = page(false);
            let first = p.inject();
            let other = p.doc.append_element(p.container, "input", &[]);
            let second = p.injector.inject(&FieldMatch {
                container: p.container,
                input: other,
            });

            p.doc.focus(first.overlay());
            p.doc.focus(second.overlay());
            settle().await;

            assert_eq!(p.source.loads.get(), 1);
            assert_eq!(p.source.library.attached(), 2);
        })
        .await;
}

#[tokio::test]
async fn test_load_failure_restores_native_field() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let p = page(true);
            p.doc.set_style(p.field, "caret-color", "red");
            let b = p.inject();
            let other = p.doc.append_element(p.container, "input", &[]);
            let second = p.injector.inject(&FieldMatch {
                container: p.container,
                input: other,
            });

            p.doc.focus(b.overlay());
            settle().await;

            // Every binding on the page falls back.
            for binding in [&b, &second] {
                assert_eq!(binding.mode(), BindingMode::Native);
                assert_eq!(
                    p.doc.inline_style(binding.overlay(), "display").as_deref(),
                    Some("none")
                );
            }
            assert_eq!(p.doc.computed_style(p.field, "color").as_deref(), Some("rgb(51, 71, 91)"));
            assert_eq!(p.doc.inline_style(p.field, "caret-color").as_deref(), Some("red"));

            // No further load is attempted, and new fields start native.
            p.doc.focus(second.overlay());
            settle().await;
            assert_eq!(p.source.loads.get(), 1);

            let late = p.doc.append_element(p.container, "input", &[]);
            let third = p.injector.inject(&FieldMatch {
                container: p.container,
                input: late,
            });
            assert_eq!(third.mode(), BindingMode::Native);
        })
        .await;
}

#[tokio::test]
async fn test_attach_failure_falls_back_that_field_only() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let p = page(false);
            p.source.library.refuse.set(true);
            let b = p.inject();

            p.doc.focus(b.overlay());
            settle().await;

            assert_eq!(b.mode(), BindingMode::Native);
            assert_eq!(p.injector.loader().state(), LoadState::Loaded);
        })
        .await;
}

#[tokio::test]
async fn test_lookup_failure_disables_that_overlay() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let p = page(false);
            let b = p.inject();
            let other = p.doc.append_element(p.container, "input", &[]);
            let second = p.injector.inject(&FieldMatch {
                container: p.container,
                input: other,
            });
            p.doc.focus(b.overlay());
            p.doc.focus(second.overlay());
            settle().await;

            p.source.library.fail_lookup(b.overlay(), "OVER_QUERY_LIMIT");

            assert_eq!(b.mode(), BindingMode::Native);
            assert_eq!(p.doc.inline_style(b.overlay(), "display").as_deref(), Some("none"));
            assert_eq!(second.mode(), BindingMode::Autocomplete);
        })
        .await;
}
