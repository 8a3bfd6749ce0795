//! Injected documents analyzed alongside their host.

use rstest::rstest;
use vigil::highlight::{DiagnosticKind, Severity};
use vigil::{Cancelled, PassConfig, ProgressToken};

use crate::helpers::pass_helpers::{Commit, Harness, quiet_config};
use crate::helpers::source_fixtures::*;
use crate::helpers::visitors::{RuleVisitor, bad_ident_is_error, panic_on_boom};

fn config(parallel: bool) -> PassConfig {
    PassConfig {
        parallel_injections: parallel,
        ..quiet_config()
    }
}

#[rstest]
#[case(true)]
#[case(false)]
fn test_injected_diagnostic_lands_in_host_coordinates(#[case] parallel: bool) {
    let h = Harness::with_injections(
        vec![RuleVisitor::new("bad", 0, bad_ident_is_error)],
        config(parallel),
    );
    let doc = document("a = \"bad;\";\n");
    h.run(&doc, doc.full_range(), true).unwrap();

    let stored = h.store.diagnostics(doc.id());
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].severity, Severity::Error);
    // `bad` inside the literal, shifted past the opening quote
    assert_eq!(stored[0].range, range(5, 8));

    assert!(h.problems.has_problems(doc.id()));
    assert!(h.statuses.was_error_found(doc.id()));
}

#[test]
fn test_injected_diagnostic_outside_priority_waits_for_apply() {
    let h = Harness::with_injections(
        vec![RuleVisitor::new("bad", 0, bad_ident_is_error)],
        config(true),
    );
    let doc = document("a;\nb = \"bad;\";\n");
    h.run(&doc, range(0, 2), true).unwrap();

    let commits = h.store.commits();
    let Commit::InRange { diagnostics: inside, .. } = &commits[0] else {
        panic!("expected inside commit first");
    };
    assert!(inside.is_empty());
    let Commit::OutsideRange { diagnostics: outside, .. } = &commits[1] else {
        panic!("expected outside commit second");
    };
    assert_eq!(outside.len(), 1);
    assert_eq!(outside[0].range, range(8, 11));
}

#[test]
fn test_fragment_markers_cover_host_shreds() {
    let config = PassConfig {
        highlight_injected_fragments: true,
        ..quiet_config()
    };
    let h = Harness::with_injections(vec![RuleVisitor::new("bad", 0, bad_ident_is_error)], config);
    let doc = document("a = \"x = 1;\";\n");
    h.run(&doc, doc.full_range(), true).unwrap();

    let stored = h.store.diagnostics(doc.id());
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].kind, DiagnosticKind::InjectedFragment);
    assert_eq!(stored[0].range, range(5, 11));
    assert_eq!(stored[0].description.as_deref(), Some("x = 1;"));
}

#[test]
fn test_todo_inside_injected_text_is_mapped() {
    let config = PassConfig {
        highlight_injected_fragments: false,
        ..PassConfig::default()
    };
    let h = Harness::with_injections(vec![RuleVisitor::new("bad", 0, bad_ident_is_error)], config);
    let doc = document("q = \"x; # TODO fix\";\n");
    h.run(&doc, doc.full_range(), true).unwrap();

    let todo_start = find(&doc, "TODO").start();
    let mapped = vigil::TextRange::at(todo_start, 8.into());
    assert!(
        h.store
            .diagnostics(doc.id())
            .iter()
            .any(|d| d.kind == DiagnosticKind::Todo && d.range == mapped),
        "no TODO at {mapped:?}"
    );
}

#[rstest]
#[case(true)]
#[case(false)]
fn test_panicking_injected_task_restarts_pass(#[case] parallel: bool) {
    let h = Harness::with_injections(
        vec![RuleVisitor::new("boom", 0, panic_on_boom)],
        config(parallel),
    );
    let doc = document("a = \"boom;\";\n");
    let token = ProgressToken::new();

    assert_eq!(h.run_with(&doc, doc.full_range(), true, &token), Err(Cancelled));
    assert!(token.is_canceled());
    assert!(h.store.commits().is_empty());
    assert_eq!(h.restarts.pending().len(), 1);
}

#[test]
fn test_injected_documents_use_fresh_visitors() {
    let h = Harness::with_injections(
        vec![RuleVisitor::new("bad", 0, bad_ident_is_error)],
        config(false),
    );
    let doc = document("a = \"bad;\";\nb = \"bad;\";\n");
    h.run(&doc, doc.full_range(), true).unwrap();

    // Host plus one query per injected document.
    assert_eq!(h.registry.queries(), vec![false, false, false]);
    assert_eq!(h.store.diagnostics(doc.id()).len(), 2);
}
