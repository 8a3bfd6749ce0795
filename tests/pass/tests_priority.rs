//! Inside results are committed before the rest of the document.

use vigil::highlight::{Diagnostic, DiagnosticKind, Severity, TODO_ATTRIBUTES};
use vigil::{PassConfig, ProgressToken};

use crate::helpers::pass_helpers::{Commit, Harness, quiet_config};
use crate::helpers::source_fixtures::*;
use crate::helpers::visitors::{
    RuleVisitor, bad_ident_is_error, number_is_warning, silent,
};

#[test]
fn test_inside_commit_precedes_outside_commit() {
    let h = Harness::with_config(
        vec![
            RuleVisitor::new("bad", 1, bad_ident_is_error),
            RuleVisitor::new("numbers", 2, number_is_warning),
        ],
        quiet_config(),
    );
    let doc = document(PRIORITY_SPLIT);
    h.run(&doc, range(0, 20), true).unwrap();

    let commits = h.store.commits();
    let Commit::InRange { range: inside_range, diagnostics: inside } = &commits[0] else {
        panic!("expected inside commit first, got {:?}", commits[0]);
    };
    assert_eq!(*inside_range, range(0, 20));
    assert_eq!(inside.len(), 1);
    assert_eq!(inside[0].severity, Severity::Error);
    assert_eq!(inside[0].range, find(&doc, "bad"));

    let Commit::OutsideRange { keep, diagnostics: outside } = &commits[1] else {
        panic!("expected outside commit second, got {:?}", commits[1]);
    };
    assert_eq!(*keep, range(0, 20));
    assert_eq!(outside.len(), 1);
    assert_eq!(outside[0].severity, Severity::Warning);
    assert_eq!(outside[0].range, find(&doc, "42"));

    assert_eq!(h.store.diagnostics(doc.id()).len(), 2);
}

#[test]
fn test_whole_file_pass_clears_file_level_diagnostics() {
    let h = Harness::with_config(vec![RuleVisitor::new("quiet", 0, silent)], quiet_config());
    let doc = document(PRIORITY_SPLIT);
    h.store
        .inner
        .add_file_level(doc.id(), Diagnostic::warning(range(0, 0), "stale"));

    h.run(&doc, range(0, 20), true).unwrap();
    assert!(h.store.commits().contains(&Commit::ClearFileLevel));
    assert!(h.store.inner.file_level(doc.id()).is_empty());
}

#[test]
fn test_second_run_replaces_previous_results() {
    let h = Harness::with_config(
        vec![RuleVisitor::new("numbers", 0, number_is_warning)],
        quiet_config(),
    );
    let doc = document("a = 1; b = 2;\n");
    h.run(&doc, doc.full_range(), true).unwrap();
    assert_eq!(h.store.diagnostics(doc.id()).len(), 2);

    let doc = edited(&doc, "a = x; b = 2;\n");
    h.run(&doc, range(0, 6), true).unwrap();
    let ranges: Vec<_> = h.store.diagnostics(doc.id()).iter().map(|d| d.range).collect();
    assert_eq!(ranges, vec![find(&doc, "2")]);
}

#[test]
fn test_visible_pass_keeps_results_of_applied_full_pass() {
    let h = Harness::with_config(
        vec![RuleVisitor::new("numbers", 0, number_is_warning)],
        quiet_config(),
    );
    let token = ProgressToken::new();
    let doc = document("a; late = 42;\n");
    h.run_with(&doc, range(0, 2), true, &token).unwrap();
    assert!(token.full_pass_applied());
    assert_eq!(h.store.diagnostics(doc.id()).len(), 1);

    // Same token: the outside commit is skipped.
    let doc = edited(&doc, "a; late = x;\n");
    h.run_with(&doc, range(0, 2), false, &token).unwrap();
    assert_eq!(h.store.diagnostics(doc.id()).len(), 1);

    // Fresh token: the visible pass owns the whole document again.
    h.run(&doc, range(0, 2), false).unwrap();
    assert!(h.store.diagnostics(doc.id()).is_empty());
}

#[test]
fn test_todo_markers_are_bucketed_by_range() {
    let h = Harness::with_config(vec![RuleVisitor::new("quiet", 0, silent)], PassConfig::default());
    let doc = document("a; # TODO first\nb;\nc; # FIXME second\n");
    let priority = range(0, 16);
    h.run(&doc, priority, true).unwrap();

    let commits = h.store.commits();
    let Commit::InRange { diagnostics: inside, .. } = &commits[0] else {
        panic!("expected inside commit first");
    };
    assert_eq!(inside.len(), 1);
    assert_eq!(inside[0].kind, DiagnosticKind::Todo);
    assert_eq!(inside[0].description.as_deref(), Some("TODO first"));
    assert_eq!(inside[0].forced_attributes.as_deref(), Some(TODO_ATTRIBUTES));

    let Commit::OutsideRange { diagnostics: outside, .. } = &commits[1] else {
        panic!("expected outside commit second");
    };
    assert_eq!(outside.len(), 1);
    assert_eq!(outside[0].description.as_deref(), Some("FIXME second"));
}

#[test]
fn test_progress_reaches_one_on_full_pass() {
    let h = Harness::with_config(
        vec![
            RuleVisitor::new("bad", 1, bad_ident_is_error),
            RuleVisitor::new("numbers", 2, number_is_warning),
        ],
        quiet_config(),
    );
    let doc = document(PRIORITY_SPLIT);

    let (result, progress) = h.drive(h.pass(&doc, range(0, 20), true), &ProgressToken::new());
    assert_eq!(result, Ok(()));
    assert_eq!(progress, Some(1.0));

    let (result, progress) = h.drive(h.pass(&doc, range(0, 20), false), &ProgressToken::new());
    assert_eq!(result, Ok(()));
    assert_eq!(progress, None);
}
