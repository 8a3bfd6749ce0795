//! Ancestors of nodes with errors are skipped unless parents are forced.

use rstest::rstest;
use vigil::PassConfig;

use crate::helpers::pass_helpers::{Harness, quiet_config};
use crate::helpers::source_fixtures::*;
use crate::helpers::visitors::{RuleVisitor, VisitLog, bad_ident_is_error};

fn two_reporters(log: &VisitLog) -> Vec<RuleVisitor> {
    // Registered out of order: the pass sorts them.
    vec![
        RuleVisitor::new("second", 2, bad_ident_is_error).with_log(log),
        RuleVisitor::new("first", 1, bad_ident_is_error).with_log(log),
    ]
}

#[test]
fn test_parent_of_error_is_skipped_for_every_visitor() {
    let log = VisitLog::default();
    let h = Harness::with_config(two_reporters(&log), quiet_config());
    let doc = document(NESTED_BAD);
    h.run(&doc, doc.full_range(), true).unwrap();

    let bad = find(&doc, "bad");
    let bad_item = find(&doc, "bad;");
    let fine_item = find(&doc, "fine { ok; }");

    assert!(log.visited("first", bad));
    assert!(log.visited("second", bad));
    assert!(!log.visited("first", bad_item));
    assert!(!log.visited("second", bad_item));
    assert!(log.visited("first", fine_item));
    assert!(log.visited("second", fine_item));

    // Both report the same error; it is stored once.
    assert_eq!(h.store.diagnostics(doc.id()).len(), 1);
}

#[test]
fn test_visitors_run_in_declared_order() {
    let log = VisitLog::default();
    let h = Harness::with_config(two_reporters(&log), quiet_config());
    let doc = document(NESTED_BAD);
    h.run(&doc, doc.full_range(), true).unwrap();

    let visits = log.visits();
    let last_first = visits.iter().rposition(|(name, _)| *name == "first").unwrap();
    let first_second = visits.iter().position(|(name, _)| *name == "second").unwrap();
    assert!(last_first < first_second);
}

#[rstest]
#[case(false, false)]
#[case(true, true)]
fn test_forced_parents_are_visited(#[case] force: bool, #[case] visited: bool) {
    let log = VisitLog::default();
    let config = PassConfig {
        force_highlight_parents: force,
        ..quiet_config()
    };
    let h = Harness::with_config(two_reporters(&log), config);
    let doc = document(NESTED_BAD);
    h.run(&doc, doc.full_range(), true).unwrap();

    assert_eq!(log.visited("first", find(&doc, "bad;")), visited);
    assert_eq!(log.visited("first", find(&doc, "outer { bad; }")), visited);
    // The document node is never skipped.
    assert!(log.visited("first", doc.full_range()));
}

#[test]
fn test_root_is_visited_after_top_level_error() {
    let log = VisitLog::default();
    let h = Harness::with_config(two_reporters(&log), quiet_config());
    let doc = document("bad;\nok;\n");
    h.run(&doc, doc.full_range(), true).unwrap();

    assert!(!log.visited("first", find(&doc, "bad;")));
    assert!(log.visited("first", find(&doc, "ok;")));
    assert!(log.visited("first", doc.full_range()));
    assert!(log.visited("second", doc.full_range()));
}

#[test]
fn test_empty_document_visits_root() {
    let log = VisitLog::default();
    let h = Harness::with_config(two_reporters(&log), quiet_config());
    let doc = document("");
    h.run(&doc, doc.full_range(), true).unwrap();

    assert_eq!(
        log.visits(),
        vec![("first", range(0, 0)), ("second", range(0, 0))]
    );
}

#[test]
fn test_skip_set_does_not_leak_into_next_run() {
    let log = VisitLog::default();
    let h = Harness::with_config(two_reporters(&log), quiet_config());
    let doc = document(NESTED_BAD);
    h.run(&doc, doc.full_range(), true).unwrap();

    let fixed = edited(&doc, "outer { god; }\nfine { ok; }\n");
    h.run(&fixed, fixed.full_range(), true).unwrap();
    assert!(log.visited("first", find(&fixed, "god;")));
    assert!(h.store.diagnostics(fixed.id()).is_empty());
}
