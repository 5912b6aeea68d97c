//! Offset translation property tests
//!
//! Exercise the translator over arbitrary leaf splits so the round-trip,
//! normalization and idempotence guarantees hold regardless of how the
//! surface happens to be fragmented.

use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use surface_sync::coords::{LineIndex, Selection, Span};
use surface_sync::engine::LoopbackTransport;
use surface_sync::surface::{DomTree, Surface};
use surface_sync::{translate, DocumentSnapshot, SurfaceSession, SyncOptions};

fn leaves_strategy() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-zé日\n]{0,6}", 0..6)
}

fn tree_from(leaves: &[String]) -> DomTree {
    let refs: Vec<&str> = leaves.iter().map(String::as_str).collect();
    DomTree::from_leaves(&refs)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn caret_round_trips_over_any_leaf_split(leaves in leaves_strategy()) {
        let mut tree = tree_from(&leaves);
        let len = tree.text_content().chars().count();
        for offset in 0..=len {
            translate::to_native_caret(&mut tree, offset);
            prop_assert_eq!(translate::to_linear_offsets(&tree), Span::caret(offset));
        }
    }

    #[test]
    fn selection_is_normalized_and_clamped(
        leaves in leaves_strategy(),
        a in 0usize..40,
        b in 0usize..40,
    ) {
        let mut tree = tree_from(&leaves);
        let len = tree.text_content().chars().count();
        translate::to_native_selection(&mut tree, a, b);
        let span = translate::to_linear_offsets(&tree);
        prop_assert_eq!(span, Span::new(a.min(len), b.min(len)));
        prop_assert_eq!(
            translate::to_linear_offsets(&{
                let mut reversed = tree_from(&leaves);
                translate::to_native_selection(&mut reversed, b, a);
                reversed
            }),
            span
        );
    }

    #[test]
    fn applying_snapshot_twice_is_idempotent(
        text in "[a-z\n]{0,24}",
        cursor in 0usize..30,
        selection in proptest::option::of((0usize..30, 0usize..30)),
    ) {
        let snapshot = DocumentSnapshot::new(
            text,
            cursor,
            selection.map(|(anchor, active)| Selection::new(anchor, active)),
        );
        let mut session = SurfaceSession::new(
            DomTree::new(),
            LoopbackTransport::default(),
            SyncOptions::default(),
        )
        .unwrap();

        session.apply(snapshot.clone());
        session.run_until_idle();
        let once = (
            session.surface().text_content(),
            translate::to_linear_offsets(session.surface()),
        );
        session.apply(snapshot.clone());
        session.run_until_idle();
        let twice = (
            session.surface().text_content(),
            translate::to_linear_offsets(session.surface()),
        );

        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.0.as_str(), snapshot.text());
        prop_assert_eq!(once.1, snapshot.span());
        // applying never reports back to the engine
        prop_assert!(session.transport().sent().is_empty());
    }

    #[test]
    fn row_col_round_trips(text in "[a-z\n]{0,24}", offset in 0usize..30) {
        let index = LineIndex::from_text(&text);
        let clamped = offset.min(index.total_len());
        prop_assert_eq!(index.to_flat(index.to_row_col(offset)), clamped);
    }
}
