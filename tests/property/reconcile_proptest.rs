//! Property-based tests for comment reconciliation

use chrono::Utc;
use lexdraft::offline::{OptimisticStore, ReconcileOutcome};
use lexdraft::shared::Comment;
use proptest::prelude::*;

fn authors() -> impl Strategy<Value = String> {
    prop_oneof![Just("alice".to_string()), Just("bob".to_string())]
}

fn contents() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("looks good".to_string()),
        Just("see clause 4".to_string()),
        Just("agreed".to_string())
    ]
}

proptest! {
    #[test]
    fn test_matching_reconcile_keeps_length(
        existing in proptest::collection::vec((authors(), contents()), 0..8),
        author in authors(),
        content in contents(),
    ) {
        let mut store = OptimisticStore::new();
        for (a, c) in &existing {
            store.submit_local(a.clone(), c.clone());
        }
        store.submit_local(author.clone(), content.clone());
        let before = store.len();
        let pending_before = store.pending_count();

        let persisted = Comment::persisted("srv-1", author.clone(), content.clone(), Utc::now());
        let outcome = store.reconcile(persisted);

        prop_assert!(matches!(outcome, ReconcileOutcome::Replaced { .. }), "expected ReconcileOutcome::Replaced");
        prop_assert_eq!(store.len(), before);
        prop_assert_eq!(store.pending_count(), pending_before - 1);
        let confirmed = store
            .iter()
            .filter(|c| !c.pending && c.author == author && c.content == content)
            .count();
        prop_assert_eq!(confirmed, 1);
        prop_assert_eq!(store.comments().last().map(|c| c.id.as_str()), Some("srv-1"));
    }

    #[test]
    fn test_first_match_is_removed(
        prefix in proptest::collection::vec((authors(), contents()), 0..6),
        copies in 2usize..5,
    ) {
        let mut store = OptimisticStore::new();
        for (a, c) in &prefix {
            store.submit_local(a.clone(), c.clone());
        }
        let ids: Vec<_> = (0..copies)
            .map(|_| store.submit_local("carol", "duplicate"))
            .collect();

        let outcome = store.reconcile(Comment::persisted("srv", "carol", "duplicate", Utc::now()));
        prop_assert_eq!(outcome.replaced(), Some(&ids[0]));
        for id in &ids[1..] {
            prop_assert!(store.get(id).is_some());
        }
    }

    #[test]
    fn test_unmatched_reconcile_strictly_appends(
        existing in proptest::collection::vec((authors(), contents()), 0..8),
    ) {
        let mut store = OptimisticStore::new();
        for (a, c) in &existing {
            store.submit_local(a.clone(), c.clone());
        }
        let before = store.comments().to_vec();

        let outcome = store.reconcile(Comment::persisted("srv", "dave", "from elsewhere", Utc::now()));
        prop_assert_eq!(outcome, ReconcileOutcome::Appended);
        prop_assert_eq!(store.len(), before.len() + 1);
        prop_assert_eq!(&store.comments()[..before.len()], before.as_slice());
    }
}
