//! Property tests: arbitrary add/remove sequences on one id never leave the
//! id pending and always end in the state the confirmations dictate.

use std::sync::Arc;
use std::time::Duration;

use bills_model::FavoriteBill;
use oireachtas_bills::favorites::mock::MockConfirmer;
use oireachtas_bills::favorites::{FavoritesStore, MemoryStorage};
use proptest::prelude::*;

const ID: &str = "2024-B10";

#[derive(Debug, Clone, Copy)]
enum Op {
    Add { confirmed: bool },
    Remove { confirmed: bool },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<bool>().prop_map(|confirmed| Op::Add { confirmed }),
        any::<bool>().prop_map(|confirmed| Op::Remove { confirmed }),
    ]
}

fn bill(id: &str) -> FavoriteBill {
    FavoriteBill {
        id: id.to_string(),
        bill_no: id.trim_start_matches("2024-").to_string(),
        bill_type: "Public".to_string(),
        status: "Published".to_string(),
        sponsor: "Unknown".to_string(),
        english_title: "No title available".to_string(),
        irish_title: "No title available".to_string(),
    }
}

proptest! {
    #[test]
    fn sequential_mutations_settle_cleanly(ops in prop::collection::vec(op_strategy(), 1..24)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");

        runtime.block_on(async {
            let confirmer = Arc::new(MockConfirmer::new());
            let store = FavoritesStore::load(
                Box::new(MemoryStorage::new()),
                confirmer.clone(),
                Duration::from_secs(5),
            );
            store.add_favorite(bill("2024-OTHER")).await;

            let mut expected = false;
            for op in ops {
                let (confirmed, applied) = match op {
                    Op::Add { confirmed } => (confirmed, true),
                    Op::Remove { confirmed } => (confirmed, false),
                };
                if !confirmed {
                    confirmer.push_failure();
                }
                let mutation = if applied {
                    store.begin_add(bill(ID))
                } else {
                    store.begin_remove(ID)
                };

                prop_assert!(store.is_pending(ID));
                prop_assert_eq!(store.is_favorite(ID), applied);

                let outcome = mutation.settle().await;
                prop_assert_eq!(outcome.is_committed(), confirmed);
                if confirmed {
                    expected = applied;
                }

                prop_assert!(!store.is_pending(ID));
                prop_assert_eq!(store.is_favorite(ID), expected);
                prop_assert!(store.is_favorite("2024-OTHER"));
            }
            Ok::<(), proptest::test_runner::TestCaseError>(())
        })?;
    }
}
