use gridquery::query::{FilterNode, Query};
use gridquery::{CompilerConfig, Schema};
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Row {
    n: i64,
    m: Option<i64>,
    s: Option<String>,
}

fn schema() -> Arc<Schema<Row>> {
    Schema::builder("Row")
        .value("N", |r: &Row| r.n)
        .nullable("M", |r: &Row| r.m)
        .reference("S", |r: &Row| r.s.clone())
        .build()
}

fn row() -> impl Strategy<Value = Row> {
    (-20i64..20, proptest::option::of(-20i64..20), proptest::option::of("[a-c]{0,4}"))
        .prop_map(|(n, m, s)| Row { n, m, s })
}

/// Indexes of the rows matching a single condition.
fn hits(rows: &[Row], property: &str, operator: &str, value: &str) -> Vec<usize> {
    let predicate = FilterNode::condition(property, operator, value)
        .compile_with(&schema(), &CompilerConfig::json())
        .unwrap();
    rows.iter().enumerate().filter(|(_, r)| predicate.matches(r)).map(|(i, _)| i).collect()
}

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        failure_persistence: Some(Box::new(proptest::test_runner::FileFailurePersistence::WithSource("proptest-regressions"))),
        cases: 64,
        .. proptest::test_runner::Config::default()
    })]
    #[test]
    fn prop_in_and_notin_partition_value_property(
        rows in proptest::collection::vec(row(), 0..30),
        set in proptest::collection::vec(-20i64..20, 0..6),
    ) {
        let list = serde_json::to_string(&set).unwrap();
        let inside = hits(&rows, "N", "in", &list);
        let outside = hits(&rows, "N", "notin", &list);
        prop_assert_eq!(inside.len() + outside.len(), rows.len());
        for i in &inside {
            prop_assert!(set.contains(&rows[*i].n));
            prop_assert!(!outside.contains(i));
        }
    }

    #[test]
    fn prop_nullable_comparisons_never_match_absent(rows in proptest::collection::vec(row(), 0..30), v in -20i64..20) {
        let raw = v.to_string();
        for op in ["eq", "neq", "gt", "lte"] {
            for i in hits(&rows, "M", op, &raw) {
                prop_assert!(rows[i].m.is_some(), "{} matched an absent value", op);
            }
        }
        let above = hits(&rows, "M", "gt", &raw);
        let below = hits(&rows, "M", "lte", &raw);
        prop_assert_eq!(above.len() + below.len(), rows.iter().filter(|r| r.m.is_some()).count());
    }

    #[test]
    fn prop_gt_and_lte_are_complements(rows in proptest::collection::vec(row(), 0..30), v in -20i64..20) {
        let raw = v.to_string();
        let above = hits(&rows, "N", "gt", &raw);
        let below = hits(&rows, "N", "lte", &raw);
        prop_assert_eq!(above.len() + below.len(), rows.len());
        prop_assert!(above.iter().all(|i| rows[*i].n > v));
    }

    #[test]
    fn prop_null_checks_partition(rows in proptest::collection::vec(row(), 0..30)) {
        for property in ["M", "S"] {
            let null = hits(&rows, property, "isnull", "null");
            let set = hits(&rows, property, "isnotnull", "null");
            prop_assert_eq!(null.len() + set.len(), rows.len());
            prop_assert!(null.iter().all(|i| !set.contains(i)));
        }
    }

    #[test]
    fn prop_contains_matches_str_contains(rows in proptest::collection::vec(row(), 0..30), needle in "[a-c]{0,2}") {
        let raw = serde_json::to_string(&needle).unwrap();
        let expected: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.s.as_deref().is_some_and(|s| s.contains(needle.as_str())))
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(hits(&rows, "S", "contains", &raw), expected);
    }

    #[test]
    fn prop_count_matches_filtered_rows(rows in proptest::collection::vec(row(), 0..30), v in -20i64..20) {
        let predicate = FilterNode::or(
            FilterNode::condition("N", "lt", &v.to_string()),
            FilterNode::condition("M", "isnull", "null"),
        )
        .compile_with(&schema(), &CompilerConfig::json())
        .unwrap();
        let query = Query::new(schema(), &rows).filter(predicate);
        let expected = rows.iter().filter(|r| r.n < v || r.m.is_none()).count();
        prop_assert_eq!(query.count(), expected);
        prop_assert_eq!(query.to_vec().len(), expected);
    }
}
