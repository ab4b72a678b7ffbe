use gridquery::query::{Query, QueryRequest, SortKey};
use gridquery::{CompilerConfig, Schema};
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Row {
    id: usize,
    n: i64,
    m: Option<i64>,
}

fn schema() -> Arc<Schema<Row>> {
    Schema::builder("Row")
        .value("N", |r: &Row| r.n)
        .nullable("M", |r: &Row| r.m)
        .build()
}

fn rows() -> impl Strategy<Value = Vec<Row>> {
    proptest::collection::vec((-5i64..5, proptest::option::of(-5i64..5)), 0..40).prop_map(|v| {
        v.into_iter().enumerate().map(|(id, (n, m))| Row { id, n, m }).collect()
    })
}

fn run<'a>(rows: &'a [Row], request: &QueryRequest) -> Vec<&'a Row> {
    request.apply_with(Query::new(schema(), rows), &CompilerConfig::json()).unwrap().to_vec()
}

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        failure_persistence: Some(Box::new(proptest::test_runner::FileFailurePersistence::WithSource("proptest-regressions"))),
        cases: 64,
        .. proptest::test_runner::Config::default()
    })]
    #[test]
    fn prop_sort_is_ordered_and_stable(rows in rows(), descending in any::<bool>()) {
        let key = if descending { SortKey::desc("N") } else { SortKey::asc("N") };
        let request = QueryRequest { sort: vec![key], ..QueryRequest::default() };
        let out = run(&rows, &request);
        prop_assert_eq!(out.len(), rows.len());
        for w in out.windows(2) {
            let (a, b) = (w[0], w[1]);
            if descending { prop_assert!(a.n >= b.n); } else { prop_assert!(a.n <= b.n); }
            if a.n == b.n { prop_assert!(a.id < b.id); }
        }
    }

    #[test]
    fn prop_nulls_lowest_puts_absent_first(rows in rows()) {
        let request = QueryRequest { sort: vec![SortKey::asc("M").nulls_lowest()], ..QueryRequest::default() };
        let out = run(&rows, &request);
        let absent = rows.iter().filter(|r| r.m.is_none()).count();
        prop_assert!(out[..absent].iter().all(|r| r.m.is_none()));
        prop_assert!(out[absent..].windows(2).all(|w| w[0].m <= w[1].m));
    }

    #[test]
    fn prop_paging_slices_the_sorted_rows(rows in rows(), skip in 0usize..50, take in 0usize..50) {
        let sort = vec![SortKey::asc("N"), SortKey::desc("M")];
        let all = run(&rows, &QueryRequest { sort: sort.clone(), ..QueryRequest::default() });
        let page = run(&rows, &QueryRequest { sort, skip: Some(skip), take: Some(take), ..QueryRequest::default() });
        let expected: Vec<usize> = all.iter().skip(skip).take(take).map(|r| r.id).collect();
        prop_assert_eq!(page.iter().map(|r| r.id).collect::<Vec<_>>(), expected);
    }
}
