use super::_support::{config, full_rows, ids, schema, sort_rows};
use gridquery::query::{Query, QueryRequest, SortKey, apply_sort, compile_sort};
use gridquery::QueryError;

fn sorted(keys: Vec<SortKey>) -> (String, Vec<i32>) {
    let rows = sort_rows();
    let request = QueryRequest { sort: keys, ..QueryRequest::default() };
    let query = request.apply_with(Query::new(schema(), &rows), &config()).expect("sort");
    (query.to_string(), ids(&query.to_vec()))
}

#[test]
fn single_key() {
    let (plan, hits) = sorted(vec![SortKey::asc("E")]);
    assert_eq!(plan, "Subject[].order_by(|it| it.E)");
    assert_eq!(hits, vec![1, 3, 5]);
}

#[test]
fn single_key_descending() {
    let (plan, hits) = sorted(vec![SortKey::desc("E")]);
    assert_eq!(plan, "Subject[].order_by_descending(|it| it.E)");
    assert_eq!(hits, vec![5, 3, 1]);
}

#[test]
fn multiple_keys() {
    let (plan, hits) = sorted(vec![SortKey::desc("E"), SortKey::asc("C"), SortKey::desc("D")]);
    assert_eq!(
        plan,
        "Subject[].order_by_descending(|it| it.E).then_by(|it| it.C).then_by_descending(|it| it.D)"
    );
    assert_eq!(hits, vec![5, 3, 1]);
}

#[test]
fn nulls_lowest_on_nullable_value() {
    let (plan, hits) = sorted(vec![SortKey::asc("E").nulls_lowest()]);
    assert_eq!(plan, "Subject[].order_by(|it| it.E.is_some()).then_by(|it| it.E)");
    assert_eq!(hits, vec![1, 3, 5]);
}

#[test]
fn nulls_lowest_on_reference() {
    let (plan, hits) = sorted(vec![SortKey::asc("B").nulls_lowest()]);
    assert_eq!(plan, "Subject[].order_by(|it| (it.B != null)).then_by(|it| it.B)");
    assert_eq!(hits, vec![1, 5, 3]);

    let (plan, hits) = sorted(vec![SortKey::desc("B").nulls_lowest()]);
    assert_eq!(plan, "Subject[].order_by_descending(|it| (it.B != null)).then_by_descending(|it| it.B)");
    assert_eq!(hits, vec![3, 5, 1]);
}

#[test]
fn nulls_lowest_on_value_type_fails() {
    let rows = sort_rows();
    let err = apply_sort(Query::new(schema(), &rows), &[SortKey::asc("A").nulls_lowest()]).unwrap_err();
    match err {
        QueryError::NotNullable { property, ty, .. } => {
            assert_eq!(property, "A");
            assert_eq!(ty, "int");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unknown_property_fails() {
    let err = compile_sort(&[SortKey::asc("X")], &schema()).unwrap_err();
    assert!(matches!(err, QueryError::PropertyNotFound { .. }));
}

#[test]
fn empty_sort_is_identity() {
    let rows = sort_rows();
    let query = apply_sort(Query::new(schema(), &rows), &[]).unwrap();
    assert_eq!(query.to_string(), "Subject[]");
    assert_eq!(ids(&query.to_vec()), vec![1, 3, 5]);
}

#[test]
fn ties_keep_source_order() {
    let rows = full_rows();
    let query = apply_sort(Query::new(schema(), &rows), &[SortKey::asc("D")]).unwrap();
    assert_eq!(ids(&query.to_vec()), vec![0, 1, 4, 8, 11, 2, 5, 9, 12, 3, 6, 7, 10, 13]);
}

#[test]
fn new_primary_key_resorts_stably() {
    let rows = full_rows();
    let by_e = apply_sort(Query::new(schema(), &rows), &[SortKey::desc("E")]).unwrap();
    let then_d = apply_sort(by_e, &[SortKey::asc("D")]).unwrap();
    assert_eq!(then_d.to_string(), "Subject[].order_by_descending(|it| it.E).order_by(|it| it.D)");
    // D groups, each ordered by E descending from the earlier sort.
    assert_eq!(ids(&then_d.to_vec()), vec![4, 0, 1, 8, 11, 2, 9, 12, 5, 3, 6, 10, 13, 7]);
}
