// The default snapshot is process-wide; every test here holds LOCK and starts from a reset.
use super::_support::{ids, schema, three_rows};
use gridquery::config::{self, reset_defaults, set_default_deserializer, set_default_operators, set_defaults};
use gridquery::deserialize;
use gridquery::expr::Expr;
use gridquery::query::{FilterNode, Query, QueryRequest, SortKey};
use gridquery::{CompilerConfig, OperatorHandler, OperatorRegistry, QueryError};
use parking_lot::{Mutex, MutexGuard};

static LOCK: Mutex<()> = parking_lot::const_mutex(());

fn fresh() -> MutexGuard<'static, ()> {
    let guard = LOCK.lock();
    reset_defaults();
    guard
}

#[test]
fn builtin_defaults_have_no_deserializer() {
    let _g = fresh();
    let err = FilterNode::condition("A", "eq", "1").compile(&schema()).unwrap_err();
    assert!(matches!(err, QueryError::MissingDeserializer { .. }));
    assert_eq!(config::defaults().operators.len(), 14);
}

#[test]
fn default_deserializer_feeds_plain_compile() {
    let _g = fresh();
    set_default_deserializer(Some(deserialize::json()));
    let predicate = FilterNode::condition("A", "gte", "3").compile(&schema()).unwrap();
    let rows = three_rows();
    assert_eq!(ids(&Query::new(schema(), &rows).filter(predicate).to_vec()), vec![3, 5]);

    set_default_deserializer(None);
    assert!(FilterNode::condition("A", "gte", "3").compile(&schema()).is_err());
}

#[test]
fn default_operators_are_replaced_wholesale() {
    let _g = fresh();
    set_default_deserializer(Some(deserialize::json()));
    set_default_operators(
        OperatorRegistry::new().with("never", OperatorHandler::new(|_, _, _, _| Ok(Expr::bool(false)))),
    );
    assert!(config::defaults().deserializer.is_some());
    assert!(FilterNode::condition("A", "never", "0").compile(&schema()).is_ok());
    let err = FilterNode::condition("A", "eq", "1").compile(&schema()).unwrap_err();
    assert!(matches!(err, QueryError::UnknownOperator { .. }));
}

#[test]
fn request_apply_reads_defaults() {
    let _g = fresh();
    set_defaults(CompilerConfig::json());
    let request = QueryRequest {
        filter: Some(FilterNode::condition("A", "neq", "3")),
        sort: vec![SortKey::desc("A")],
        skip: None,
        take: Some(1),
    };
    let rows = three_rows();
    let query = request.apply(Query::new(schema(), &rows)).unwrap();
    assert_eq!(ids(&query.to_vec()), vec![5]);

    let counted = request.apply_with_count(Query::new(schema(), &rows)).unwrap();
    assert_eq!(counted.count, 2);
    assert_eq!(counted.into_result().result.len(), 1);
}

#[test]
fn snapshots_survive_later_updates() {
    let _g = fresh();
    set_defaults(CompilerConfig::json());
    let before = config::defaults();
    reset_defaults();
    assert!(before.deserializer.is_some());
    assert!(config::defaults().deserializer.is_none());
}
