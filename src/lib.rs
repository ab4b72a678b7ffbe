//! Compiles grid filter, sort and paging requests into typed predicates and orderings.
//!
//! A request names properties and operators as strings and carries filter values raw. Compiling
//! it against a [`Schema`] resolves every name, deserializes every value and yields an
//! [`Expr`] that can be evaluated against items or inspected. [`Query`] runs the result over an
//! in-memory slice.

pub mod config;
pub mod deserialize;
pub mod errors;
pub mod expr;
pub mod logger;
pub mod operators;
pub mod query;
pub mod schema;
pub mod value;

pub use config::CompilerConfig;
pub use deserialize::Deserializer;
pub use errors::QueryError;
pub use expr::Expr;
pub use operators::{OperatorHandler, OperatorRegistry};
pub use query::{
    Condition, CountedQuery, FilterNode, LogicalOperator, OrderStep, Predicate, Query,
    QueryRequest, QueryRequestWithPayload, QueryResultWithCount, SortKey,
};
pub use schema::Schema;
pub use value::{Scalar, Type, Value, ValueKind};
