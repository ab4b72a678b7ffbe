// Submodules for separation of concerns
mod exec;
mod filter;
mod parse;
mod sort;
mod types;

pub use exec::{CountedQuery, Query, apply_filter, apply_pagination, apply_sort};
pub use filter::{FilterNode, NodeKind, Predicate, compile_filter};
pub use parse::FilterNodeSerde;
pub use sort::{OrderStep, compile_sort};
pub use types::{
    Condition, LogicalOperator, QueryRequest, QueryRequestWithPayload, QueryResultWithCount,
    SortKey,
};
