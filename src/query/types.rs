use serde::{Deserialize, Serialize};

use super::filter::FilterNode;

/// One comparison against one property. The value stays raw until compile time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub property: String,
    pub operator: String,
    pub value: String,
}

impl Condition {
    pub fn new(
        property: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self { property: property.into(), operator: operator.into(), value: value.into() }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    #[default]
    #[serde(alias = "AND")]
    And,
    #[serde(alias = "OR")]
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortKey {
    pub property: String,
    #[serde(default)]
    pub descending: bool,
    /// Order by presence first so absent values sort lowest. Nullable properties only.
    #[serde(default)]
    pub treat_null_lowest: bool,
}

impl SortKey {
    pub fn asc(property: impl Into<String>) -> Self {
        Self { property: property.into(), descending: false, treat_null_lowest: false }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self { property: property.into(), descending: true, treat_null_lowest: false }
    }

    #[must_use]
    pub const fn nulls_lowest(mut self) -> Self {
        self.treat_null_lowest = true;
        self
    }
}

/// Filter, sort and paging for one grid request. Reusable across sources of the same item type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterNode>,
    #[serde(default)]
    pub sort: Vec<SortKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take: Option<usize>,
}

/// A [`QueryRequest`] with caller-defined data carried beside it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequestWithPayload<P> {
    #[serde(flatten)]
    pub request: QueryRequest,
    pub payload: P,
}

/// Response shape: one page of results plus the pre-pagination count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResultWithCount<R> {
    pub result: Vec<R>,
    pub count: usize,
}
