use serde::{Deserialize, Serialize};

use crate::errors::QueryError;

use super::filter::{FilterNode, NodeKind};
use super::types::{Condition, LogicalOperator, QueryRequest, SortKey};

/// Wire form of a filter node: `{condition}` or `{left, logic, right}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterNodeSerde {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Box<FilterNodeSerde>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic: Option<LogicalOperator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Box<FilterNodeSerde>>,
}

impl FilterNodeSerde {
    /// Validates the shape of this node and its subtree; `path` names this node in errors.
    ///
    /// # Errors
    /// Returns [`QueryError::InvalidNode`] for the first malformed node.
    pub fn into_node(self, path: &str) -> Result<FilterNode, QueryError> {
        let invalid = |reason: &str| QueryError::InvalidNode {
            path: path.to_string(),
            reason: reason.to_string(),
        };
        match self {
            Self { condition: Some(condition), left: None, logic: None, right: None } => {
                Ok(FilterNode::leaf(condition))
            }
            Self { condition: Some(_), .. } => {
                Err(invalid("a condition node cannot also carry children or a logical operator"))
            }
            Self { condition: None, left: Some(left), logic, right: Some(right) } => {
                let left = left.into_node(&format!("{path}.left"))?;
                let right = right.into_node(&format!("{path}.right"))?;
                Ok(FilterNode::branch(left, logic.unwrap_or_default(), right))
            }
            Self { condition: None, left: Some(_), right: None, .. } => {
                Err(invalid("branch is missing its right child"))
            }
            Self { condition: None, left: None, right: Some(_), .. } => {
                Err(invalid("branch is missing its left child"))
            }
            Self { condition: None, left: None, right: None, .. } => {
                Err(invalid("node has neither a condition nor children"))
            }
        }
    }
}

impl TryFrom<FilterNodeSerde> for FilterNode {
    type Error = QueryError;
    fn try_from(fs: FilterNodeSerde) -> Result<Self, Self::Error> {
        fs.into_node("$")
    }
}

impl From<FilterNode> for FilterNodeSerde {
    fn from(node: FilterNode) -> Self {
        match node.into_kind() {
            NodeKind::Leaf(condition) => Self { condition: Some(condition), ..Self::default() },
            NodeKind::Branch { left, logic, right } => Self {
                condition: None,
                left: Some(Box::new(Self::from(*left))),
                logic: Some(logic),
                right: Some(Box::new(Self::from(*right))),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequestSerde {
    #[serde(default)]
    filter: Option<FilterNodeSerde>,
    #[serde(default)]
    sort: Vec<SortKey>,
    #[serde(default)]
    skip: Option<usize>,
    #[serde(default)]
    take: Option<usize>,
}

impl QueryRequest {
    /// Parses a request from JSON. Malformed filter trees fail with
    /// [`QueryError::InvalidNode`] naming the offending node.
    ///
    /// # Errors
    /// Returns an error on invalid JSON or an invalid filter tree.
    pub fn from_json(s: &str) -> Result<Self, QueryError> {
        let wire: QueryRequestSerde = serde_json::from_str(s)?;
        let filter = wire.filter.map(|f| f.into_node("$")).transpose()?;
        Ok(Self { filter, sort: wire.sort, skip: wire.skip, take: wire.take })
    }

    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, QueryError> {
        Ok(serde_json::to_string(self)?)
    }
}
