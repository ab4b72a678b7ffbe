//! Filter trees and their compilation into boolean expressions.
//!
//! A node is either a leaf holding one [`Condition`] or a branch joining two subtrees with
//! AND/OR. Any node may override the value deserializer and the operator registry; an
//! override applies to the whole subtree unless a descendant overrides it again. Unset
//! overrides fall back to the [`CompilerConfig`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::config::{self, CompilerConfig};
use crate::deserialize::Deserializer;
use crate::errors::QueryError;
use crate::expr::{CmpOp, Expr, PARAM};
use crate::operators::{self, OperatorError, OperatorRegistry};
use crate::schema::Schema;
use crate::value::Nullability;

use super::parse::FilterNodeSerde;
use super::types::{Condition, LogicalOperator};

pub(crate) const COMPILE_TARGET: &str = "gridquery::compile";

#[derive(Debug, Clone)]
pub enum NodeKind {
    Leaf(Condition),
    Branch { left: Box<FilterNode>, logic: LogicalOperator, right: Box<FilterNode> },
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "FilterNodeSerde", into = "FilterNodeSerde")]
pub struct FilterNode {
    kind: NodeKind,
    deserializer: Option<Deserializer>,
    operators: Option<Arc<OperatorRegistry>>,
}

impl FilterNode {
    #[must_use]
    pub const fn leaf(condition: Condition) -> Self {
        Self { kind: NodeKind::Leaf(condition), deserializer: None, operators: None }
    }

    /// Shorthand for a leaf built from its three parts.
    pub fn condition(
        property: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::leaf(Condition::new(property, operator, value))
    }

    #[must_use]
    pub fn branch(left: Self, logic: LogicalOperator, right: Self) -> Self {
        Self {
            kind: NodeKind::Branch { left: Box::new(left), logic, right: Box::new(right) },
            deserializer: None,
            operators: None,
        }
    }

    #[must_use]
    pub fn and(left: Self, right: Self) -> Self {
        Self::branch(left, LogicalOperator::And, right)
    }

    #[must_use]
    pub fn or(left: Self, right: Self) -> Self {
        Self::branch(left, LogicalOperator::Or, right)
    }

    #[must_use]
    pub fn with_deserializer(mut self, deserializer: Deserializer) -> Self {
        self.deserializer = Some(deserializer);
        self
    }

    #[must_use]
    pub fn with_operators(mut self, operators: impl Into<Arc<OperatorRegistry>>) -> Self {
        self.operators = Some(operators.into());
        self
    }

    pub fn set_deserializer(&mut self, deserializer: Option<Deserializer>) {
        self.deserializer = deserializer;
    }

    pub fn set_operators(&mut self, operators: Option<Arc<OperatorRegistry>>) {
        self.operators = operators;
    }

    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[must_use]
    pub fn into_kind(self) -> NodeKind {
        self.kind
    }

    #[must_use]
    pub const fn deserializer(&self) -> Option<&Deserializer> {
        self.deserializer.as_ref()
    }

    #[must_use]
    pub fn operators(&self) -> Option<&OperatorRegistry> {
        self.operators.as_deref()
    }

    /// Compiles against the process-wide defaults.
    ///
    /// # Errors
    /// See [`compile_filter`].
    pub fn compile<T>(&self, schema: &Arc<Schema<T>>) -> Result<Predicate<T>, QueryError> {
        self.compile_with(schema, &config::defaults())
    }

    /// # Errors
    /// See [`compile_filter`].
    pub fn compile_with<T>(
        &self,
        schema: &Arc<Schema<T>>,
        config: &CompilerConfig,
    ) -> Result<Predicate<T>, QueryError> {
        let expr = compile_filter(self, schema, config, None, None)?;
        log::debug!(target: COMPILE_TARGET, "{}: filter |{PARAM}| {expr}", schema.name());
        Ok(Predicate { schema: Arc::clone(schema), expr })
    }
}

impl fmt::Debug for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterNode")
            .field("kind", &self.kind)
            .field("deserializer", &self.deserializer.is_some())
            .field("operators", &self.operators.as_ref().map(|o| o.names()))
            .finish()
    }
}

/// Compiles `node` into one boolean expression over the current item.
///
/// `inherited_deserializer` and `inherited_operators` are the overrides in effect above
/// `node`; pass `None` at the root.
///
/// # Errors
/// Fails on the first leaf whose property, operator or value cannot be resolved. Nothing is
/// returned for the rest of the tree.
pub fn compile_filter<T>(
    node: &FilterNode,
    schema: &Schema<T>,
    config: &CompilerConfig,
    inherited_deserializer: Option<&Deserializer>,
    inherited_operators: Option<&OperatorRegistry>,
) -> Result<Expr, QueryError> {
    let scope = Scope { config, deserializer: inherited_deserializer, operators: inherited_operators };
    compile_node(node, schema, scope, "$")
}

#[derive(Clone, Copy)]
struct Scope<'c> {
    config: &'c CompilerConfig,
    deserializer: Option<&'c Deserializer>,
    operators: Option<&'c OperatorRegistry>,
}

fn compile_node<'c, T>(
    node: &'c FilterNode,
    schema: &Schema<T>,
    inherited: Scope<'c>,
    path: &str,
) -> Result<Expr, QueryError> {
    let scope = Scope {
        config: inherited.config,
        deserializer: node.deserializer.as_ref().or(inherited.deserializer),
        operators: node.operators.as_deref().or(inherited.operators),
    };
    match &node.kind {
        NodeKind::Branch { left, logic, right } => {
            let l = compile_node(left, schema, scope, &format!("{path}.left"))?;
            let r = compile_node(right, schema, scope, &format!("{path}.right"))?;
            Ok(match logic {
                LogicalOperator::And => Expr::and(l, r),
                LogicalOperator::Or => Expr::or(l, r),
            })
        }
        NodeKind::Leaf(condition) => compile_condition(condition, schema, scope, path),
    }
}

fn compile_condition<T>(
    condition: &Condition,
    schema: &Schema<T>,
    scope: Scope<'_>,
    path: &str,
) -> Result<Expr, QueryError> {
    let (id, property) = schema.resolve(&condition.property)?;
    let raw = property.ty();
    let nullability = raw.nullability();
    let handler =
        operators::resolve(&condition.operator, path, scope.operators, &scope.config.operators)?;
    if handler.is_nullable_only() && nullability == Nullability::NonNullable {
        return Err(QueryError::NotNullable {
            property: property.name().to_string(),
            ty: raw.to_string(),
            context: format!("operator '{}' at {path}", condition.operator),
        });
    }
    let unwrapped = raw.unwrapped();
    let target = handler.value_type(&unwrapped, &raw);

    let deserialize = scope.deserializer.or(scope.config.deserializer.as_ref()).ok_or_else(|| {
        QueryError::MissingDeserializer {
            property: property.name().to_string(),
            raw: condition.value.clone(),
            path: path.to_string(),
        }
    })?;
    let value = deserialize(&condition.value, &target).map_err(|source| QueryError::Deserialize {
        property: property.name().to_string(),
        raw: condition.value.clone(),
        target: target.to_string(),
        path: path.to_string(),
        source,
    })?;

    let guarded = !handler.skips_null_guard();
    let access = Expr::property(id, property.name(), raw);
    let left = if guarded && nullability == Nullability::NullableValue {
        Expr::unwrap_value(access.clone())
    } else {
        access.clone()
    };
    let comparison = handler
        .build(&unwrapped, &raw, left, Expr::constant(value, target))
        .map_err(|e| match e {
            OperatorError::NotNullable { ty } => QueryError::NotNullable {
                property: property.name().to_string(),
                ty,
                context: format!("operator '{}' at {path}", condition.operator),
            },
            OperatorError::Unsupported(reason) => QueryError::UnsupportedOperand {
                operator: condition.operator.clone(),
                property: property.name().to_string(),
                path: path.to_string(),
                reason,
            },
        })?;
    log::trace!(
        target: COMPILE_TARGET,
        "{path}: {} {} {:?} -> {comparison}",
        property.name(),
        condition.operator,
        condition.value
    );

    if !guarded {
        return Ok(comparison);
    }
    Ok(match nullability {
        Nullability::NullableValue => {
            Expr::cond(Expr::has_value(access), comparison, Expr::bool(false))
        }
        Nullability::Reference => Expr::cond(
            Expr::cmp(CmpOp::Ne, access, Expr::null(raw)),
            comparison,
            Expr::bool(false),
        ),
        Nullability::NonNullable => comparison,
    })
}

/// A compiled filter bound to its schema.
pub struct Predicate<T> {
    schema: Arc<Schema<T>>,
    expr: Expr,
}

impl<T> Predicate<T> {
    #[must_use]
    pub const fn new(schema: Arc<Schema<T>>, expr: Expr) -> Self {
        Self { schema, expr }
    }

    pub fn matches(&self, item: &T) -> bool {
        self.expr.test(&self.schema, item)
    }

    #[must_use]
    pub const fn expr(&self) -> &Expr {
        &self.expr
    }

    #[must_use]
    pub const fn schema(&self) -> &Arc<Schema<T>> {
        &self.schema
    }

    #[must_use]
    pub fn into_expr(self) -> Expr {
        self.expr
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self { schema: Arc::clone(&self.schema), expr: self.expr.clone() }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("schema", &self.schema.name())
            .field("expr", &self.expr)
            .finish()
    }
}

impl<T> fmt::Display for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|{PARAM}| {}", self.expr)
    }
}
