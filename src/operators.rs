//! Operator handlers and registries.
//!
//! An [`OperatorHandler`] turns `(unwrapped type, raw type, left, right)` into a boolean
//! [`Expr`]. Handlers are registered by name in an [`OperatorRegistry`]; names are
//! matched exactly.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::errors::QueryError;
use crate::expr::{CmpOp, Expr, TextOp};
use crate::value::{Nullability, Type, ValueKind};

pub type ExpressionFactory =
    Arc<dyn Fn(&Type, &Type, Expr, Expr) -> Result<Expr, OperatorError> + Send + Sync>;

pub type ValueTypeOverride = Arc<dyn Fn(&Type, &Type) -> Type + Send + Sync>;

/// Failure raised by an expression factory; the compiler attaches property and path.
#[derive(Debug, Error)]
pub enum OperatorError {
    #[error("type {ty} is not nullable")]
    NotNullable { ty: String },
    #[error("{0}")]
    Unsupported(String),
}

#[derive(Clone)]
pub struct OperatorHandler {
    factory: ExpressionFactory,
    value_type: Option<ValueTypeOverride>,
    skip_null_guard: bool,
    nullable_only: bool,
}

impl OperatorHandler {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&Type, &Type, Expr, Expr) -> Result<Expr, OperatorError> + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
            value_type: None,
            skip_null_guard: false,
            nullable_only: false,
        }
    }

    /// Overrides the type the raw value is deserialized into.
    #[must_use]
    pub fn with_value_type<F>(mut self, value_type: F) -> Self
    where
        F: Fn(&Type, &Type) -> Type + Send + Sync + 'static,
    {
        self.value_type = Some(Arc::new(value_type));
        self
    }

    /// The compiler will neither unwrap the property nor wrap the result in a null guard.
    #[must_use]
    pub const fn without_null_guard(mut self) -> Self {
        self.skip_null_guard = true;
        self
    }

    /// The compiler rejects non-nullable properties before the value is deserialized.
    #[must_use]
    pub const fn nullable_only(mut self) -> Self {
        self.nullable_only = true;
        self
    }

    /// # Errors
    /// Propagates the factory's error.
    pub fn build(
        &self,
        unwrapped: &Type,
        raw: &Type,
        left: Expr,
        right: Expr,
    ) -> Result<Expr, OperatorError> {
        (self.factory)(unwrapped, raw, left, right)
    }

    /// Target type for the condition value: the override's answer, else `raw`.
    #[must_use]
    pub fn value_type(&self, unwrapped: &Type, raw: &Type) -> Type {
        self.value_type.as_ref().map_or(*raw, |f| f(unwrapped, raw))
    }

    #[must_use]
    pub const fn skips_null_guard(&self) -> bool {
        self.skip_null_guard
    }

    #[must_use]
    pub const fn is_nullable_only(&self) -> bool {
        self.nullable_only
    }
}

impl fmt::Debug for OperatorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorHandler")
            .field("value_type", &self.value_type.is_some())
            .field("skip_null_guard", &self.skip_null_guard)
            .field("nullable_only", &self.nullable_only)
            .finish_non_exhaustive()
    }
}

/// Built-in operator families and the value kinds each accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Equality,
    Ordering,
    Membership,
    TextContains,
    TextPrefix,
    TextSuffix,
    Nullness,
}

impl Family {
    #[must_use]
    pub const fn supports(self, kind: ValueKind) -> bool {
        match self {
            Self::Equality | Self::Membership | Self::Nullness => true,
            Self::Ordering => !matches!(kind, ValueKind::Bool),
            Self::TextContains | Self::TextPrefix | Self::TextSuffix => {
                matches!(kind, ValueKind::Text)
            }
        }
    }

    fn check(self, unwrapped: &Type) -> Result<(), OperatorError> {
        if self.supports(unwrapped.kind()) {
            Ok(())
        } else {
            Err(OperatorError::Unsupported(format!(
                "{self:?} operators do not accept {unwrapped} operands"
            )))
        }
    }

    fn handler<F>(self, build: F) -> OperatorHandler
    where
        F: Fn(&Type, &Type, Expr, Expr) -> Result<Expr, OperatorError> + Send + Sync + 'static,
    {
        OperatorHandler::new(move |unwrapped, raw, left, right| {
            self.check(unwrapped)?;
            build(unwrapped, raw, left, right)
        })
    }
}

fn compare(family: Family, op: CmpOp) -> OperatorHandler {
    family.handler(move |_, _, left, right| Ok(Expr::cmp(op, left, right)))
}

fn membership(negated: bool) -> OperatorHandler {
    Family::Membership
        .handler(move |_, _, left, right| {
            let set_ty = right.ty();
            if !set_ty.is_array() {
                return Err(OperatorError::Unsupported(format!(
                    "membership needs a sequence operand, found {set_ty}"
                )));
            }
            let test = Expr::member(right, left);
            Ok(if negated { Expr::negate(test) } else { test })
        })
        .with_value_type(|unwrapped, _| unwrapped.array_of())
}

fn text(family: Family, op: TextOp, negated: bool) -> OperatorHandler {
    family.handler(move |_, _, left, right| {
        let test = Expr::text(op, left, right);
        Ok(if negated { Expr::negate(test) } else { test })
    })
}

fn nullness(is_null: bool) -> OperatorHandler {
    Family::Nullness
        .handler(move |_, raw, left, _| match raw.nullability() {
            Nullability::NullableValue => {
                let present = Expr::has_value(left);
                Ok(if is_null { Expr::negate(present) } else { present })
            }
            Nullability::Reference => {
                let op = if is_null { CmpOp::Eq } else { CmpOp::Ne };
                Ok(Expr::cmp(op, left, Expr::null(*raw)))
            }
            Nullability::NonNullable => Err(OperatorError::NotNullable { ty: raw.to_string() }),
        })
        .with_value_type(|_, raw| *raw)
        .without_null_guard()
        .nullable_only()
}

#[derive(Debug, Clone, Default)]
pub struct OperatorRegistry {
    handlers: HashMap<String, OperatorHandler>,
}

impl OperatorRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The fourteen built-in operators.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new()
            .with("eq", compare(Family::Equality, CmpOp::Eq))
            .with("neq", compare(Family::Equality, CmpOp::Ne))
            .with("gt", compare(Family::Ordering, CmpOp::Gt))
            .with("gte", compare(Family::Ordering, CmpOp::Gte))
            .with("lt", compare(Family::Ordering, CmpOp::Lt))
            .with("lte", compare(Family::Ordering, CmpOp::Lte))
            .with("in", membership(false))
            .with("notin", membership(true))
            .with("contains", text(Family::TextContains, TextOp::Contains, false))
            .with("doesnotcontain", text(Family::TextContains, TextOp::Contains, true))
            .with("startswith", text(Family::TextPrefix, TextOp::StartsWith, false))
            .with("endswith", text(Family::TextSuffix, TextOp::EndsWith, false))
            .with("isnull", nullness(true))
            .with("isnotnull", nullness(false))
    }

    /// Registers `handler` under `name`, returning the handler it replaced.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: OperatorHandler,
    ) -> Option<OperatorHandler> {
        self.handlers.insert(name.into(), handler)
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, handler: OperatorHandler) -> Self {
        self.register(name, handler);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<OperatorHandler> {
        self.handlers.remove(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OperatorHandler> {
        self.handlers.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Looks `name` up in the override registry, then in `defaults`.
pub(crate) fn resolve<'r>(
    name: &str,
    path: &str,
    overrides: Option<&'r OperatorRegistry>,
    defaults: &'r OperatorRegistry,
) -> Result<&'r OperatorHandler, QueryError> {
    if let Some(handler) = overrides.and_then(|o| o.get(name)) {
        return Ok(handler);
    }
    defaults.get(name).ok_or_else(|| QueryError::UnknownOperator {
        operator: name.to_string(),
        path: path.to_string(),
        override_state: if overrides.is_some() { "set, no match" } else { "not set" },
    })
}
