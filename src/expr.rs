//! Expression AST produced by the filter and sort compilers.
//!
//! Every expression reads "the current item" (printed as `it`). Evaluation is total:
//! comparisons against null are false, equality treats two nulls as equal, and
//! malformed operands evaluate to `false` rather than failing.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use crate::schema::{PropertyId, Schema};
use crate::value::{Type, Value};

/// Name used for the item parameter when printing expressions.
pub const PARAM: &str = "it";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CmpOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }

    #[must_use]
    pub fn test(self, left: &Value, right: &Value) -> bool {
        match self {
            Self::Eq => left.loose_eq(right),
            Self::Ne => !left.loose_eq(right),
            Self::Gt => left.compare(right) == Some(Ordering::Greater),
            Self::Gte => matches!(left.compare(right), Some(Ordering::Greater | Ordering::Equal)),
            Self::Lt => left.compare(right) == Some(Ordering::Less),
            Self::Lte => matches!(left.compare(right), Some(Ordering::Less | Ordering::Equal)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOp {
    Contains,
    StartsWith,
    EndsWith,
}

impl TextOp {
    #[must_use]
    pub const fn method(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
        }
    }

    #[must_use]
    pub fn test(self, haystack: &str, needle: &str) -> bool {
        match self {
            Self::Contains => haystack.contains(needle),
            Self::StartsWith => haystack.starts_with(needle),
            Self::EndsWith => haystack.ends_with(needle),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant { value: Value, ty: Type },
    Property { id: PropertyId, name: String, ty: Type },
    /// Value inside a nullable wrapper; only meaningful behind a has-value guard.
    Unwrap(Box<Expr>),
    HasValue(Box<Expr>),
    Cmp { op: CmpOp, left: Box<Expr>, right: Box<Expr> },
    /// "`set` contains `value`".
    Member { set: Box<Expr>, value: Box<Expr> },
    Text { op: TextOp, target: Box<Expr>, arg: Box<Expr> },
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Cond { test: Box<Expr>, then: Box<Expr>, otherwise: Box<Expr> },
}

impl Expr {
    #[must_use]
    pub const fn constant(value: Value, ty: Type) -> Self {
        Self::Constant { value, ty }
    }

    #[must_use]
    pub const fn null(ty: Type) -> Self {
        Self::Constant { value: Value::Null, ty }
    }

    #[must_use]
    pub const fn bool(b: bool) -> Self {
        Self::Constant { value: Value::Bool(b), ty: Type::BOOL }
    }

    #[must_use]
    pub fn property(id: PropertyId, name: impl Into<String>, ty: Type) -> Self {
        Self::Property { id, name: name.into(), ty }
    }

    #[must_use]
    pub fn unwrap_value(inner: Self) -> Self {
        Self::Unwrap(Box::new(inner))
    }

    #[must_use]
    pub fn has_value(inner: Self) -> Self {
        Self::HasValue(Box::new(inner))
    }

    #[must_use]
    pub fn cmp(op: CmpOp, left: Self, right: Self) -> Self {
        Self::Cmp { op, left: Box::new(left), right: Box::new(right) }
    }

    #[must_use]
    pub fn member(set: Self, value: Self) -> Self {
        Self::Member { set: Box::new(set), value: Box::new(value) }
    }

    #[must_use]
    pub fn text(op: TextOp, target: Self, arg: Self) -> Self {
        Self::Text { op, target: Box::new(target), arg: Box::new(arg) }
    }

    #[must_use]
    pub fn negate(inner: Self) -> Self {
        Self::Not(Box::new(inner))
    }

    #[must_use]
    pub fn and(left: Self, right: Self) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    #[must_use]
    pub fn or(left: Self, right: Self) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    #[must_use]
    pub fn cond(test: Self, then: Self, otherwise: Self) -> Self {
        Self::Cond { test: Box::new(test), then: Box::new(then), otherwise: Box::new(otherwise) }
    }

    /// Static type of the expression.
    #[must_use]
    pub fn ty(&self) -> Type {
        match self {
            Self::Constant { ty, .. } | Self::Property { ty, .. } => *ty,
            Self::Unwrap(inner) => inner.ty().unwrapped(),
            Self::Cond { then, .. } => then.ty(),
            Self::HasValue(_)
            | Self::Cmp { .. }
            | Self::Member { .. }
            | Self::Text { .. }
            | Self::Not(_)
            | Self::And(..)
            | Self::Or(..) => Type::BOOL,
        }
    }

    pub fn eval<'a, T>(&'a self, schema: &Schema<T>, item: &T) -> Cow<'a, Value> {
        match self {
            Self::Constant { value, .. } => Cow::Borrowed(value),
            Self::Property { id, .. } => Cow::Owned(schema.read(*id, item)),
            Self::Unwrap(inner) => inner.eval(schema, item),
            Self::HasValue(inner) => Cow::Owned(Value::Bool(!inner.eval(schema, item).is_null())),
            Self::Cmp { op, left, right } => {
                let l = left.eval(schema, item);
                let r = right.eval(schema, item);
                Cow::Owned(Value::Bool(op.test(&l, &r)))
            }
            Self::Member { set, value } => {
                let s = set.eval(schema, item);
                let v = value.eval(schema, item);
                let found = s.as_list().is_some_and(|xs| xs.iter().any(|x| x.loose_eq(&v)));
                Cow::Owned(Value::Bool(found))
            }
            Self::Text { op, target, arg } => {
                let t = target.eval(schema, item);
                let a = arg.eval(schema, item);
                let hit = match (t.as_text(), a.as_text()) {
                    (Some(t), Some(a)) => op.test(t, a),
                    _ => false,
                };
                Cow::Owned(Value::Bool(hit))
            }
            Self::Not(inner) => Cow::Owned(Value::Bool(!inner.test(schema, item))),
            Self::And(l, r) => {
                Cow::Owned(Value::Bool(l.test(schema, item) && r.test(schema, item)))
            }
            Self::Or(l, r) => Cow::Owned(Value::Bool(l.test(schema, item) || r.test(schema, item))),
            Self::Cond { test, then, otherwise } => {
                if test.test(schema, item) {
                    then.eval(schema, item)
                } else {
                    otherwise.eval(schema, item)
                }
            }
        }
    }

    /// Evaluates as a predicate; anything but `true` is false.
    pub fn test<T>(&self, schema: &Schema<T>, item: &T) -> bool {
        matches!(self.eval(schema, item).as_ref(), Value::Bool(true))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant { value, .. } => write!(f, "{value}"),
            Self::Property { name, .. } => write!(f, "{PARAM}.{name}"),
            Self::Unwrap(inner) => write!(f, "{inner}.value()"),
            Self::HasValue(inner) => write!(f, "{inner}.is_some()"),
            Self::Cmp { op, left, right } => write!(f, "({left} {} {right})", op.symbol()),
            Self::Member { set, value } => write!(f, "{set}.contains({value})"),
            Self::Text { op, target, arg } => write!(f, "{target}.{}({arg})", op.method()),
            Self::Not(inner) => write!(f, "!{inner}"),
            Self::And(l, r) => write!(f, "({l} && {r})"),
            Self::Or(l, r) => write!(f, "({l} || {r})"),
            Self::Cond { test, then, otherwise } => {
                write!(f, "if {test} {{ {then} }} else {{ {otherwise} }}")
            }
        }
    }
}
