//! Value model: scalar kinds, declared property types and runtime values.
//!
//! A property is declared with a [`Type`], which pairs a [`ValueKind`] with one of the
//! nullability disciplines (plain value, nullable-wrapped value, reference) or marks a
//! sequence. Runtime values flowing through compiled expressions are [`Value`]s.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::fmt;

/// Static descriptor of a field-less enum: its name and `(variant, discriminant)` pairs.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumDef {
    pub name: &'static str,
    pub variants: &'static [(&'static str, i64)],
}

impl EnumDef {
    #[must_use]
    pub fn variant_name(&self, discriminant: i64) -> Option<&'static str> {
        self.variants.iter().find(|(_, d)| *d == discriminant).map(|(name, _)| *name)
    }

    /// Case-insensitive lookup of a variant by name.
    #[must_use]
    pub fn discriminant(&self, name: &str) -> Option<i64> {
        self.variants.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, d)| *d)
    }

    #[must_use]
    pub fn is_defined(&self, discriminant: i64) -> bool {
        self.variant_name(discriminant).is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Text,
    DateTime,
    Enum(&'static EnumDef),
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Text => f.write_str("text"),
            Self::DateTime => f.write_str("datetime"),
            Self::Enum(def) => f.write_str(def.name),
        }
    }
}

/// How a declared type handles absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nullability {
    NonNullable,
    NullableValue,
    Reference,
}

/// Declared type of a property, a constant or a deserialization target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    /// Non-nullable value.
    Value(ValueKind),
    /// Value wrapped with a "has value" flag.
    Nullable(ValueKind),
    /// Nullable reference.
    Reference(ValueKind),
    /// Sequence of non-nullable values.
    Array(ValueKind),
}

impl Type {
    pub const BOOL: Self = Self::Value(ValueKind::Bool);

    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match *self {
            Self::Value(k) | Self::Nullable(k) | Self::Reference(k) | Self::Array(k) => k,
        }
    }

    /// The value type inside a nullable wrapper, or the type itself.
    #[must_use]
    pub const fn unwrapped(&self) -> Self {
        match *self {
            Self::Nullable(k) => Self::Value(k),
            other => other,
        }
    }

    #[must_use]
    pub const fn array_of(&self) -> Self {
        Self::Array(self.kind())
    }

    #[must_use]
    pub const fn nullability(&self) -> Nullability {
        match self {
            Self::Value(_) => Nullability::NonNullable,
            Self::Nullable(_) => Nullability::NullableValue,
            Self::Reference(_) | Self::Array(_) => Nullability::Reference,
        }
    }

    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        !matches!(self, Self::Value(_))
    }

    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(k) | Self::Reference(k) => write!(f, "{k}"),
            Self::Nullable(k) => write!(f, "{k}?"),
            Self::Array(k) => write!(f, "{k}[]"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumValue {
    def: &'static EnumDef,
    discriminant: i64,
}

impl EnumValue {
    #[must_use]
    pub const fn new(def: &'static EnumDef, discriminant: i64) -> Self {
        Self { def, discriminant }
    }

    #[must_use]
    pub const fn def(&self) -> &'static EnumDef {
        self.def
    }

    #[must_use]
    pub const fn discriminant(&self) -> i64 {
        self.discriminant
    }

    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        self.def.variant_name(self.discriminant)
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(variant) => write!(f, "{}::{variant}", self.def.name),
            None => write!(f, "{}({})", self.def.name, self.discriminant),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(DateTime<Utc>),
    Enum(EnumValue),
    List(Vec<Value>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Partial comparison between values of the same kind (ints and floats compare numerically).
    /// Null and mismatched kinds are incomparable.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Int(_) | Self::Float(_), Self::Int(_) | Self::Float(_)) => {
                self.as_f64()?.partial_cmp(&other.as_f64()?)
            }
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            (Self::Enum(a), Self::Enum(b)) if a.def == b.def => {
                Some(a.discriminant.cmp(&b.discriminant))
            }
            _ => None,
        }
    }

    /// Equality used by compiled expressions: two nulls are equal, null never equals a value.
    #[must_use]
    pub fn loose_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            _ => self.compare(other) == Some(Ordering::Equal),
        }
    }

    /// Total order for sorting: null sorts lowest, mismatched kinds fall back to a fixed rank.
    #[must_use]
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Null, _) => Ordering::Less,
            (_, Self::Null) => Ordering::Greater,
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::List(a), Self::List(b)) => a
                .iter()
                .zip(b)
                .map(|(x, y)| x.sort_cmp(y))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            _ => self.compare(other).unwrap_or_else(|| self.rank().cmp(&other.rank())),
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Float(_) => 2,
            Self::Text(_) => 3,
            Self::DateTime(_) => 4,
            Self::Enum(_) => 5,
            Self::List(_) => 6,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::DateTime(dt) => write!(f, "\"{}\"", dt.to_rfc3339()),
            Self::Enum(e) => write!(f, "{e}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Rust field types that can back a schema property.
pub trait Scalar {
    fn kind() -> ValueKind;
    fn into_value(self) -> Value;
}

macro_rules! impl_scalar_int {
    ($($t:ty),*) => {
        $(
            impl Scalar for $t {
                fn kind() -> ValueKind {
                    ValueKind::Int
                }

                fn into_value(self) -> Value {
                    Value::Int(i64::from(self))
                }
            }
        )*
    };
}

impl_scalar_int!(i8, i16, i32, i64, u8, u16, u32);

impl Scalar for f32 {
    fn kind() -> ValueKind {
        ValueKind::Float
    }

    fn into_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl Scalar for f64 {
    fn kind() -> ValueKind {
        ValueKind::Float
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl Scalar for bool {
    fn kind() -> ValueKind {
        ValueKind::Bool
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl Scalar for String {
    fn kind() -> ValueKind {
        ValueKind::Text
    }

    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl Scalar for DateTime<Utc> {
    fn kind() -> ValueKind {
        ValueKind::DateTime
    }

    fn into_value(self) -> Value {
        Value::DateTime(self)
    }
}

/// Implements [`Scalar`] for a field-less enum so it can back schema properties.
///
/// ```ignore
/// #[derive(Clone, Copy)]
/// enum Status { Open = 1, Closed = 2 }
/// gridquery::scalar_enum!(Status { Open, Closed });
/// ```
#[macro_export]
macro_rules! scalar_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::value::Scalar for $ty {
            fn kind() -> $crate::value::ValueKind {
                static DEF: $crate::value::EnumDef = $crate::value::EnumDef {
                    name: stringify!($ty),
                    variants: &[$((stringify!($variant), $ty::$variant as i64)),+],
                };
                $crate::value::ValueKind::Enum(&DEF)
            }

            fn into_value(self) -> $crate::value::Value {
                let discriminant = self as i64;
                match <Self as $crate::value::Scalar>::kind() {
                    $crate::value::ValueKind::Enum(def) => $crate::value::Value::Enum(
                        $crate::value::EnumValue::new(def, discriminant),
                    ),
                    _ => $crate::value::Value::Int(discriminant),
                }
            }
        }
    };
}
