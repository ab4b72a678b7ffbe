use std::cmp::Ordering;
use std::fmt;

use crate::errors::QueryError;
use crate::expr::{CmpOp, Expr, PARAM};
use crate::schema::Schema;
use crate::value::{Nullability, Value};

use super::filter::COMPILE_TARGET;
use super::types::SortKey;

/// One key of an ordering. `then` marks a secondary key; a primary key restarts the ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderStep {
    pub key: Expr,
    pub descending: bool,
    pub then: bool,
}

impl OrderStep {
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match (self.then, self.descending) {
            (false, false) => "order_by",
            (false, true) => "order_by_descending",
            (true, false) => "then_by",
            (true, true) => "then_by_descending",
        }
    }

    /// Compares two evaluated keys in this step's direction.
    #[must_use]
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let ord = a.sort_cmp(b);
        if self.descending { ord.reverse() } else { ord }
    }
}

impl fmt::Display for OrderStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(|{PARAM}| {})", self.verb(), self.key)
    }
}

/// Compiles sort keys into order steps, applied in list order. Only the first emitted step is
/// primary.
///
/// # Errors
/// Fails if a property is missing, or if `treat_null_lowest` is set on a non-nullable property.
pub fn compile_sort<T>(keys: &[SortKey], schema: &Schema<T>) -> Result<Vec<OrderStep>, QueryError> {
    let mut steps: Vec<OrderStep> = Vec::with_capacity(keys.len());
    for key in keys {
        let (id, property) = schema.resolve(&key.property)?;
        let ty = property.ty();
        let access = Expr::property(id, property.name(), ty);
        if key.treat_null_lowest {
            let present = match ty.nullability() {
                Nullability::NullableValue => Expr::has_value(access.clone()),
                Nullability::Reference => Expr::cmp(CmpOp::Ne, access.clone(), Expr::null(ty)),
                Nullability::NonNullable => {
                    return Err(QueryError::NotNullable {
                        property: property.name().to_string(),
                        ty: ty.to_string(),
                        context: format!("treatNullLowest sort on {}", schema.name()),
                    });
                }
            };
            let then = !steps.is_empty();
            steps.push(OrderStep { key: present, descending: key.descending, then });
        }
        let then = !steps.is_empty();
        steps.push(OrderStep { key: access, descending: key.descending, then });
    }
    if !steps.is_empty() {
        log::debug!(
            target: COMPILE_TARGET,
            "{}: sort {}",
            schema.name(),
            steps.iter().map(ToString::to_string).collect::<Vec<_>>().join(".")
        );
    }
    Ok(steps)
}
