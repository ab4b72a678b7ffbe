use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::config::{self, CompilerConfig};
use crate::errors::QueryError;
use crate::schema::Schema;
use crate::value::Value;

use super::filter::{FilterNode, Predicate};
use super::sort::{OrderStep, compile_sort};
use super::types::{QueryRequest, QueryResultWithCount, SortKey};

const QUERY_TARGET: &str = "gridquery::query";

enum Step<T> {
    Filter(Predicate<T>),
    Order(OrderStep),
    Skip(usize),
    Take(usize),
}

impl<T> Clone for Step<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Filter(p) => Self::Filter(p.clone()),
            Self::Order(o) => Self::Order(o.clone()),
            Self::Skip(n) => Self::Skip(*n),
            Self::Take(n) => Self::Take(*n),
        }
    }
}

/// Deferred query over a borrowed slice. Steps run in the order they were added when the
/// query is executed; consecutive order steps form one stable multi-key sort.
pub struct Query<'a, T> {
    schema: Arc<Schema<T>>,
    source: &'a [T],
    steps: Vec<Step<T>>,
}

impl<'a, T> Query<'a, T> {
    #[must_use]
    pub fn new(schema: Arc<Schema<T>>, source: &'a [T]) -> Self {
        Self { schema, source, steps: Vec::new() }
    }

    #[must_use]
    pub const fn schema(&self) -> &Arc<Schema<T>> {
        &self.schema
    }

    #[must_use]
    pub fn filter(mut self, predicate: Predicate<T>) -> Self {
        self.steps.push(Step::Filter(predicate));
        self
    }

    #[must_use]
    pub fn order(mut self, step: OrderStep) -> Self {
        self.steps.push(Step::Order(step));
        self
    }

    #[must_use]
    pub fn skip(mut self, n: usize) -> Self {
        self.steps.push(Step::Skip(n));
        self
    }

    #[must_use]
    pub fn take(mut self, n: usize) -> Self {
        self.steps.push(Step::Take(n));
        self
    }

    /// Runs the plan and returns references to the matching items, in order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<&'a T> {
        let mut rows: Vec<&'a T> = self.source.iter().collect();
        let mut keys: Vec<&OrderStep> = Vec::new();
        for step in &self.steps {
            match step {
                Step::Filter(predicate) => rows.retain(|item| predicate.matches(item)),
                Step::Order(order) => {
                    if !order.then {
                        self.sort(&mut rows, &mut keys);
                    }
                    keys.push(order);
                }
                Step::Skip(n) => {
                    self.sort(&mut rows, &mut keys);
                    let n = (*n).min(rows.len());
                    rows.drain(..n);
                }
                Step::Take(n) => {
                    self.sort(&mut rows, &mut keys);
                    rows.truncate(*n);
                }
            }
        }
        self.sort(&mut rows, &mut keys);
        rows
    }

    /// Like [`Query::to_vec`], cloning the items.
    #[must_use]
    pub fn to_owned_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.to_vec().into_iter().cloned().collect()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        if self.steps.iter().any(|s| matches!(s, Step::Skip(_) | Step::Take(_))) {
            self.to_vec().len()
        } else {
            let filters: Vec<&Predicate<T>> = self
                .steps
                .iter()
                .filter_map(|s| match s {
                    Step::Filter(p) => Some(p),
                    _ => None,
                })
                .collect();
            self.source.iter().filter(|item| filters.iter().all(|p| p.matches(item))).count()
        }
    }

    /// Sorts `rows` by the pending keys, then clears them.
    fn sort(&self, rows: &mut Vec<&'a T>, keys: &mut Vec<&OrderStep>) {
        if keys.is_empty() {
            return;
        }
        let mut keyed: Vec<(Vec<Value>, &'a T)> = rows
            .drain(..)
            .map(|item| {
                let values = keys.iter().map(|k| k.key.eval(&self.schema, item).into_owned());
                (values.collect(), item)
            })
            .collect();
        keyed.sort_by(|(a, _), (b, _)| {
            keys.iter()
                .zip(a.iter().zip(b))
                .map(|(k, (x, y))| k.compare(x, y))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        });
        rows.extend(keyed.into_iter().map(|(_, item)| item));
        keys.clear();
    }
}

impl<T> Clone for Query<'_, T> {
    fn clone(&self) -> Self {
        Self { schema: Arc::clone(&self.schema), source: self.source, steps: self.steps.clone() }
    }
}

impl<T> fmt::Display for Query<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[]", self.schema.name())?;
        for step in &self.steps {
            match step {
                Step::Filter(p) => write!(f, ".filter({p})")?,
                Step::Order(o) => write!(f, ".{o}")?,
                Step::Skip(n) => write!(f, ".skip({n})")?,
                Step::Take(n) => write!(f, ".take({n})")?,
            }
        }
        Ok(())
    }
}

impl<T> fmt::Debug for Query<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("source_len", &self.source.len())
            .field("plan", &self.to_string())
            .finish()
    }
}

/// A paged query together with the number of items before paging.
#[derive(Debug, Clone)]
pub struct CountedQuery<'a, T> {
    pub query: Query<'a, T>,
    pub count: usize,
}

impl<T: Clone> CountedQuery<'_, T> {
    /// Executes the paged query into the `{ result, count }` response shape.
    #[must_use]
    pub fn into_result(self) -> QueryResultWithCount<T> {
        QueryResultWithCount { result: self.query.to_owned_vec(), count: self.count }
    }
}

/// Adds the compiled filter, or returns `query` unchanged when there is none.
///
/// # Errors
/// Propagates filter compilation errors.
pub fn apply_filter<'a, T>(
    query: Query<'a, T>,
    filter: Option<&FilterNode>,
    config: &CompilerConfig,
) -> Result<Query<'a, T>, QueryError> {
    match filter {
        None => Ok(query),
        Some(node) => {
            let predicate = node.compile_with(query.schema(), config)?;
            Ok(query.filter(predicate))
        }
    }
}

/// # Errors
/// Propagates sort compilation errors.
pub fn apply_sort<'a, T>(query: Query<'a, T>, keys: &[SortKey]) -> Result<Query<'a, T>, QueryError> {
    let steps = compile_sort(keys, query.schema())?;
    Ok(steps.into_iter().fold(query, Query::order))
}

#[must_use]
pub fn apply_pagination<T>(query: Query<'_, T>, skip: Option<usize>, take: Option<usize>) -> Query<'_, T> {
    let query = match skip {
        Some(n) => query.skip(n),
        None => query,
    };
    match take {
        Some(n) => query.take(n),
        None => query,
    }
}

impl QueryRequest {
    /// Filter, then sort, then paging, using the process-wide defaults.
    ///
    /// # Errors
    /// Propagates compilation errors.
    pub fn apply<'a, T>(&self, query: Query<'a, T>) -> Result<Query<'a, T>, QueryError> {
        self.apply_with(query, &config::defaults())
    }

    /// # Errors
    /// Propagates compilation errors.
    pub fn apply_with<'a, T>(
        &self,
        query: Query<'a, T>,
        config: &CompilerConfig,
    ) -> Result<Query<'a, T>, QueryError> {
        let query = self.filter_and_sort(query, config)?;
        let query = apply_pagination(query, self.skip, self.take);
        log::debug!(target: QUERY_TARGET, "{query}");
        Ok(query)
    }

    /// Like [`QueryRequest::apply`], also counting the filtered items before paging.
    ///
    /// # Errors
    /// Propagates compilation errors.
    pub fn apply_with_count<'a, T>(&self, query: Query<'a, T>) -> Result<CountedQuery<'a, T>, QueryError> {
        self.apply_with_count_using(query, &config::defaults())
    }

    /// # Errors
    /// Propagates compilation errors.
    pub fn apply_with_count_using<'a, T>(
        &self,
        query: Query<'a, T>,
        config: &CompilerConfig,
    ) -> Result<CountedQuery<'a, T>, QueryError> {
        let query = self.filter_and_sort(query, config)?;
        let count = query.count();
        let query = apply_pagination(query, self.skip, self.take);
        log::debug!(target: QUERY_TARGET, "{query} (count {count})");
        Ok(CountedQuery { query, count })
    }

    fn filter_and_sort<'a, T>(
        &self,
        query: Query<'a, T>,
        config: &CompilerConfig,
    ) -> Result<Query<'a, T>, QueryError> {
        let query = apply_filter(query, self.filter.as_ref(), config)?;
        apply_sort(query, &self.sort)
    }
}
