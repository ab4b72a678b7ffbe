//! Registration-time property catalog for an item type.
//!
//! A [`Schema`] maps property names to typed getters and their declared [`Type`]. It is
//! built once per item type and shared by every compiled predicate and ordering.

use std::fmt;
use std::sync::Arc;

use crate::errors::QueryError;
use crate::value::{Scalar, Type, Value};

type Getter<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;

/// Index of a property inside its schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyId(usize);

pub struct Property<T> {
    name: String,
    ty: Type,
    getter: Getter<T>,
}

impl<T> Property<T> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn ty(&self) -> Type {
        self.ty
    }

    /// Reads the property from an item; absent values come back as [`Value::Null`].
    pub fn get(&self, item: &T) -> Value {
        (self.getter)(item)
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property").field("name", &self.name).field("ty", &self.ty).finish()
    }
}

pub struct Schema<T> {
    name: String,
    properties: Vec<Property<T>>,
}

impl<T: 'static> Schema<T> {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> SchemaBuilder<T> {
        SchemaBuilder { name: name.into(), properties: Vec::new() }
    }
}

impl<T> Schema<T> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-insensitive property lookup.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<(PropertyId, &Property<T>)> {
        self.properties
            .iter()
            .enumerate()
            .find(|(_, p)| p.name.eq_ignore_ascii_case(name))
            .map(|(i, p)| (PropertyId(i), p))
    }

    /// Like [`Schema::find`], failing with [`QueryError::PropertyNotFound`].
    ///
    /// # Errors
    /// Returns an error when no property matches `name`.
    pub fn resolve(&self, name: &str) -> Result<(PropertyId, &Property<T>), QueryError> {
        self.find(name).ok_or_else(|| QueryError::PropertyNotFound {
            property: name.to_string(),
            type_name: self.name.clone(),
        })
    }

    #[must_use]
    pub fn property(&self, id: PropertyId) -> Option<&Property<T>> {
        self.properties.get(id.0)
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property<T>> {
        self.properties.iter()
    }

    /// Reads a property by id. Ids from another schema read as null.
    pub fn read(&self, id: PropertyId, item: &T) -> Value {
        self.properties.get(id.0).map_or(Value::Null, |p| p.get(item))
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("properties", &self.properties)
            .finish()
    }
}

pub struct SchemaBuilder<T> {
    name: String,
    properties: Vec<Property<T>>,
}

impl<T: 'static> SchemaBuilder<T> {
    /// Registers a non-nullable value property.
    #[must_use]
    pub fn value<V, F>(self, name: &str, getter: F) -> Self
    where
        V: Scalar + 'static,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.push(name, Type::Value(V::kind()), Box::new(move |item: &T| getter(item).into_value()))
    }

    /// Registers a nullable-wrapped value property (e.g. `Option<i32>`).
    #[must_use]
    pub fn nullable<V, F>(self, name: &str, getter: F) -> Self
    where
        V: Scalar + 'static,
        F: Fn(&T) -> Option<V> + Send + Sync + 'static,
    {
        self.push(
            name,
            Type::Nullable(V::kind()),
            Box::new(move |item: &T| getter(item).map_or(Value::Null, Scalar::into_value)),
        )
    }

    /// Registers a nullable reference property (e.g. `Option<String>`).
    #[must_use]
    pub fn reference<V, F>(self, name: &str, getter: F) -> Self
    where
        V: Scalar + 'static,
        F: Fn(&T) -> Option<V> + Send + Sync + 'static,
    {
        self.push(
            name,
            Type::Reference(V::kind()),
            Box::new(move |item: &T| getter(item).map_or(Value::Null, Scalar::into_value)),
        )
    }

    fn push(mut self, name: &str, ty: Type, getter: Getter<T>) -> Self {
        let property = Property { name: name.to_string(), ty, getter };
        if let Some(existing) =
            self.properties.iter_mut().find(|p| p.name.eq_ignore_ascii_case(name))
        {
            log::warn!("schema {}: property '{}' registered twice, replacing", self.name, name);
            *existing = property;
        } else {
            self.properties.push(property);
        }
        self
    }

    #[must_use]
    pub fn build(self) -> Arc<Schema<T>> {
        Arc::new(Schema { name: self.name, properties: self.properties })
    }
}
