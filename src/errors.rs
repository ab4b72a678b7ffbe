use thiserror::Error;

use crate::deserialize::DeserializeError;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(
        "Cannot deserialize value {raw:?} for property '{property}' at {path}: no value \
         deserializer is configured. Set a default deserializer in the compiler configuration \
         or provide one on the filter node (or one of its ancestors)."
    )]
    MissingDeserializer { property: String, raw: String, path: String },

    #[error(
        "Unknown operator '{operator}' at {path}: not found in the node override registry \
         ({override_state}) nor in the default operator registry"
    )]
    UnknownOperator { operator: String, path: String, override_state: &'static str },

    #[error("Property '{property}' not found on type {type_name}")]
    PropertyNotFound { property: String, type_name: String },

    #[error("Property '{property}' of type {ty} is not nullable ({context})")]
    NotNullable { property: String, ty: String, context: String },

    #[error("Invalid filter node at {path}: {reason}")]
    InvalidNode { path: String, reason: String },

    #[error("Failed to deserialize {raw:?} as {target} for property '{property}' at {path}: {source}")]
    Deserialize {
        property: String,
        raw: String,
        target: String,
        path: String,
        #[source]
        source: DeserializeError,
    },

    #[error("Operator '{operator}' cannot be applied to property '{property}' at {path}: {reason}")]
    UnsupportedOperand { operator: String, property: String, path: String, reason: String },

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),
}
