//! Compiler configuration and the process-wide default snapshot.
//!
//! Every compile entry point has a form that takes a [`CompilerConfig`] explicitly. The
//! plain forms read [`defaults()`], an immutable snapshot published behind a lock: a
//! compile takes the snapshot once, so publishing new defaults never tears a compile.

use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::deserialize::{self, Deserializer};
use crate::operators::OperatorRegistry;

/// Fallbacks used when neither a filter node nor any of its ancestors overrides them.
#[derive(Clone)]
pub struct CompilerConfig {
    pub deserializer: Option<Deserializer>,
    pub operators: Arc<OperatorRegistry>,
}

impl Default for CompilerConfig {
    /// No deserializer and the built-in operators.
    fn default() -> Self {
        Self { deserializer: None, operators: Arc::new(OperatorRegistry::builtin()) }
    }
}

impl CompilerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in operators with the bundled JSON deserializer.
    #[must_use]
    pub fn json() -> Self {
        Self::default().with_deserializer(deserialize::json())
    }

    #[must_use]
    pub fn with_deserializer(mut self, deserializer: Deserializer) -> Self {
        self.deserializer = Some(deserializer);
        self
    }

    #[must_use]
    pub fn with_operators(mut self, operators: impl Into<Arc<OperatorRegistry>>) -> Self {
        self.operators = operators.into();
        self
    }
}

impl fmt::Debug for CompilerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilerConfig")
            .field("deserializer", &self.deserializer.is_some())
            .field("operators", &self.operators.names())
            .finish()
    }
}

static DEFAULTS: LazyLock<RwLock<Arc<CompilerConfig>>> =
    LazyLock::new(|| RwLock::new(Arc::new(CompilerConfig::default())));

/// Current default snapshot.
pub fn defaults() -> Arc<CompilerConfig> {
    DEFAULTS.read().clone()
}

pub fn set_defaults(config: CompilerConfig) {
    *DEFAULTS.write() = Arc::new(config);
    log::info!("compiler defaults replaced");
}

/// Publishes a copy of the current defaults modified by `f`.
pub fn update_defaults(f: impl FnOnce(&mut CompilerConfig)) {
    let mut guard = DEFAULTS.write();
    let mut next = CompilerConfig::clone(&guard);
    f(&mut next);
    *guard = Arc::new(next);
}

pub fn set_default_deserializer(deserializer: Option<Deserializer>) {
    log::info!("default deserializer {}", if deserializer.is_some() { "set" } else { "cleared" });
    update_defaults(|c| c.deserializer = deserializer);
}

pub fn set_default_operators(operators: impl Into<Arc<OperatorRegistry>>) {
    let operators = operators.into();
    log::info!("default operators set: {:?}", operators.names());
    update_defaults(|c| c.operators = operators);
}

/// Restores the built-in defaults (no deserializer).
pub fn reset_defaults() {
    *DEFAULTS.write() = Arc::new(CompilerConfig::default());
}
