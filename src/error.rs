//! Error type shared by configuration loading and event listeners.
//!
//! Listener callbacks return [`ListenerResult`]; the event bus and the
//! collision system log failures and keep dispatching to the remaining
//! listeners, so an error never escapes a single emit.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// The configuration file could not be read or parsed.
    #[error("failed to load config file {path}: {message}")]
    Config { path: String, message: String },

    /// A configuration key holds a value that cannot be used.
    #[error("invalid value for [{section}] {key}: {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },

    /// An entity expected by a listener does not carry the component it needs.
    #[error("entity {entity} is missing component {component}")]
    MissingComponent {
        entity: String,
        component: &'static str,
    },

    /// Generic listener failure.
    #[error("listener failed: {0}")]
    Listener(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result returned by every bus and collision listener.
pub type ListenerResult = Result<(), SimError>;

impl SimError {
    pub fn missing<T>(entity: bevy_ecs::entity::Entity) -> Self {
        SimError::MissingComponent {
            entity: format!("{entity:?}"),
            component: std::any::type_name::<T>(),
        }
    }
}
