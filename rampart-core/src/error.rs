//! Error types for the access-control engine

/// Result type used throughout rampart
pub type Result<T> = std::result::Result<T, RampartError>;

/// Main error type for rampart
///
/// Access decisions never fail because access is denied; a denial is `Ok(false)`.
/// Errors are reserved for contract violations and collaborator failures.
#[derive(thiserror::Error, Debug)]
pub enum RampartError {
    /// Malformed rule declaration input (role name, context, predicate)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Malformed configuration value
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Declared rules or persisted roles are inconsistent with the application
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
    /// A context value could not be resolved to a canonical context
    #[error("Invalid context: {0}")]
    InvalidContext(String),
    /// Failure reported by a role store, persistence lookup or cache backend
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Fatal inconsistencies detected by the integrity checker
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("rules on `{resource}` reference actions that do not exist: {}", .actions.join(", "))]
    MissingActions { resource: String, actions: Vec<String> },
    #[error("persisted roles reference context type `{type_name}`, which no longer resolves")]
    MissingContextType { type_name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_actions_message_names_resource_and_actions() {
        let err = RampartError::from(IntegrityError::MissingActions {
            resource: "PostsController".to_string(),
            actions: vec!["archive".to_string(), "publish".to_string()],
        });
        let message = err.to_string();
        assert!(message.contains("PostsController"));
        assert!(message.contains("archive, publish"));
    }
}
