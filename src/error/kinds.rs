use std::{fmt, io};

use crate::completion::{ContextId, ProviderId};

/// Crate-wide `Result` type using [`CompletionError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, CompletionError>;

/// Top-level error type for the completion engine.
///
/// Every variant is recoverable: the engine reports these to its caller and
/// keeps running.
#[derive(Debug)]
pub enum CompletionError {
    /// Provider registry errors.
    Registry(RegistryError),

    /// Completion request errors.
    Request(RequestError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Provider registry errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The same provider instance was added twice.
    ProviderAlreadyRegistered(String),

    /// Removal of a provider that was never added.
    ProviderNotRegistered(ProviderId),
}

/// Errors produced while starting or feeding a completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The request was made with an empty provider list.
    NoProviders,

    /// None of the requested providers matched the context.
    NoMatchingProviders,

    /// A provider reported proposals for a context or round that is no
    /// longer current, or was not asked to populate it.
    LateCallback {
        context: ContextId,
        provider: ProviderId,
    },
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::Registry(e) => write!(f, "Registry error: {e}"),
            CompletionError::Request(e) => write!(f, "{e}"),
            CompletionError::Config(e) => write!(f, "Configuration error: {e}"),
            CompletionError::Io(e) => write!(f, "I/O error: {e}"),
            CompletionError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::ProviderAlreadyRegistered(name) => {
                write!(f, "Provider '{name}' is already bound to this completion")
            }
            RegistryError::ProviderNotRegistered(id) => {
                write!(f, "Provider {id} is not bound to this completion")
            }
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::NoProviders => write!(f, "No completion available"),
            RequestError::NoMatchingProviders => {
                write!(f, "No provider matched the completion context")
            }
            RequestError::LateCallback { context, provider } => write!(
                f,
                "Ignored proposals from provider {provider} for stale context {context}"
            ),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for CompletionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompletionError::Io(e) => Some(e),
            _ => None,
        }
    }
}
impl std::error::Error for RegistryError {}
impl std::error::Error for RequestError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to CompletionError ========================= */

impl From<io::Error> for CompletionError {
    fn from(err: io::Error) -> Self {
        CompletionError::Io(err)
    }
}

impl From<RegistryError> for CompletionError {
    fn from(err: RegistryError) -> Self {
        CompletionError::Registry(err)
    }
}

impl From<RequestError> for CompletionError {
    fn from(err: RequestError) -> Self {
        CompletionError::Request(err)
    }
}

impl From<ConfigError> for CompletionError {
    fn from(err: ConfigError) -> Self {
        CompletionError::Config(err)
    }
}

impl From<toml::de::Error> for CompletionError {
    fn from(err: toml::de::Error) -> Self {
        CompletionError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<toml::ser::Error> for CompletionError {
    fn from(err: toml::ser::Error) -> Self {
        CompletionError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<String> for CompletionError {
    fn from(msg: String) -> Self {
        CompletionError::Generic(msg)
    }
}

impl From<&str> for CompletionError {
    fn from(msg: &str) -> Self {
        CompletionError::Generic(msg.to_owned())
    }
}

impl CompletionError {
    /// Whether this error only means "nothing to show".
    ///
    /// Hosts typically ignore these: the popup simply does not appear.
    pub fn is_nothing_to_show(&self) -> bool {
        matches!(
            self,
            CompletionError::Request(RequestError::NoProviders | RequestError::NoMatchingProviders)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_display() {
        let err = CompletionError::from(RequestError::NoProviders);
        assert_eq!(err.to_string(), "No completion available");
        assert!(err.is_nothing_to_show());
    }

    #[test]
    fn test_registry_error_display() {
        let err = CompletionError::from(RegistryError::ProviderAlreadyRegistered(
            "Words".to_string(),
        ));
        assert_eq!(
            err.to_string(),
            "Registry error: Provider 'Words' is already bound to this completion"
        );
        assert!(!err.is_nothing_to_show());
    }

    #[test]
    fn test_config_error_from_toml() {
        let parsed: std::result::Result<toml::Value, _> = toml::from_str("[completion");
        let err = CompletionError::from(parsed.unwrap_err());
        assert!(matches!(err, CompletionError::Config(ConfigError::InvalidFormat(_))));
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error;

        let err = CompletionError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(err.source().is_some());
    }
}
