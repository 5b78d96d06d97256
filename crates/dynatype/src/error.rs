// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for type definition, resolution and member dispatch.

use std::fmt;
use thiserror::Error;

/// Category of a [`TypeSystemError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed definition input (unknown member kind, bad composition list).
    Configuration,
    /// A declared type conflicts with the one the engine requires.
    TypeMismatch,
    /// A name could not be resolved through the registry.
    NotFound,
    /// A member was used before the state it depends on was set up.
    Initialization,
    /// An abstract operation was invoked.
    NotImplemented,
    /// The operation is not valid for the target member or type.
    InvalidOperation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Configuration => "ConfigurationError",
            ErrorKind::TypeMismatch => "TypeError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Initialization => "InitializationError",
            ErrorKind::NotImplemented => "NotImplementedError",
            ErrorKind::InvalidOperation => "InvalidOperation",
        };
        f.write_str(s)
    }
}

/// Errors raised by the type system.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeSystemError {
    #[error("configuration error: {message}{}", ctx(.context))]
    Configuration {
        message: String,
        context: Option<String>,
    },

    #[error("type mismatch: {message}{}", ctx(.context))]
    TypeMismatch {
        message: String,
        context: Option<String>,
    },

    #[error("not found: {message}{}", ctx(.context))]
    NotFound {
        message: String,
        context: Option<String>,
    },

    #[error("not initialized: {message}{}", ctx(.context))]
    Initialization {
        message: String,
        context: Option<String>,
    },

    #[error("not implemented: {message}{}", ctx(.context))]
    NotImplemented {
        message: String,
        context: Option<String>,
    },

    #[error("invalid operation: {message}{}", ctx(.context))]
    InvalidOperation {
        message: String,
        context: Option<String>,
    },
}

fn ctx(context: &Option<String>) -> String {
    match context {
        Some(c) => format!(" ({})", c),
        None => String::new(),
    }
}

impl TypeSystemError {
    /// Single entry point used by every component to build an error.
    pub fn raise(kind: ErrorKind, message: impl Into<String>, context: Option<String>) -> Self {
        let message = message.into();
        log::debug!("[error] {}: {}", kind, message);
        match kind {
            ErrorKind::Configuration => Self::Configuration { message, context },
            ErrorKind::TypeMismatch => Self::TypeMismatch { message, context },
            ErrorKind::NotFound => Self::NotFound { message, context },
            ErrorKind::Initialization => Self::Initialization { message, context },
            ErrorKind::NotImplemented => Self::NotImplemented { message, context },
            ErrorKind::InvalidOperation => Self::InvalidOperation { message, context },
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::raise(ErrorKind::Configuration, message, None)
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::raise(ErrorKind::TypeMismatch, message, None)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::raise(ErrorKind::NotFound, message, None)
    }

    pub fn initialization(message: impl Into<String>) -> Self {
        Self::raise(ErrorKind::Initialization, message, None)
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::raise(ErrorKind::NotImplemented, message, None)
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::raise(ErrorKind::InvalidOperation, message, None)
    }

    /// Attach (or replace) the context string.
    #[must_use]
    pub fn with_context(mut self, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match &mut self {
            Self::Configuration { context, .. }
            | Self::TypeMismatch { context, .. }
            | Self::NotFound { context, .. }
            | Self::Initialization { context, .. }
            | Self::NotImplemented { context, .. }
            | Self::InvalidOperation { context, .. } => *context = value,
        }
        self
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Initialization { .. } => ErrorKind::Initialization,
            Self::NotImplemented { .. } => ErrorKind::NotImplemented,
            Self::InvalidOperation { .. } => ErrorKind::InvalidOperation,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Configuration { message, .. }
            | Self::TypeMismatch { message, .. }
            | Self::NotFound { message, .. }
            | Self::Initialization { message, .. }
            | Self::NotImplemented { message, .. }
            | Self::InvalidOperation { message, .. } => message,
        }
    }

    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Configuration { context, .. }
            | Self::TypeMismatch { context, .. }
            | Self::NotFound { context, .. }
            | Self::Initialization { context, .. }
            | Self::NotImplemented { context, .. }
            | Self::InvalidOperation { context, .. } => context.as_deref(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TypeSystemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_maps_kind_to_variant() {
        let err = TypeSystemError::raise(ErrorKind::NotFound, "App.Missing", None);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), "App.Missing");
        assert!(err.context().is_none());
    }

    #[test]
    fn display_includes_context() {
        let err = TypeSystemError::configuration("Unknown member type: field,age")
            .with_context("App.Person");
        assert_eq!(
            err.to_string(),
            "configuration error: Unknown member type: field,age (App.Person)"
        );
    }

    #[test]
    fn kind_display_names() {
        assert_eq!(ErrorKind::TypeMismatch.to_string(), "TypeError");
        assert_eq!(ErrorKind::Initialization.to_string(), "InitializationError");
    }
}
