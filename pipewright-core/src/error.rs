//! Error types for Pipewright.
//!
//! Every error carries a stable code (`E1xx` validation, `E2xx` not found,
//! `E3xx` conflict, `E4xx` auth, `E5xx` execution, `E8xx` configuration,
//! `E9xx` I/O) and maps onto one [`StatusKind`], which the API layer turns into
//! an HTTP status and a gRPC-style status code.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Pipewright operations.
#[derive(Error, Debug)]
pub enum PipewrightError {
    // =========================================================================
    // Validation Errors (E100-E199)
    // =========================================================================
    /// A resource id violates the naming rules.
    #[error("E101: Invalid {kind} id '{id}': {cause}")]
    InvalidId {
        /// Kind of resource being named (e.g. "pipeline").
        kind: &'static str,
        /// The rejected id.
        id: String,
        /// The rule that was violated.
        cause: String,
    },

    /// A required field is missing from the request.
    #[error("E102: Missing required field '{field}'")]
    MissingField {
        /// The missing field.
        field: String,
    },

    /// A reference expression is malformed.
    #[error("E103: Invalid reference syntax '{reference}': {cause}")]
    ReferenceSyntax {
        /// The malformed reference.
        reference: String,
        /// Description of the syntax error.
        cause: String,
    },

    /// A reference points at nothing.
    #[error("E104: Reference '{reference}' in component '{component_id}' cannot be resolved: {cause}")]
    UnresolvedReference {
        /// The reference that failed to resolve.
        reference: String,
        /// Component (or output field) holding the reference.
        component_id: String,
        /// Why resolution failed.
        cause: String,
    },

    /// The recipe is structurally invalid.
    #[error("E105: Invalid recipe: {cause}")]
    InvalidRecipe {
        /// Description of the problem.
        cause: String,
    },

    /// An update tried to change an immutable field.
    #[error("E106: Field '{field}' is immutable")]
    ImmutableField {
        /// The immutable field.
        field: String,
    },

    /// A field mask path is invalid.
    #[error("E107: Invalid update mask path '{path}': {cause}")]
    InvalidFieldMask {
        /// The offending path.
        path: String,
        /// Why it is invalid.
        cause: String,
    },

    /// A list filter could not be parsed or applied.
    #[error("E108: Invalid filter '{filter}': {cause}")]
    InvalidFilter {
        /// The filter expression.
        filter: String,
        /// Description of the problem.
        cause: String,
    },

    /// A page token is malformed.
    #[error("E109: Invalid page token '{token}'")]
    InvalidPageToken {
        /// The rejected token.
        token: String,
    },

    /// Generic invalid request argument.
    #[error("E110: Invalid argument '{field}': {cause}")]
    InvalidArgument {
        /// The argument name.
        field: String,
        /// Description of the problem.
        cause: String,
    },

    /// Trigger input does not match the pipeline's declared variables.
    #[error("E111: Invalid trigger input: {cause}")]
    InvalidInput {
        /// Description of the mismatch.
        cause: String,
    },

    /// Components reference each other in a cycle.
    #[error("E112: Dependency cycle between components: {components:?}")]
    DependencyCycle {
        /// Components involved in the cycle.
        components: Vec<String>,
    },

    // =========================================================================
    // Not Found Errors (E200-E299)
    // =========================================================================
    /// Pipeline not found.
    #[error("E201: Pipeline '{name}' not found")]
    PipelineNotFound {
        /// Resource name or uid that was looked up.
        name: String,
    },

    /// Connection not found.
    #[error("E202: Connection '{name}' not found")]
    ConnectionNotFound {
        /// Resource name that was looked up.
        name: String,
    },

    /// Component or operator definition not found.
    #[error("E203: Definition '{id}' not found")]
    DefinitionNotFound {
        /// Definition id.
        id: String,
    },

    /// Integration not found.
    #[error("E204: Integration '{id}' not found")]
    IntegrationNotFound {
        /// Integration id.
        id: String,
    },

    /// Pipeline run not found.
    #[error("E205: Pipeline run '{uid}' not found")]
    RunNotFound {
        /// Run uid.
        uid: String,
    },

    /// Long-running operation not found.
    #[error("E206: Operation '{name}' not found")]
    OperationNotFound {
        /// Operation name.
        name: String,
    },

    // =========================================================================
    // Conflict Errors (E300-E399)
    // =========================================================================
    /// A resource with the same id already exists in the namespace.
    #[error("E301: {kind} '{name}' already exists")]
    AlreadyExists {
        /// Kind of resource (e.g. "Pipeline").
        kind: &'static str,
        /// Full resource name.
        name: String,
    },

    // =========================================================================
    // Auth Errors (E400-E499)
    // =========================================================================
    /// The caller could not be authenticated.
    #[error("E401: Authentication failed: {cause}")]
    AuthenticationFailed {
        /// Reason for the failure.
        cause: String,
    },

    /// The caller is authenticated but not allowed to perform the operation.
    #[error("E402: Permission denied for '{identity}': {cause}")]
    AuthorizationDenied {
        /// The authenticated identity.
        identity: String,
        /// Reason for the denial.
        cause: String,
    },

    // =========================================================================
    // Execution Errors (E500-E599)
    // =========================================================================
    /// A component failed while executing.
    #[error("E501: Component '{component_id}' failed: {cause}")]
    ComponentExecution {
        /// The failing component.
        component_id: String,
        /// Reason for the failure.
        cause: String,
    },

    /// No executor is available for a catalog component.
    #[error("E502: No executor available for component type '{component_type}'")]
    ExecutorUnavailable {
        /// The component type.
        component_type: String,
    },

    /// Execution exceeded the configured trigger timeout.
    #[error("E503: Pipeline '{pipeline}' timed out after {timeout_ms}ms")]
    ExecutionTimeout {
        /// Pipeline name.
        pipeline: String,
        /// Timeout in milliseconds.
        timeout_ms: u64,
    },

    // =========================================================================
    // Configuration Errors (E800-E899)
    // =========================================================================
    /// YAML parsing failed.
    #[error("E801: Failed to parse YAML{}: {cause}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    YamlParse {
        /// Source file, if any.
        path: Option<PathBuf>,
        /// Parser message.
        cause: String,
    },

    /// Invalid configuration value.
    #[error("E802: Invalid configuration value for '{field}': {cause}")]
    ConfigValue {
        /// The configuration field.
        field: String,
        /// Description of the problem.
        cause: String,
    },

    /// JSON serialization failed.
    #[error("E804: Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // =========================================================================
    // I/O Errors (E900-E999)
    // =========================================================================
    /// I/O failure.
    #[error("E901: I/O error at {path}: {cause}")]
    Io {
        /// Path or address involved.
        path: PathBuf,
        /// Reason for the failure.
        cause: String,
    },

    /// Network failure.
    #[error("E902: Network error: {cause}")]
    Network {
        /// Reason for the failure.
        cause: String,
    },
}

/// Transport-independent status classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// Request is malformed or fails validation.
    InvalidArgument,
    /// Addressed resource does not exist.
    NotFound,
    /// Resource id collides with an existing resource.
    AlreadyExists,
    /// Caller identity is missing or unknown.
    Unauthenticated,
    /// Caller identity lacks access.
    PermissionDenied,
    /// Operation exceeded its deadline.
    DeadlineExceeded,
    /// A dependency is unavailable.
    Unavailable,
    /// Anything else.
    Internal,
}

impl StatusKind {
    /// gRPC status code number.
    pub fn grpc_code(self) -> u16 {
        match self {
            Self::InvalidArgument => 3,
            Self::DeadlineExceeded => 4,
            Self::NotFound => 5,
            Self::AlreadyExists => 6,
            Self::PermissionDenied => 7,
            Self::Internal => 13,
            Self::Unavailable => 14,
            Self::Unauthenticated => 16,
        }
    }

    /// HTTP status code number.
    pub fn http_status(self) -> u16 {
        match self {
            Self::InvalidArgument => 400,
            Self::Unauthenticated => 401,
            Self::PermissionDenied => 403,
            Self::NotFound => 404,
            Self::AlreadyExists => 409,
            Self::Internal => 500,
            Self::Unavailable => 503,
            Self::DeadlineExceeded => 504,
        }
    }
}

impl PipewrightError {
    /// Get the error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId { .. } => "E101",
            Self::MissingField { .. } => "E102",
            Self::ReferenceSyntax { .. } => "E103",
            Self::UnresolvedReference { .. } => "E104",
            Self::InvalidRecipe { .. } => "E105",
            Self::ImmutableField { .. } => "E106",
            Self::InvalidFieldMask { .. } => "E107",
            Self::InvalidFilter { .. } => "E108",
            Self::InvalidPageToken { .. } => "E109",
            Self::InvalidArgument { .. } => "E110",
            Self::InvalidInput { .. } => "E111",
            Self::DependencyCycle { .. } => "E112",
            Self::PipelineNotFound { .. } => "E201",
            Self::ConnectionNotFound { .. } => "E202",
            Self::DefinitionNotFound { .. } => "E203",
            Self::IntegrationNotFound { .. } => "E204",
            Self::RunNotFound { .. } => "E205",
            Self::OperationNotFound { .. } => "E206",
            Self::AlreadyExists { .. } => "E301",
            Self::AuthenticationFailed { .. } => "E401",
            Self::AuthorizationDenied { .. } => "E402",
            Self::ComponentExecution { .. } => "E501",
            Self::ExecutorUnavailable { .. } => "E502",
            Self::ExecutionTimeout { .. } => "E503",
            Self::YamlParse { .. } => "E801",
            Self::ConfigValue { .. } => "E802",
            Self::Serialization(_) => "E804",
            Self::Io { .. } => "E901",
            Self::Network { .. } => "E902",
        }
    }

    /// Classify the error for transport mapping.
    #[must_use]
    pub fn status_kind(&self) -> StatusKind {
        match self {
            Self::InvalidId { .. }
            | Self::MissingField { .. }
            | Self::ReferenceSyntax { .. }
            | Self::UnresolvedReference { .. }
            | Self::InvalidRecipe { .. }
            | Self::ImmutableField { .. }
            | Self::InvalidFieldMask { .. }
            | Self::InvalidFilter { .. }
            | Self::InvalidPageToken { .. }
            | Self::InvalidArgument { .. }
            | Self::InvalidInput { .. }
            | Self::DependencyCycle { .. }
            | Self::YamlParse { .. }
            | Self::Serialization(_) => StatusKind::InvalidArgument,

            Self::PipelineNotFound { .. }
            | Self::ConnectionNotFound { .. }
            | Self::DefinitionNotFound { .. }
            | Self::IntegrationNotFound { .. }
            | Self::RunNotFound { .. }
            | Self::OperationNotFound { .. } => StatusKind::NotFound,

            Self::AlreadyExists { .. } => StatusKind::AlreadyExists,
            Self::AuthenticationFailed { .. } => StatusKind::Unauthenticated,
            Self::AuthorizationDenied { .. } => StatusKind::PermissionDenied,
            Self::ExecutionTimeout { .. } => StatusKind::DeadlineExceeded,
            Self::ExecutorUnavailable { .. } | Self::Network { .. } => StatusKind::Unavailable,

            Self::ComponentExecution { .. } | Self::ConfigValue { .. } | Self::Io { .. } => {
                StatusKind::Internal
            }
        }
    }

    /// Check if this error is a request validation error.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.status_kind() == StatusKind::InvalidArgument
    }

    /// Message intended for end users: the display text without the code prefix.
    #[must_use]
    pub fn user_message(&self) -> String {
        let text = self.to_string();
        match text.split_once(": ") {
            Some((code, rest)) if code.starts_with('E') => rest.to_string(),
            _ => text,
        }
    }
}

/// Result type alias using `PipewrightError`.
pub type Result<T> = std::result::Result<T, PipewrightError>;
