use thiserror::Error;

#[derive(Error, Debug)]
pub enum OperatorError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Workload management layer unreachable: {message}")]
    Unreachable { message: String },

    #[error("Workload operation failed: {message}")]
    WorkloadError { message: String },

    #[error("Relation {relation} (id {id}) not created yet")]
    NotYetEstablished { relation: String, id: u32 },

    #[error("Template '{template}' could not be rendered: {message}")]
    TemplateError { template: String, message: String },

    #[error("Relation store error: {message}")]
    RelationStoreError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Workload,
    Relation,
    Rendering,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl OperatorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            OperatorError::ConfigError { .. }
            | OperatorError::ConfigValidationError { .. }
            | OperatorError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            OperatorError::Unreachable { .. } | OperatorError::WorkloadError { .. } => {
                ErrorCategory::Workload
            }
            OperatorError::NotYetEstablished { .. } | OperatorError::RelationStoreError { .. } => {
                ErrorCategory::Relation
            }
            OperatorError::TemplateError { .. } => ErrorCategory::Rendering,
            OperatorError::IoError(_) | OperatorError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            OperatorError::Unreachable { .. } => ErrorSeverity::Medium,
            OperatorError::ConfigError { .. }
            | OperatorError::ConfigValidationError { .. }
            | OperatorError::InvalidConfigValueError { .. }
            | OperatorError::NotYetEstablished { .. }
            | OperatorError::TemplateError { .. }
            | OperatorError::WorkloadError { .. } => ErrorSeverity::High,
            OperatorError::IoError(_)
            | OperatorError::SerializationError(_)
            | OperatorError::RelationStoreError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Whether the trigger that produced this error may simply be delivered again later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, OperatorError::Unreachable { .. })
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the operator configuration file and its values",
            ErrorCategory::Workload => {
                "Check the workload container; deferred triggers are redelivered once it is reachable"
            }
            ErrorCategory::Relation => {
                "Make sure the relation exists before publishing data to it"
            }
            ErrorCategory::Rendering => "Check the template directory and template variables",
            ErrorCategory::System => "Check file permissions and the state directory contents",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            OperatorError::NotYetEstablished { relation, id } => {
                format!("Cannot publish to relation '{}' (id {}): it does not exist", relation, id)
            }
            OperatorError::Unreachable { .. } => {
                "The workload container is not reachable yet".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OperatorError>;
