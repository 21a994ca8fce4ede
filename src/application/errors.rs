// Use-case level errors
use crate::application::telemetry_repository::RepositoryError;
use crate::domain::frequency::FrequencyVariant;
use crate::domain::monitor::MonitorId;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("monitor {0} not found")]
    MonitorNotFound(MonitorId),
    #[error("no monitor configured for {0}")]
    NoMonitorForVariant(FrequencyVariant),
    #[error("Please enter PLC IP address")]
    MissingPlcAddress,
    #[error("failed to encode tick payload: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    /// Whether the error stems from missing or conflicting configuration
    /// rather than a failure of the service itself
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ServiceError::MonitorNotFound(_)
                | ServiceError::NoMonitorForVariant(_)
                | ServiceError::MissingPlcAddress
                | ServiceError::Repository(RepositoryError::DuplicateVariant(_))
                | ServiceError::Repository(RepositoryError::MonitorNotFound(_))
        )
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
