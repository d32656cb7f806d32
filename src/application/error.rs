//! 应用层错误定义
//!
//! 统一的命令/查询错误类型。守卫拒绝不是错误，见 `ActionOutcome`。

use thiserror::Error;

use crate::application::ports::SessionError;
use crate::domain::session::SampleError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<SessionError> for ApplicationError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(id) => Self::not_found("Session", id),
            SessionError::AlreadyExists(id) => {
                Self::internal(format!("Session already exists: {}", id))
            }
        }
    }
}

impl From<SampleError> for ApplicationError {
    fn from(err: SampleError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::SessionId;

    #[test]
    fn test_session_not_found_maps_to_not_found() {
        let id = SessionId::new();
        let err: ApplicationError = SessionError::NotFound(id.clone()).into();
        assert_eq!(err.to_string(), format!("Session not found: {}", id));
    }

    #[test]
    fn test_sample_error_maps_to_validation() {
        let err: ApplicationError = SampleError::EmptyContent.into();
        assert!(matches!(err, ApplicationError::ValidationError(_)));
    }
}
