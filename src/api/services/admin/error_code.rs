//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};
use ts_rs::TS;

use super::types::TS_EXPORT_PATH;

use crate::errors::ClarocheError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，ts-rs 自动生成 TypeScript 类型。
/// 按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 认证错误
/// - 3000-3099: 追踪链接错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[ts(rename = "ErrorCode")]
#[ts(repr(enum))]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,
    RateLimitExceeded = 1010,

    // 追踪链接错误 3000-3099
    TrackerNotFound = 3000,
    TrackerCodeExists = 3001,
    TrackerInvalidCode = 3002,
    TrackerDatabaseError = 3005,
}

impl From<ClarocheError> for ErrorCode {
    fn from(err: ClarocheError) -> Self {
        match err {
            ClarocheError::Validation(_) => ErrorCode::BadRequest,
            ClarocheError::NotFound(_) => ErrorCode::NotFound,
            ClarocheError::TrackerInvalidCode(_) => ErrorCode::TrackerInvalidCode,
            ClarocheError::TrackerCodeExists(_) => ErrorCode::TrackerCodeExists,
            ClarocheError::RateLimited(_) => ErrorCode::RateLimitExceeded,
            ClarocheError::DatabaseConfig(_)
            | ClarocheError::DatabaseConnection(_)
            | ClarocheError::DatabaseOperation(_) => ErrorCode::TrackerDatabaseError,
            _ => ErrorCode::InternalServerError,
        }
    }
}
