use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum ClarocheError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
    TrackerInvalidCode(String),
    TrackerCodeExists(String),
    RateLimited(String),
}

impl ClarocheError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ClarocheError::DatabaseConfig(_) => "E001",
            ClarocheError::DatabaseConnection(_) => "E002",
            ClarocheError::DatabaseOperation(_) => "E003",
            ClarocheError::FileOperation(_) => "E004",
            ClarocheError::Validation(_) => "E005",
            ClarocheError::NotFound(_) => "E006",
            ClarocheError::Serialization(_) => "E007",
            ClarocheError::TrackerInvalidCode(_) => "E008",
            ClarocheError::TrackerCodeExists(_) => "E009",
            ClarocheError::RateLimited(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ClarocheError::DatabaseConfig(_) => "Database Configuration Error",
            ClarocheError::DatabaseConnection(_) => "Database Connection Error",
            ClarocheError::DatabaseOperation(_) => "Database Operation Error",
            ClarocheError::FileOperation(_) => "File Operation Error",
            ClarocheError::Validation(_) => "Validation Error",
            ClarocheError::NotFound(_) => "Resource Not Found",
            ClarocheError::Serialization(_) => "Serialization Error",
            ClarocheError::TrackerInvalidCode(_) => "Invalid Tracker Code",
            ClarocheError::TrackerCodeExists(_) => "Tracker Code Exists",
            ClarocheError::RateLimited(_) => "Rate Limited",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            ClarocheError::DatabaseConfig(msg)
            | ClarocheError::DatabaseConnection(msg)
            | ClarocheError::DatabaseOperation(msg)
            | ClarocheError::FileOperation(msg)
            | ClarocheError::Validation(msg)
            | ClarocheError::NotFound(msg)
            | ClarocheError::Serialization(msg)
            | ClarocheError::TrackerInvalidCode(msg)
            | ClarocheError::TrackerCodeExists(msg)
            | ClarocheError::RateLimited(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码（用于 API 层统一转换）
    pub fn http_status(&self) -> StatusCode {
        match self {
            ClarocheError::Validation(_) | ClarocheError::TrackerInvalidCode(_) => {
                StatusCode::BAD_REQUEST
            }
            ClarocheError::NotFound(_) => StatusCode::NOT_FOUND,
            ClarocheError::TrackerCodeExists(_) => StatusCode::CONFLICT,
            ClarocheError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式启动失败）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ClarocheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ClarocheError {}

// 便捷的构造函数
impl ClarocheError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        ClarocheError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        ClarocheError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        ClarocheError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        ClarocheError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        ClarocheError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ClarocheError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ClarocheError::Serialization(msg.into())
    }

    pub fn tracker_invalid_code<T: Into<String>>(msg: T) -> Self {
        ClarocheError::TrackerInvalidCode(msg.into())
    }

    pub fn tracker_code_exists<T: Into<String>>(msg: T) -> Self {
        ClarocheError::TrackerCodeExists(msg.into())
    }

    pub fn rate_limited<T: Into<String>>(msg: T) -> Self {
        ClarocheError::RateLimited(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for ClarocheError {
    fn from(err: sea_orm::DbErr) -> Self {
        ClarocheError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for ClarocheError {
    fn from(err: std::io::Error) -> Self {
        ClarocheError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ClarocheError {
    fn from(err: serde_json::Error) -> Self {
        ClarocheError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClarocheError>;
