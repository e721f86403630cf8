//! Cart persistence backends
//!
//! The browser-storage analogue: a single JSON blob keyed by the claroche
//! namespace. Backends are intentionally dumb — the store layers its own
//! fallback behavior on top.

use std::path::PathBuf;

use parking_lot::Mutex;

use crate::errors::{ClarocheError, Result};

/// 快照持久化后端
pub trait CartPersistence: Send + Sync {
    /// 读取原始 JSON；不存在返回 None
    fn load(&self) -> Result<Option<String>>;
    /// 写入原始 JSON
    fn store(&self, payload: &str) -> Result<()>;
}

/// JSON 文件持久化（localStorage 的进程端替身）
pub struct JsonFileCart {
    path: PathBuf,
}

impl JsonFileCart {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CartPersistence for JsonFileCart {
    fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClarocheError::file_operation(format!(
                "读取购物车快照失败 {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn store(&self, payload: &str) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                ClarocheError::file_operation(format!("创建购物车目录失败: {}", e))
            })?;
        }

        std::fs::write(&self.path, payload).map_err(|e| {
            ClarocheError::file_operation(format!(
                "写入购物车快照失败 {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// 纯内存持久化（测试与无盘环境）
#[derive(Default)]
pub struct MemoryCart {
    data: Mutex<Option<String>>,
}

impl MemoryCart {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartPersistence for MemoryCart {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.data.lock().clone())
    }

    fn store(&self, payload: &str) -> Result<()> {
        *self.data.lock() = Some(payload.to_string());
        Ok(())
    }
}
