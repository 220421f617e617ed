//! 配置存储服务

use std::fs;
use std::path::Path;

use crate::core::models::{ConfigError, GatewayConfig};

/// 配置存储服务
pub struct ConfigStorage;

impl ConfigStorage {
    /// 加载网关配置; missing fields fall back to defaults
    pub fn load(path: &Path) -> Result<GatewayConfig, ConfigError> {
        let display = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// 保存网关配置
    pub fn save(path: &Path, config: &GatewayConfig) -> Result<(), ConfigError> {
        let display = path.display().to_string();
        let io_err = |source| ConfigError::Read {
            path: display.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let content = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Parse {
            path: display.clone(),
            source,
        })?;

        // 原子写入：先写入临时文件，再重命名
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &content).map_err(io_err)?;
        fs::rename(&temp_path, path).map_err(io_err)?;

        Ok(())
    }
}
