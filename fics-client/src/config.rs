//! 客户端配置
//!
//! 保存在 `<config_dir>/fics-client/config.json`。

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fics_protocol::{NetworkConfig, DEFAULT_PROMPT, DEFAULT_SITE};
use serde::{Deserialize, Serialize};

/// 默认日志过滤指令
pub const DEFAULT_LOG_FILTER: &str = "fics_client=info,fics_protocol=info";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// 登录用户名，用于识别自己的封盘列表和对局颜色
    pub username: String,
    /// 服务器提示符
    pub prompt: String,
    /// 棋谱标签中的站点名
    pub site_name: String,
    pub network: NetworkConfig,
    /// tracing EnvFilter 指令，环境变量 RUST_LOG 优先
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            prompt: DEFAULT_PROMPT.to_string(),
            site_name: DEFAULT_SITE.to_string(),
            network: NetworkConfig::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ClientConfig {
    /// 获取配置文件路径
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("fics-client");
            path.push("config.json");
            path
        })
    }

    /// 从默认位置加载，失败时使用默认配置
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            tracing::warn!("无法获取配置目录，使用默认配置");
            return Self::default();
        };

        if !path.exists() {
            tracing::info!("配置文件不存在，使用默认配置");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("已加载配置: {:?}", path);
                config
            }
            Err(e) => {
                tracing::warn!("{:#}，使用默认配置", e);
                Self::default()
            }
        }
    }

    /// 从指定文件加载
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("配置文件格式无效: {:?}", path))
    }

    /// 保存到默认位置
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().context("无法获取配置目录")?;
        self.save_to(&path)
    }

    /// 保存到指定文件
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // 确保目录存在
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("无法创建配置目录: {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self).context("序列化配置失败")?;
        std::fs::write(path, content).with_context(|| format!("写入配置文件失败: {:?}", path))?;

        tracing::info!("配置已保存: {:?}", path);
        Ok(())
    }
}
