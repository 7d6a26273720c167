//! 配置文件管理模块
//!
//! 治理配置、插件清单、推导参数都放在同一个 JSON 配置文件里。

use crate::core::addon_registry::{AddonRegistry, NameCollation};
use crate::core::derivation::DerivationOptions;
use crate::core::models::{AddonDescriptor, GovernanceConfig};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 注册表设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// list_all 使用的显示名称排序规则
    pub name_collation: NameCollation,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 治理配置列表（有序）
    pub governance: Vec<GovernanceConfig>,
    /// 插件清单（自定义匹配函数只能在代码中注入）
    pub addons: Vec<AddonDescriptor>,
    /// 推导参数
    pub derivation: DerivationOptions,
    pub registry: RegistrySettings,
}

impl AppConfig {
    /// 根据配置组装插件注册表
    pub fn build_registry(&self) -> Result<AddonRegistry> {
        let mut registry = AddonRegistry::new().with_collation(self.registry.name_collation);
        registry.register_all(self.addons.iter().cloned())?;
        Ok(registry)
    }
}

/// 配置管理器
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// 创建配置管理器
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// 获取默认配置路径
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "governance", "GovernanceEngine")
            .map(|d| d.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    }

    pub fn path(&self) -> &PathBuf {
        &self.config_path
    }

    /// 加载配置，文件不存在时返回默认配置
    pub fn load(&self) -> Result<AppConfig> {
        if self.config_path.exists() {
            let content = std::fs::read_to_string(&self.config_path)?;
            let config: AppConfig = serde_json::from_str(&content)?;
            tracing::info!(
                "已加载配置: {} ({} 个治理配置, {} 个插件)",
                self.config_path.display(),
                config.governance.len(),
                config.addons.len()
            );
            Ok(config)
        } else {
            tracing::warn!("配置文件不存在，使用默认配置: {}", self.config_path.display());
            Ok(AppConfig::default())
        }
    }

    /// 保存配置
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        // 确保目录存在
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }

    /// 重置为默认配置
    pub fn reset(&self) -> Result<()> {
        self.save(&AppConfig::default())
    }

    /// 初始化配置文件
    ///
    /// 文件已存在且未指定 force 时不覆盖。返回是否写入了文件。
    pub fn init(&self, force: bool) -> Result<bool> {
        if self.config_path.exists() && !force {
            tracing::warn!("配置文件已存在，跳过初始化: {}", self.config_path.display());
            return Ok(false);
        }

        self.reset()?;
        tracing::info!("已写入默认配置: {}", self.config_path.display());
        Ok(true)
    }
}
