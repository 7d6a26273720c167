//! 插件解析注册表
//!
//! 负责插件描述符的注册、按语义ID匹配和优先级排序。
//! 注册表在应用组装时构建一次，之后以引用形式共享给所有使用方，不存在全局单例。

use crate::core::error::RegistryError;
use crate::core::models::{AddonDescriptor, CustomMatcher, SemanticVersion, VersionRange};
use crate::core::semantic_id::SemanticIdentifier;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// 匹配策略
///
/// 注册时根据描述符显式确定，便于检查和测试。
#[derive(Debug, Clone)]
pub enum MatchStrategy {
    /// 命名空间、名称、版本三者完全一致
    Exact {
        namespace: String,
        name: String,
        version: SemanticVersion,
    },
    /// 命名空间、名称一致，版本落在范围内
    Range {
        namespace: String,
        name: String,
        range: VersionRange,
    },
    /// 调用方注入的匹配函数
    Custom(CustomMatcher),
}

impl MatchStrategy {
    /// 根据描述符确定匹配策略：自定义函数优先，其次按版本范围类型区分
    pub fn for_descriptor(descriptor: &AddonDescriptor) -> Self {
        if let Some(ref matcher) = descriptor.matcher {
            return MatchStrategy::Custom(matcher.clone());
        }

        match descriptor.version_range {
            VersionRange::Exact(version) => MatchStrategy::Exact {
                namespace: descriptor.namespace.clone(),
                name: descriptor.name.clone(),
                version,
            },
            range => MatchStrategy::Range {
                namespace: descriptor.namespace.clone(),
                name: descriptor.name.clone(),
                range,
            },
        }
    }

    /// 检查语义ID是否被此策略接受
    pub fn matches(&self, id: &SemanticIdentifier) -> bool {
        match self {
            MatchStrategy::Exact {
                namespace,
                name,
                version,
            } => id.namespace() == namespace && id.name() == name && id.version() == *version,
            MatchStrategy::Range {
                namespace,
                name,
                range,
            } => id.namespace() == namespace && id.name() == name && range.contains(&id.version()),
            MatchStrategy::Custom(matcher) => matcher.matches(id),
        }
    }
}

/// 显示名称排序规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameCollation {
    /// 按字节比较，大写字母排在小写之前
    #[default]
    CaseSensitive,
    CaseInsensitive,
}

impl NameCollation {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            NameCollation::CaseSensitive => a.cmp(b),
            NameCollation::CaseInsensitive => a.to_lowercase().cmp(&b.to_lowercase()),
        }
    }
}

#[derive(Debug)]
struct RegisteredAddon {
    descriptor: AddonDescriptor,
    strategy: MatchStrategy,
}

/// 插件注册表
///
/// 注册需要 `&mut self`，查询只需 `&self`：组装阶段单写，之后多读。
#[derive(Debug, Default)]
pub struct AddonRegistry {
    /// 按注册顺序保存，下标即注册序号
    addons: Vec<RegisteredAddon>,
    /// ID -> 下标
    index: HashMap<String, usize>,
    collation: NameCollation,
}

impl AddonRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定显示名称排序规则
    pub fn with_collation(mut self, collation: NameCollation) -> Self {
        self.collation = collation;
        self
    }

    /// 注册插件
    ///
    /// 注册表只追加不修改，重复的ID会被拒绝。
    pub fn register(&mut self, descriptor: AddonDescriptor) -> Result<(), RegistryError> {
        if self.index.contains_key(&descriptor.id) {
            return Err(RegistryError::DuplicateAddon(descriptor.id));
        }

        let strategy = MatchStrategy::for_descriptor(&descriptor);
        tracing::info!(
            "注册插件: {} ({}), 优先级 {}",
            descriptor.id,
            descriptor.display_name,
            descriptor.priority
        );

        self.index.insert(descriptor.id.clone(), self.addons.len());
        self.addons.push(RegisteredAddon {
            descriptor,
            strategy,
        });
        Ok(())
    }

    /// 批量注册
    pub fn register_all(
        &mut self,
        descriptors: impl IntoIterator<Item = AddonDescriptor>,
    ) -> Result<(), RegistryError> {
        for descriptor in descriptors {
            self.register(descriptor)?;
        }
        Ok(())
    }

    /// 按ID获取插件
    pub fn get(&self, id: &str) -> Option<&AddonDescriptor> {
        self.index.get(id).map(|&i| &self.addons[i].descriptor)
    }

    /// 获取插件的匹配策略
    pub fn strategy(&self, id: &str) -> Option<&MatchStrategy> {
        self.index.get(id).map(|&i| &self.addons[i].strategy)
    }

    pub fn len(&self) -> usize {
        self.addons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addons.is_empty()
    }

    /// 解析原始语义ID，返回最佳匹配的插件
    ///
    /// 解析失败或没有匹配时返回 None。优先级相同时先注册的胜出。
    pub fn resolve(&self, raw_id: &str) -> Option<&AddonDescriptor> {
        let Some(id) = SemanticIdentifier::parse(raw_id) else {
            tracing::debug!("无法解析语义ID: {}", raw_id);
            return None;
        };

        let mut best: Option<&AddonDescriptor> = None;
        for addon in self.addons.iter().filter(|a| a.strategy.matches(&id)) {
            // 只有严格更高的优先级才替换，保证先注册者胜出
            if best.map_or(true, |b| addon.descriptor.priority > b.priority) {
                best = Some(&addon.descriptor);
            }
        }

        match best {
            Some(addon) => tracing::debug!("语义ID {} 解析到插件 {}", raw_id, addon.id),
            None => tracing::debug!("语义ID {} 没有匹配的插件", raw_id),
        }
        best
    }

    /// 列出所有兼容的插件，按优先级降序，同优先级保持注册顺序
    pub fn list_compatible(&self, id: &SemanticIdentifier) -> Vec<&AddonDescriptor> {
        let mut compatible: Vec<&AddonDescriptor> = self
            .addons
            .iter()
            .filter(|a| a.strategy.matches(id))
            .map(|a| &a.descriptor)
            .collect();

        // sort_by 是稳定排序
        compatible.sort_by(|a, b| b.priority.cmp(&a.priority));
        compatible
    }

    /// 列出所有插件，按显示名称升序
    pub fn list_all(&self) -> Vec<&AddonDescriptor> {
        let mut all: Vec<&AddonDescriptor> = self.addons.iter().map(|a| &a.descriptor).collect();
        all.sort_by(|a, b| self.collation.compare(&a.display_name, &b.display_name));
        all
    }
}
