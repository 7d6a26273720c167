//! Governance Engine - 治理策略推导引擎与语义ID插件注册表
//!
//! 核心设计原则：
//! - 输入数据有问题时降级为"无匹配"，不报错
//! - 组合展开必须有上限，超限是唯一的硬错误
//! - 注册表在组装根构建一次，显式传递，没有全局单例
//! - 相同输入永远得到相同输出
//!
//! # 示例
//!
//! ```rust
//! use governance_engine::core::derivation::derive_policies_default;
//! use governance_engine::core::models::{Constraint, GovernanceConfig, GovernancePolicy, Rule, RuleSet};
//!
//! let configs = vec![GovernanceConfig {
//!     semantic_id: None,
//!     policies: vec![GovernancePolicy {
//!         strict: true,
//!         permission: RuleSet::One(Rule::new(
//!             "use",
//!             vec![
//!                 Constraint::new("purpose", "eq", "R&D"),
//!                 Constraint::new("membership", "eq", "active"),
//!             ],
//!         )),
//!         ..Default::default()
//!     }],
//! }];
//!
//! let docs = derive_policies_default(&configs, None).unwrap();
//! assert_eq!(docs.len(), 1);
//! ```

pub mod core;
pub mod storage;

pub use crate::core::addon_registry::{AddonRegistry, MatchStrategy, NameCollation};
pub use crate::core::derivation::{derive_policies, derive_policies_default, DerivationOptions, PolicyDeriver};
pub use crate::core::error::{GovernanceError, RegistryError};
pub use crate::core::models::{AddonDescriptor, GovernanceConfig, PolicyDocument};
pub use crate::core::semantic_id::SemanticIdentifier;
