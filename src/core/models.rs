//! 核心数据模型定义
//!
//! 包括约束/规则模型、治理配置、输出的策略文档，以及插件描述符。
//! 策略文档的字段名即下游策略执行方消费的线上格式，不允许随意改动。

use crate::core::semantic_id::SemanticIdentifier;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// 中性占位动作，非 permission 类文档的 permission 槽位使用此动作填充
pub const NEUTRAL_ACTION: &str = "use";

/// 唯一被识别的 OR 标记（大小写不敏感）
pub const OR_MARKER: &str = "or";

/// 原子约束：左操作数、运算符、右操作数，全部是不透明字符串
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    pub left_operand: String,
    pub operator: String,
    pub right_operand: String,
}

impl Constraint {
    /// 创建新约束
    pub fn new(
        left_operand: impl Into<String>,
        operator: impl Into<String>,
        right_operand: impl Into<String>,
    ) -> Self {
        Self {
            left_operand: left_operand.into(),
            operator: operator.into(),
            right_operand: right_operand.into(),
        }
    }
}

/// 多约束之间的逻辑连接词
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalConnective {
    #[default]
    And,
    Or,
}

impl LogicalConnective {
    /// 从作者写入的标记解析连接词
    ///
    /// 只有大小写不敏感地等于 `or` 才是 OR，其余一律（包括缺省）视为 AND。
    pub fn from_marker(marker: Option<&str>) -> Self {
        match marker {
            Some(m) if m.trim().eq_ignore_ascii_case(OR_MARKER) => LogicalConnective::Or,
            _ => LogicalConnective::And,
        }
    }
}

impl fmt::Display for LogicalConnective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalConnective::And => write!(f, "and"),
            LogicalConnective::Or => write!(f, "or"),
        }
    }
}

/// 配置中的一条规则
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// 动作标识
    pub action: String,
    /// 有序约束列表
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    /// 原始连接词标记，保留作者写法
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic: Option<String>,
}

impl Rule {
    /// 创建不带连接词标记的规则（默认 AND）
    pub fn new(action: impl Into<String>, constraints: Vec<Constraint>) -> Self {
        Self {
            action: action.into(),
            constraints,
            logic: None,
        }
    }

    /// 设置连接词标记
    pub fn with_logic(mut self, logic: impl Into<String>) -> Self {
        self.logic = Some(logic.into());
        self
    }

    pub fn connective(&self) -> LogicalConnective {
        LogicalConnective::from_marker(self.logic.as_deref())
    }
}

/// 单条规则或规则列表
///
/// 配置里每个规则类别既可以写成一个对象，也可以写成数组。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSet {
    One(Rule),
    Many(Vec<Rule>),
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::Many(Vec::new())
    }
}

impl RuleSet {
    /// 规范化为规则切片，单条规则视为单元素列表
    pub fn as_slice(&self) -> &[Rule] {
        match self {
            RuleSet::One(rule) => std::slice::from_ref(rule),
            RuleSet::Many(rules) => rules,
        }
    }
}

impl From<Rule> for RuleSet {
    fn from(rule: Rule) -> Self {
        RuleSet::One(rule)
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        RuleSet::Many(rules)
    }
}

/// 规则类别，遍历顺序固定为 permission → prohibition → obligation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    Permission,
    Prohibition,
    Obligation,
}

impl RuleType {
    pub const ALL: [RuleType; 3] = [
        RuleType::Permission,
        RuleType::Prohibition,
        RuleType::Obligation,
    ];
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleType::Permission => write!(f, "permission"),
            RuleType::Prohibition => write!(f, "prohibition"),
            RuleType::Obligation => write!(f, "obligation"),
        }
    }
}

/// 一条治理策略
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GovernancePolicy {
    /// 严格模式：保持作者的约束顺序和分组，只生成一份文档
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub permission: RuleSet,
    #[serde(default)]
    pub prohibition: RuleSet,
    #[serde(default)]
    pub obligation: RuleSet,
}

impl GovernancePolicy {
    /// 按类别取出规则列表
    pub fn rules(&self, rule_type: RuleType) -> &[Rule] {
        match rule_type {
            RuleType::Permission => self.permission.as_slice(),
            RuleType::Prohibition => self.prohibition.as_slice(),
            RuleType::Obligation => self.obligation.as_slice(),
        }
    }
}

/// 治理配置：可选的语义ID键加一组有序策略
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_id: Option<String>,
    #[serde(default)]
    pub policies: Vec<GovernancePolicy>,
}

/// 逻辑分组，序列化为 `{"and": [...]}` 或 `{"or": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalGroup {
    And(Vec<Constraint>),
    Or(Vec<Constraint>),
}

impl LogicalGroup {
    pub fn connective(&self) -> LogicalConnective {
        match self {
            LogicalGroup::And(_) => LogicalConnective::And,
            LogicalGroup::Or(_) => LogicalConnective::Or,
        }
    }

    pub fn constraints(&self) -> &[Constraint] {
        match self {
            LogicalGroup::And(c) | LogicalGroup::Or(c) => c,
        }
    }
}

/// 约束结构：单个约束直接输出，多个约束包在逻辑分组里
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstraintStructure {
    Single(Constraint),
    Group(LogicalGroup),
}

/// 输出文档中的规则结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleStructure {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<ConstraintStructure>,
}

impl RuleStructure {
    /// 中性占位规则 `{"action": "use"}`
    pub fn neutral() -> Self {
        Self {
            action: NEUTRAL_ACTION.to_string(),
            constraint: None,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.action == NEUTRAL_ACTION && self.constraint.is_none()
    }
}

/// 输出的策略文档
///
/// 三个槽位始终存在：permission 是单个规则结构，prohibition 和 obligation 是列表。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    pub permission: RuleStructure,
    pub prohibition: Vec<RuleStructure>,
    pub obligation: Vec<RuleStructure>,
}

impl Default for PolicyDocument {
    fn default() -> Self {
        Self {
            permission: RuleStructure::neutral(),
            prohibition: Vec::new(),
            obligation: Vec::new(),
        }
    }
}

/// 语义版本三元组，比较顺序为 major → minor → patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemanticVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// 版本范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionRange {
    /// 三个分量全部相等
    Exact(SemanticVersion),
    /// 版本 >= min
    Min(SemanticVersion),
    /// 版本 <= max
    Max(SemanticVersion),
    /// 闭区间 [min, max]
    Between {
        min: SemanticVersion,
        max: SemanticVersion,
    },
    /// 不限制
    #[default]
    Any,
}

impl VersionRange {
    /// 检查版本是否落在范围内
    pub fn contains(&self, version: &SemanticVersion) -> bool {
        match self {
            VersionRange::Exact(v) => version == v,
            VersionRange::Min(min) => version >= min,
            VersionRange::Max(max) => version <= max,
            VersionRange::Between { min, max } => version >= min && version <= max,
            VersionRange::Any => true,
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRange::Exact(v) => write!(f, "={}", v),
            VersionRange::Min(v) => write!(f, ">={}", v),
            VersionRange::Max(v) => write!(f, "<={}", v),
            VersionRange::Between { min, max } => write!(f, ">={}, <={}", min, max),
            VersionRange::Any => write!(f, "*"),
        }
    }
}

/// 自定义匹配函数，覆盖默认的命名空间/名称/版本范围检查
#[derive(Clone)]
pub struct CustomMatcher(Arc<dyn Fn(&SemanticIdentifier) -> bool + Send + Sync>);

impl CustomMatcher {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&SemanticIdentifier) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn matches(&self, id: &SemanticIdentifier) -> bool {
        (self.0)(id)
    }
}

impl fmt::Debug for CustomMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomMatcher(..)")
    }
}

/// 插件描述符
///
/// 应用组装时由各个处理模块注册一次，注册后不可变。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonDescriptor {
    /// 唯一键
    pub id: String,
    /// 显示名称（list_all 按此排序）
    pub display_name: String,
    /// 目标语义ID命名空间
    pub namespace: String,
    /// 目标语义ID名称
    pub name: String,
    #[serde(default)]
    pub version_range: VersionRange,
    /// 优先级，数字越大优先级越高
    #[serde(default)]
    pub priority: i32,
    /// 只能在代码中注入，配置文件无法表达
    #[serde(skip)]
    pub matcher: Option<CustomMatcher>,
}

impl AddonDescriptor {
    /// 创建新描述符，默认不限版本、优先级为0
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            namespace: namespace.into(),
            name: name.into(),
            version_range: VersionRange::Any,
            priority: 0,
            matcher: None,
        }
    }

    pub fn with_version_range(mut self, range: VersionRange) -> Self {
        self.version_range = range;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// 注入自定义匹配函数
    pub fn with_matcher(mut self, matcher: CustomMatcher) -> Self {
        self.matcher = Some(matcher);
        self
    }
}
