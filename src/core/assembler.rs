//! 策略组装模块
//!
//! 把原始规则组装成输出文档里的规则结构和约束结构。

use crate::core::models::{
    Constraint, ConstraintStructure, LogicalConnective, LogicalGroup, PolicyDocument,
    RuleStructure, RuleType,
};

/// 组装约束结构
///
/// 单个约束直接输出；多个约束包在逻辑分组里；没有约束时返回 None。
pub fn build_constraint_structure(
    constraints: &[Constraint],
    connective: LogicalConnective,
) -> Option<ConstraintStructure> {
    match constraints {
        [] => None,
        [single] => Some(ConstraintStructure::Single(single.clone())),
        many => {
            let group = match connective {
                LogicalConnective::And => LogicalGroup::And(many.to_vec()),
                LogicalConnective::Or => LogicalGroup::Or(many.to_vec()),
            };
            Some(ConstraintStructure::Group(group))
        }
    }
}

/// 组装规则结构
pub fn build_rule(
    action: &str,
    constraints: &[Constraint],
    connective: LogicalConnective,
) -> RuleStructure {
    RuleStructure {
        action: action.to_string(),
        constraint: build_constraint_structure(constraints, connective),
    }
}

/// 把规则放进对应类别的槽位，生成完整的策略文档
///
/// 非 permission 文档的 permission 槽位填中性占位规则。
pub fn assemble_policy_document(rule: RuleStructure, rule_type: RuleType) -> PolicyDocument {
    let mut document = PolicyDocument::default();
    match rule_type {
        RuleType::Permission => document.permission = rule,
        RuleType::Prohibition => document.prohibition.push(rule),
        RuleType::Obligation => document.obligation.push(rule),
    }
    document
}
