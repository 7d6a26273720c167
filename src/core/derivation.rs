//! 策略推导模块
//!
//! 遍历治理配置并生成策略文档。严格模式每条规则只输出一份文档；
//! 非严格模式把规则的约束展开为所有变体，每个变体输出一份。
//!
//! 推导是纯函数：相同输入总得到相同输出，不持有任何状态。

use crate::core::assembler::{assemble_policy_document, build_rule};
use crate::core::error::GovernanceError;
use crate::core::models::{GovernanceConfig, PolicyDocument, Rule, RuleType};
use crate::core::variant::{VariantGenerator, DEFAULT_MAX_CONSTRAINTS};
use serde::{Deserialize, Serialize};

/// 约束数量超过组合上限时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitBehavior {
    /// 返回 VariantLimitExceeded 错误
    #[default]
    Reject,
    /// 退化为严格模式输出一份文档，并记录警告
    FallbackStrict,
}

/// 推导参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivationOptions {
    /// 非严格模式允许展开的最大约束数量
    pub max_variant_constraints: usize,
    pub limit_behavior: LimitBehavior,
}

impl Default for DerivationOptions {
    fn default() -> Self {
        Self {
            max_variant_constraints: DEFAULT_MAX_CONSTRAINTS,
            limit_behavior: LimitBehavior::Reject,
        }
    }
}

/// 选择要使用的治理配置
///
/// 给了语义ID时取第一个键相等的配置（找不到就是 None）；没给时取第一个配置。
pub fn select_config<'a>(
    configs: &'a [GovernanceConfig],
    semantic_id: Option<&str>,
) -> Option<&'a GovernanceConfig> {
    match semantic_id {
        Some(id) => configs.iter().find(|c| c.semantic_id.as_deref() == Some(id)),
        None => configs.first(),
    }
}

/// 策略推导器
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyDeriver {
    options: DerivationOptions,
    generator: VariantGenerator,
}

impl PolicyDeriver {
    /// 创建新的推导器
    pub fn new(options: DerivationOptions) -> Self {
        Self {
            options,
            generator: VariantGenerator::new(options.max_variant_constraints),
        }
    }

    pub fn options(&self) -> &DerivationOptions {
        &self.options
    }

    /// 推导策略文档
    ///
    /// 输出顺序：策略 → 类别（permission、prohibition、obligation）→ 规则 → 变体。
    /// 唯一的错误是组合上限超出。
    pub fn derive(
        &self,
        configs: &[GovernanceConfig],
        semantic_id: Option<&str>,
    ) -> Result<Vec<PolicyDocument>, GovernanceError> {
        let Some(config) = select_config(configs, semantic_id) else {
            tracing::debug!("没有匹配的治理配置: {:?}", semantic_id);
            return Ok(Vec::new());
        };

        let mut documents = Vec::new();
        for policy in &config.policies {
            for rule_type in RuleType::ALL {
                for rule in policy.rules(rule_type) {
                    // 没有约束的规则直接跳过
                    if rule.constraints.is_empty() {
                        tracing::debug!("跳过无约束的 {} 规则: {}", rule_type, rule.action);
                        continue;
                    }

                    if policy.strict {
                        documents.push(strict_document(rule, rule_type));
                    } else {
                        self.push_variants(&mut documents, rule, rule_type)?;
                    }
                }
            }
        }

        tracing::info!("共生成 {} 份策略文档", documents.len());
        Ok(documents)
    }

    fn push_variants(
        &self,
        documents: &mut Vec<PolicyDocument>,
        rule: &Rule,
        rule_type: RuleType,
    ) -> Result<(), GovernanceError> {
        let variants = match self.generator.generate(&rule.constraints) {
            Ok(variants) => variants,
            Err(err) => match self.options.limit_behavior {
                LimitBehavior::Reject => return Err(err),
                LimitBehavior::FallbackStrict => {
                    tracing::warn!("{}，{} 规则 {} 退化为严格模式", err, rule_type, rule.action);
                    documents.push(strict_document(rule, rule_type));
                    return Ok(());
                }
            },
        };

        let connective = rule.connective();
        documents.extend(variants.iter().map(|variant| {
            assemble_policy_document(build_rule(&rule.action, variant, connective), rule_type)
        }));
        Ok(())
    }
}

fn strict_document(rule: &Rule, rule_type: RuleType) -> PolicyDocument {
    assemble_policy_document(
        build_rule(&rule.action, &rule.constraints, rule.connective()),
        rule_type,
    )
}

/// 使用指定参数推导策略文档
pub fn derive_policies(
    configs: &[GovernanceConfig],
    semantic_id: Option<&str>,
    options: DerivationOptions,
) -> Result<Vec<PolicyDocument>, GovernanceError> {
    PolicyDeriver::new(options).derive(configs, semantic_id)
}

/// 使用默认参数推导策略文档
pub fn derive_policies_default(
    configs: &[GovernanceConfig],
    semantic_id: Option<&str>,
) -> Result<Vec<PolicyDocument>, GovernanceError> {
    derive_policies(configs, semantic_id, DerivationOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{
        Constraint, ConstraintStructure, GovernancePolicy, LogicalGroup, RuleSet,
    };
    use serde_json::json;

    fn a() -> Constraint {
        Constraint::new("purpose", "eq", "R&D")
    }

    fn b() -> Constraint {
        Constraint::new("membership", "eq", "active")
    }

    fn c() -> Constraint {
        Constraint::new("region", "eq", "EU")
    }

    fn config(semantic_id: Option<&str>, policies: Vec<GovernancePolicy>) -> GovernanceConfig {
        GovernanceConfig {
            semantic_id: semantic_id.map(str::to_string),
            policies,
        }
    }

    fn permission_policy(strict: bool, rule: Rule) -> GovernancePolicy {
        GovernancePolicy {
            strict,
            permission: RuleSet::One(rule),
            ..Default::default()
        }
    }

    #[test]
    fn test_strict_two_constraints_single_document() {
        let configs = vec![config(
            None,
            vec![permission_policy(true, Rule::new("use", vec![a(), b()]))],
        )];

        let docs = derive_policies_default(&configs, None).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(
            docs[0].permission.constraint,
            Some(ConstraintStructure::Group(LogicalGroup::And(vec![a(), b()])))
        );
    }

    #[test]
    fn test_non_strict_two_constraints_four_documents() {
        let configs = vec![config(
            None,
            vec![permission_policy(false, Rule::new("use", vec![a(), b()]))],
        )];

        let docs = derive_policies_default(&configs, None).unwrap();
        assert_eq!(docs.len(), 4);

        let constraints: Vec<_> = docs.iter().map(|d| d.permission.constraint.clone()).collect();
        assert_eq!(
            constraints,
            vec![
                Some(ConstraintStructure::Single(a())),
                Some(ConstraintStructure::Single(b())),
                Some(ConstraintStructure::Group(LogicalGroup::And(vec![a(), b()]))),
                Some(ConstraintStructure::Group(LogicalGroup::And(vec![b(), a()]))),
            ]
        );
    }

    #[test]
    fn test_non_strict_three_constraints_keeps_or() {
        let rule = Rule::new("use", vec![a(), b(), c()]).with_logic("OR");
        let configs = vec![config(None, vec![permission_policy(false, rule)])];

        let docs = derive_policies_default(&configs, None).unwrap();
        assert_eq!(docs.len(), 15);
        for doc in &docs[3..] {
            assert!(matches!(
                doc.permission.constraint,
                Some(ConstraintStructure::Group(LogicalGroup::Or(_)))
            ));
        }
    }

    #[test]
    fn test_empty_configs_yield_empty_list() {
        assert!(derive_policies_default(&[], Some("urn:samm:ns:N:1.0.0"))
            .unwrap()
            .is_empty());
        assert!(derive_policies_default(&[], None).unwrap().is_empty());
    }

    #[test]
    fn test_select_config_by_semantic_id() {
        let configs = vec![
            config(Some("urn:samm:ns:A:1.0.0"), vec![permission_policy(true, Rule::new("first", vec![a()]))]),
            config(Some("urn:samm:ns:B:1.0.0"), vec![permission_policy(true, Rule::new("second", vec![a()]))]),
            config(Some("urn:samm:ns:B:1.0.0"), vec![permission_policy(true, Rule::new("third", vec![a()]))]),
        ];

        let docs = derive_policies_default(&configs, Some("urn:samm:ns:B:1.0.0")).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].permission.action, "second");

        let docs = derive_policies_default(&configs, None).unwrap();
        assert_eq!(docs[0].permission.action, "first");

        let docs = derive_policies_default(&configs, Some("urn:samm:ns:C:1.0.0")).unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn test_rules_without_constraints_are_skipped() {
        let policy = GovernancePolicy {
            strict: true,
            permission: RuleSet::Many(vec![Rule::new("use", vec![]), Rule::new("use", vec![a()])]),
            prohibition: RuleSet::One(Rule::new("distribute", vec![])),
            ..Default::default()
        };
        let docs = derive_policies_default(&[config(None, vec![policy])], None).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].permission.constraint, Some(ConstraintStructure::Single(a())));
    }

    #[test]
    fn test_iteration_order_policies_then_categories() {
        let first = GovernancePolicy {
            strict: true,
            permission: RuleSet::One(Rule::new("use", vec![a()])),
            prohibition: RuleSet::Many(vec![
                Rule::new("distribute", vec![b()]),
                Rule::new("modify", vec![c()]),
            ]),
            obligation: RuleSet::One(Rule::new("notify", vec![a()])),
        };
        let second = GovernancePolicy {
            strict: true,
            obligation: RuleSet::One(Rule::new("delete", vec![b()])),
            ..Default::default()
        };

        let docs = derive_policies_default(&[config(None, vec![first, second])], None).unwrap();
        let labels: Vec<String> = docs
            .iter()
            .map(|d| {
                if let Some(r) = d.prohibition.first() {
                    format!("prohibition:{}", r.action)
                } else if let Some(r) = d.obligation.first() {
                    format!("obligation:{}", r.action)
                } else {
                    format!("permission:{}", d.permission.action)
                }
            })
            .collect();

        assert_eq!(
            labels,
            vec![
                "permission:use",
                "prohibition:distribute",
                "prohibition:modify",
                "obligation:notify",
                "obligation:delete",
            ]
        );
        // 非 permission 文档保留中性占位
        assert!(docs[1].permission.is_neutral());
    }

    #[test]
    fn test_limit_rejects_large_non_strict_rule() {
        let constraints: Vec<Constraint> = (0..4)
            .map(|i| Constraint::new(format!("op{i}"), "eq", "x"))
            .collect();
        let configs = vec![config(
            None,
            vec![permission_policy(false, Rule::new("use", constraints))],
        )];
        let options = DerivationOptions {
            max_variant_constraints: 3,
            limit_behavior: LimitBehavior::Reject,
        };

        let deriver = PolicyDeriver::new(options);
        assert_eq!(deriver.options().max_variant_constraints, 3);
        assert_eq!(deriver.options().limit_behavior, LimitBehavior::Reject);

        let err = derive_policies(&configs, None, options).unwrap_err();
        assert_eq!(
            err,
            GovernanceError::VariantLimitExceeded {
                constraints: 4,
                limit: 3
            }
        );
    }

    #[test]
    fn test_limit_fallback_to_strict() {
        let constraints: Vec<Constraint> = (0..4)
            .map(|i| Constraint::new(format!("op{i}"), "eq", "x"))
            .collect();
        let configs = vec![config(
            None,
            vec![permission_policy(false, Rule::new("use", constraints.clone()))],
        )];
        let options = DerivationOptions {
            max_variant_constraints: 3,
            limit_behavior: LimitBehavior::FallbackStrict,
        };

        let docs = derive_policies(&configs, None, options).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(
            docs[0].permission.constraint,
            Some(ConstraintStructure::Group(LogicalGroup::And(constraints)))
        );
    }

    #[test]
    fn test_strict_mode_ignores_limit() {
        let constraints: Vec<Constraint> = (0..20)
            .map(|i| Constraint::new(format!("op{i}"), "eq", "x"))
            .collect();
        let configs = vec![config(
            None,
            vec![permission_policy(true, Rule::new("use", constraints))],
        )];
        assert_eq!(derive_policies_default(&configs, None).unwrap().len(), 1);
    }

    #[test]
    fn test_derive_from_json_config() {
        let configs: Vec<GovernanceConfig> = serde_json::from_value(json!([{
            "semanticId": "urn:samm:io.catenax:SerialPart:3.0.0",
            "policies": [{
                "strict": true,
                "prohibition": {
                    "action": "distribute",
                    "logic": "or",
                    "constraints": [
                        {"leftOperand": "purpose", "operator": "eq", "rightOperand": "R&D"},
                        {"leftOperand": "membership", "operator": "eq", "rightOperand": "active"}
                    ]
                }
            }]
        }]))
        .unwrap();

        let docs =
            derive_policies_default(&configs, Some("urn:samm:io.catenax:SerialPart:3.0.0")).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(
            serde_json::to_value(&docs[0]).unwrap(),
            json!({
                "permission": {"action": "use"},
                "prohibition": [{
                    "action": "distribute",
                    "constraint": {"or": [
                        {"leftOperand": "purpose", "operator": "eq", "rightOperand": "R&D"},
                        {"leftOperand": "membership", "operator": "eq", "rightOperand": "active"}
                    ]}
                }],
                "obligation": []
            })
        );
    }
}
