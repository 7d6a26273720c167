//! 错误类型定义
//!
//! 输入数据本身的问题（语义ID无法解析、配置为空）不算错误，只会降级为"无匹配"。
//! 这里只收录真正需要调用方处理的情况。

use thiserror::Error;

/// 策略推导错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GovernanceError {
    /// 非严格模式下约束数量超过组合上限
    #[error("约束数量 {constraints} 超过组合展开上限 {limit}")]
    VariantLimitExceeded { constraints: usize, limit: usize },
}

/// 插件注册表错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// 同一个ID重复注册
    #[error("插件ID已注册: {0}")]
    DuplicateAddon(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GovernanceError::VariantLimitExceeded {
            constraints: 9,
            limit: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains('9'));
        assert!(msg.contains('7'));

        let err = RegistryError::DuplicateAddon("bom-viewer".to_string());
        assert!(err.to_string().contains("bom-viewer"));
    }
}
