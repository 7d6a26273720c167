//! 约束变体生成模块
//!
//! 对一组约束，枚举其每个非空子集的每一种排列。非严格模式用它来覆盖
//! 同一组约束所有可能的书写顺序和分组方式。
//!
//! 输出规模是超指数级的（N=7 时 13,699 个，N=10 时 9,864,100 个），
//! 所以生成前必须先检查约束数量上限。

use crate::core::error::GovernanceError;

/// 默认的约束数量上限
pub const DEFAULT_MAX_CONSTRAINTS: usize = 7;

/// 无论如何配置都不能超过的上限（N=9 时 986,409 个变体）
pub const HARD_MAX_CONSTRAINTS: usize = 9;

/// 单条规则允许输出的最大变体数量
pub const HARD_MAX_VARIANTS: u64 = 1_000_000;

/// 计算 N 个约束会产生的变体数量：Σ_{k=1}^{N} N!/(N-k)!
///
/// 溢出时返回 None。
pub fn variant_count(n: usize) -> Option<u64> {
    let n = n as u64;
    let mut total: u64 = 0;
    let mut term: u64 = 1;
    for k in 0..n {
        term = term.checked_mul(n - k)?;
        total = total.checked_add(term)?;
    }
    Some(total)
}

/// 变体生成器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantGenerator {
    /// 允许展开的最大约束数量
    max_constraints: usize,
}

impl Default for VariantGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONSTRAINTS)
    }
}

impl VariantGenerator {
    /// 创建生成器，上限会被钳制到 [`HARD_MAX_CONSTRAINTS`]
    pub fn new(max_constraints: usize) -> Self {
        if max_constraints > HARD_MAX_CONSTRAINTS {
            tracing::warn!(
                "组合展开上限 {} 超过硬上限，已调整为 {}",
                max_constraints,
                HARD_MAX_CONSTRAINTS
            );
        }
        Self {
            max_constraints: max_constraints.min(HARD_MAX_CONSTRAINTS),
        }
    }

    pub fn max_constraints(&self) -> usize {
        self.max_constraints
    }

    /// 检查约束数量和变体总数是否在上限内
    pub fn check(&self, count: usize) -> Result<(), GovernanceError> {
        let within_budget = variant_count(count).is_some_and(|total| total <= HARD_MAX_VARIANTS);
        if count > self.max_constraints || !within_budget {
            return Err(GovernanceError::VariantLimitExceeded {
                constraints: count,
                limit: self.max_constraints,
            });
        }
        Ok(())
    }

    /// 生成所有变体
    ///
    /// 输出顺序：子集大小从 1 到 N；同一大小内按位掩码升序；每个子集内从输入顺序
    /// 开始按字典序枚举排列。相同输入总是得到相同输出。
    pub fn generate<T: Clone>(&self, items: &[T]) -> Result<Vec<Vec<T>>, GovernanceError> {
        let n = items.len();
        self.check(n)?;
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut variants = Vec::new();
        let full_mask: u32 = (1u32 << n) - 1;

        for size in 1..=n {
            for mask in 1..=full_mask {
                if mask.count_ones() as usize != size {
                    continue;
                }

                let mut indices: Vec<usize> = (0..n).filter(|i| mask & (1 << i) != 0).collect();
                loop {
                    variants.push(indices.iter().map(|&i| items[i].clone()).collect());
                    if !next_permutation(&mut indices) {
                        break;
                    }
                }
            }
        }

        tracing::debug!("{} 个约束展开为 {} 个变体", n, variants.len());
        Ok(variants)
    }
}

/// 原地求下一个字典序排列，已经是最后一个排列时返回 false
fn next_permutation(indices: &mut [usize]) -> bool {
    if indices.len() < 2 {
        return false;
    }

    let mut i = indices.len() - 1;
    while i > 0 && indices[i - 1] >= indices[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }

    let mut j = indices.len() - 1;
    while indices[j] <= indices[i - 1] {
        j -= 1;
    }
    indices.swap(i - 1, j);
    indices[i..].reverse();
    true
}
