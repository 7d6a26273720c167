//! 语义ID解析模块
//!
//! 把 `urn:samm:<namespace>:<name>:<major>.<minor>.<patch>#<fragment>` 形式的
//! 字符串解析为结构化的语义ID。不匹配时返回 None 而不是错误，调用方应把它当作
//! "未识别" 处理。

use crate::core::models::SemanticVersion;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static SEMANTIC_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^urn:(samm|bamm):([^:]+):([^:]+):(\d+)\.(\d+)\.(\d+)(?:#(.+))?$")
        .expect("semantic id pattern is valid")
});

/// 语义ID的URN方案
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrnScheme {
    Samm,
    Bamm,
}

impl UrnScheme {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "samm" => Some(UrnScheme::Samm),
            "bamm" => Some(UrnScheme::Bamm),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UrnScheme::Samm => "samm",
            UrnScheme::Bamm => "bamm",
        }
    }
}

/// 解析后的语义ID
///
/// 只能通过 [`SemanticIdentifier::parse`] 得到，字段只读。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemanticIdentifier {
    scheme: UrnScheme,
    namespace: String,
    name: String,
    version: SemanticVersion,
    fragment: Option<String>,
    raw: String,
}

impl SemanticIdentifier {
    /// 解析语义ID字符串
    pub fn parse(raw: &str) -> Option<Self> {
        let caps = SEMANTIC_ID_RE.captures(raw)?;

        let scheme = UrnScheme::from_token(caps.get(1)?.as_str())?;
        // 数字溢出同样视为不匹配
        let major = caps.get(4)?.as_str().parse().ok()?;
        let minor = caps.get(5)?.as_str().parse().ok()?;
        let patch = caps.get(6)?.as_str().parse().ok()?;

        Some(Self {
            scheme,
            namespace: caps.get(2)?.as_str().to_string(),
            name: caps.get(3)?.as_str().to_string(),
            version: SemanticVersion::new(major, minor, patch),
            fragment: caps.get(7).map(|m| m.as_str().to_string()),
            raw: raw.to_string(),
        })
    }

    pub fn scheme(&self) -> UrnScheme {
        self.scheme
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> SemanticVersion {
        self.version
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// 原始输入字符串
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// 用结构化字段重新拼出规范URN
    pub fn to_urn(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SemanticIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "urn:{}:{}:{}:{}",
            self.scheme.as_str(),
            self.namespace,
            self.name,
            self.version
        )?;
        if let Some(ref fragment) = self.fragment {
            write!(f, "#{}", fragment)?;
        }
        Ok(())
    }
}
