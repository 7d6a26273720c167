//! Core模块 - 包含所有核心业务逻辑

pub mod models;
pub mod error;
pub mod semantic_id;
pub mod addon_registry;
pub mod variant;
pub mod assembler;
pub mod derivation;
