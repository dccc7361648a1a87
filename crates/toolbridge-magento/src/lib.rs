//! Magento paint-colour adapter: fixed table reads plus a parameterized
//! query escape hatch, over the shared MySQL plumbing.

pub mod config;
pub mod tools;

pub use tools::{MagentoTool, MagentoToolSet};
