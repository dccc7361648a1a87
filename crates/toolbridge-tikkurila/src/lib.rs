//! Tikkurila paint-mixing adapter: fixed table reads over the primary
//! database plus a dual-database query escape hatch.

pub mod config;
pub mod tools;

pub use config::TikkurilaConfig;
pub use tools::{TikkurilaTool, TikkurilaToolSet};
