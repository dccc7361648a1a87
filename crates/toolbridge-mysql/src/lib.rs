//! Shared MySQL plumbing for toolbridge servers: connection configuration,
//! pooled execution, and conversion of result rows into JSON values.

pub mod backend;
pub mod connection;
pub mod error;
pub mod rows;

pub use backend::{MysqlBackend, QueryBackend};
pub use connection::MysqlConnection;
pub use error::{MysqlError, MysqlResult};
pub use rows::convert_row;
