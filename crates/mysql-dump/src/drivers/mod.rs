//! Database driver implementations of [`MetadataSource`](crate::core::MetadataSource).
//!
//! - [`mysql`]: MySQL/MariaDB over sqlx (feature `mysql`, on by default)

#[cfg(feature = "mysql")]
pub mod mysql;

#[cfg(feature = "mysql")]
pub use mysql::MysqlSource;
