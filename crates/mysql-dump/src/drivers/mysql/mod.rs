//! MySQL/MariaDB driver.
//!
//! Schema listings come from `information_schema`, definitions from
//! `SHOW CREATE ...`, rows from a streamed `SELECT *`.

mod decode;
mod source;

pub use source::MysqlSource;
