//! Session directives wrapped around the whole script.
//!
//! The preamble saves the client character set, time zone, foreign key
//! checks and SQL mode into user variables and sets them for the load; the
//! postamble restores them. Rows are read in a `+00:00` session, so the load
//! runs in `+00:00` too. The `/*!NNNNN ... */` form makes older servers skip
//! directives they do not understand.

use chrono::{DateTime, Utc};

/// Banner name written at the top of every script.
pub const GENERATOR_NAME: &str = "mysql-dump";

const SESSION_SETUP: [&str; 7] = [
    "/*!40101 SET @OLD_CHARACTER_SET_CLIENT=@@CHARACTER_SET_CLIENT */;",
    "/*!40101 SET NAMES utf8 */;",
    "/*!50503 SET NAMES utf8mb4 */;",
    "/*!40103 SET @OLD_TIME_ZONE=@@TIME_ZONE */;",
    "/*!40103 SET TIME_ZONE='+00:00' */;",
    "/*!40014 SET @OLD_FOREIGN_KEY_CHECKS=@@FOREIGN_KEY_CHECKS, FOREIGN_KEY_CHECKS=0 */;",
    "/*!40101 SET @OLD_SQL_MODE=@@SQL_MODE, SQL_MODE='NO_AUTO_VALUE_ON_ZERO' */;",
];

const SESSION_RESTORE: [&str; 4] = [
    "/*!40103 SET TIME_ZONE=@OLD_TIME_ZONE */;",
    "/*!40101 SET SQL_MODE=IFNULL(@OLD_SQL_MODE, '') */;",
    "/*!40014 SET FOREIGN_KEY_CHECKS=IF(@OLD_FOREIGN_KEY_CHECKS IS NULL, 1, @OLD_FOREIGN_KEY_CHECKS) */;",
    "/*!40101 SET CHARACTER_SET_CLIENT=@OLD_CHARACTER_SET_CLIENT */;",
];

/// Format of the `-- Date:` banner line.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Script header: banner with database and timestamp, then session setup.
pub fn preamble(database: &str, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str("--\n");
    out.push_str(&format!("-- Generated by {} {}\n", GENERATOR_NAME, env!("CARGO_PKG_VERSION")));
    out.push_str(&format!("-- Database: {}\n", database));
    out.push_str(&format!("-- Date: {}\n", generated_at.format(DATE_FORMAT)));
    out.push_str("--\n\n");
    out.push_str(&SESSION_SETUP.join("\n"));
    out.push('\n');
    out
}

/// Script footer restoring the session settings saved by [`preamble`].
pub fn postamble() -> String {
    let mut out = String::from("\n");
    out.push_str(&SESSION_RESTORE.join("\n"));
    out.push('\n');
    out
}
