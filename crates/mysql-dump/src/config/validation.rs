//! Configuration validation.

use super::Config;
use crate::error::{DumpError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let source = &config.source;
    let has_url = source.url.as_deref().is_some_and(|u| !u.trim().is_empty());

    if !has_url && source.host.is_empty() {
        return Err(DumpError::Config(
            "source.host is required (or set source.url)".into(),
        ));
    }
    if !has_url && source.user.is_empty() {
        return Err(DumpError::Config(
            "source.user is required (or set source.url)".into(),
        ));
    }
    if source.database_name().is_none() {
        return Err(DumpError::Config(
            "source.database is required (directly or as the path of source.url)".into(),
        ));
    }
    if source.max_connections == 0 {
        return Err(DumpError::Config(
            "source.max_connections must be at least 1".into(),
        ));
    }

    if let Some(0) = config.export.max_rows_per_insert {
        return Err(DumpError::Config(
            "export.max_rows_per_insert must be at least 1".into(),
        ));
    }

    if let Some(name) = &config.output.file_name {
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(DumpError::Config(format!(
                "output.file_name must be a plain file name, got '{}'",
                name
            )));
        }
    }

    Ok(())
}
