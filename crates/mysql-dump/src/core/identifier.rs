//! Identifier validation and quoting.
//!
//! Table, column and routine names end up spliced into `SHOW CREATE` queries
//! and into the generated script. They cannot be bound as parameters, so they
//! are validated and backtick-quoted here instead.

use crate::error::{DumpError, Result};

/// MySQL limits identifiers to 64 characters; anything much longer is not a
/// name the server handed us.
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Validate an identifier.
///
/// Rejects empty names, names containing null bytes and names exceeding
/// [`MAX_IDENTIFIER_LENGTH`].
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DumpError::Config("Identifier cannot be empty".to_string()));
    }

    if name.contains('\0') {
        return Err(DumpError::Config(format!(
            "Identifier contains null byte: {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(DumpError::Config(format!(
            "Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Quote a MySQL identifier using backticks, doubling embedded backticks.
///
/// Used for names inside generated text, where the name came from the server
/// and only needs escaping.
pub fn quote(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Validate and quote an identifier for use in a query sent to the server.
pub fn quote_checked(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(quote(name))
}

/// Qualify a name with its database: `` `db`.`name` ``.
pub fn qualify(database: &str, name: &str) -> Result<String> {
    Ok(format!("{}.{}", quote_checked(database)?, quote_checked(name)?))
}
