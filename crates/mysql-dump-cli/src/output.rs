//! Writing the finished script to disk.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use flate2::write::GzEncoder;
use flate2::Compression;
use mysql_dump::{DumpScript, Result};
use tracing::{debug, info};

/// Default file name (without extension):
/// `<d_M_Y_H_mm_ss>_<database>_database_dump`.
pub fn default_file_name<Tz>(database: &str, now: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}_database_dump",
        now.format("%-d_%-m_%Y_%-H_%M_%S"),
        database
    )
}

/// Final path of the script: `<dir>/<name>.sql` or `<dir>/<name>.sql.gz`.
pub fn script_path(directory: &Path, file_name: &str, compress: bool) -> PathBuf {
    let extension = if compress { "sql.gz" } else { "sql" };
    directory.join(format!("{}.{}", file_name, extension))
}

/// Write `script` to `path`, gzip-compressed when `compress` is set.
///
/// The data goes to a `.partial` sibling first and is renamed into place
/// once complete, so `path` never holds a truncated script.
pub fn write_script(script: &DumpScript, path: &Path, compress: bool) -> Result<u64> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut partial = path.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    let written = write_file(script, &partial, compress);
    if let Err(e) = written {
        let _ = fs::remove_file(&partial);
        return Err(e);
    }

    fs::rename(&partial, path)?;
    let size = fs::metadata(path)?.len();
    info!("Wrote {} ({} bytes)", path.display(), size);
    Ok(size)
}

fn write_file(script: &DumpScript, path: &Path, compress: bool) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    if compress {
        debug!("Compressing script into {}", path.display());
        let mut encoder = GzEncoder::new(file, Compression::default());
        script.write_to(&mut encoder)?;
        encoder.finish()?.flush()?;
    } else {
        script.write_to(file)?;
    }
    Ok(())
}
