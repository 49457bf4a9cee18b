//! Cache database location and connection setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use rusqlite::Connection;

use super::migrations::run_migrations;

/// Database file name.
const DB_FILE: &str = "streamkit.db";

/// Application directory under the XDG data root.
const APP_DIR: &str = "streamkit";

/// How long a writer waits on a lock held by another process.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) the cache database and runs migrations.
///
/// Path precedence: `{dir}/streamkit.db`, then
/// `$XDG_DATA_HOME/streamkit/streamkit.db`, then
/// `~/.local/share/streamkit/streamkit.db`. Journaling is WAL with a
/// 5 second busy timeout.
///
/// # Errors
///
/// Returns an error if the path cannot be resolved, the database cannot be
/// opened, or migrations fail.
pub fn open_db(dir: Option<&PathBuf>) -> Result<Connection> {
    let db_path = db_path_from(
        dir.map(PathBuf::as_path),
        std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )?;

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let conn = Connection::open(&db_path)
        .with_context(|| format!("failed to open cache database {}", db_path.display()))?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .context("failed to set busy timeout")?;
    let journal_mode: String = conn
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .context("failed to enable WAL journaling")?;

    run_migrations(&conn).context("database migration failed")?;

    tracing::debug!(
        path = %db_path.display(),
        journal_mode = %journal_mode,
        "cache database opened"
    );

    Ok(conn)
}

/// Applies the lookup order to already-read environment values.
fn db_path_from(
    dir: Option<&Path>,
    xdg_data_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(DB_FILE));
    }

    let root = match (xdg_data_home.filter(|p| p.is_absolute()), home) {
        (Some(xdg), _) => xdg,
        (None, Some(home)) if !home.as_os_str().is_empty() => home.join(".local").join("share"),
        _ => bail!("cannot locate data directory: neither XDG_DATA_HOME nor HOME is set"),
    };
    Ok(root.join(APP_DIR).join(DB_FILE))
}
