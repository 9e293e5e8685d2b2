use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

pub fn user_home() -> Option<PathBuf> {
    home::home_dir()
}

/// Hidden directory name for `app`: a leading dot is added when missing.
pub fn app_dir_name(app: &str) -> Result<String> {
    let app = app.trim();
    if app.is_empty() || app == "." {
        return Err(Error::EmptyAppName);
    }
    if app.starts_with('.') {
        Ok(app.to_string())
    } else {
        Ok(format!(".{app}"))
    }
}

/// `~/.{app}`, created if it does not exist yet.
pub fn app_home(app: &str) -> Result<PathBuf> {
    let home = user_home().ok_or(Error::NoHome)?;
    app_home_in(home, app)
}

/// `{base}/.{app}`, created if it does not exist yet.
pub fn app_home_in(base: impl AsRef<Path>, app: &str) -> Result<PathBuf> {
    let dir = base.as_ref().join(app_dir_name(app)?);

    if dir.is_dir() {
        return Ok(dir);
    }
    if dir.exists() {
        return Err(Error::NotADirectory(dir));
    }

    fs::create_dir_all(&dir).map_err(|source| Error::Create {
        path: dir.clone(),
        source,
    })?;
    tracing::debug!(path = %dir.display(), "application directory created");
    Ok(dir)
}
