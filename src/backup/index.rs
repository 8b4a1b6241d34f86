//! Script wrappers and index of backups for the front end's history view

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::snapshot::js_assignment;
use crate::utils::atomic_write;

pub const BACKUP_GLOBAL: &str = "window.__GACHA_BACKUP__";
pub const INDEX_GLOBAL: &str = "window.__GACHA_BACKUPS__";
pub const INDEX_FILE: &str = "index.js";

/// Entry of `backups/index.js`; key names are what the page expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "JS")]
    pub js: String,
}

/// `<stem>.js` next to a backup JSON file
pub fn wrapper_path(json_path: &Path) -> PathBuf {
    json_path.with_extension("js")
}

/// Write `<stem>.js` assigning the backup's JSON to `BACKUP_GLOBAL`
pub fn write_wrapper(json_path: &Path) -> io::Result<PathBuf> {
    let json = fs::read_to_string(json_path)?;
    let path = wrapper_path(json_path);
    atomic_write(&path, js_assignment(BACKUP_GLOBAL, &json).as_bytes())?;
    Ok(path)
}

/// Write `index.js` listing `names` (already newest first)
pub fn write_index(dir: &Path, names: &[String]) -> io::Result<()> {
    let entries: Vec<IndexEntry> = names
        .iter()
        .map(|name| IndexEntry {
            name: name.clone(),
            js: wrapper_path(Path::new(name)).display().to_string(),
        })
        .collect();

    let json = serde_json::to_string(&entries).map_err(io::Error::other)?;
    atomic_write(
        dir.join(INDEX_FILE),
        js_assignment(INDEX_GLOBAL, &json).as_bytes(),
    )
}
