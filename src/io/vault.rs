use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::io::config_io::{VaultConfig, read_config};
use crate::model::NoteSet;
use crate::parse::parse_note;

/// Name of the directory that marks a vault root.
pub const VAULT_DIR: &str = ".scribe";

/// Error type for vault I/O operations
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("not a scribe vault: no {VAULT_DIR}/ directory found")]
    NotAVault,
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not parse config.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
}

/// A directory of markdown notes plus its parsed metadata.
#[derive(Debug, Clone)]
pub struct Vault {
    pub root: PathBuf,
    pub notes: NoteSet,
}

impl Vault {
    pub fn scribe_dir(&self) -> PathBuf {
        self.root.join(VAULT_DIR)
    }

    /// Re-parse one note after its text changed, adding it if new.
    pub fn update_note(&mut self, path: &str, source: &str) {
        self.notes.upsert(parse_note(path, source));
    }
}

/// Discover the vault by walking up from the given directory, looking for
/// a `.scribe/` subdirectory.
pub fn discover_vault(start: &Path) -> Result<PathBuf, VaultError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(VAULT_DIR).is_dir() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(VaultError::NotAVault);
        }
    }
}

/// Discover the vault at or above `start`, load its notes and read its
/// config.
pub fn open_vault(start: &Path) -> Result<(Vault, VaultConfig), VaultError> {
    let root = discover_vault(start)?;
    let vault = load_vault(&root)?;
    let config = read_config(&vault.scribe_dir())?;
    Ok((vault, config))
}

/// Load and parse every `.md` file under `root`. Hidden directories are
/// skipped, and so are notes that cannot be read. Note paths are relative
/// to `root` with `/` separators, sorted.
pub fn load_vault(root: &Path) -> Result<Vault, VaultError> {
    let mut files = Vec::new();
    collect_markdown(root, root, &mut files)?;
    files.sort();

    let mut notes = Vec::with_capacity(files.len());
    for rel in &files {
        match read_note(root, rel) {
            Ok(source) => notes.push(parse_note(rel, &source)),
            Err(e) => tracing::warn!(file = %rel, error = %e, "skipping unreadable note"),
        }
    }
    tracing::info!(root = %root.display(), notes = notes.len(), "vault loaded");

    Ok(Vault {
        root: root.to_path_buf(),
        notes: NoteSet::new(notes),
    })
}

fn collect_markdown(root: &Path, dir: &Path, out: &mut Vec<String>) -> Result<(), VaultError> {
    let entries = fs::read_dir(dir).map_err(|e| VaultError::ReadError {
        path: dir.to_path_buf(),
        source: e,
    })?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        if path.is_dir() {
            collect_markdown(root, &path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("md") {
            if let Ok(rel) = path.strip_prefix(root) {
                let parts: Vec<_> = rel.iter().map(|p| p.to_string_lossy()).collect();
                out.push(parts.join("/"));
            }
        }
    }
    Ok(())
}

/// Read a note by vault-relative path.
pub fn read_note(root: &Path, rel: &str) -> Result<String, VaultError> {
    let path = root.join(rel);
    fs::read_to_string(&path).map_err(|e| VaultError::ReadError { path, source: e })
}

/// Write a note by vault-relative path, creating parent directories.
pub fn save_note(root: &Path, rel: &str, content: &str) -> Result<(), VaultError> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    atomic_write(&path, content.as_bytes())
        .map_err(|e| VaultError::WriteError { path, source: e })
}

/// Write through a temp file in the same directory, then rename over the
/// target.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create `.scribe/` in `root` if missing. Returns whether it was created.
pub fn init_vault(root: &Path) -> Result<bool, VaultError> {
    let dir = root.join(VAULT_DIR);
    if dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(&dir)?;
    Ok(true)
}
