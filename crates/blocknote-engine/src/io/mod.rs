use chrono::Local;
use relative_path::{RelativePath, RelativePathBuf};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::collaborators::{CollaboratorError, ImageUploader, NoteStore};
use crate::models::{Block, BlockId};

/// Extension of persisted notes
pub const NOTE_EXTENSION: &str = "json";

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid notes directory: {0}")]
    InvalidNotesDir(String),
}

/// Read a note file and return its content
pub fn read_file(relative_path: &RelativePath, notes_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(notes_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Write bytes to a file under the notes root, creating parent directories
pub fn write_file(
    relative_path: &RelativePath,
    notes_root: &Path,
    content: impl AsRef<[u8]>,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(notes_root);

    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(&absolute_path, content).map_err(IoError::Io)
}

/// All note files under the notes directory, as sorted relative paths
pub fn scan_note_files(notes_root: &Path) -> Result<Vec<RelativePathBuf>, IoError> {
    if !notes_root.exists() {
        return Err(IoError::InvalidNotesDir(
            "notes directory not found".to_string(),
        ));
    }

    let mut files = Vec::new();
    scan_directory_recursive(notes_root, &mut files)?;

    let mut relative: Vec<RelativePathBuf> = files
        .iter()
        .filter_map(|f| f.strip_prefix(notes_root).ok())
        .filter_map(|f| RelativePathBuf::from_path(f).ok())
        .collect();
    relative.sort();
    Ok(relative)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == NOTE_EXTENSION
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_notes_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidNotesDir(
            "Directory does not exist".to_string(),
        ));
    }

    Ok(())
}

fn check_note_path(path: &RelativePath) -> Result<(), CollaboratorError> {
    if path.extension() != Some(NOTE_EXTENSION) {
        return Err(CollaboratorError::InvalidPath(format!(
            "{path} is not a .{NOTE_EXTENSION} note"
        )));
    }
    Ok(())
}

/// Notes persisted as JSON arrays of blocks under a root directory.
///
/// A note that does not exist yet loads as empty; the first save creates
/// it along with any missing directories.
#[derive(Debug, Clone)]
pub struct JsonNoteStore {
    root: PathBuf,
}

impl JsonNoteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl NoteStore for JsonNoteStore {
    fn load(&self, path: &RelativePath) -> Result<Vec<Block>, CollaboratorError> {
        check_note_path(path)?;
        match read_file(path, &self.root) {
            Ok(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(IoError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, path: &RelativePath, blocks: &[Block]) -> Result<(), CollaboratorError> {
        check_note_path(path)?;
        let json = serde_json::to_string_pretty(blocks)?;
        write_file(path, &self.root, json)?;
        Ok(())
    }
}

/// Notes kept in memory, keyed by path; for previews and headless hosts
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    notes: RefCell<HashMap<RelativePathBuf, String>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a note from its persisted JSON form
    pub fn insert_json(&self, path: impl Into<RelativePathBuf>, json: impl Into<String>) {
        self.notes.borrow_mut().insert(path.into(), json.into());
    }

    /// Persisted JSON of a note, if saved
    pub fn json(&self, path: &RelativePath) -> Option<String> {
        self.notes.borrow().get(path).cloned()
    }
}

impl NoteStore for MemoryNoteStore {
    fn load(&self, path: &RelativePath) -> Result<Vec<Block>, CollaboratorError> {
        match self.notes.borrow().get(path) {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, path: &RelativePath, blocks: &[Block]) -> Result<(), CollaboratorError> {
        let json = serde_json::to_string(blocks)?;
        self.notes.borrow_mut().insert(path.to_relative_path_buf(), json);
        Ok(())
    }
}

/// Stores pasted images next to the note, in an `images` directory.
///
/// Files are named `<short id>_<YYYYMMDD>_<sanitized name>` so repeated
/// pastes of the same file name never collide. The returned URL is the
/// image's path from the notes root, with a leading slash.
#[derive(Debug, Clone)]
pub struct FsImageUploader {
    root: PathBuf,
}

impl FsImageUploader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageUploader for FsImageUploader {
    fn upload(
        &self,
        note: &RelativePath,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, CollaboratorError> {
        let sanitized = sanitize_file_name(file_name);
        if sanitized.is_empty() {
            return Err(CollaboratorError::Upload("invalid file name".to_string()));
        }
        if bytes.is_empty() {
            return Err(CollaboratorError::Upload("empty image".to_string()));
        }

        let stored_name = format!(
            "{}_{}_{}",
            BlockId::new().short(),
            Local::now().format("%Y%m%d"),
            sanitized
        );
        let images_dir = note
            .parent()
            .map(|p| p.join("images"))
            .unwrap_or_else(|| RelativePathBuf::from("images"));
        let relative = images_dir.join(stored_name);

        write_file(&relative, &self.root, bytes)?;
        log::info!("stored pasted image at {relative}");
        Ok(format!("/{relative}"))
    }
}

/// Keep ASCII letters, digits, `.`, `-` and `_`; everything else becomes
/// `_`. Leading dots are dropped.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}
