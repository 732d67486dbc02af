use std::fs;
use std::path::{Path, PathBuf};

/// One of the three file intake buckets, each with its own extension
/// allow-list and multipart field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Audio,
    Data,
    Chat,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Audio, Category::Data, Category::Chat];

    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Audio => &[".mp3", ".wav"],
            Category::Data => &[".csv", ".xlsx"],
            Category::Chat => &[".docx", ".txt"],
        }
    }

    /// Multipart field name expected by the portal's /upload endpoint.
    pub fn field_name(&self) -> &'static str {
        match self {
            Category::Audio => "audioFiles",
            Category::Data => "dataFiles",
            Category::Chat => "chatFiles",
        }
    }

    /// Short key used in user-facing rejection messages.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Audio => "audio",
            Category::Data => "data",
            Category::Chat => "chat",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Audio => "Audio",
            Category::Data => "Data",
            Category::Chat => "Chat history",
        }
    }
}

/// A file selected or dropped by the user but not yet submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub name: String,
    pub size: u64,
    pub path: PathBuf,
}

impl StagedFile {
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let name = path
            .file_name()
            .ok_or("Invalid filename")?
            .to_str()
            .ok_or("Invalid filename encoding")?
            .to_string();

        let size = fs::metadata(path)
            .map_err(|e| format!("Failed to read file metadata: {}", e))?
            .len();

        Ok(Self {
            name,
            size,
            path: path.to_path_buf(),
        })
    }

    /// Lower-cased suffix after the last dot, including the dot itself.
    /// A name without a dot yields the whole name, which never matches
    /// an allow-list and so gets rejected with a readable message.
    pub fn extension(&self) -> String {
        match self.name.rsplit_once('.') {
            Some((_, ext)) => format!(".{}", ext.to_lowercase()),
            None => format!(".{}", self.name.to_lowercase()),
        }
    }
}
