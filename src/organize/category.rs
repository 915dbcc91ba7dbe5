//! Static extension → category table.

use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Images,
    Documents,
    Videos,
    Audio,
    Archives,
    Code,
    Executables,
    Others,
}

const TABLE: &[(Category, &[&str])] = &[
    (
        Category::Images,
        &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff"],
    ),
    (
        Category::Documents,
        &[
            "pdf", "doc", "docx", "txt", "rtf", "ppt", "pptx", "xls", "xlsx", "csv",
        ],
    ),
    (Category::Videos, &["mp4", "mkv", "avi", "mov", "wmv", "flv"]),
    (Category::Audio, &["mp3", "wav", "aac", "flac", "ogg", "m4a"]),
    (Category::Archives, &["zip", "rar", "7z", "tar", "gz"]),
    (
        Category::Code,
        &[
            "py", "java", "cpp", "c", "js", "html", "css", "json", "xml", "yml", "yaml",
        ],
    ),
    (Category::Executables, &["exe", "msi", "bat", "sh"]),
];

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Images,
        Category::Documents,
        Category::Videos,
        Category::Audio,
        Category::Archives,
        Category::Code,
        Category::Executables,
        Category::Others,
    ];

    /// Folder name the category's files are grouped under.
    pub fn dir_name(self) -> &'static str {
        match self {
            Category::Images => "Images",
            Category::Documents => "Documents",
            Category::Videos => "Videos",
            Category::Audio => "Audio",
            Category::Archives => "Archives",
            Category::Code => "Code",
            Category::Executables => "Executables",
            Category::Others => "Others",
        }
    }

    /// Category for a file name, by its last extension (case-insensitive).
    pub fn for_path(path: &Path) -> Category {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Category::Others;
        };
        let ext = ext.to_ascii_lowercase();
        TABLE
            .iter()
            .find(|(_, exts)| exts.contains(&ext.as_str()))
            .map(|(c, _)| *c)
            .unwrap_or(Category::Others)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}
