use thiserror::Error;

/// File-system operation that was being attempted when a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsOperation {
    List,
    Stat,
    Read,
    Write,
    MakeDirectory,
}

impl FsOperation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::List => "list directory",
            Self::Stat => "stat",
            Self::Read => "read",
            Self::Write => "write",
            Self::MakeDirectory => "make directory",
        }
    }
}

impl std::fmt::Display for FsOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors produced by the ROM discovery and metadata pipeline.
///
/// This set is closed: every file-system failure is translated into one of
/// the first five variants, and classification failures use
/// [`RomError::UnknownPlatform`]. Each variant carries the offending path
/// (or extension) so callers can report it without a backtrace.
#[derive(Debug, Error)]
pub enum RomError {
    /// The path does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A directory was expected
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// A regular file was expected
    #[error("Not a file: {0}")]
    NotAFile(String),

    /// The operation was refused by the platform
    #[error("Permission denied ({operation}): {path}")]
    PermissionDenied { path: String, operation: FsOperation },

    /// Any other file-system failure, keeping the original cause
    #[error("File system error at {path}: {message}")]
    FileSystem {
        path: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No platform could be inferred from the file extension
    #[error("Unknown platform for extension '{0}'")]
    UnknownPlatform(String),
}

impl RomError {
    pub fn file_system(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileSystem {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Wrap another error as a `FileSystem` failure at `path`.
    pub fn wrap(
        path: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::FileSystem {
            path: path.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Path (or extension, for `UnknownPlatform`) the error refers to.
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound(path)
            | Self::NotADirectory(path)
            | Self::NotAFile(path)
            | Self::PermissionDenied { path, .. }
            | Self::FileSystem { path, .. } => path,
            Self::UnknownPlatform(ext) => ext,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
