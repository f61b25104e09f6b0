use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Step of the walk that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkStage {
    /// Inspecting the traversal root.
    Root,
    /// Resolving a relative root against the working directory.
    CurrentDir,
    /// Opening a directory for listing.
    ReadDir,
    /// Reading the next name out of a directory listing.
    ReadEntry,
    /// Inspecting an entry below the root.
    Metadata,
}

impl WalkStage {
    const fn describe(self) -> &'static str {
        match self {
            Self::Root => "inspect traversal root",
            Self::CurrentDir => "resolve relative root",
            Self::ReadDir => "read directory",
            Self::ReadEntry => "read entry in",
            Self::Metadata => "inspect",
        }
    }
}

/// Error that ends a walk: the failing step, its path, and the OS error.
#[derive(Debug)]
pub struct WalkError {
    stage: WalkStage,
    path: PathBuf,
    source: io::Error,
}

impl WalkError {
    pub(crate) const fn new(stage: WalkStage, path: PathBuf, source: io::Error) -> Self {
        Self {
            stage,
            path,
            source,
        }
    }

    /// Returns the step that failed.
    #[must_use]
    pub const fn stage(&self) -> WalkStage {
        self.stage
    }

    /// Returns the filesystem path associated with the error.
    ///
    /// # Examples
    ///
    /// ```
    /// use walk::WalkBuilder;
    ///
    /// let error = WalkBuilder::new("./definitely_missing_root")
    ///     .build()
    ///     .expect_err("missing root yields error");
    /// assert!(error.path().ends_with("definitely_missing_root"));
    /// ```
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the underlying [`io::Error`].
    #[must_use]
    pub fn source_error(&self) -> &io::Error {
        &self.source
    }
}

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to {} '{}': {}",
            self.stage.describe(),
            self.path.display(),
            self.source
        )
    }
}

impl Error for WalkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}
