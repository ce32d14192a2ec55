//! Options passed to the engine when submitting a copy job.

/// Transfer direction. A single job targets exactly one service kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Local filesystem to a blob container.
    LocalToBlob,
    /// Local filesystem to a file share.
    LocalToFileShare,
}

impl Direction {
    /// Engine `--from-to` value for this direction.
    fn engine_pair(self) -> &'static str {
        match self {
            Self::LocalToBlob => "LocalBlob",
            Self::LocalToFileShare => "LocalFile",
        }
    }
}

/// Relative path prefixes excluded from directory uploads: version-control
/// and editor metadata directories.
pub const METADATA_EXCLUDES: &[&str] = &[".git", ".vscode"];

/// Engine options for one copy job.
///
/// Uploads always overwrite existing remote entries, recurse into
/// directories and follow symbolic links; only the direction and the
/// exclusion set vary per job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOptions {
    pub direction: Direction,
    pub overwrite: bool,
    pub recursive: bool,
    pub follow_symlinks: bool,
    pub exclude_paths: Vec<String>,
}

impl TransferOptions {
    /// Options for an upload in the given direction, with no exclusions.
    pub fn upload(direction: Direction) -> Self {
        Self {
            direction,
            overwrite: true,
            recursive: true,
            follow_symlinks: true,
            exclude_paths: Vec::new(),
        }
    }

    /// Adds relative path prefixes to exclude from the job.
    pub fn exclude<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_paths
            .extend(prefixes.into_iter().map(Into::into));
        self
    }

    /// Renders the options as engine command-line flags.
    pub fn cli_args(&self) -> Vec<String> {
        let mut args = vec![format!("--from-to={}", self.direction.engine_pair())];
        if self.overwrite {
            args.push("--overwrite=true".to_string());
        }
        if self.recursive {
            args.push("--recursive".to_string());
        }
        if self.follow_symlinks {
            args.push("--follow-symlinks".to_string());
        }
        if !self.exclude_paths.is_empty() {
            args.push(format!("--exclude-path={}", self.exclude_paths.join(";")));
        }
        args
    }
}
