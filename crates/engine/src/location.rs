//! Transfer endpoint descriptors.
//!
//! Locations are immutable value objects built fresh for each transfer.
//! A local source may be a wildcard pattern covering all children of a
//! directory; remote destinations are never patterns.

use std::path::MAIN_SEPARATOR;

/// Glob suffix appended to a directory path so the engine expands it into
/// one sub-transfer per child. The engine matches dotfiles with `*`;
/// metadata directories are kept out via `TransferOptions::exclude_paths`.
const GLOB_SUFFIX: char = '*';

/// One endpoint of a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A path on the local filesystem.
    Local {
        path: String,
        /// Whether `path` is an all-children pattern rather than a single file.
        wildcard: bool,
    },
    /// A path inside a remote resource, authorized by a short-lived token.
    Remote {
        resource_uri: String,
        token: String,
        path: String,
        wildcard: bool,
    },
}

impl Location {
    /// A single local file.
    pub fn local(path: impl Into<String>) -> Self {
        Self::Local {
            path: path.into(),
            wildcard: false,
        }
    }

    /// All children of a local directory.
    ///
    /// The separator is inserted only when the directory path does not
    /// already end in one, so `/data` and `/data/` both yield `/data/*`.
    pub fn local_directory(directory_path: impl Into<String>) -> Self {
        let mut path = directory_path.into();
        if !path.ends_with(MAIN_SEPARATOR) {
            path.push(MAIN_SEPARATOR);
        }
        path.push(GLOB_SUFFIX);
        Self::Local {
            path,
            wildcard: true,
        }
    }

    /// A destination path inside a remote resource.
    ///
    /// The path is normalized to always start with `/`.
    pub fn remote(
        resource_uri: impl Into<String>,
        token: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        Self::Remote {
            resource_uri: resource_uri.into(),
            token: token.into(),
            path,
            wildcard: false,
        }
    }

    /// Whether this location is an all-children directory pattern.
    pub fn is_wildcard(&self) -> bool {
        match self {
            Self::Local { wildcard, .. } | Self::Remote { wildcard, .. } => *wildcard,
        }
    }

    /// Renders the location as a single engine command-line argument.
    ///
    /// Remote locations carry their authorization token in the query
    /// string, the way the engine expects signed URLs.
    pub fn as_engine_arg(&self) -> String {
        match self {
            Self::Local { path, .. } => path.clone(),
            Self::Remote {
                resource_uri,
                token,
                path,
                ..
            } => {
                let token = token.trim_start_matches('?');
                format!("{resource_uri}{path}?{token}")
            }
        }
    }
}
