//! Network namespace identity: is a path the plugin's own namespace?

use cni_types::{CniError, ErrorCode};

/// Answers whether a namespace path names the namespace the plugin itself
/// is running in.
pub trait NamespaceIdentity {
    /// Returns `true` if `netns` is the calling thread's network namespace.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::InvalidNetNs`] if either namespace cannot be
    /// inspected.
    fn is_current(&self, netns: &str) -> Result<bool, CniError>;
}

/// Compares namespace files by device and inode.
///
/// On non-Linux targets no path is ever the current namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadNetNs;

#[cfg(target_os = "linux")]
impl ThreadNetNs {
    /// The calling thread's network namespace.
    const SELF_PATH: &'static str = "/proc/thread-self/ns/net";

    fn identity(path: &str) -> std::io::Result<(u64, u64)> {
        use std::os::unix::fs::MetadataExt;

        let meta = std::fs::metadata(path)?;
        Ok((meta.dev(), meta.ino()))
    }
}

#[cfg(target_os = "linux")]
impl NamespaceIdentity for ThreadNetNs {
    fn is_current(&self, netns: &str) -> Result<bool, CniError> {
        if netns.is_empty() {
            return Ok(false);
        }
        let plugin_ns = Self::identity(Self::SELF_PATH).map_err(|_| {
            CniError::new(ErrorCode::InvalidNetNs, "get plugin's netns failed")
        })?;
        let target_ns = Self::identity(netns).map_err(|e| {
            CniError::new(ErrorCode::InvalidNetNs, "get netns failed").with_details(e.to_string())
        })?;
        Ok(plugin_ns == target_ns)
    }
}

#[cfg(not(target_os = "linux"))]
impl NamespaceIdentity for ThreadNetNs {
    fn is_current(&self, _netns: &str) -> Result<bool, CniError> {
        Ok(false)
    }
}

/// A namespace identity with a fixed answer, for tests.
#[derive(Debug, Clone, Default)]
pub struct FakeNamespaceIdentity {
    current: Option<String>,
    failure: Option<CniError>,
}

impl FakeNamespaceIdentity {
    /// A fake for which no path is the current namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `path` as the plugin's own namespace.
    #[must_use]
    pub fn with_current(mut self, path: impl Into<String>) -> Self {
        self.current = Some(path.into());
        self
    }

    /// Fail every query with `err`.
    #[must_use]
    pub fn with_failure(mut self, err: CniError) -> Self {
        self.failure = Some(err);
        self
    }
}

impl NamespaceIdentity for FakeNamespaceIdentity {
    fn is_current(&self, netns: &str) -> Result<bool, CniError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        Ok(self.current.as_deref() == Some(netns))
    }
}
