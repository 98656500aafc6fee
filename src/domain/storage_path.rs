use std::fmt;

use super::JobId;

/// Key of an object in the staging blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath(String);

impl StoragePath {
    pub fn audio(job_id: &JobId) -> Self {
        Self(format!("audio/{}", job_id))
    }

    pub fn metadata(job_id: &JobId) -> Self {
        Self(format!("metadata/{}.json", job_id))
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
