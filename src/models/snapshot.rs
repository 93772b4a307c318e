use std::collections::BTreeSet;
use std::ffi::{OsStr, OsString};
use std::path::Path;

use tokio::fs;

use crate::error::AppResult;

/// 某一时刻目录中的文件名集合，只用于做差集
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySnapshot {
    names: BTreeSet<OsString>,
}

impl DirectorySnapshot {
    /// 读取目录当前的全部条目名
    pub async fn capture(dir: &Path) -> AppResult<Self> {
        let mut names = BTreeSet::new();
        let mut entries = fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            names.insert(entry.file_name());
        }
        Ok(Self { names })
    }

    pub fn contains(&self, name: &OsStr) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_capture_lists_files_and_dirs() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("old.xlsx"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let snapshot = DirectorySnapshot::capture(dir.path()).await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains(OsStr::new("old.xlsx")));
        assert!(snapshot.contains(OsStr::new("nested")));
        assert!(!snapshot.contains(OsStr::new("new.xlsx")));
    }

    #[tokio::test]
    async fn test_capture_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let result = DirectorySnapshot::capture(&dir.path().join("missing")).await;
        assert!(result.is_err());
    }
}
