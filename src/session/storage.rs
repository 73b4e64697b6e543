//! セッションの永続化先

use crate::error::Result;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::sync::Mutex;

/// 文字列キー/値の永続ストレージ
///
/// 複数キーの書き込み・削除は1回の操作でまとめて行う。
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_items(&self, items: &[(&str, &str)]) -> Result<()>;
    fn remove_items(&self, keys: &[&str]) -> Result<()>;
}

/// JSONファイル1つにキー/値を保存する
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if entries.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path)?;
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(writer, entries)?;
        Ok(())
    }

    /// 壊れたファイルは空として扱って上書きする
    fn read_entries_or_empty(&self) -> BTreeMap<String, String> {
        match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("セッションファイルを読み込めません ({}): {}", self.path.display(), e);
                BTreeMap::new()
            }
        }
    }
}

impl SessionStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.read_entries()?.get(key).cloned())
    }

    fn set_items(&self, items: &[(&str, &str)]) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.read_entries_or_empty();
        for (key, value) in items {
            entries.insert((*key).to_string(), (*value).to_string());
        }
        self.write_entries(&entries)
    }

    fn remove_items(&self, keys: &[&str]) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.read_entries_or_empty();
        for key in keys {
            entries.remove(*key);
        }
        self.write_entries(&entries)
    }
}

/// プロセス内だけのストレージ（テスト・一時実行用）
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: &[(&str, &str)]) -> Self {
        let storage = Self::new();
        for (key, value) in items {
            storage.entries_mut().insert((*key).to_string(), (*value).to_string());
        }
        storage
    }

    pub fn len(&self) -> usize {
        self.entries_mut().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries_mut(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries_mut().get(key).cloned())
    }

    fn set_items(&self, items: &[(&str, &str)]) -> Result<()> {
        let mut entries = self.entries_mut();
        for (key, value) in items {
            entries.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_items(&self, keys: &[&str]) -> Result<()> {
        let mut entries = self.entries_mut();
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}
