//! プレビュー参照の管理
//!
//! ブラウザの Object URL に相当する `blob:` URL を発行する。
//! `PreviewRef` がドロップされた時点でレジストリから登録が外れる。

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

const BLOB_PREFIX: &str = "blob:detect-batch/";

/// `blob:` URL が指す中身
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSource {
    pub media_type: String,
    pub content: Arc<[u8]>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: u64,
    entries: HashMap<String, PreviewSource>,
}

/// ローカルプレビューのレジストリ
///
/// 複製しても同じレジストリを指す。
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// プレビューを登録してハンドルを返す
    pub fn create(&self, media_type: &str, content: Arc<[u8]>) -> PreviewRef {
        let url = {
            let mut inner = self.lock();
            inner.next_id += 1;
            let url = format!("{}{}", BLOB_PREFIX, inner.next_id);
            inner.entries.insert(
                url.clone(),
                PreviewSource {
                    media_type: media_type.to_string(),
                    content,
                },
            );
            url
        };

        PreviewRef {
            url,
            registry: self.clone(),
        }
    }

    /// URLを解決する（解放済みならNone）
    pub fn resolve(&self, url: &str) -> Option<PreviewSource> {
        self.lock().entries.get(url).cloned()
    }

    /// 現在保持しているプレビュー数
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, url: &str) {
        if self.lock().entries.remove(url).is_some() {
            tracing::trace!(url, "preview released");
        }
    }
}

/// 登録済みプレビューの所有ハンドル
pub struct PreviewRef {
    url: String,
    registry: PreviewRegistry,
}

impl PreviewRef {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Debug for PreviewRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PreviewRef").field(&self.url).finish()
    }
}

impl Drop for PreviewRef {
    fn drop(&mut self) {
        self.registry.release(&self.url);
    }
}
