//! ステージングストア
//!
//! 送信前に選択された画像を保持する。IDの重複は許さない（先着優先）。
//! 受け入れた画像ごとにプレビューを1つ確保し、`clear()` で解放する。

use crate::preview::PreviewRegistry;
use crate::types::{DisplayImage, RawFile, StagedImage};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct StagingStore {
    registry: PreviewRegistry,
    entries: Vec<StagedImage>,
    ids: HashSet<String>,
}

impl StagingStore {
    pub fn new(registry: PreviewRegistry) -> Self {
        Self {
            registry,
            entries: Vec::new(),
            ids: HashSet::new(),
        }
    }

    /// ファイルを追加し、受け入れた件数を返す
    ///
    /// 画像以外は黙って捨てる。既存IDと同じものは追加しない。
    pub fn add<I>(&mut self, files: I) -> usize
    where
        I: IntoIterator<Item = RawFile>,
    {
        let mut accepted = 0;

        for file in files {
            if !file.is_image() {
                tracing::debug!(name = %file.name, media_type = %file.media_type, "skipping non-image file");
                continue;
            }

            let id = file.staging_id();
            if self.ids.contains(&id) {
                tracing::debug!(%id, "skipping duplicate file");
                continue;
            }

            let content: Arc<[u8]> = Arc::from(file.content);
            let preview = self.registry.create(&file.media_type, Arc::clone(&content));

            self.ids.insert(id.clone());
            self.entries.push(StagedImage {
                id,
                display_name: file.name,
                media_type: file.media_type,
                content,
                preview: Arc::new(preview),
            });
            accepted += 1;
        }

        accepted
    }

    /// 全件削除（プレビューも解放）
    pub fn clear(&mut self) {
        self.entries.clear();
        self.ids.clear();
    }

    pub fn entries(&self) -> &[StagedImage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// ステージング段階の表示用画像
    pub fn display_images(&self) -> Vec<DisplayImage> {
        self.entries.iter().map(StagedImage::to_display).collect()
    }

    pub fn registry(&self) -> &PreviewRegistry {
        &self.registry
    }
}
