//! ワークフローで扱う型定義
//!
//! - RawFile: 選択・ドロップされたファイル（フィルタ前）
//! - StagedImage: ステージングされた送信待ち画像
//! - ProcessedResult: 検出サービスのレスポンス要素
//! - DisplayImage: 表示層へ渡す画像

use crate::preview::PreviewRef;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// ファイル選択・ドラッグ&ドロップで渡される入力
#[derive(Debug, Clone, Default)]
pub struct RawFile {
    pub name: String,
    /// 申告されたメディアタイプ（例: "image/png"）
    pub media_type: String,
    /// 最終更新時刻（UNIXエポックからのミリ秒）
    pub last_modified: i64,
    pub content: Vec<u8>,
}

impl RawFile {
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    /// 重複判定用ID（ファイル名 + 更新時刻）
    ///
    /// 同名・同時刻の別ファイルは同一とみなされる。
    pub fn staging_id(&self) -> String {
        staging_id(&self.name, self.last_modified)
    }
}

pub fn staging_id(name: &str, last_modified: i64) -> String {
    format!("{}-{}", name, last_modified)
}

/// ステージング済み画像
///
/// 複製はプレビューを共有し、最後の複製が破棄された時点で解放される。
#[derive(Debug, Clone)]
pub struct StagedImage {
    pub id: String,
    pub display_name: String,
    pub media_type: String,
    pub content: Arc<[u8]>,
    pub(crate) preview: Arc<PreviewRef>,
}

impl StagedImage {
    pub fn preview_url(&self) -> &str {
        self.preview.url()
    }

    /// ステージング段階の表示用画像
    pub fn to_display(&self) -> DisplayImage {
        DisplayImage {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
            preview_ref: self.preview_url().to_string(),
        }
    }
}

/// 検出サービスが返す1画像分の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedResult {
    pub filename: String,
    pub processed_image_b64: String,
    pub content_type: String,
}

impl ProcessedResult {
    /// `data:<mime>;base64,<payload>` 形式のURI
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, self.processed_image_b64)
    }
}

/// 表示層へ渡す画像
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayImage {
    pub id: String,
    pub display_name: String,
    /// `blob:` URL、`data:` URI、または空文字（プレースホルダ）
    pub preview_ref: String,
}

impl DisplayImage {
    pub fn has_preview(&self) -> bool {
        !self.preview_ref.is_empty()
    }
}

/// 検出サービスのルートエンドポイントの応答
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
