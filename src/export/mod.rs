//! 検出結果の書き出し
//!
//! 結果画像の `data:` URI をデコードしてファイルに保存し、
//! 一覧を `results.json` にまとめる。

use crate::error::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use detect_batch_common::{split_data_uri, DisplayImage};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE_NAME: &str = "results.json";

/// 書き出した1画像分の情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedImage {
    pub id: String,
    pub display_name: String,
    /// 出力ファイル名（プレースホルダや保存失敗の場合はNone）
    pub output_file: Option<String>,
    /// 保存できなかった理由
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// results.json の中身
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub exported_at: String,
    pub service_url: String,
    pub submitted: usize,
    pub images: Vec<ExportedImage>,
    /// サービスが結果を返さなかったファイル
    pub missing: Vec<String>,
}

impl Manifest {
    pub fn new(service_url: &str, submitted: usize, images: Vec<ExportedImage>, missing: Vec<String>) -> Self {
        Self {
            exported_at: chrono::Local::now().to_rfc3339(),
            service_url: service_url.to_string(),
            submitted,
            images,
            missing,
        }
    }

    pub fn save(&self, output_dir: &Path) -> Result<PathBuf> {
        let path = output_dir.join(MANIFEST_FILE_NAME);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

/// MIMEタイプに対応する拡張子
pub fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/bmp" => "bmp",
        "image/webp" => "webp",
        "image/tiff" => "tif",
        _ => "bin",
    }
}

/// 出力ファイル名: `<元のファイル名の stem>_detected.<ext>`
pub fn output_file_name(display_name: &str, mime: &str) -> String {
    let stem = Path::new(display_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_string());
    format!("{}_detected.{}", stem, extension_for(mime))
}

/// 結果画像をデコードする
pub fn decode_preview(preview_ref: &str) -> Result<(String, Vec<u8>)> {
    let (mime, payload) = split_data_uri(preview_ref)?;
    let bytes = STANDARD.decode(payload)?;
    Ok((mime.to_string(), bytes))
}

/// 結果画像を出力フォルダへ保存する
///
/// 同名になる場合は連番を付ける。プレビューのないものは一覧にだけ載せる。
/// 1枚の失敗で中断せず、理由を `error` に残して残りを続ける。
pub fn export_results(images: &[DisplayImage], output_dir: &Path) -> Result<Vec<ExportedImage>> {
    std::fs::create_dir_all(output_dir)?;

    let mut used = HashSet::new();
    let mut exported = Vec::with_capacity(images.len());

    for image in images {
        let (output_file, error) = if image.has_preview() {
            match write_image(image, output_dir, &mut used) {
                Ok(name) => (Some(name), None),
                Err(e) => {
                    tracing::warn!(name = %image.display_name, error = %e, "result image not written");
                    (None, Some(e.to_string()))
                }
            }
        } else {
            (None, None)
        };

        exported.push(ExportedImage {
            id: image.id.clone(),
            display_name: image.display_name.clone(),
            output_file,
            error,
        });
    }

    Ok(exported)
}

fn write_image(image: &DisplayImage, output_dir: &Path, used: &mut HashSet<String>) -> Result<String> {
    let (mime, bytes) = decode_preview(&image.preview_ref)?;
    let name = unique_name(used, output_file_name(&image.display_name, &mime));
    std::fs::write(output_dir.join(&name), bytes)?;
    tracing::debug!(file = %name, "result image written");
    Ok(name)
}

fn unique_name(used: &mut HashSet<String>, name: String) -> String {
    if used.insert(name.clone()) {
        return name;
    }

    let path = Path::new(&name);
    let stem = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
    let ext = path.extension().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();

    let mut n = 2;
    loop {
        let candidate = format!("{}_{}.{}", stem, n, ext);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
