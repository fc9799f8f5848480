//! ファイル読み込み
//!
//! 指定されたファイル・フォルダから `RawFile` を作る。
//! 画像かどうかの判定はステージング側で行う。画像以外は中身を読まず、
//! 空の `RawFile` としてそのまま渡す。

use crate::error::{DetectError, Result};
use detect_batch_common::RawFile;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

const OCTET_STREAM: &str = "application/octet-stream";

/// 拡張子からメディアタイプを推定
pub fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "txt" => "text/plain",
        "json" => "application/json",
        "pdf" => "application/pdf",
        _ => OCTET_STREAM,
    }
}

/// パスを展開してファイル一覧にする
///
/// フォルダはファイル名順に並べる。ファイル指定は指定順のまま。
pub fn collect_paths(paths: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if !path.exists() {
            return Err(DetectError::PathNotFound(path.display().to_string()));
        }

        if path.is_file() {
            files.push(path.clone());
            continue;
        }

        let mut found: Vec<PathBuf> = WalkDir::new(path)
            .max_depth(if recursive { usize::MAX } else { 1 })
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();

        found.sort_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.cmp(b)));
        files.extend(found);
    }

    Ok(files)
}

/// 1ファイルを読み込む
///
/// 画像以外は中身を読まない（読めないファイルや巨大な動画で止まらないように）。
pub fn load_raw_file(path: &Path) -> Result<RawFile> {
    let media_type = media_type_for(path);
    let content = if media_type.starts_with("image/") {
        std::fs::read(path)?
    } else {
        tracing::debug!(path = %path.display(), media_type, "skipping content of non-image file");
        Vec::new()
    };
    let last_modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(RawFile {
        name,
        media_type: media_type.to_string(),
        last_modified,
        content,
    })
}

/// パスを展開して全ファイルを読み込む
pub fn load_raw_files(paths: &[PathBuf], recursive: bool) -> Result<Vec<RawFile>> {
    collect_paths(paths, recursive)?
        .iter()
        .map(|p| load_raw_file(p))
        .collect()
}
