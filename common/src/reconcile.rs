//! 検出結果の突き合わせ
//!
//! 順不同で返ってくる結果配列を、送信した画像にファイル名で対応付ける。

use crate::types::{DisplayImage, ProcessedResult, StagedImage};
use std::collections::HashMap;

/// 結果をステージング済み画像に対応付けて表示用画像を作る
///
/// - 出力順は `results` の順（送信順ではない）
/// - 同名のステージング画像が複数ある場合は先に追加された方に対応付ける
/// - 未知のファイル名は `"<filename>-<index>"` のIDと空プレビューで補う
/// - サービスが落とした画像は出力に含まれない
pub fn reconcile(staged: &[StagedImage], results: &[ProcessedResult]) -> Vec<DisplayImage> {
    let mut by_name: HashMap<&str, &StagedImage> = HashMap::with_capacity(staged.len());
    for entry in staged {
        by_name.entry(entry.display_name.as_str()).or_insert(entry);
    }

    results
        .iter()
        .enumerate()
        .map(|(index, result)| match by_name.get(result.filename.as_str()) {
            Some(entry) => DisplayImage {
                id: entry.id.clone(),
                display_name: entry.display_name.clone(),
                preview_ref: result.data_uri(),
            },
            None => {
                tracing::warn!(filename = %result.filename, index, "result does not match any submitted file");
                DisplayImage {
                    id: format!("{}-{}", result.filename, index),
                    display_name: result.filename.clone(),
                    preview_ref: String::new(),
                }
            }
        })
        .collect()
}

/// 突き合わせ結果に現れなかった（サービスが落とした）ステージング画像
///
/// サービスはファイル名しか返さないので、件数をファイル名ごとに数える。
/// 同名の画像が複数あれば、返ってきた件数だけ先に追加された方から埋める。
pub fn missing_from_results<'a>(
    staged: &'a [StagedImage],
    images: &[DisplayImage],
) -> Vec<&'a StagedImage> {
    let mut returned: HashMap<&str, usize> = HashMap::new();
    for image in images.iter().filter(|i| i.has_preview()) {
        *returned.entry(image.display_name.as_str()).or_default() += 1;
    }

    staged
        .iter()
        .filter(|entry| match returned.get_mut(entry.display_name.as_str()) {
            Some(count) if *count > 0 => {
                *count -= 1;
                false
            }
            _ => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::StagingStore;
    use crate::types::RawFile;

    fn store_with(names: &[(&str, i64)]) -> StagingStore {
        let mut store = StagingStore::default();
        store.add(names.iter().map(|(name, mtime)| RawFile {
            name: name.to_string(),
            media_type: "image/png".to_string(),
            last_modified: *mtime,
            content: vec![0],
        }));
        store
    }

    fn result(name: &str, payload: &str) -> ProcessedResult {
        ProcessedResult {
            filename: name.to_string(),
            processed_image_b64: payload.to_string(),
            content_type: "image/jpeg".to_string(),
        }
    }

    #[test]
    fn test_output_follows_results_order() {
        let store = store_with(&[("a.png", 1), ("b.png", 1)]);
        let results = vec![result("b.png", "Qg=="), result("a.png", "QQ==")];

        let images = reconcile(store.entries(), &results);

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].id, "b.png-1");
        assert_eq!(images[0].preview_ref, "data:image/jpeg;base64,Qg==");
        assert_eq!(images[1].id, "a.png-1");
        assert_eq!(images[1].preview_ref, "data:image/jpeg;base64,QQ==");
    }

    #[test]
    fn test_unknown_filename_gets_fallback() {
        let store = store_with(&[("a.png", 1)]);
        let results = vec![result("a.png", "QQ=="), result("ghost.png", "Rw==")];

        let images = reconcile(store.entries(), &results);

        assert_eq!(images.len(), results.len());
        assert_eq!(images[1].id, "ghost.png-1");
        assert_eq!(images[1].display_name, "ghost.png");
        assert!(!images[1].has_preview());
    }

    #[test]
    fn test_dropped_inputs_are_absent() {
        let store = store_with(&[("a.png", 1), ("b.png", 1), ("c.png", 1)]);
        let results = vec![result("c.png", "Qw==")];

        let images = reconcile(store.entries(), &results);

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].display_name, "c.png");

        let missing: Vec<_> = missing_from_results(store.entries(), &images)
            .into_iter()
            .map(|e| e.display_name.as_str())
            .collect();
        assert_eq!(missing, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_duplicate_staged_names_match_first_added() {
        let store = store_with(&[("a.png", 1), ("a.png", 2)]);
        let images = reconcile(store.entries(), &[result("a.png", "QQ==")]);

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].id, "a.png-1");
    }

    #[test]
    fn test_same_name_from_two_folders_is_not_missing() {
        let store = store_with(&[("a.png", 1), ("a.png", 2), ("b.png", 1)]);
        let results = vec![result("a.png", "MQ=="), result("a.png", "Mg==")];

        let images = reconcile(store.entries(), &results);
        let missing: Vec<_> = missing_from_results(store.entries(), &images)
            .into_iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(missing, vec!["b.png-1"]);

        let images = reconcile(store.entries(), &results[..1]);
        let missing: Vec<_> = missing_from_results(store.entries(), &images)
            .into_iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(missing, vec!["a.png-2", "b.png-1"]);
    }

    #[test]
    fn test_duplicate_result_names_share_staged_id() {
        let store = store_with(&[("a.png", 1)]);
        let results = vec![result("a.png", "MQ=="), result("a.png", "Mg==")];

        let images = reconcile(store.entries(), &results);

        assert_eq!(images.len(), 2);
        assert!(images.iter().all(|i| i.id == "a.png-1"));
        assert_eq!(images[1].preview_ref, "data:image/jpeg;base64,Mg==");
    }

    #[test]
    fn test_empty_results() {
        let store = store_with(&[("a.png", 1)]);
        assert!(reconcile(store.entries(), &[]).is_empty());
    }
}
