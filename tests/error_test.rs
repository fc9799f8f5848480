//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use detect_batch::config::normalize_base_url;
use detect_batch::error::DetectError;
use detect_batch::scanner;
use detect_batch_common::SubmitError;
use std::path::PathBuf;
use tempfile::tempdir;

/// 存在しないパスを読み込んだ場合
#[test]
fn test_load_nonexistent_path() {
    let result = scanner::load_raw_files(&[PathBuf::from("/nonexistent/path/12345")], false);
    assert!(matches!(result, Err(DetectError::PathNotFound(_))));
}

/// 空のフォルダは空のVecを返す
#[test]
fn test_load_empty_folder() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = scanner::load_raw_files(&[dir.path().to_path_buf()], false);

    assert!(result.is_ok());
    assert!(result.unwrap().is_empty());
}

/// DetectErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        DetectError::Config("テスト設定エラー".to_string()),
        DetectError::PathNotFound("test.jpg".to_string()),
        DetectError::NoImagesFound("/path/to/folder".to_string()),
        DetectError::Batch("model unavailable".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// サービス由来のメッセージはそのまま表示される
#[test]
fn test_submit_error_conversion() {
    let err: DetectError = SubmitError::Service("model unavailable".to_string()).into();

    assert!(matches!(err, DetectError::Submit(_)));
    assert!(format!("{}", err).contains("model unavailable"));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: DetectError = io_err.into();

    assert!(matches!(err, DetectError::Io(_)));
    assert!(format!("{}", err).contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: DetectError = json_err.into();

    assert!(matches!(err, DetectError::JsonParse(_)));
}

/// common::Errorは透過的に表示される
#[test]
fn test_common_error_transparent() {
    let common_err = detect_batch_common::Error::Parse("not a data URI".to_string());
    let err: DetectError = common_err.into();

    assert!(matches!(err, DetectError::Common(_)));
    assert_eq!(format!("{}", err), "Parse error: not a data URI");
}

/// 不正な接続先URL
#[test]
fn test_invalid_base_url() {
    let err = normalize_base_url("ftp://example.com").unwrap_err();
    assert!(matches!(err, DetectError::Config(_)));
}
