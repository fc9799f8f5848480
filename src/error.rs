use detect_batch_common::SubmitError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルまたはフォルダが見つかりません: {0}")]
    PathNotFound(String),

    #[error("送信できる画像がありません: {0}")]
    NoImagesFound(String),

    #[error("バッチ処理に失敗しました: {0}")]
    Batch(String),

    #[error("検出サービスとの通信に失敗: {0}")]
    Submit(#[from] SubmitError),

    #[error("Base64デコードエラー: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] detect_batch_common::Error),
}

pub type Result<T> = std::result::Result<T, DetectError>;
