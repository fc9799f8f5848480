//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

/// バッチ送信の失敗
///
/// ワークフローではどれも `Error(message)` に畳み込まれる。
/// 区別はメッセージ文言の組み立てにだけ使う。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// サービスがバッチを明示的に拒否した（メッセージはサービス由来）
    #[error("{0}")]
    Service(String),

    /// レスポンスが期待した形式ではない
    #[error("unexpected response from detection service: {0}")]
    Protocol(String),

    /// レスポンスを受け取れなかった
    #[error("could not reach detection service: {0}")]
    Transport(String),
}
