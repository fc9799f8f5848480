//! 検出サービスのレスポンスパーサー
//!
//! HTTPステータスとボディから送信結果を判定する。
//! 通信処理とは切り離してあるのでネットワークなしでテストできる。

use crate::error::{self, Error, SubmitError};
use crate::types::{HealthStatus, ProcessedResult};
use serde_json::Value;

/// ステータスとボディから送信結果を判定
///
/// - 2xx: JSON配列としてパース（失敗は `Protocol`）
/// - それ以外: `{ "detail": ... }` からメッセージを取り出す（失敗時は汎用メッセージ）
pub fn interpret_response(status: u16, body: &str) -> Result<Vec<ProcessedResult>, SubmitError> {
    if !is_success(status) {
        return Err(service_error(status, body));
    }
    parse_process_response(body)
}

/// 成功レスポンスのボディをパース
pub fn parse_process_response(body: &str) -> Result<Vec<ProcessedResult>, SubmitError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| SubmitError::Protocol(format!("body is not valid JSON: {}", e)))?;

    if !value.is_array() {
        return Err(SubmitError::Protocol("expected a JSON array of results".into()));
    }

    serde_json::from_value(value)
        .map_err(|e| SubmitError::Protocol(format!("malformed result entry: {}", e)))
}

/// エラーボディからメッセージを取り出す
///
/// FastAPIの検証エラー（`detail` が配列）は各要素の `msg` を連結する。
pub fn parse_error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = match value.get("detail")? {
        Value::String(detail) => detail.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("; "),
        _ => return None,
    };

    if message.is_empty() {
        None
    } else {
        Some(message)
    }
}

/// 非2xxレスポンスを `SubmitError::Service` に変換
pub fn service_error(status: u16, body: &str) -> SubmitError {
    let message = parse_error_detail(body)
        .unwrap_or_else(|| format!("server responded with status {}", status));
    SubmitError::Service(message)
}

/// ルートエンドポイントの応答をパース
pub fn interpret_health(status: u16, body: &str) -> Result<HealthStatus, SubmitError> {
    if !is_success(status) {
        return Err(service_error(status, body));
    }
    serde_json::from_str(body)
        .map_err(|e| SubmitError::Protocol(format!("malformed health response: {}", e)))
}

/// `data:<mime>;base64,<payload>` を (MIMEタイプ, Base64データ) に分解
pub fn split_data_uri(uri: &str) -> error::Result<(&str, &str)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| Error::Parse(format!("not a data URI: {}", truncate(uri))))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::Parse("data URI has no payload".into()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| Error::Parse("data URI is not base64-encoded".into()))?;
    Ok((mime, payload))
}

fn truncate(s: &str) -> &str {
    match s.char_indices().nth(32) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}
