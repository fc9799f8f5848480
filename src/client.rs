//! 検出サービスクライアント
//!
//! ステージング済み画像を1つのmultipartリクエストにまとめて
//! `POST {base-url}/api/process` へ送る。

use crate::error::{DetectError, Result};
use detect_batch_common::{
    interpret_health, interpret_response, HealthStatus, ProcessedResult, StagedImage, SubmitError,
    Submitter,
};
use reqwest::multipart::{Form, Part};
use std::time::Duration;

pub const PROCESS_PATH: &str = "/api/process";
/// 画像を添付するフィールド名（全パート共通）
pub const FILES_FIELD: &str = "files";

#[derive(Debug, Clone)]
pub struct DetectionClient {
    http: reqwest::Client,
    base_url: String,
}

impl DetectionClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| DetectError::Config(format!("HTTPクライアントを作成できません: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn process_url(&self) -> String {
        format!("{}{}", self.base_url, PROCESS_PATH)
    }

    /// ルートエンドポイントで稼働状況を確認
    pub async fn health(&self) -> std::result::Result<HealthStatus, SubmitError> {
        let url = format!("{}/", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        let (status, body) = read_body(response).await?;
        interpret_health(status, &body)
    }
}

/// ステータスとボディを読む
///
/// エラー応答ならボディが読めなくても空として続行する。成功応答で読めなければ Transport。
async fn read_body(response: reqwest::Response) -> std::result::Result<(u16, String), SubmitError> {
    let status = response.status();
    match response.text().await {
        Ok(body) => Ok((status.as_u16(), body)),
        Err(_) if !status.is_success() => Ok((status.as_u16(), String::new())),
        Err(e) => Err(SubmitError::Transport(e.to_string())),
    }
}

/// multipartフォームを組み立てる
///
/// 各パートのファイル名は元のファイル名、Content-Typeは申告されたメディアタイプ。
pub fn build_form(staged: &[StagedImage]) -> Form {
    staged.iter().fold(Form::new(), |form, entry| {
        form.part(FILES_FIELD, image_part(entry))
    })
}

fn image_part(entry: &StagedImage) -> Part {
    let part = Part::bytes(entry.content.to_vec()).file_name(entry.display_name.clone());
    match part.mime_str(&entry.media_type) {
        Ok(part) => part,
        Err(_) => {
            tracing::warn!(name = %entry.display_name, media_type = %entry.media_type, "invalid media type; sending without one");
            Part::bytes(entry.content.to_vec()).file_name(entry.display_name.clone())
        }
    }
}

impl Submitter for DetectionClient {
    async fn submit(
        &self,
        staged: &[StagedImage],
    ) -> std::result::Result<Vec<ProcessedResult>, SubmitError> {
        let url = self.process_url();
        let bytes: usize = staged.iter().map(|s| s.content.len()).sum();
        tracing::debug!(%url, files = staged.len(), bytes, "sending batch");

        let response = self
            .http
            .post(&url)
            .multipart(build_form(staged))
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        tracing::debug!(status = response.status().as_u16(), "detection service responded");

        let (status, body) = read_body(response).await?;
        interpret_response(status, &body)
    }
}
