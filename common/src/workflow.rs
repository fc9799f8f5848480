//! バッチ送信ワークフロー（状態機械）
//!
//! ```text
//! Idle --追加--> Idle
//! Idle --送信(1件以上)--> Processing
//! Processing --成功--> Success(結果)
//! Processing --失敗--> Error(メッセージ)
//! Success/Error --リセット--> Idle
//! Error --追加--> Error
//! Error --送信--> Processing
//! ```
//!
//! 表示層はこの状態だけを見て描画する。

use crate::error::SubmitError;
use crate::preview::PreviewRegistry;
use crate::reconcile::reconcile;
use crate::staging::StagingStore;
use crate::types::{DisplayImage, ProcessedResult, RawFile, StagedImage};
use serde::Serialize;
use std::future::Future;

/// バッチを検出サービスへ送る処理
pub trait Submitter {
    fn submit(
        &self,
        staged: &[StagedImage],
    ) -> impl Future<Output = Result<Vec<ProcessedResult>, SubmitError>> + Send;
}

/// ワークフローの状態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WorkflowState {
    #[default]
    Idle,
    Processing,
    Success(Vec<DisplayImage>),
    Error(String),
}

impl WorkflowState {
    pub fn status(&self) -> Status {
        match self {
            WorkflowState::Idle => Status::Idle,
            WorkflowState::Processing => Status::Processing,
            WorkflowState::Success(_) => Status::Success,
            WorkflowState::Error(_) => Status::Error,
        }
    }

    /// Success / Error（ユーザー操作まで維持される）
    pub fn is_settled(&self) -> bool {
        matches!(self, WorkflowState::Success(_) | WorkflowState::Error(_))
    }

    pub fn results(&self) -> &[DisplayImage] {
        match self {
            WorkflowState::Success(images) => images,
            _ => &[],
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            WorkflowState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// 状態タグ（表示層向け）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Idle,
    Processing,
    Success,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Processing => "processing",
            Status::Success => "success",
            Status::Error => "error",
        }
    }
}

/// 1セッション分のワークフロー
#[derive(Debug, Default)]
pub struct Workflow {
    staging: StagingStore,
    state: WorkflowState,
    detail: Option<DisplayImage>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: PreviewRegistry) -> Self {
        Self {
            staging: StagingStore::new(registry),
            ..Self::default()
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn status(&self) -> Status {
        self.state.status()
    }

    pub fn staged(&self) -> &[StagedImage] {
        self.staging.entries()
    }

    /// ステージング段階の表示用画像
    pub fn staged_display(&self) -> Vec<DisplayImage> {
        self.staging.display_images()
    }

    pub fn results(&self) -> &[DisplayImage] {
        self.state.results()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.state.error_message()
    }

    pub fn registry(&self) -> &PreviewRegistry {
        self.staging.registry()
    }

    /// ファイルを追加（状態は変えない）
    pub fn add_files<I>(&mut self, files: I) -> usize
    where
        I: IntoIterator<Item = RawFile>,
    {
        let accepted = self.staging.add(files);
        tracing::debug!(accepted, staged = self.staging.len(), status = self.status().as_str(), "files added");
        accepted
    }

    /// 送信を開始し、送信対象のスナップショットを返す
    ///
    /// ステージングが空、または送信中なら何もせず `None`。
    pub fn begin_submit(&mut self) -> Option<Vec<StagedImage>> {
        if self.state == WorkflowState::Processing {
            tracing::debug!("submission already in flight; ignoring");
            return None;
        }
        if self.staging.is_empty() {
            tracing::debug!("nothing staged; ignoring submit");
            return None;
        }

        self.state = WorkflowState::Processing;
        tracing::info!(count = self.staging.len(), "batch submission started");
        Some(self.staging.entries().to_vec())
    }

    /// 送信結果を反映する
    ///
    /// `batch` は `begin_submit` が返したスナップショット。
    pub fn complete_submit(
        &mut self,
        batch: &[StagedImage],
        outcome: Result<Vec<ProcessedResult>, SubmitError>,
    ) {
        if self.state != WorkflowState::Processing {
            tracing::warn!(status = self.status().as_str(), "completion without a pending submission; ignoring");
            return;
        }

        self.state = match outcome {
            Ok(results) => {
                let images = reconcile(batch, &results);
                tracing::info!(submitted = batch.len(), returned = images.len(), "batch submission succeeded");
                WorkflowState::Success(images)
            }
            Err(err) => {
                tracing::warn!(error = %err, "batch submission failed");
                WorkflowState::Error(err.to_string())
            }
        };
    }

    /// 送信して結果が確定するまで待つ
    ///
    /// 送信を開始しなかった場合は `false`。
    pub async fn submit<S: Submitter>(&mut self, submitter: &S) -> bool {
        let Some(batch) = self.begin_submit() else {
            return false;
        };

        let outcome = submitter.submit(&batch).await;
        self.complete_submit(&batch, outcome);
        true
    }

    /// Idleに戻す（ステージング・結果・詳細表示をすべて破棄）
    ///
    /// 送信中は中断できないので何もしない。
    pub fn reset(&mut self) -> bool {
        if self.state == WorkflowState::Processing {
            tracing::debug!("cannot reset while processing");
            return false;
        }

        self.staging.clear();
        self.detail = None;
        self.state = WorkflowState::Idle;
        tracing::debug!("workflow reset");
        true
    }

    /// 詳細表示する画像を選ぶ（状態には影響しない）
    pub fn select_for_detail_view(&mut self, image: DisplayImage) {
        self.detail = Some(image);
    }

    pub fn close_detail_view(&mut self) {
        self.detail = None;
    }

    pub fn detail_view(&self) -> Option<&DisplayImage> {
        self.detail.as_ref()
    }
}
