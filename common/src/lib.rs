//! detect-batch common library
//!
//! 画像バッチ送信ワークフローの中核（I/Oなし）:
//! ステージング、レスポンス解析、結果の突き合わせ、状態機械

pub mod error;
pub mod parser;
pub mod preview;
pub mod reconcile;
pub mod staging;
pub mod types;
pub mod workflow;

pub use error::{Error, Result, SubmitError};
pub use parser::{
    interpret_health, interpret_response, parse_error_detail, parse_process_response, split_data_uri,
};
pub use preview::{PreviewRef, PreviewRegistry, PreviewSource};
pub use reconcile::{missing_from_results, reconcile};
pub use staging::StagingStore;
pub use types::{DisplayImage, HealthStatus, ProcessedResult, RawFile, StagedImage};
pub use workflow::{Status, Submitter, Workflow, WorkflowState};
