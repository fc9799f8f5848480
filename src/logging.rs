//! ログ初期化
//!
//! `RUST_LOG` があればそれに従う。`--verbose` 指定時は debug まで出す。
//! 出力先は標準エラー（標準出力は進捗表示用）。

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "detect_batch=info,detect_batch_common=info";
const VERBOSE_LOG_FILTER: &str = "detect_batch=debug,detect_batch_common=debug";

pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .try_init();

    if let Err(e) = result {
        eprintln!("ログの初期化に失敗: {}", e);
    }
}
