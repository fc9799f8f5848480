use clap::Parser;
use detect_batch::{cli, client, config, error, export, logging, scanner};
use cli::{Cli, Commands};
use client::DetectionClient;
use config::Config;
use detect_batch_common::{missing_from_results, Workflow, WorkflowState};
use error::{DetectError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Run { paths, output, recursive, base_url } => {
            println!("🔍 detect-batch - 一括検出\n");

            let config = Config::load()?;
            let base_url = config.resolve_base_url(base_url.as_deref())?;
            let client = DetectionClient::new(&base_url, config.timeout())?;

            // 1. 読み込み・ステージング
            println!("[1/3] 画像を読み込み中...");
            let files = scanner::load_raw_files(&paths, recursive)?;
            let total = files.len();

            let mut workflow = Workflow::new();
            let accepted = workflow.add_files(files);
            println!("✔ {}件中 {}枚をステージング\n", total, accepted);

            if workflow.staged().is_empty() {
                return Err(DetectError::NoImagesFound(describe_paths(&paths)));
            }

            // 2. 送信
            println!("[2/3] 検出サービスへ送信中... ({})", client.process_url());
            let spinner = processing_spinner(workflow.staged().len());
            workflow.submit(&client).await;
            spinner.finish_and_clear();

            let images = match workflow.state() {
                WorkflowState::Success(images) => images.clone(),
                WorkflowState::Error(message) => {
                    return Err(DetectError::Batch(message.clone()));
                }
                other => {
                    return Err(DetectError::Batch(format!(
                        "想定外の状態です: {}",
                        other.status().as_str()
                    )));
                }
            };

            println!("✔ {}枚の結果を受信", images.len());
            for image in &images {
                if image.has_preview() {
                    println!("  - {}", image.display_name);
                } else {
                    println!("  - {} (送信していないファイル名)", image.display_name);
                }
            }

            let missing: Vec<String> = missing_from_results(workflow.staged(), &images)
                .into_iter()
                .map(|s| s.display_name.clone())
                .collect();
            if !missing.is_empty() {
                println!("⚠ 結果が返らなかった画像: {}枚", missing.len());
                for name in &missing {
                    println!("  - {}", name);
                }
            }
            println!();

            // 3. 保存
            println!("[3/3] 結果を保存中...");
            let output_dir = output
                .or_else(|| config.output_dir.clone())
                .unwrap_or_else(|| PathBuf::from("."));
            let exported = export::export_results(&images, &output_dir)?;
            let failed: Vec<_> = exported.iter().filter(|e| e.error.is_some()).collect();
            if !failed.is_empty() {
                println!("⚠ 保存できなかった画像: {}枚", failed.len());
                for entry in &failed {
                    println!("  - {}: {}", entry.display_name, entry.error.as_deref().unwrap_or_default());
                }
            }
            let manifest = export::Manifest::new(
                client.base_url(),
                workflow.staged().len(),
                exported,
                missing,
            );
            let manifest_path = manifest.save(&output_dir)?;
            println!("✔ 結果を保存: {}", manifest_path.display());

            workflow.reset();
            println!("\n✅ 完了");
        }

        Commands::Stage { paths, recursive } => {
            println!("📋 detect-batch - 送信対象の確認\n");

            let files = scanner::load_raw_files(&paths, recursive)?;
            let total = files.len();

            let mut workflow = Workflow::new();
            let accepted = workflow.add_files(files);

            println!("送信対象: {}枚", accepted);
            for image in workflow.staged() {
                println!(
                    "  - {} [{}] {} bytes",
                    image.display_name,
                    image.media_type,
                    image.content.len()
                );
            }
            if total > accepted {
                println!("除外: {}件（画像以外または重複）", total - accepted);
            }

            workflow.reset();
        }

        Commands::Health { base_url } => {
            let config = Config::load()?;
            let base_url = config.resolve_base_url(base_url.as_deref())?;
            let client = DetectionClient::new(&base_url, config.timeout())?;

            let health = client.health().await?;
            let mark = if health.is_ok() { "✔" } else { "⚠" };
            println!("{} {}: {}", mark, client.base_url(), health.status);
            if !health.message.is_empty() {
                println!("  {}", health.message);
            }
        }

        Commands::Config { set_base_url, show } => {
            // 壊れた設定ファイルでも --set-base-url で上書きできる
            let mut config = if set_base_url.is_some() {
                Config::load_or_default(&Config::config_path()?)
            } else {
                Config::load()?
            };

            if let Some(url) = set_base_url {
                config.set_base_url(&url)?;
                println!("✔ 接続先を設定しました: {}", config.base_url);
            }

            if show {
                println!("設定:");
                println!("  接続先URL: {}", config.base_url);
                if let Ok(env_url) = std::env::var(config::BASE_URL_ENV) {
                    println!("  (環境変数 {} で上書き中: {})", config::BASE_URL_ENV, env_url);
                }
                match config.timeout_seconds {
                    Some(secs) if secs > 0 => println!("  タイムアウト: {}秒", secs),
                    _ => println!("  タイムアウト: なし"),
                }
                match &config.output_dir {
                    Some(dir) => println!("  出力先: {}", dir.display()),
                    None => println!("  出力先: カレントフォルダ"),
                }
            }
        }
    }

    Ok(())
}

fn processing_spinner(count: usize) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} ({elapsed})") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("{}枚を処理中", count));
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

fn describe_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
