use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "detect-batch")]
#[command(about = "画像をまとめて検出サービスへ送信し、結果を画像ごとに保存するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像を送信して結果を保存
    Run {
        /// 画像ファイルまたはフォルダ（複数指定可）
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// 結果の出力フォルダ（デフォルト: 設定値またはカレント）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,

        /// 検出サービスのURL
        #[arg(long)]
        base_url: Option<String>,
    },

    /// 送信対象を確認（送信はしない）
    Stage {
        /// 画像ファイルまたはフォルダ（複数指定可）
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,
    },

    /// 検出サービスの稼働確認
    Health {
        /// 検出サービスのURL
        #[arg(long)]
        base_url: Option<String>,
    },

    /// 設定を表示/編集
    Config {
        /// 検出サービスのURLを設定
        #[arg(long)]
        set_base_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from(["detect-batch", "run", "a.jpg", "photos", "-o", "out", "-r", "-v"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Run { paths, output, recursive, base_url } => {
                assert_eq!(paths, vec![PathBuf::from("a.jpg"), PathBuf::from("photos")]);
                assert_eq!(output, Some(PathBuf::from("out")));
                assert!(recursive);
                assert!(base_url.is_none());
            }
            _ => panic!("runとして解析されるはず"),
        }
    }

    #[test]
    fn test_run_requires_paths() {
        assert!(Cli::try_parse_from(["detect-batch", "run"]).is_err());
    }
}
