mod commands;
mod setup;

use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Parser)]
#[command(name = "crew")]
#[command(about = "宣言する。揃う。アカウント管理は、ロスターになった。", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 適用される変更を表示（リモートには触れない）
    Plan {
        /// アカウント名（省略時は全アカウント）
        name: Option<String>,
    },
    /// ロスターをPDSに適用
    Apply {
        /// アカウント名（省略時は全アカウント）
        name: Option<String>,
        /// 確認なしで実行
        #[arg(short, long)]
        yes: bool,
    },
    /// アカウントの状態を表示
    Status {
        /// アカウント名（省略時は全アカウント）
        name: Option<String>,
    },
    /// アカウントを削除
    Rm {
        /// アカウント名
        name: String,
        /// 確認なしで実行
        #[arg(short, long)]
        yes: bool,
    },
    /// 設定を検証
    Validate,
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::init();

    // Versionコマンドは設定ファイル不要
    if matches!(cli.command, Commands::Version) {
        println!("crewflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Validateコマンドは独自のエラー表示を持つ
    if matches!(cli.command, Commands::Validate) {
        return commands::validate::handle().await;
    }

    // プロジェクトルートを検索
    let project_root = match crewflow_core::find_project_root() {
        Ok(root) => root,
        Err(e) => {
            eprintln!("{}", "✗ プロジェクトルートが見つかりません".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    let roster = crewflow_core::load_roster_from_root(&project_root)?;

    match cli.command {
        Commands::Plan { name } => {
            commands::plan::handle(&roster, &project_root, name.as_deref()).await
        }
        Commands::Apply { name, yes } => {
            commands::apply::handle(&roster, &project_root, name.as_deref(), yes).await
        }
        Commands::Status { name } => {
            commands::status::handle(&roster, &project_root, name.as_deref()).await
        }
        Commands::Rm { name, yes } => commands::rm::handle(&roster, &project_root, &name, yes).await,
        Commands::Validate | Commands::Version => unreachable!(),
    }
}
