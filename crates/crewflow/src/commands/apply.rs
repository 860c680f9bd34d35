use crate::setup;
use colored::Colorize;
use crewflow_core::Roster;
use crewflow_engine::{CycleStatus, OpClass};
use std::path::Path;

/// ロスターをPDSに適用する
///
/// 状態ファイルをロックし、アカウントごとに作成または更新サイクルを
/// 実行する。部分的に失敗しても成功したフィールドは状態に記録される。
pub async fn handle(
    roster: &Roster,
    project_root: &Path,
    name: Option<&str>,
    yes: bool,
) -> anyhow::Result<()> {
    println!("{}", "ロスターを適用します...".blue().bold());

    let targets = setup::target_accounts(roster, name)?;

    // 確認（--yesが指定されていない場合）
    if !yes {
        println!();
        println!("{}", format!("対象アカウント ({} 個):", targets.len()).bold());
        for entry in &targets {
            println!("  • {} ({})", entry.name.cyan(), entry.handle);
        }
        println!();
        println!("{}", "警告: PDS上のアカウントを作成・更新します。".yellow());
        println!("実行するには --yes オプションを指定してください");
        return Ok(());
    }

    let reconciler = setup::build_reconciler(roster)?;
    let store = setup::open_store(project_root);
    let lock = store.acquire_lock().await?;
    let mut state = store.load().await?;

    let mut failed = 0usize;
    for entry in &targets {
        let spec = setup::resolve_spec(entry);
        println!();
        println!("{} {}", "▶".cyan(), entry.name.bold());

        let report = match state.get(&entry.name) {
            None => {
                // 作成前のプリフライト検証
                let validation = reconciler.validate(&spec, OpClass::Create);
                for warning in &validation.warnings {
                    println!("  {} {}", "⚠".yellow(), warning);
                }
                if !validation.is_ok() {
                    for error in &validation.errors {
                        eprintln!("  {} {}", "✗".red().bold(), error);
                    }
                    failed += 1;
                    continue;
                }
                reconciler.create(&spec).await
            }
            Some(current) => reconciler.update(&spec, current).await,
        };

        match report {
            Ok(report) => {
                for notice in &report.notices {
                    println!("  {} {}", "ℹ".cyan(), notice);
                }
                for error in &report.errors {
                    println!("  {} {}", "⚠".yellow(), error);
                }
                match report.status {
                    CycleStatus::Converged => {
                        println!("  {} {} は同期されました", "✓".green().bold(), entry.name.cyan());
                    }
                    CycleStatus::Degraded => {
                        println!(
                            "  {} {} は一部のみ適用されました",
                            "⚠".yellow().bold(),
                            entry.name.cyan()
                        );
                        failed += 1;
                    }
                }
                // 成功した分だけを状態に記録
                if let Some(new_state) = report.state {
                    state.set(entry.name.clone(), new_state);
                }
            }
            Err(e) => {
                eprintln!("  {} {}", "✗".red().bold(), e);
                failed += 1;
            }
        }
    }

    store.save(&state).await?;
    lock.release().await?;

    println!();
    if failed > 0 {
        eprintln!(
            "{}",
            format!("✗ {}個のアカウントでエラーが発生しました", failed)
                .red()
                .bold()
        );
        std::process::exit(1);
    }

    println!("{}", "✓ すべてのアカウントが同期されました！".green().bold());
    Ok(())
}
