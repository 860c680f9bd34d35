use crate::setup;
use colored::Colorize;
use crewflow_core::Roster;
use crewflow_engine::{EngineError, GatewayError};
use std::path::Path;

/// アカウントを削除する
///
/// リモートの削除が成功した後にのみローカル状態を消す。
/// 削除に失敗した場合はアカウントがまだ存在するものとして扱う。
pub async fn handle(
    roster: &Roster,
    project_root: &Path,
    name: &str,
    yes: bool,
) -> anyhow::Result<()> {
    let store = setup::open_store(project_root);
    let lock = store.acquire_lock().await?;
    let mut state = store.load().await?;

    let Some(current) = state.get(name).cloned() else {
        lock.release().await?;
        anyhow::bail!("アカウント '{}' のローカル状態が見つかりません", name);
    };

    if !yes {
        println!(
            "{} {} を削除しようとしています",
            "⚠".yellow().bold(),
            name.cyan()
        );
        println!("    did: {}", current.did);
        println!("    handle: {}", current.handle);
        println!();
        println!(
            "{}",
            "警告: PDS上のアカウントとそのデータが完全に削除されます。".yellow()
        );
        println!("実行するには --yes オプションを指定してください");
        lock.release().await?;
        return Ok(());
    }

    let reconciler = setup::build_reconciler(roster)?;

    println!("{} {} を削除中...", "▶".cyan(), name.cyan());
    match reconciler.delete(&current).await {
        Ok(_) => {
            state.remove(name);
            store.save(&state).await?;
            lock.release().await?;
            println!("{} {} を削除しました", "✓".green().bold(), name.cyan());
            Ok(())
        }
        Err(EngineError::Gateway(GatewayError::NotFound(_))) => {
            // リモートに存在しないので、ローカル状態の掃除だけ行う
            println!(
                "{} リモートにアカウントが存在しないため、ローカル状態のみ削除します",
                "ℹ".cyan()
            );
            state.remove(name);
            store.save(&state).await?;
            lock.release().await?;
            println!("{} {} を削除しました", "✓".green().bold(), name.cyan());
            Ok(())
        }
        Err(e) => {
            lock.release().await?;
            eprintln!("{} 削除に失敗しました: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}
