use crate::setup;
use chrono::Local;
use colored::Colorize;
use crewflow_core::Roster;
use std::path::Path;

/// アカウントの状態を表示する
///
/// PDSに接続できる場合はリモートの観測値を、できない場合は
/// 状態ファイルの内容を表示する。表示のみで状態は書き換えない。
pub async fn handle(roster: &Roster, project_root: &Path, name: Option<&str>) -> anyhow::Result<()> {
    let targets = setup::target_accounts(roster, name)?;
    let store = setup::open_store(project_root);
    let state = store.load().await?;

    let reconciler = match setup::build_reconciler(roster) {
        Ok(reconciler) => Some(reconciler),
        Err(e) => {
            println!(
                "{} {}",
                "⚠".yellow(),
                format!("PDSに接続できないためローカル状態のみ表示します: {}", e).yellow()
            );
            None
        }
    };

    println!("{}", format!("アカウント状態 ({}):", roster.name).bold());
    println!();

    for entry in &targets {
        match state.get(&entry.name) {
            None => {
                println!("{} {} (未作成)", "-".dimmed(), entry.name.cyan());
            }
            Some(current) => {
                let mut shown = current.clone();
                let mut note = None;

                if let Some(reconciler) = &reconciler {
                    match reconciler.read(current).await {
                        Ok(report) => {
                            if let Some(remote) = report.state {
                                shown = remote;
                            }
                        }
                        Err(e) => note = Some(format!("リモート照会に失敗: {}", e)),
                    }
                }

                println!("{} {}", "✓".green().bold(), entry.name.cyan().bold());
                println!("    did: {}", shown.did);
                println!("    handle: {}", shown.handle);
                println!("    email: {}", shown.email);
                if let Some(display) = &shown.display_name {
                    println!("    display name: {}", display);
                }
                println!(
                    "    更新日時: {}",
                    shown
                        .updated_at
                        .with_timezone(&Local)
                        .format("%Y-%m-%d %H:%M:%S")
                );
                if let Some(note) = note {
                    println!("    {} {}", "⚠".yellow(), note);
                }
            }
        }
    }

    // ロスターから削除されたが状態が残っているアカウント
    if name.is_none() {
        let orphans: Vec<&String> = state
            .iter()
            .map(|(tracked, _)| tracked)
            .filter(|tracked| roster.account(tracked).is_none())
            .collect();
        if !orphans.is_empty() {
            println!();
            for orphan in orphans {
                println!(
                    "{} {} は crew.kdl に存在しません (crew rm {} で削除できます)",
                    "⚠".yellow(),
                    orphan.cyan(),
                    orphan
                );
            }
        }
    }

    Ok(())
}
