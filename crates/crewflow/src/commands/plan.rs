use crate::setup;
use colored::Colorize;
use crewflow_core::Roster;
use crewflow_engine::diff;
use std::path::Path;

/// 変更プランを表示する
///
/// ローカルの状態ファイルと目標設定の差分のみを計算し、
/// リモートへの問い合わせは行わない。
pub async fn handle(roster: &Roster, project_root: &Path, name: Option<&str>) -> anyhow::Result<()> {
    println!("{}", "変更プランを計算中...".blue());

    let targets = setup::target_accounts(roster, name)?;
    let store = setup::open_store(project_root);
    let state = store.load().await?;
    let policy = setup::update_policy(roster);

    let mut to_create = 0;
    let mut to_update = 0;
    let mut blocked = 0;

    println!();
    for entry in &targets {
        let spec = setup::resolve_spec(entry);
        match state.get(&entry.name) {
            None => {
                to_create += 1;
                println!("{} {} を作成します", "+".green().bold(), entry.name.cyan());
                println!("    handle: {}", spec.handle);
                println!("    email: {}", spec.email);
                if let Some(display) = &spec.display_name {
                    println!("    display name: {}", display);
                }
                if !spec.has_password() {
                    println!("    {}", "パスワードは作成時に自動生成されます".dimmed());
                }
            }
            Some(current) => {
                let plan = diff::plan_update(&spec, current, &policy);
                if plan.is_empty() {
                    println!("{} {} は最新です", "=".dimmed(), entry.name.cyan());
                } else {
                    if !plan.steps.is_empty() {
                        to_update += 1;
                    }
                    blocked += plan.blocked.len();
                    println!("{} {} を更新します", "~".yellow().bold(), entry.name.cyan());
                    for step in &plan.steps {
                        println!("    {} {}", "→".yellow(), step);
                    }
                    for change in &plan.blocked {
                        println!("    {} {}", "⚠".yellow(), change);
                    }
                }
            }
        }
    }

    // ロスターから削除されたエントリは apply では消えない
    if name.is_none() {
        for (tracked, current) in state.iter() {
            if roster.account(tracked).is_none() {
                println!(
                    "{} {} はロスターにありません ({} で削除できます)",
                    "-".red().bold(),
                    tracked.cyan(),
                    format!("crew rm {}", tracked).cyan()
                );
                println!("    handle: {}", current.handle);
            }
        }
    }

    println!();
    println!(
        "プラン: 作成 {}個, 更新 {}個, ポリシーによりブロック {}個",
        to_create, to_update, blocked
    );
    if to_create + to_update > 0 {
        println!();
        println!("適用するには: {}", "crew apply --yes".cyan());
    }

    Ok(())
}
