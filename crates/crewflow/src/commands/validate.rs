use colored::Colorize;
use crewflow_engine::gate::{self, OpClass};
use crewflow_pds::{DEFAULT_ADMIN_TOKEN_ENV, DEFAULT_SESSION_TOKEN_ENV};

/// ロスターファイルと実行環境を検証する
///
/// リモートには接続しない。トークンの権限チェックは
/// JWTのクレームをローカルで読んで行う。
pub async fn handle() -> anyhow::Result<()> {
    println!("{}", "設定を検証中...".blue());

    // プロジェクトルートを検出
    let project_root = match crewflow_core::find_project_root() {
        Ok(root) => root,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ プロジェクトルートが見つかりません".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };
    println!(
        "プロジェクトルート: {}",
        project_root.display().to_string().cyan()
    );

    let roster = match crewflow_core::load_roster_from_root(&project_root) {
        Ok(roster) => roster,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ 設定エラー".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", "✓ ロスターファイルは正常です！".green().bold());
    println!();
    println!("サマリー:");
    println!("  プロジェクト: {}", roster.name.cyan());
    if let Some(pds) = &roster.pds {
        println!("  PDS: {}", pds.service.cyan());
    } else {
        println!("  PDS: {}", "(未設定)".yellow());
    }
    println!(
        "  ポリシー: handle更新={}, email更新={}",
        if roster.policy.allow_handle_update {
            "許可"
        } else {
            "禁止"
        },
        if roster.policy.allow_email_update {
            "許可"
        } else {
            "禁止"
        }
    );
    println!("  アカウント: {}個", roster.accounts.len());
    for account in &roster.accounts {
        println!("    - {} ({})", account.name.cyan(), account.handle);
    }

    let mut warnings = Vec::new();
    let mut errors = Vec::new();

    // 環境変数のチェック
    if let Some(pds) = &roster.pds {
        let admin_env = pds
            .admin_token_env
            .as_deref()
            .unwrap_or(DEFAULT_ADMIN_TOKEN_ENV);
        if std::env::var(admin_env).is_err() {
            warnings.push(format!(
                "管理トークンの環境変数 {} が設定されていません",
                admin_env
            ));
        }

        let session_env = pds
            .session_token_env
            .as_deref()
            .unwrap_or(DEFAULT_SESSION_TOKEN_ENV);
        if let Ok(token) = std::env::var(session_env) {
            match gate::decode_claims(&token) {
                Ok(claims) => {
                    println!();
                    println!(
                        "セッショントークン: scope={}",
                        claims.scope.as_deref().unwrap_or("(不明)").cyan()
                    );
                    if let Some(sub) = &claims.sub {
                        println!("  subject: {}", sub);
                    }
                    if let Err(e) = gate::ensure_privilege(&token, OpClass::Create) {
                        warnings.push(format!(
                            "このトークンではアカウントの作成・削除ができません: {}",
                            e
                        ));
                    }
                }
                Err(e) => {
                    errors.push(format!("セッショントークンを解読できません: {}", e));
                }
            }
        }
    }

    for account in &roster.accounts {
        match &account.password_env {
            Some(var) if std::env::var(var).is_err() => {
                warnings.push(format!(
                    "{}: パスワードの環境変数 {} が設定されていません",
                    account.name, var
                ));
            }
            None => {
                warnings.push(format!(
                    "{}: パスワード未設定のため作成時に自動生成されます",
                    account.name
                ));
            }
            _ => {}
        }
    }

    if !warnings.is_empty() {
        println!();
        for warning in &warnings {
            println!("{} {}", "⚠".yellow(), warning);
        }
    }

    if !errors.is_empty() {
        eprintln!();
        for error in &errors {
            eprintln!("{} {}", "✗".red().bold(), error);
        }
        std::process::exit(1);
    }

    Ok(())
}
