//! 実行環境の組み立て
//!
//! ロスター定義からPDSクライアント、リコンサイラ、ステートストアを
//! 構築する。トークンは環境変数からのみ読み込む。

use anyhow::{Context, anyhow};
use crewflow_core::{AccountEntry, Roster};
use crewflow_engine::{AccountSpec, Reconciler, StateStore, UpdatePolicy};
use crewflow_pds::{
    DEFAULT_ADMIN_TOKEN_ENV, DEFAULT_SESSION_TOKEN_ENV, PdsClient, PdsConfig, PdsGateway,
};
use std::path::Path;

/// アカウント作成専用トークンのデフォルト環境変数
pub const DEFAULT_CREATION_TOKEN_ENV: &str = "CREW_PDS_CREATION_TOKEN";

/// ロスターからリコンサイラを構築
pub fn build_reconciler(roster: &Roster) -> anyhow::Result<Reconciler<PdsGateway>> {
    let endpoint = roster
        .pds
        .as_ref()
        .ok_or_else(|| anyhow!("crew.kdl に pds が定義されていません"))?;

    let admin_env = endpoint
        .admin_token_env
        .as_deref()
        .unwrap_or(DEFAULT_ADMIN_TOKEN_ENV);
    let session_env = endpoint
        .session_token_env
        .as_deref()
        .unwrap_or(DEFAULT_SESSION_TOKEN_ENV);

    let config = PdsConfig::from_env(&endpoint.service, admin_env, session_env)
        .with_context(|| format!("PDS接続設定の読み込みに失敗しました ({})", endpoint.service))?;
    let session_token = config.session_token.clone();

    let mut gateway = PdsGateway::new(PdsClient::new(config));
    let creation_env = endpoint
        .creation_token_env
        .as_deref()
        .unwrap_or(DEFAULT_CREATION_TOKEN_ENV);
    if let Ok(token) = std::env::var(creation_env) {
        tracing::debug!("Using creation token from {}", creation_env);
        gateway = gateway.with_creation_token(token);
    }

    let mut reconciler = Reconciler::new(gateway).with_policy(update_policy(roster));
    if let Some(token) = session_token {
        tracing::debug!("Session token found in {}, capability gate enabled", session_env);
        reconciler = reconciler.with_session_token(token);
    }

    Ok(reconciler)
}

/// ロスターのポリシー設定をエンジンのポリシーに変換
pub fn update_policy(roster: &Roster) -> UpdatePolicy {
    UpdatePolicy {
        allow_handle_update: roster.policy.allow_handle_update,
        allow_email_update: roster.policy.allow_email_update,
    }
}

/// ロスターのエントリから目標状態を構築
///
/// パスワードは password-env で指名された環境変数から解決する。
pub fn resolve_spec(entry: &AccountEntry) -> AccountSpec {
    let mut spec = AccountSpec::new(&entry.handle, &entry.email);
    if let Some(name) = &entry.display_name {
        spec = spec.with_display_name(name);
    }
    if let Some(password) = entry.resolve_password() {
        spec = spec.with_password(password);
    }
    spec
}

/// プロジェクトルート配下のステートストアを開く
pub fn open_store(project_root: &Path) -> StateStore {
    StateStore::new(project_root)
}

/// 対象アカウントを決定
///
/// 名前指定があればそのアカウントのみ、省略時は宣言順の全アカウント。
pub fn target_accounts<'a>(
    roster: &'a Roster,
    name: Option<&str>,
) -> anyhow::Result<Vec<&'a AccountEntry>> {
    match name {
        Some(n) => roster
            .account(n)
            .map(|entry| vec![entry])
            .ok_or_else(|| anyhow!("アカウント '{}' は crew.kdl に定義されていません", n)),
        None => Ok(roster.accounts.iter().collect()),
    }
}
