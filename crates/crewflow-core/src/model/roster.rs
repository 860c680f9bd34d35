//! ロスター定義

use super::account::AccountEntry;
use serde::{Deserialize, Serialize};

/// ロスター - アカウント群の設計図
///
/// ロスターはPDS上に存在すべきアカウントの一覧と、
/// それらをどのように管理するかのポリシーを記述します。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    /// ロスター名（プロジェクト名）
    pub name: String,
    /// 対象のPDSエンドポイント
    #[serde(default)]
    pub pds: Option<PdsEndpoint>,
    /// 更新ポリシー
    #[serde(default)]
    pub policy: PolicyConfig,
    /// アカウント一覧（宣言順を保持）
    #[serde(default)]
    pub accounts: Vec<AccountEntry>,
}

impl Roster {
    /// 名前でアカウントを検索
    pub fn account(&self, name: &str) -> Option<&AccountEntry> {
        self.accounts.iter().find(|a| a.name == name)
    }
}

/// PDS接続設定
///
/// トークンは値ではなく環境変数名で参照します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdsEndpoint {
    /// PDSのベースURL（例: https://pds.example.com）
    pub service: String,
    /// 管理トークンを保持する環境変数名
    #[serde(default)]
    pub admin_token_env: Option<String>,
    /// セッショントークンを保持する環境変数名
    #[serde(default)]
    pub session_token_env: Option<String>,
    /// アカウント作成専用トークンを保持する環境変数名
    #[serde(default)]
    pub creation_token_env: Option<String>,
}

/// 更新ポリシー
///
/// デフォルトでは全フィールドの更新を許可します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// ハンドルの更新を許可
    #[serde(default = "default_true")]
    pub allow_handle_update: bool,
    /// メールアドレスの更新を許可
    #[serde(default = "default_true")]
    pub allow_email_update: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allow_handle_update: true,
            allow_email_update: true,
        }
    }
}
