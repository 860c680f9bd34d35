//! アカウント定義

use serde::{Deserialize, Serialize};

/// ロスターに登録されたアカウント
///
/// `handle` と `email` は必須です。パスワードは値そのものではなく
/// 環境変数名で参照します（設定ファイルに秘密情報を書かないため）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEntry {
    /// ロスター内での名前（`crew apply <name>` で指定する識別子）
    pub name: String,
    /// アカウントのハンドル（例: mito.example.com）
    pub handle: String,
    /// 連絡先メールアドレス
    pub email: String,
    /// プロフィールの表示名
    #[serde(default)]
    pub display_name: Option<String>,
    /// パスワードを保持する環境変数名
    #[serde(default)]
    pub password_env: Option<String>,
}

impl AccountEntry {
    /// 環境変数からパスワードを解決
    ///
    /// `password_env` が未設定、または変数が存在しない場合は None。
    pub fn resolve_password(&self) -> Option<String> {
        self.password_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
    }
}
