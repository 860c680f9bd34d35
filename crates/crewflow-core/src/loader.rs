//! 統合ローダー
//!
//! ファイル発見とパースを統合

use crate::discovery::{find_project_root, roster_file};
use crate::error::{CoreError, Result};
use crate::model::Roster;
use crate::parser::parse_kdl_string;
use std::path::Path;
use tracing::{debug, info, instrument};

/// プロジェクト全体をロードしてRosterを生成
///
/// 以下の処理を実行:
/// 1. プロジェクトルートの検出
/// 2. ロスターファイルの発見
/// 3. KDLパース
#[instrument]
pub fn load_roster() -> Result<Roster> {
    info!("Starting roster load");
    let project_root = find_project_root()?;
    load_roster_from_root(&project_root)
}

/// 指定されたルートディレクトリからロスターをロード
#[instrument(skip(project_root), fields(project_root = %project_root.display()))]
pub fn load_roster_from_root(project_root: &Path) -> Result<Roster> {
    debug!("Discovering roster file");
    let path = roster_file(project_root)
        .ok_or_else(|| CoreError::RosterFileNotFound(project_root.join("crew.kdl")))?;

    debug!(file = %path.display(), "Parsing roster file");
    let content = std::fs::read_to_string(&path)?;
    let name = project_root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string();

    let roster = parse_kdl_string(&content, name)?;
    info!(
        accounts = roster.accounts.len(),
        "Roster loaded successfully"
    );

    Ok(roster)
}
