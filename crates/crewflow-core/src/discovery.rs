//! ロスターファイルの発見
//!
//! 規約ベースでプロジェクトルートとロスターファイルを検出します。

use crate::error::{CoreError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// プロジェクトルート指定用の環境変数
pub const PROJECT_ROOT_ENV: &str = "CREW_PROJECT_ROOT";

/// プロジェクトルートを検出
///
/// 以下の優先順位で検索:
/// 1. 環境変数 CREW_PROJECT_ROOT
/// 2. カレントディレクトリから上に向かって以下を探す:
///    - crew.kdl
///    - .crewflow/crew.kdl
#[tracing::instrument]
pub fn find_project_root() -> Result<PathBuf> {
    // 1. 環境変数
    if let Ok(root) = std::env::var(PROJECT_ROOT_ENV) {
        let path = PathBuf::from(&root);
        debug!(env_root = %root, "Checking CREW_PROJECT_ROOT");
        if roster_file(&path).is_some() {
            info!(project_root = %path.display(), "Found project root from environment variable");
            return Ok(path);
        }
    }

    // 2. カレントディレクトリから上に向かって探す
    let start_dir = std::env::current_dir()?;
    let mut current = start_dir.clone();
    debug!(start_dir = %start_dir.display(), "Searching for project root");

    loop {
        if roster_file(&current).is_some() {
            info!(project_root = %current.display(), "Found project root");
            return Ok(current);
        }

        // 親ディレクトリへ
        if !current.pop() {
            break;
        }
    }

    warn!(start_dir = %start_dir.display(), "Project root not found");
    Err(CoreError::ProjectRootNotFound(start_dir))
}

/// プロジェクトルート配下のロスターファイルを返す
///
/// crew.kdl が .crewflow/crew.kdl より優先されます。
pub fn roster_file(project_root: &Path) -> Option<PathBuf> {
    let root_file = project_root.join("crew.kdl");
    if root_file.exists() {
        return Some(root_file);
    }

    let hidden_file = project_root.join(".crewflow/crew.kdl");
    if hidden_file.exists() {
        return Some(hidden_file);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_roster_file_prefers_root_over_hidden_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join(".crewflow")).unwrap();
        fs::write(root.join(".crewflow/crew.kdl"), "// hidden").unwrap();
        fs::write(root.join("crew.kdl"), "// root").unwrap();

        let found = roster_file(root).unwrap();
        assert!(found.ends_with("crew.kdl"));
        assert!(!found.to_string_lossy().contains(".crewflow"));
    }

    #[test]
    fn test_roster_file_falls_back_to_hidden_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join(".crewflow")).unwrap();
        fs::write(root.join(".crewflow/crew.kdl"), "// hidden").unwrap();

        let found = roster_file(root).unwrap();
        assert!(found.ends_with(".crewflow/crew.kdl"));
    }

    #[test]
    fn test_roster_file_missing() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(roster_file(temp_dir.path()).is_none());
    }

    #[test]
    fn test_find_project_root_from_env() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("crew.kdl"), "project \"env-test\"").unwrap();

        temp_env::with_var(PROJECT_ROOT_ENV, Some(root.to_str().unwrap()), || {
            let found = find_project_root().unwrap();
            assert_eq!(found, root.to_path_buf());
        });
    }

    #[test]
    fn test_find_project_root_env_without_roster_is_ignored() {
        let temp_dir = tempfile::tempdir().unwrap();

        // ロスターファイルのないディレクトリを指す環境変数は無視され、
        // カレントディレクトリからの探索にフォールバックする
        temp_env::with_var(
            PROJECT_ROOT_ENV,
            Some(temp_dir.path().to_str().unwrap()),
            || {
                let result = find_project_root();
                if let Ok(found) = result {
                    assert_ne!(found, temp_dir.path().to_path_buf());
                }
            },
        );
    }
}
