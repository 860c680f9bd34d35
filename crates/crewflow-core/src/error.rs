use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("KDLパースエラー: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error(
        "プロジェクトルートが見つかりません\n探索開始位置: {0}\nヒント: crew.kdl ファイルを含むディレクトリで実行してください"
    )]
    ProjectRootNotFound(PathBuf),

    #[error("ロスターファイルが見つかりません: {0}")]
    RosterFileNotFound(PathBuf),

    #[error("アカウントが重複しています: {0}")]
    DuplicateAccount(String),

    #[error("アカウント '{account}' に {field} が指定されていません")]
    MissingAccountField { account: String, field: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
