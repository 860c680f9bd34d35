//! crewflow-core
//!
//! crewflowのコア機能を提供します:
//! - ロスターモデル（アカウント、PDS接続、更新ポリシー）
//! - KDLロスターファイルのパース
//! - プロジェクトルートとロスターファイルの発見

pub mod discovery;
pub mod error;
pub mod loader;
pub mod model;
pub mod parser;

pub use discovery::{PROJECT_ROOT_ENV, find_project_root, roster_file};
pub use error::{CoreError, Result};
pub use loader::{load_roster, load_roster_from_root};
pub use model::{AccountEntry, PdsEndpoint, PolicyConfig, Roster};
pub use parser::{parse_kdl_file, parse_kdl_string};
