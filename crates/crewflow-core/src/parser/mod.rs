//! KDLパーサー
//!
//! crewflowのKDLロスターファイルをパースします。
//! 各ノードタイプのパース処理はモジュールに分離されています。

mod account;
mod pds;

use account::parse_account;
use pds::{parse_pds, parse_policy};

use crate::error::{CoreError, Result};
use crate::model::{AccountEntry, Roster};
use kdl::KdlDocument;
use std::fs;
use std::path::Path;

/// KDLファイルをパースしてRosterを生成
pub fn parse_kdl_file<P: AsRef<Path>>(path: P) -> Result<Roster> {
    let content = fs::read_to_string(path.as_ref())?;
    let name = path
        .as_ref()
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string();
    parse_kdl_string(&content, name)
}

/// KDL文字列をパース
pub fn parse_kdl_string(content: &str, default_name: String) -> Result<Roster> {
    let doc: KdlDocument = content.parse()?;

    let mut name = default_name;
    let mut pds = None;
    let mut policy = Default::default();
    let mut accounts: Vec<AccountEntry> = Vec::new();

    for node in doc.nodes() {
        match node.name().value() {
            "project" => {
                // projectノードから名前を取得
                if let Some(project_name) =
                    node.entries().first().and_then(|e| e.value().as_string())
                {
                    name = project_name.to_string();
                }
            }
            "pds" => {
                pds = Some(parse_pds(node)?);
            }
            "policy" => {
                policy = parse_policy(node);
            }
            "account" => {
                let entry = parse_account(node)?;
                // 同名アカウントの重複はエラー
                if accounts.iter().any(|a| a.name == entry.name) {
                    return Err(CoreError::DuplicateAccount(entry.name));
                }
                accounts.push(entry);
            }
            _ => {
                // 不明なノードはスキップ
            }
        }
    }

    Ok(Roster {
        name,
        pds,
        policy,
        accounts,
    })
}
