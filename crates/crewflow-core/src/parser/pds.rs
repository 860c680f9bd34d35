//! PDS・ポリシーノードのパース

use crate::error::{CoreError, Result};
use crate::model::{PdsEndpoint, PolicyConfig};
use kdl::KdlNode;

/// pds ノードをパース
///
/// フラット形式 `pds "https://..."` とネスト形式の両方をサポートします。
pub fn parse_pds(node: &KdlNode) -> Result<PdsEndpoint> {
    // フラット形式: 最初のエントリをURLとして扱う
    let mut service = node
        .entries()
        .first()
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string());
    let mut admin_token_env = None;
    let mut session_token_env = None;
    let mut creation_token_env = None;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "service" => {
                    service = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_string())
                        .map(|s| s.to_string());
                }
                "admin-token-env" => {
                    admin_token_env = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_string())
                        .map(|s| s.to_string());
                }
                "session-token-env" => {
                    session_token_env = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_string())
                        .map(|s| s.to_string());
                }
                "creation-token-env" => {
                    creation_token_env = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_string())
                        .map(|s| s.to_string());
                }
                _ => {}
            }
        }
    }

    let service = service
        .ok_or_else(|| CoreError::InvalidConfig("pds には service が必要です".to_string()))?;

    Ok(PdsEndpoint {
        service,
        admin_token_env,
        session_token_env,
        creation_token_env,
    })
}

/// policy ノードをパース
pub fn parse_policy(node: &KdlNode) -> PolicyConfig {
    let mut policy = PolicyConfig::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "allow-handle-update" => {
                    if let Some(value) = child.entries().first().and_then(|e| e.value().as_bool()) {
                        policy.allow_handle_update = value;
                    }
                }
                "allow-email-update" => {
                    if let Some(value) = child.entries().first().and_then(|e| e.value().as_bool()) {
                        policy.allow_email_update = value;
                    }
                }
                _ => {}
            }
        }
    }

    policy
}

#[cfg(test)]
mod tests {
    use super::*;
    use kdl::KdlDocument;

    #[test]
    fn test_parse_pds_nested() {
        let kdl = r#"
            pds {
                service "https://pds.example.com"
                admin-token-env "CREW_PDS_ADMIN_TOKEN"
                session-token-env "CREW_PDS_SESSION_TOKEN"
                creation-token-env "CREW_PDS_CREATION_TOKEN"
            }
        "#;
        let doc: KdlDocument = kdl.parse().unwrap();
        let node = doc.nodes().first().unwrap();

        let pds = parse_pds(node).unwrap();

        assert_eq!(pds.service, "https://pds.example.com");
        assert_eq!(pds.admin_token_env, Some("CREW_PDS_ADMIN_TOKEN".to_string()));
        assert_eq!(
            pds.session_token_env,
            Some("CREW_PDS_SESSION_TOKEN".to_string())
        );
        assert_eq!(
            pds.creation_token_env,
            Some("CREW_PDS_CREATION_TOKEN".to_string())
        );
    }

    #[test]
    fn test_parse_pds_flat() {
        let kdl = r#"pds "https://pds.example.com""#;
        let doc: KdlDocument = kdl.parse().unwrap();
        let node = doc.nodes().first().unwrap();

        let pds = parse_pds(node).unwrap();

        assert_eq!(pds.service, "https://pds.example.com");
        assert_eq!(pds.admin_token_env, None);
    }

    #[test]
    fn test_parse_pds_without_service() {
        let kdl = r#"
            pds {
                admin-token-env "CREW_PDS_ADMIN_TOKEN"
            }
        "#;
        let doc: KdlDocument = kdl.parse().unwrap();
        let node = doc.nodes().first().unwrap();

        assert!(parse_pds(node).is_err());
    }

    #[test]
    fn test_parse_policy() {
        let kdl = r#"
            policy {
                allow-handle-update #false
                allow-email-update #true
            }
        "#;
        let doc: KdlDocument = kdl.parse().unwrap();
        let node = doc.nodes().first().unwrap();

        let policy = parse_policy(node);

        assert!(!policy.allow_handle_update);
        assert!(policy.allow_email_update);
    }

    #[test]
    fn test_parse_policy_defaults() {
        let kdl = r#"policy"#;
        let doc: KdlDocument = kdl.parse().unwrap();
        let node = doc.nodes().first().unwrap();

        let policy = parse_policy(node);

        // 省略時は許可がデフォルト
        assert!(policy.allow_handle_update);
        assert!(policy.allow_email_update);
    }
}
