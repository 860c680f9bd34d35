//! アカウントノードのパース

use crate::error::{CoreError, Result};
use crate::model::AccountEntry;
use kdl::KdlNode;

/// account ノードをパース
pub fn parse_account(node: &KdlNode) -> Result<AccountEntry> {
    let name = node
        .entries()
        .first()
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| CoreError::InvalidConfig("account には名前が必要です".to_string()))?
        .to_string();

    let mut handle = None;
    let mut email = None;
    let mut display_name = None;
    let mut password_env = None;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "handle" => {
                    handle = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_string())
                        .map(|s| s.to_string());
                }
                "email" => {
                    email = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_string())
                        .map(|s| s.to_string());
                }
                "display-name" => {
                    display_name = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_string())
                        .map(|s| s.to_string());
                }
                "password-env" => {
                    password_env = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_string())
                        .map(|s| s.to_string());
                }
                _ => {}
            }
        }
    }

    let handle = handle.ok_or_else(|| CoreError::MissingAccountField {
        account: name.clone(),
        field: "handle".to_string(),
    })?;
    let email = email.ok_or_else(|| CoreError::MissingAccountField {
        account: name.clone(),
        field: "email".to_string(),
    })?;

    Ok(AccountEntry {
        name,
        handle,
        email,
        display_name,
        password_env,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kdl::KdlDocument;

    #[test]
    fn test_parse_account_full() {
        let kdl = r#"
            account "mito" {
                handle "mito.example.com"
                email "mito@example.com"
                display-name "ミト"
                password-env "CREW_MITO_PASSWORD"
            }
        "#;
        let doc: KdlDocument = kdl.parse().unwrap();
        let node = doc.nodes().first().unwrap();

        let entry = parse_account(node).unwrap();

        assert_eq!(entry.name, "mito");
        assert_eq!(entry.handle, "mito.example.com");
        assert_eq!(entry.email, "mito@example.com");
        assert_eq!(entry.display_name, Some("ミト".to_string()));
        assert_eq!(entry.password_env, Some("CREW_MITO_PASSWORD".to_string()));
    }

    #[test]
    fn test_parse_account_minimal() {
        let kdl = r#"
            account "bot" {
                handle "bot.example.com"
                email "bot@example.com"
            }
        "#;
        let doc: KdlDocument = kdl.parse().unwrap();
        let node = doc.nodes().first().unwrap();

        let entry = parse_account(node).unwrap();

        assert_eq!(entry.name, "bot");
        assert_eq!(entry.display_name, None);
        assert_eq!(entry.password_env, None);
    }

    #[test]
    fn test_parse_account_missing_handle() {
        let kdl = r#"
            account "broken" {
                email "broken@example.com"
            }
        "#;
        let doc: KdlDocument = kdl.parse().unwrap();
        let node = doc.nodes().first().unwrap();

        let err = parse_account(node).unwrap_err();
        assert!(matches!(
            err,
            CoreError::MissingAccountField { account, field }
                if account == "broken" && field == "handle"
        ));
    }

    #[test]
    fn test_parse_account_without_name() {
        let kdl = r#"
            account {
                handle "x.example.com"
                email "x@example.com"
            }
        "#;
        let doc: KdlDocument = kdl.parse().unwrap();
        let node = doc.nodes().first().unwrap();

        assert!(parse_account(node).is_err());
    }
}
