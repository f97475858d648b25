use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

/// One account under a user. Only the reserved `root` account carries no
/// password; selecting it logs the session in immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub name: String,
    pub password: Option<String>,
}

impl Account {
    pub fn is_root(&self) -> bool {
        self.password.is_none()
    }
}

/// An entry of the credential table. The table is loaded once at startup and
/// shared read-only between sessions; per-session login progress lives in
/// the session's `CredentialStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub admin: bool,
    pub accounts: Vec<Account>,
}

/// Parses the credential table: one user per line, comma-delimited. The
/// record named `admin` is the admin user and lists no accounts; any other
/// record is `name,acct1.pw1,acct2.pw2,...` where the account entry `root`
/// has no password part. Blank lines are skipped.
pub fn parse_users(input: &str) -> Result<Vec<User>> {
    let mut users = Vec::new();

    for (idx, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let mut fields = line.split(',');
        let name = fields
            .next()
            .map(str::to_string)
            .unwrap_or_default();

        if name == "admin" {
            users.push(User {
                name,
                admin: true,
                accounts: Vec::new(),
            });
            continue;
        }

        let mut accounts = Vec::new();
        for entry in fields {
            if entry == "root" {
                accounts.push(Account {
                    name: entry.to_string(),
                    password: None,
                });
            } else {
                let (acct, password) = entry.split_once('.').ok_or_else(|| {
                    anyhow::Error::msg(format!(
                        "line {}: account entry {:?} has no password part",
                        idx + 1,
                        entry
                    ))
                })?;
                accounts.push(Account {
                    name: acct.to_string(),
                    password: Some(password.to_string()),
                });
            }
        }

        users.push(User {
            name,
            admin: false,
            accounts,
        });
    }

    Ok(users)
}

/// Loads and parses the credential table from `path`.
pub fn load_users(path: &str) -> Result<Arc<Vec<User>>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read users file: {}", path))?;
    let users =
        parse_users(&raw).with_context(|| format!("Failed to parse users file: {}", path))?;
    info!("Loaded {} user(s) from {}", users.len(), path);
    Ok(Arc::new(users))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_admin_and_account_records() {
        let table = "admin\nlucy,work.secret,root\n\nbob,games.arcade\n";
        let users = parse_users(table).unwrap();

        assert_eq!(users.len(), 3);
        assert!(users[0].admin);
        assert!(users[0].accounts.is_empty());

        assert_eq!(users[1].name, "lucy");
        assert!(!users[1].admin);
        assert_eq!(users[1].accounts.len(), 2);
        assert_eq!(users[1].accounts[0].name, "work");
        assert_eq!(users[1].accounts[0].password.as_deref(), Some("secret"));
        assert!(users[1].accounts[1].is_root());

        assert_eq!(users[2].accounts[0].password.as_deref(), Some("arcade"));
    }

    #[test]
    fn account_entry_without_password_is_rejected() {
        assert!(parse_users("lucy,work").is_err());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let users = parse_users("\n\nadmin\n\n").unwrap();
        assert_eq!(users.len(), 1);
    }
}
