use std::sync::Arc;

use super::user::User;

/// Login progress for one session. Selecting a user resets any account
/// progress, so the indices below always point into the selected user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    NoUser,
    /// A non-admin user is selected; no account yet.
    UserSelected(usize),
    /// The admin user is selected; admin carries no accounts.
    LoggedInAdmin(usize),
    /// A non-root account is selected, waiting on its password.
    AccountSelected { user: usize, account: usize },
    LoggedIn { user: usize, account: usize },
}

/// Per-session view over the shared user table. Every operation answers
/// with the wire response line; nothing in here tears a session down.
pub struct CredentialStore {
    users: Arc<Vec<User>>,
    state: LoginState,
    bypass: bool,
}

impl CredentialStore {
    pub fn new(users: Arc<Vec<User>>, bypass: bool) -> Self {
        Self {
            users,
            state: LoginState::NoUser,
            bypass,
        }
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    pub fn is_user_selected(&self) -> bool {
        self.bypass || self.state != LoginState::NoUser
    }

    pub fn is_logged_in(&self) -> bool {
        self.bypass
            || matches!(
                self.state,
                LoginState::LoggedInAdmin(_) | LoginState::LoggedIn { .. }
            )
    }

    /// USER: exact-match lookup. Selecting a user forgets any account
    /// progress; the admin user is logged in on the spot.
    pub fn select_user(&mut self, name: &str) -> String {
        if self.bypass {
            return "+ Bypass Login".to_string();
        }

        match self.users.iter().position(|user| user.name == name) {
            Some(idx) if self.users[idx].admin => {
                self.state = LoginState::LoggedInAdmin(idx);
                format!("!{} logged in", name)
            }
            Some(idx) => {
                self.state = LoginState::UserSelected(idx);
                format!("+{} valid, send account and password", name)
            }
            None => "-Invalid user-id, try again".to_string(),
        }
    }

    /// ACCT: meaningful only under a selected non-admin user. A root
    /// account logs in immediately; any other selection demands a fresh
    /// PASS, dropping an earlier login.
    pub fn select_account(&mut self, name: &str) -> String {
        if self.bypass {
            return "+ Bypass Login".to_string();
        }

        let user = match self.state {
            LoginState::UserSelected(user)
            | LoginState::AccountSelected { user, .. }
            | LoginState::LoggedIn { user, .. } => user,
            LoginState::NoUser | LoginState::LoggedInAdmin(_) => {
                return "-Invalid account, try again".to_string();
            }
        };

        let accounts = &self.users[user].accounts;
        match accounts.iter().position(|acct| acct.name == name) {
            Some(account) if accounts[account].is_root() => {
                self.state = LoginState::LoggedIn { user, account };
                "! Account valid, logged-in".to_string()
            }
            Some(account) => {
                self.state = LoginState::AccountSelected { user, account };
                "+Account valid, send password".to_string()
            }
            None => "-Invalid account, try again".to_string(),
        }
    }

    /// PASS: only a selected, not-yet-logged-in account takes a password;
    /// everywhere else the peer is told to pick an account first.
    pub fn submit_password(&mut self, password: &str) -> String {
        if self.bypass {
            return "+ Bypass Login".to_string();
        }

        match self.state {
            LoginState::AccountSelected { user, account } => {
                let expected = self.users[user].accounts[account].password.as_deref();
                if expected == Some(password) {
                    self.state = LoginState::LoggedIn { user, account };
                    "! Logged in".to_string()
                } else {
                    "-Wrong password, try again".to_string()
                }
            }
            _ => "+Send account".to_string(),
        }
    }
}
