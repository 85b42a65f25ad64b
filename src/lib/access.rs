//! Allow-list access control.
//!
//! Authentication itself happens elsewhere (an SSO provider, or simply the `--user` flag
//! and `CERTGEN_USER`); this module only decides whether an authenticated username may
//! use the generator. The allow-list is a comma-separated string. Matching is
//! case-insensitive on the trimmed username.

use log::{debug, info, warn};
use std::env;

use crate::CertError;

/// Environment variable holding the comma-separated allow-list.
pub const ALLOWED_USERS_ENV: &str = "ALLOWED_USERS";
/// Environment variable naming the signed-in user.
pub const USER_ENV: &str = "CERTGEN_USER";

/// Normalised set of allowed usernames.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AllowList {
    users: Vec<String>,
}

impl AllowList {
    /// Parses `a@x.test, B@x.test,,` into `["a@x.test", "b@x.test"]`.
    ///
    /// ```
    /// use certgen::access::AllowList;
    ///
    /// let list = AllowList::parse(" Alice@Example.com ,, bob@example.com ");
    /// assert_eq!(list.users(), ["alice@example.com", "bob@example.com"]);
    /// assert!(list.allows("ALICE@example.com"));
    /// ```
    pub fn parse(raw: &str) -> Self {
        Self::from_entries(raw.split(','))
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut users: Vec<String> = Vec::new();
        for entry in entries {
            let user = entry.as_ref().trim().to_lowercase();
            if !user.is_empty() && !users.contains(&user) {
                users.push(user);
            }
        }
        AllowList { users }
    }

    /// Picks the first configured source: the explicit value (e.g. `--allowed-users`),
    /// then `ALLOWED_USERS`, then the configuration file entries.
    pub fn resolve(explicit: Option<&str>, config_entries: &[String]) -> Self {
        if let Some(raw) = explicit {
            debug!("Using allow-list from the command line");
            return Self::parse(raw);
        }
        if let Ok(raw) = env::var(ALLOWED_USERS_ENV) {
            debug!("Using allow-list from {}", ALLOWED_USERS_ENV);
            return Self::parse(&raw);
        }
        Self::from_entries(config_entries)
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn allows(&self, username: &str) -> bool {
        let username = username.trim().to_lowercase();
        !username.is_empty() && self.users.iter().any(|u| *u == username)
    }
}

/// An authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub display_name: Option<String>,
}

impl Identity {
    pub fn new(username: impl Into<String>, display_name: Option<String>) -> Self {
        Identity {
            username: username.into().trim().to_string(),
            display_name: display_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        }
    }

    /// The display name, falling back to the username.
    pub fn greeting_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }

    pub fn welcome_message(&self) -> String {
        format!("Welcome, {}", self.greeting_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessState {
    /// The identity provider has not answered yet.
    Checking,
    SignedOut,
    Denied { username: String },
    Authorized { identity: Identity },
}

/// Tracks the sign-in state against an allow-list.
#[derive(Debug, Clone)]
pub struct AccessGate {
    allow_list: AllowList,
    state: AccessState,
}

impl AccessGate {
    pub fn new(allow_list: AllowList) -> Self {
        if allow_list.is_empty() {
            warn!("The allow-list is empty; every user will be denied");
        }
        AccessGate {
            allow_list,
            state: AccessState::Checking,
        }
    }

    pub fn state(&self) -> &AccessState {
        &self.state
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Applies the identity provider's answer: `None` means nobody is signed in.
    pub fn resolve(&mut self, identity: Option<Identity>) -> &AccessState {
        self.state = match identity {
            None => AccessState::SignedOut,
            Some(identity) if self.allow_list.allows(&identity.username) => {
                info!("Authorized {}", identity.username);
                AccessState::Authorized { identity }
            }
            Some(identity) => {
                warn!("Access denied for {}", identity.username);
                AccessState::Denied {
                    username: identity.username,
                }
            }
        };
        &self.state
    }

    pub fn sign_out(&mut self) {
        self.state = AccessState::SignedOut;
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self.state, AccessState::Authorized { .. })
    }

    /// The authorized identity, or the reason there is none.
    pub fn require_authorized(&self) -> Result<&Identity, CertError> {
        match &self.state {
            AccessState::Authorized { identity } => Ok(identity),
            AccessState::Denied { username } => Err(CertError::AccessDenied {
                username: username.clone(),
            }),
            AccessState::Checking | AccessState::SignedOut => Err(CertError::AccessDenied {
                username: "(not signed in)".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(list: &str) -> AccessGate {
        AccessGate::new(AllowList::parse(list))
    }

    #[test]
    fn test_allow_list_parsing() {
        let list = AllowList::parse("a@x.test, ,B@X.TEST,a@x.test");
        assert_eq!(list.users(), ["a@x.test", "b@x.test"]);
        assert!(AllowList::parse("").is_empty());
        assert!(AllowList::parse(" , ,").is_empty());
        assert!(!list.allows(""));
        assert!(list.allows("  b@x.test "));
    }

    #[test]
    fn test_explicit_source_wins() {
        let config = vec!["config@x.test".to_string()];
        let list = AllowList::resolve(Some("cli@x.test"), &config);
        assert!(list.allows("cli@x.test"));
        assert!(!list.allows("config@x.test"));
    }

    #[test]
    fn test_gate_starts_checking() {
        assert_eq!(gate("a@x.test").state(), &AccessState::Checking);
    }

    #[test]
    fn test_unlisted_user_is_denied() {
        let mut gate = gate("a@x.test");
        let state = gate.resolve(Some(Identity::new("mallory@x.test", None)));
        assert_eq!(
            state,
            &AccessState::Denied {
                username: "mallory@x.test".into()
            }
        );
        assert!(!gate.is_authorized());
        assert!(matches!(
            gate.require_authorized(),
            Err(CertError::AccessDenied { .. })
        ));
    }

    #[test]
    fn test_listed_user_is_authorized_case_insensitively() {
        let mut gate = gate("Alice@Example.com");
        gate.resolve(Some(Identity::new("alice@example.COM", Some("Alice".into()))));
        assert!(gate.is_authorized());
        assert_eq!(gate.require_authorized().unwrap().welcome_message(), "Welcome, Alice");
    }

    #[test]
    fn test_sign_out_and_missing_identity() {
        let mut gate = gate("a@x.test");
        gate.resolve(Some(Identity::new("a@x.test", None)));
        gate.sign_out();
        assert_eq!(gate.state(), &AccessState::SignedOut);
        assert_eq!(gate.resolve(None), &AccessState::SignedOut);
    }

    #[test]
    fn test_empty_allow_list_denies_everyone() {
        let mut gate = gate("");
        gate.resolve(Some(Identity::new("a@x.test", None)));
        assert!(!gate.is_authorized());
    }

    #[test]
    fn test_greeting_falls_back_to_username() {
        let identity = Identity::new("a@x.test", Some("  ".into()));
        assert_eq!(identity.greeting_name(), "a@x.test");
    }
}
