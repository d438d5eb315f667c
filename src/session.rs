//! Login sessions and the tokens they issue.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};

use crate::clock::Clock;
use crate::error::DomainError;
use crate::utils;

/// Short-lived credential proving one successful login, bound to one
/// user. Immutable once issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    user_id: String,
    issued_at: DateTime<Utc>,
}

impl Token {
    /// Pure construction; the user id is taken as given.
    pub fn issued_for(user_id: String, value: String, issued_at: DateTime<Utc>) -> Token {
        Token {
            value,
            user_id,
            issued_at,
        }
    }

    /// A token is good through `issued_at + ttl` inclusive; expiry is
    /// strictly after that instant, never at it.
    pub fn assert_valid_at(&self, now: DateTime<Utc>, ttl: Duration) -> Result<(), DomainError> {
        if self.issued_at + ttl < now {
            return Err(DomainError::TokenExpired);
        }
        Ok(())
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

/// Authenticates credentials and maps live token values to users. The
/// credential mapping is fixed at construction; the token registry grows
/// on login and sheds stale entries lazily.
pub struct Session {
    valid_users: HashMap<String, String>,
    active_tokens: Mutex<HashMap<String, Token>>,
    clock: Arc<dyn Clock>,
    token_ttl: Duration,
}

impl Session {
    pub fn new(
        valid_users: HashMap<String, String>,
        clock: Arc<dyn Clock>,
        token_ttl: Duration,
    ) -> Session {
        Session {
            valid_users,
            active_tokens: Mutex::new(HashMap::new()),
            clock,
            token_ttl,
        }
    }

    /// Issues a fresh token for a known user. A missing user and a wrong
    /// password are indistinguishable to the caller.
    pub fn login_for(&self, user: &str, pass: &str) -> Result<String, DomainError> {
        self.check_valid_user(user, pass)?;
        let value = utils::mint_token_value();
        let token = Token::issued_for(user.to_owned(), value.clone(), self.clock.now());
        self.tokens().insert(value.clone(), token);
        Ok(value)
    }

    /// Resolves a token value to the user it was issued for. Expired
    /// entries are evicted on the way out; eviction is an optimization,
    /// not load-bearing — an expired token keeps failing the same way
    /// whether or not it was already cleaned up.
    pub fn user_id_from_valid_token(&self, token_value: &str) -> Result<String, DomainError> {
        let now = self.clock.now();
        let mut tokens = self.tokens();
        let resolved = match tokens.get(token_value) {
            None => Err(DomainError::InvalidToken),
            Some(token) => token
                .assert_valid_at(now, self.token_ttl)
                .map(|()| token.user_id().to_owned()),
        };
        if matches!(resolved, Err(DomainError::TokenExpired)) {
            tokens.remove(token_value);
        }
        resolved
    }

    /// True iff [`Session::user_id_from_valid_token`] would succeed.
    pub fn is_valid(&self, token_value: &str) -> bool {
        self.user_id_from_valid_token(token_value).is_ok()
    }

    /// Destroys a token ahead of its natural expiry. Later lookups fail
    /// as if it had never been issued.
    pub fn revoke(&self, token_value: &str) {
        self.tokens().remove(token_value);
    }

    /// Number of tokens currently held, stale entries included.
    pub fn active_token_count(&self) -> usize {
        self.tokens().len()
    }

    fn check_valid_user(&self, user: &str, pass: &str) -> Result<(), DomainError> {
        if self.valid_users.get(user).map(String::as_str) != Some(pass) {
            return Err(DomainError::InvalidCredentials);
        }
        Ok(())
    }

    fn tokens(&self) -> MutexGuard<'_, HashMap<String, Token>> {
        self.active_tokens
            .lock()
            .expect("token registry lock poisoned")
    }
}
