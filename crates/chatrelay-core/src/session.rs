//! Anonymous session identity carried in a cookie.
//!
//! The session token is a client-correlation identifier, not a credential.
//! It is read from the inbound `Cookie` header or minted as a fresh UUID v4.

use uuid::Uuid;

/// Cookie holding the session token.
pub const SESSION_COOKIE_NAME: &str = "chat_session_id";

/// Lifetime of the session cookie: 30 days.
pub const SESSION_COOKIE_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;

/// The session a request belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub id: String,
    /// True when the id was minted for this request and the caller must
    /// send a `Set-Cookie` header.
    pub is_new: bool,
}

/// Resolves session identities from cookie headers.
#[derive(Debug, Clone)]
pub struct SessionResolver {
    cookie_name: String,
    max_age_secs: u64,
}

impl Default for SessionResolver {
    fn default() -> Self {
        Self::new(SESSION_COOKIE_NAME, SESSION_COOKIE_MAX_AGE_SECS)
    }
}

impl SessionResolver {
    pub fn new(cookie_name: impl Into<String>, max_age_secs: u64) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            max_age_secs,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Use the session cookie from `cookie_header` if present, otherwise
    /// mint a new token.
    pub fn resolve(&self, cookie_header: Option<&str>) -> SessionIdentity {
        match cookie_header.and_then(|h| parse_cookie(h, &self.cookie_name)) {
            Some(id) => SessionIdentity {
                id: id.to_string(),
                is_new: false,
            },
            None => SessionIdentity {
                id: Uuid::new_v4().to_string(),
                is_new: true,
            },
        }
    }

    /// `Set-Cookie` value for a newly minted session.
    pub fn set_cookie_header(&self, session_id: &str) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age={}",
            self.cookie_name, session_id, self.max_age_secs
        )
    }
}

/// Find `name` in a semicolon-delimited `Cookie` header.
///
/// Returns `None` when the cookie is missing or its value is empty.
pub fn parse_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
