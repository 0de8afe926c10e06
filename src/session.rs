//! Client-side session handling for the dashboard front end.
//!
//! A [`SessionContext`] is created empty, initialised from an auth response,
//! and torn down on logout. It is passed explicitly to whatever needs it; the
//! route gate in [`guard`] decides where navigation may go.

use crate::models::auth::{AuthResponse, Claims, UserResponse};
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: UserResponse,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    session: Option<Session>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("token payload could not be read: {0}")]
    MalformedToken(#[from] jsonwebtoken::errors::Error),
    #[error("token expiry is out of range")]
    InvalidExpiry,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session from a freshly issued token.
    ///
    /// The client holds no signing key, so only the payload is read here to
    /// learn the expiry; the server still verifies every token it receives.
    pub fn init(&mut self, token: String, user: UserResponse) -> Result<&Session, SessionError> {
        let expires_at = token_expiry(&token)?;
        Ok(&*self.session.insert(Session { token, user, expires_at }))
    }

    pub fn init_from_response(&mut self, response: AuthResponse) -> Result<&Session, SessionError> {
        self.init(response.token, response.user)
    }

    pub fn teardown(&mut self) {
        self.session = None;
    }

    /// The live session, if any. An expired session counts as none.
    pub fn current(&self, now: DateTime<Utc>) -> Option<&Session> {
        self.session.as_ref().filter(|s| s.expires_at > now)
    }

    pub fn is_authenticated(&self, now: DateTime<Utc>) -> bool {
        self.current(now).is_some()
    }

    /// Value for an `Authorization` header.
    pub fn bearer(&self, now: DateTime<Utc>) -> Option<String> {
        self.current(now).map(|s| format!("Bearer {}", s.token))
    }
}

fn token_expiry(token: &str) -> Result<DateTime<Utc>, SessionError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Utc.timestamp_opt(data.claims.exp as i64, 0)
        .single()
        .ok_or(SessionError::InvalidExpiry)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Anyone, logged in or not.
    Public,
    /// Only visitors without a session (login, register).
    GuestOnly,
    Protected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(&'static str),
}

const PUBLIC_ROUTES: &[&str] = &["/", "/therapycards", "/meditate", "/exercise", "/games"];
const GUEST_ROUTES: &[&str] = &["/login", "/register"];

pub fn route_access(path: &str) -> RouteAccess {
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    if PUBLIC_ROUTES.contains(&path) || path.starts_with("/games/") {
        RouteAccess::Public
    } else if GUEST_ROUTES.contains(&path) {
        RouteAccess::GuestOnly
    } else {
        RouteAccess::Protected
    }
}

pub fn guard(path: &str, session: &SessionContext, now: DateTime<Utc>) -> RouteDecision {
    let authenticated = session.is_authenticated(now);
    match (route_access(path), authenticated) {
        (RouteAccess::Public, _) => RouteDecision::Allow,
        (RouteAccess::GuestOnly, true) => RouteDecision::Redirect(DASHBOARD_PATH),
        (RouteAccess::GuestOnly, false) => RouteDecision::Allow,
        (RouteAccess::Protected, true) => RouteDecision::Allow,
        (RouteAccess::Protected, false) => RouteDecision::Redirect(LOGIN_PATH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_expiring_at(exp: DateTime<Utc>) -> String {
        let claims = Claims {
            sub: "1".to_string(),
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            exp: exp.timestamp() as usize,
            iat: Utc::now().timestamp() as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"server-secret")).unwrap()
    }

    fn user() -> UserResponse {
        UserResponse { id: 1, name: "A".to_string(), email: "a@x.com".to_string() }
    }

    #[test]
    fn test_init_reads_expiry_and_teardown_clears() {
        let now = Utc::now();
        let exp = now + Duration::days(90);
        let mut ctx = SessionContext::new();
        assert!(!ctx.is_authenticated(now));

        let session = ctx.init(token_expiring_at(exp), user()).unwrap();
        assert_eq!(session.expires_at.timestamp(), exp.timestamp());
        assert!(ctx.is_authenticated(now));
        assert!(ctx.bearer(now).unwrap().starts_with("Bearer "));

        ctx.teardown();
        assert!(!ctx.is_authenticated(now));
        assert!(ctx.bearer(now).is_none());
    }

    #[test]
    fn test_expired_session_is_logged_out() {
        let now = Utc::now();
        let mut ctx = SessionContext::new();
        ctx.init(token_expiring_at(now + Duration::hours(1)), user()).unwrap();

        assert!(ctx.is_authenticated(now));
        assert!(!ctx.is_authenticated(now + Duration::hours(2)));
        assert_eq!(
            guard("/dashboard", &ctx, now + Duration::hours(2)),
            RouteDecision::Redirect(LOGIN_PATH)
        );
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let mut ctx = SessionContext::new();
        assert!(ctx.init("not-a-jwt".to_string(), user()).is_err());
        assert!(!ctx.is_authenticated(Utc::now()));
    }

    #[test]
    fn test_guard_for_guest() {
        let ctx = SessionContext::new();
        let now = Utc::now();
        assert_eq!(guard("/dashboard", &ctx, now), RouteDecision::Redirect(LOGIN_PATH));
        assert_eq!(guard("/login", &ctx, now), RouteDecision::Allow);
        assert_eq!(guard("/register", &ctx, now), RouteDecision::Allow);
        assert_eq!(guard("/", &ctx, now), RouteDecision::Allow);
        assert_eq!(guard("/meditate", &ctx, now), RouteDecision::Allow);
        assert_eq!(guard("/games/whack-mole", &ctx, now), RouteDecision::Allow);
        assert_eq!(guard("/settings", &ctx, now), RouteDecision::Redirect(LOGIN_PATH));
    }

    #[test]
    fn test_guard_for_member() {
        let now = Utc::now();
        let mut ctx = SessionContext::new();
        ctx.init(token_expiring_at(now + Duration::days(1)), user()).unwrap();

        assert_eq!(guard("/dashboard", &ctx, now), RouteDecision::Allow);
        assert_eq!(guard("/login", &ctx, now), RouteDecision::Redirect(DASHBOARD_PATH));
        assert_eq!(guard("/register/", &ctx, now), RouteDecision::Redirect(DASHBOARD_PATH));
        assert_eq!(guard("/therapycards", &ctx, now), RouteDecision::Allow);
    }
}
