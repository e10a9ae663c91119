//! Session-backed gate in front of the backoffice.
//!
//! A session is either unauthenticated (no [`AdminSession`] stored, or one with
//! `authenticated == false`) or authenticated after a successful [`AuthGate::login`].
//! [`require_admin`] runs before every backoffice handler.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};
use tracing::{info, warn};

use crate::config::AdminConfig;

/// Session key holding the [`AdminSession`] payload.
pub const ADMIN_SESSION_KEY: &str = "admin";
pub const SESSION_COOKIE_NAME: &str = "praktijk.sid";
pub const SESSION_LIFETIME_HOURS: i64 = 24;
pub const LOGIN_PATH: &str = "/backoffice/login";

/// Authentication state stored server-side for one browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub authenticated: bool,
    pub username: String,
}

/// Name of the signed-in administrator, placed in request extensions by [`require_admin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser(pub String);

/// Decision taken before any backoffice operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow { username: String },
    Deny,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Ongeldige gebruikersnaam of wachtwoord.")]
    InvalidCredentials,
    #[error("session store failure: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Checks a submitted username/password pair.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Accepts exactly one configured identity. Without a password nothing is accepted.
#[derive(Clone)]
pub struct SingleAdminVerifier {
    username: String,
    password: Option<String>,
}

impl SingleAdminVerifier {
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(config.username.clone(), config.password.clone())
    }

    pub fn is_configured(&self) -> bool {
        self.password.is_some()
    }
}

impl CredentialVerifier for SingleAdminVerifier {
    fn verify(&self, username: &str, password: &str) -> bool {
        let Some(expected_password) = self.password.as_deref() else {
            return false;
        };

        // Evaluate both comparisons so timing does not reveal which one failed.
        let user_ok = self.username.as_bytes().ct_eq(username.as_bytes());
        let pass_ok = expected_password.as_bytes().ct_eq(password.as_bytes());
        bool::from(user_ok & pass_ok)
    }
}

/// Login, logout and the per-request access check.
#[derive(Clone)]
pub struct AuthGate {
    verifier: Arc<dyn CredentialVerifier>,
}

impl AuthGate {
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { verifier }
    }

    pub async fn login(
        &self,
        session: &Session,
        username: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        if !self.verifier.verify(username, password) {
            warn!("backoffice login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        session.cycle_id().await?;
        session
            .insert(
                ADMIN_SESSION_KEY,
                AdminSession {
                    authenticated: true,
                    username: username.to_string(),
                },
            )
            .await?;

        info!(%username, "backoffice login");
        Ok(())
    }

    pub async fn guard(&self, session: &Session) -> Result<Access, AuthError> {
        let state = session.get::<AdminSession>(ADMIN_SESSION_KEY).await?;
        Ok(match state {
            Some(AdminSession {
                authenticated: true,
                username,
            }) => Access::Allow { username },
            _ => Access::Deny,
        })
    }

    pub async fn logout(&self, session: &Session) -> Result<(), AuthError> {
        session.flush().await?;
        info!("backoffice logout");
        Ok(())
    }
}

/// Middleware: lets authenticated sessions through, sends everyone else to the login page.
pub async fn require_admin(
    State(gate): State<AuthGate>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    match gate.guard(&session).await {
        Ok(Access::Allow { username }) => {
            request.extensions_mut().insert(AdminUser(username));
            next.run(request).await
        }
        Ok(Access::Deny) => Redirect::to(LOGIN_PATH).into_response(),
        Err(err) => {
            warn!(error = %err, "session lookup failed, treating request as anonymous");
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}

/// In-process session layer with the backoffice cookie settings.
pub fn session_layer(secure_cookie: bool) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_secure(secure_cookie)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::hours(SESSION_LIFETIME_HOURS)))
}
