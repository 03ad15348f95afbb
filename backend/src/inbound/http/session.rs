//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie holds only the user id and role established at login. Role
//! checks happen here so handlers read as one line: `session.require(&[Role::Student])?`.
//! When [`HttpState`] is registered the extractor also re-reads the account,
//! so a cookie for a deactivated or deleted account counts as signed out.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::{info, warn};

use crate::domain::{AccountService, AuthenticatedUser, Error, ErrorCode, Role, UserId};

use super::state::HttpState;

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ROLE_KEY: &str = "role";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Start a fresh session for `user`, discarding any previous state.
    pub fn persist(&self, user: &AuthenticatedUser) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user.user_id.to_string())
            .and_then(|()| self.0.insert(ROLE_KEY, user.role.as_str()))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop the session cookie.
    pub fn purge(&self) {
        self.0.purge();
    }

    /// The signed-in user, if any. Tampered or partial cookies count as
    /// signed out.
    pub fn user(&self) -> Result<Option<AuthenticatedUser>, Error> {
        let read = |key: &str| {
            self.0
                .get::<String>(key)
                .map_err(|error| Error::internal(format!("failed to read session: {error}")))
        };
        let (Some(raw_id), Some(raw_role)) = (read(USER_ID_KEY)?, read(ROLE_KEY)?) else {
            return Ok(None);
        };
        let user_id = match UserId::new(&raw_id) {
            Ok(id) => id,
            Err(error) => {
                warn!("invalid user id in session cookie: {error}");
                return Ok(None);
            }
        };
        match raw_role.parse::<Role>() {
            Ok(role) => Ok(Some(AuthenticatedUser { user_id, role })),
            Err(error) => {
                warn!("invalid role in session cookie: {error}");
                Ok(None)
            }
        }
    }

    /// Purge the session when its account is no longer active.
    async fn drop_inactive(&self, accounts: &AccountService) -> Result<(), Error> {
        let Some(user) = self.user()? else {
            return Ok(());
        };
        match accounts.current_user(&user.user_id).await {
            Ok(_) => Ok(()),
            Err(error) if error.code() == ErrorCode::Unauthorized => {
                info!(user_id = %user.user_id, "session for inactive account dropped");
                self.purge();
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    /// Require a signed-in user or return `401 Unauthorized`.
    pub fn require_user(&self) -> Result<AuthenticatedUser, Error> {
        self.user()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Require a signed-in user holding one of `roles`; other roles get
    /// `403 Forbidden`.
    pub fn require(&self, roles: &[Role]) -> Result<AuthenticatedUser, Error> {
        let user = self.require_user()?;
        if roles.contains(&user.role) {
            Ok(user)
        } else {
            Err(Error::forbidden(format!(
                "this endpoint is not available to {} accounts",
                user.role
            )))
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let context = SessionContext::new(fut.await?);
            if let Some(state) = state {
                context.drop_inactive(&state.services.accounts).await?;
            }
            Ok(context)
        })
    }
}
