use std::sync::Arc;

use validator::Validate;

use crate::auth::auth_dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::error::Result;
use crate::gateway::ApiGateway;
use crate::session::{Session, SessionStore, User};

/// Login, registration, and profile lookup over the gateway. Writes the
/// session store on success; logout only clears it, no network call.
#[derive(Clone)]
pub struct AuthService {
    gateway: ApiGateway,
    session: Arc<SessionStore>,
}

impl AuthService {
    pub fn new(gateway: ApiGateway, session: Arc<SessionStore>) -> Self {
        Self { gateway, session }
    }

    pub async fn login(&self, request: LoginRequest) -> Result<User> {
        request.validate()?;
        let auth: AuthResponse = self
            .gateway
            .create_form("/api/auth/login", &request)
            .await?;
        self.session.set(Session {
            token: auth.token,
            user: auth.user.clone(),
        });
        tracing::info!(username = %auth.user.username, "Logged in");
        Ok(auth.user)
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        request.validate()?;
        let auth: AuthResponse = self.gateway.create("/api/auth/register", &request).await?;
        self.session.set(Session {
            token: auth.token,
            user: auth.user.clone(),
        });
        Ok(auth.user)
    }

    pub async fn current_user(&self) -> Result<User> {
        Ok(self.gateway.fetch("/api/auth/me", &[]).await?)
    }

    pub fn logout(&self) {
        self.session.clear();
    }

    pub fn stored_user(&self) -> Option<User> {
        self.session.get().map(|session| session.user)
    }
}
