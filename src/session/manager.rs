// Session manager: bearer injection, expiry detection, refresh-and-retry

use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::models::{RefreshResponse, Session, SignInResponse, SignUpRequest, UserInfo};
use super::transport::{HttpTransport, TransportRequest, TransportResponse};
use crate::common::EngineError;

/// Owns the access/refresh token pair and fronts every authenticated call.
///
/// Expiry detection is reactive: the first 401 inside a logical call
/// triggers exactly one refresh, then one retry of the original request.
/// A failed refresh clears all session state and surfaces `SessionExpired`;
/// the caller is responsible for redirecting to sign-in.
pub struct SessionManager {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    session: RwLock<Option<Session>>,
}

impl SessionManager {
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            session: RwLock::new(None),
        }
    }

    /// `POST /user/login/`. Creates the session on success.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserInfo, EngineError> {
        let request = TransportRequest::new(Method::POST, format!("{}/user/login/", self.base_url))
            .with_body(json!({ "email": email, "password": password }));

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            warn!(status = response.status, "sign-in rejected");
            return Err(EngineError::from_status(
                response.status,
                response.error_message(),
            ));
        }

        let payload: SignInResponse = response.json()?;
        let user = UserInfo {
            id: payload.id,
            name: payload.name,
            email: payload.email,
            username: payload.username,
            is_admin: payload.is_admin,
        };

        info!(user_id = %user.id, "sign-in successful");
        *self.session.write().await = Some(Session {
            access: payload.access,
            refresh: payload.refresh,
            user: user.clone(),
        });

        Ok(user)
    }

    /// `POST /user/register/`. Account creation, no session side effects.
    pub async fn sign_up(&self, details: SignUpRequest) -> Result<(), EngineError> {
        let body = serde_json::to_value(&details).map_err(|e| EngineError::Api {
            status: 0,
            message: format!("failed to serialize registration: {}", e),
        })?;
        let request =
            TransportRequest::new(Method::POST, format!("{}/user/register/", self.base_url))
                .with_body(body);

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(EngineError::from_status(
                response.status,
                response.error_message(),
            ));
        }
        info!("account registered");
        Ok(())
    }

    /// Destroys the local session. Tokens are not persisted anywhere else,
    /// so this is the whole logout.
    pub async fn sign_out(&self) {
        if self.session.write().await.take().is_some() {
            info!("signed out");
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    pub async fn current_user(&self) -> Option<UserInfo> {
        self.session.read().await.as_ref().map(|s| s.user.clone())
    }

    /// The signed-in user's id, or `Unauthenticated`.
    pub async fn user_id(&self) -> Result<Uuid, EngineError> {
        self.current_user()
            .await
            .map(|u| u.id)
            .ok_or(EngineError::Unauthenticated)
    }

    pub async fn access_token(&self) -> Option<String> {
        self.session.read().await.as_ref().map(|s| s.access.clone())
    }

    /// Issues an authenticated call against `path` (relative to the API
    /// base). Runs the refresh-and-retry protocol on the first 401, maps
    /// any remaining non-2xx status to the typed taxonomy, and returns the
    /// successful response for the caller to deserialize.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<TransportResponse, EngineError> {
        let access = self
            .access_token()
            .await
            .ok_or(EngineError::Unauthenticated)?;

        let mut request =
            TransportRequest::new(method, format!("{}{}", self.base_url, path)).with_bearer(access);
        if let Some(body) = body {
            request = request.with_body(body);
        }

        let response = self.transport.send(request.clone()).await?;
        if response.status != 401 {
            return Self::into_result(response);
        }

        debug!(path, "access token rejected, attempting refresh");
        let access = self.refresh_access_token().await?;
        let retried = self.transport.send(request.with_bearer(access)).await?;
        if retried.status == 401 {
            // The freshly refreshed token was rejected too; the session is
            // unusable and must not keep answering is_authenticated().
            warn!(path, "retry rejected after refresh, forcing sign-out");
            *self.session.write().await = None;
            return Err(EngineError::SessionExpired);
        }
        Self::into_result(retried)
    }

    /// One refresh attempt. On success the new access token is persisted so
    /// subsequent independent calls reuse it; on any failure the session is
    /// cleared and the caller sees `SessionExpired`.
    async fn refresh_access_token(&self) -> Result<String, EngineError> {
        let refresh = {
            let guard = self.session.read().await;
            match guard.as_ref() {
                Some(s) => s.refresh.clone(),
                None => return Err(EngineError::Unauthenticated),
            }
        };

        let request = TransportRequest::new(
            Method::POST,
            format!("{}/user/token/refresh/", self.base_url),
        )
        .with_body(json!({ "refresh": refresh }));

        let outcome = self.transport.send(request).await;
        let refreshed = match outcome {
            Ok(response) if response.is_success() => response.json::<RefreshResponse>(),
            Ok(response) => {
                warn!(status = response.status, "token refresh rejected");
                Err(EngineError::SessionExpired)
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed");
                Err(EngineError::SessionExpired)
            }
        };

        match refreshed {
            Ok(payload) => {
                if let Some(session) = self.session.write().await.as_mut() {
                    session.access = payload.access.clone();
                }
                debug!("access token refreshed");
                Ok(payload.access)
            }
            Err(_) => {
                *self.session.write().await = None;
                Err(EngineError::SessionExpired)
            }
        }
    }

    fn into_result(response: TransportResponse) -> Result<TransportResponse, EngineError> {
        if response.is_success() {
            Ok(response)
        } else {
            Err(EngineError::from_status(
                response.status,
                response.error_message(),
            ))
        }
    }

    #[cfg(test)]
    pub(crate) async fn install_session(&self, session: Session) {
        *self.session.write().await = Some(session);
    }
}
