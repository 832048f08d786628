//! Single chokepoint for outbound calls. Every repository and service goes
//! through these verbs; none may hold its own HTTP client.

pub mod normalize;

use std::sync::Arc;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::session::SessionStore;

/// Success payloads arrive either bare or wrapped in a `{data, message?}`
/// envelope; both unwrap to the payload.
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload<T> {
    Enveloped { data: T },
    Bare(T),
}

/// Injects the bearer credential, unwraps payloads, and routes failures
/// through the normalizer. Reads the session store fresh on every call; a 401
/// clears it as a side effect before the error propagates.
#[derive(Clone)]
pub struct ApiGateway {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiGateway {
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<T, ApiError> {
        self.execute(self.http.get(self.url(path)).query(query))
            .await
    }

    pub async fn create<T, B>(&self, path: &str, body: &B) -> std::result::Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.http.post(self.url(path)).json(body))
            .await
    }

    /// POST with a form-encoded body; the login endpoint expects
    /// `application/x-www-form-urlencoded` rather than JSON.
    pub async fn create_form<T, B>(&self, path: &str, form: &B) -> std::result::Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.http.post(self.url(path)).form(form))
            .await
    }

    pub async fn replace<T, B>(&self, path: &str, body: &B) -> std::result::Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.http.put(self.url(path)).json(body)).await
    }

    /// Success is the absence of failure; any response body is discarded.
    pub async fn remove(&self, path: &str) -> std::result::Result<(), ApiError> {
        self.dispatch(self.http.delete(self.url(path))).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<T, ApiError> {
        let body = self.dispatch(request).await?;
        match serde_json::from_slice::<Payload<T>>(&body) {
            Ok(Payload::Enveloped { data } | Payload::Bare(data)) => Ok(data),
            Err(err) => {
                tracing::error!("Failed to decode success payload: {}", err);
                Err(normalize::unknown_error())
            }
        }
    }

    async fn dispatch(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<Vec<u8>, ApiError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|err| normalize::transport_error(&err))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| normalize::transport_error(&err))?;
        if status.is_success() {
            return Ok(body.to_vec());
        }

        let err = normalize::http_error(status.as_u16(), &body);
        if err.is_auth() {
            tracing::warn!("Authorization failure, clearing stored session");
            self.session.clear();
        }
        Err(err)
    }
}
