//! OAuth code-grant session for Untappd

use std::sync::Arc;

use crate::config::Endpoints;
use crate::error::{Result, UntappdError};
use crate::transport::HttpTransport;
use crate::types::{AccessToken, Envelope, QueryParams};
use crate::utils::url_with_query;

/// Registered application credentials
///
/// Opaque strings; never validated for format.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Redirect URL registered with the provider
    pub redirect_url: String,
}

impl Credentials {
    /// Create a credential set
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_url: redirect_url.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_url", &self.redirect_url)
            .finish()
    }
}

/// Where the session is in the code-grant flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No token yet
    Unauthenticated,
    /// A token was obtained (or restored)
    Authenticated,
}

/// Holds credentials and the current access token
///
/// Starts `Unauthenticated`; a successful
/// [`exchange_code_for_token`](Self::exchange_code_for_token) moves it to
/// `Authenticated`. There is no way back: a revoked token only shows up as a
/// failing query.
#[derive(Debug, Clone)]
pub struct AuthSession {
    credentials: Credentials,
    authenticate_base: String,
    authorize_base: String,
    access_token: AccessToken,
    last_error: String,
    transport: Arc<dyn HttpTransport>,
}

impl AuthSession {
    /// Create a session against the given endpoints
    #[must_use]
    pub fn new(
        credentials: Credentials,
        endpoints: &Endpoints,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            credentials,
            authenticate_base: endpoints.authenticate_url.clone(),
            authorize_base: endpoints.authorize_url.clone(),
            access_token: AccessToken::default(),
            last_error: String::new(),
            transport,
        }
    }

    /// Get the credentials
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// URL to send the end user to for login
    ///
    /// Pure function of the credentials.
    #[must_use]
    pub fn authenticate_url(&self) -> String {
        url_with_query(
            &self.authenticate_base,
            &[
                ("client_id", self.credentials.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_url", self.credentials.redirect_url.as_str()),
            ],
        )
    }

    /// URL that exchanges `code` for a token when fetched
    ///
    /// Pure function of the credentials and `code`. Pass the result to
    /// [`exchange_code_for_token`](Self::exchange_code_for_token), or fetch it
    /// yourself.
    #[must_use]
    pub fn authorize_url(&self, code: &str) -> String {
        url_with_query(
            &self.authorize_base,
            &[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("response_type", "code"),
                ("redirect_url", self.credentials.redirect_url.as_str()),
                ("code", code),
            ],
        )
    }

    /// Fetch `url` and take the access token out of the envelope
    ///
    /// On success the token is stored and returned; [`last_error`](Self::last_error)
    /// is left as it was. On a non-200 envelope the provider's
    /// `error_detail` is stored as the last error and the token is unchanged.
    ///
    /// # Errors
    ///
    /// - `UntappdError::AuthRejected` if the provider refused the exchange
    /// - `UntappdError::Transport` if the provider could not be reached
    /// - `UntappdError::Decode` if the body is not a JSON envelope, or a
    ///   success envelope carries no `access_token`
    pub async fn exchange_code_for_token(&mut self, url: &str) -> Result<AccessToken> {
        let response = self.transport.get(url, &QueryParams::new()).await?;
        let envelope = Envelope::from_value(&response.json()?)?;

        if !envelope.is_success() {
            let detail = envelope.meta.error_detail.clone().unwrap_or_else(|| {
                format!(
                    "provider returned http_code {}",
                    envelope.meta.http_code.as_deref().unwrap_or("<missing>")
                )
            });
            tracing::warn!(
                http_code = envelope.meta.http_code.as_deref().unwrap_or("<missing>"),
                detail = %detail,
                "Authorization code rejected"
            );
            self.last_error.clone_from(&detail);
            return Err(UntappdError::auth_rejected(detail));
        }

        let token = envelope
            .access_token()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                UntappdError::decode("Success envelope has no non-empty response.access_token", None)
            })?;

        self.access_token = AccessToken::new(token);
        tracing::info!("Authorization code exchanged for access token");

        Ok(self.access_token.clone())
    }

    /// Build the authorize URL for `code` and run the exchange
    ///
    /// # Errors
    ///
    /// Same as [`exchange_code_for_token`](Self::exchange_code_for_token).
    pub async fn authorise_code(&mut self, code: &str) -> Result<AccessToken> {
        let url = self.authorize_url(code);
        self.exchange_code_for_token(&url).await
    }

    /// Most recent provider rejection detail; empty if none yet
    #[must_use]
    pub fn last_error(&self) -> &str {
        &self.last_error
    }

    /// Current access token; empty until authorized
    #[must_use]
    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    /// Restore a token obtained earlier (e.g. from the caller's session store)
    pub fn set_access_token(&mut self, token: impl Into<AccessToken>) {
        self.access_token = token.into();
    }

    /// Current state of the flow
    #[must_use]
    pub fn state(&self) -> AuthState {
        if self.access_token.is_empty() {
            AuthState::Unauthenticated
        } else {
            AuthState::Authenticated
        }
    }

    /// Whether a token is held
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state() == AuthState::Authenticated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays canned bodies and records requested URLs
    #[derive(Debug, Default)]
    struct ScriptedTransport {
        bodies: Mutex<Vec<Result<&'static str>>>,
        requests: Mutex<Vec<(String, QueryParams)>>,
    }

    impl ScriptedTransport {
        fn replying(body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                bodies: Mutex::new(vec![Ok(body)]),
                ..Self::default()
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                bodies: Mutex::new(vec![Err(UntappdError::transport("connection refused"))]),
                ..Self::default()
            })
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn get(&self, url: &str, params: &QueryParams) -> Result<TransportResponse> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), params.clone()));
            let body = self.bodies.lock().unwrap().remove(0)?;
            Ok(TransportResponse {
                status: 200,
                body: body.as_bytes().to_vec(),
            })
        }
    }

    fn session(transport: Arc<dyn HttpTransport>) -> AuthSession {
        AuthSession::new(
            Credentials::new("cid", "csecret", "https://app.test/cb"),
            &Endpoints::default(),
            transport,
        )
    }

    #[test]
    fn test_authenticate_url() {
        let session = session(ScriptedTransport::replying("{}"));
        assert_eq!(
            session.authenticate_url(),
            "https://untappd.com/oauth/authenticate/?client_id=cid&response_type=code\
             &redirect_url=https%3A%2F%2Fapp.test%2Fcb"
        );
    }

    #[test]
    fn test_authorize_url_is_pure() {
        let transport = ScriptedTransport::replying("{}");
        let session = session(transport.clone());

        let first = session.authorize_url("abc");
        let second = session.authorize_url("abc");

        assert_eq!(first, second);
        assert_eq!(
            first,
            "https://untappd.com/oauth/authorize/?client_id=cid&client_secret=csecret\
             &response_type=code&redirect_url=https%3A%2F%2Fapp.test%2Fcb&code=abc"
        );
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exchange_success_keeps_last_error() {
        let transport = Arc::new(ScriptedTransport {
            bodies: Mutex::new(vec![
                Ok(r#"{"meta":{"http_code":400,"error_detail":"invalid_code"}}"#),
                Ok(r#"{"meta":{"http_code":"200"},"response":{"access_token":"T"}}"#),
            ]),
            ..ScriptedTransport::default()
        });
        let mut session = session(transport.clone());

        assert!(session.exchange_code_for_token("https://x.test/a").await.is_err());
        let token = session
            .exchange_code_for_token("https://x.test/b")
            .await
            .unwrap();

        assert_eq!(token.as_str(), "T");
        assert_eq!(session.state(), AuthState::Authenticated);
        assert_eq!(session.last_error(), "invalid_code");

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[1].0, "https://x.test/b");
        assert!(requests[1].1.is_empty());
    }

    #[tokio::test]
    async fn test_exchange_rejection() {
        let mut session = session(ScriptedTransport::replying(
            r#"{"meta":{"http_code":"400","error_detail":"invalid_code"}}"#,
        ));
        session.set_access_token("previous");

        let err = session
            .exchange_code_for_token("https://x.test/")
            .await
            .unwrap_err();

        assert_eq!(err.rejection_detail(), Some("invalid_code"));
        assert_eq!(session.access_token().as_str(), "previous");
        assert_eq!(session.last_error(), "invalid_code");
    }

    #[tokio::test]
    async fn test_exchange_rejection_without_detail() {
        let mut session = session(ScriptedTransport::replying(r#"{"meta":{"http_code":500}}"#));

        let err = session
            .exchange_code_for_token("https://x.test/")
            .await
            .unwrap_err();

        assert_eq!(err.rejection_detail(), Some("provider returned http_code 500"));
        assert_eq!(session.last_error(), "provider returned http_code 500");
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_a_rejection() {
        let mut session = session(ScriptedTransport::failing());

        let err = session
            .exchange_code_for_token("https://x.test/")
            .await
            .unwrap_err();

        assert!(matches!(err, UntappdError::Transport(_)));
        assert_eq!(session.last_error(), "");
        assert_eq!(session.state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_garbled_body_is_decode_error() {
        let mut session = session(ScriptedTransport::replying("<html>oops</html>"));

        let err = session
            .exchange_code_for_token("https://x.test/")
            .await
            .unwrap_err();

        assert!(matches!(err, UntappdError::Decode { .. }));
        assert_eq!(session.last_error(), "");
    }

    #[tokio::test]
    async fn test_success_without_token_is_decode_error() {
        let mut session = session(ScriptedTransport::replying(
            r#"{"meta":{"http_code":200},"response":{}}"#,
        ));

        let err = session
            .exchange_code_for_token("https://x.test/")
            .await
            .unwrap_err();

        assert!(matches!(err, UntappdError::Decode { .. }));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_success_with_empty_token_is_decode_error() {
        let mut session = session(ScriptedTransport::replying(
            r#"{"meta":{"http_code":200},"response":{"access_token":""}}"#,
        ));
        session.set_access_token("previous");

        let err = session
            .exchange_code_for_token("https://x.test/")
            .await
            .unwrap_err();

        assert!(matches!(err, UntappdError::Decode { .. }));
        assert_eq!(session.access_token().as_str(), "previous");
        assert_eq!(session.last_error(), "");
    }

    #[tokio::test]
    async fn test_authorise_code_fetches_authorize_url() {
        let transport = ScriptedTransport::replying(
            r#"{"meta":{"http_code":200},"response":{"access_token":"T"}}"#,
        );
        let mut session = session(transport.clone());
        let expected_url = session.authorize_url("the-code");

        session.authorise_code("the-code").await.unwrap();

        assert_eq!(transport.requests.lock().unwrap()[0].0, expected_url);
        assert_eq!(session.access_token().as_str(), "T");
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let debug = format!("{:?}", Credentials::new("id", "hunter2", "cb"));
        assert!(!debug.contains("hunter2"));
    }
}
