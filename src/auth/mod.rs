//! OAuth authentication for Untappd
//!
//! Implements the three-legged authorization code flow:
//!
//! 1. Send the end user to [`AuthSession::authenticate_url`]
//! 2. Untappd redirects back to your `redirect_url` with a `code`
//! 3. Build [`AuthSession::authorize_url`] for that code
//! 4. Exchange it with [`AuthSession::exchange_code_for_token`] (or do steps 3
//!    and 4 at once with [`AuthSession::authorise_code`])
//! 5. The session now holds the access token used by every query
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use untappd_sdk::auth::{AuthSession, Credentials};
//! use untappd_sdk::{Endpoints, ReqwestTransport};
//!
//! # async fn example(code: &str) -> Result<(), untappd_sdk::UntappdError> {
//! let mut session = AuthSession::new(
//!     Credentials::new("client-id", "client-secret", "https://my-app.example/cb"),
//!     &Endpoints::default(),
//!     Arc::new(ReqwestTransport::new()),
//! );
//!
//! println!("Log in at {}", session.authenticate_url());
//!
//! let url = session.authorize_url(code);
//! match session.exchange_code_for_token(&url).await {
//!     Ok(_) => println!("Authenticated"),
//!     Err(e) if e.rejection_detail().is_some() => {
//!         eprintln!("Untappd said no: {}", session.last_error());
//!     }
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

mod session;

pub use session::{AuthSession, AuthState, Credentials};
