//! Local listener that captures the identity provider redirect.
//!
//! The provider requires the registered redirect URL to match exactly, so
//! the listener binds a fixed local port. Exactly one redirect is expected;
//! the handler resolves a oneshot rendezvous and the server is torn down
//! gracefully afterwards, so the browser always receives the result page
//! before the socket closes.

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{Router, extract::Query, response::Html, routing::get};
use tokio::{
    net::TcpListener,
    sync::{Mutex, oneshot},
};
use tracing::{debug, warn};

use crate::{error::AuthError, types::CallbackParams};

const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>strato</title></head>
<body style="font-family: system-ui; text-align: center; padding-top: 80px;">
<h2>Login successful!</h2>
<p>You can close this tab and return to the terminal.</p>
</body>
</html>"#;

const DENIED_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>strato</title></head>
<body style="font-family: system-ui; text-align: center; padding-top: 80px;">
<h2>Login was not completed</h2>
<p>Return to the terminal and run <code>strato login</code> to try again.</p>
</body>
</html>"#;

type Rendezvous = oneshot::Sender<Result<CallbackParams, AuthError>>;

pub struct CallbackServer;

impl CallbackServer {
    /// Bind the fixed local port and wait for exactly one redirect.
    ///
    /// Resolves with the captured parameters, or fails with
    /// [`AuthError::AuthorizationDenied`] if the provider reported an error,
    /// [`AuthError::RedirectTimeout`] after `timeout`, or
    /// [`AuthError::LoginCancelled`] on Ctrl-C.
    pub async fn wait_for_redirect(
        port: u16,
        timeout: Duration,
    ) -> Result<CallbackParams, AuthError> {
        let (tx, rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .map_err(|source| AuthError::ListenerBind { port, source })?;
        debug!(port, "redirect listener bound");

        let app = router(Arc::new(Mutex::new(Some(tx))));
        let server = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = serve.await {
                warn!("redirect listener error: {e}");
            }
        });

        let outcome = tokio::select! {
            received = rx => match received {
                Ok(result) => result,
                Err(_) => Err(AuthError::MalformedRedirect(
                    "redirect listener closed unexpectedly".into(),
                )),
            },
            () = tokio::time::sleep(timeout) => Err(AuthError::RedirectTimeout),
            () = wait_for_ctrl_c() => Err(AuthError::LoginCancelled),
        };

        // Graceful shutdown only after the rendezvous resolved: in-flight
        // handlers finish first, so the browser sees the result page rather
        // than a connection reset.
        let _ = shutdown_tx.send(());
        let _ = server.await;

        outcome
    }
}

fn router(tx: Arc<Mutex<Option<Rendezvous>>>) -> Router {
    Router::new().route(
        "/",
        get(move |Query(params): Query<HashMap<String, String>>| {
            let tx = tx.clone();
            async move {
                let (result, page) = parse_redirect(&params);
                if let Some(sender) = tx.lock().await.take() {
                    let _ = sender.send(result);
                }
                Html(page)
            }
        }),
    )
}

/// Split a redirect into the flow outcome and the page served back.
///
/// An `error` query parameter aborts the flow before any token exchange.
fn parse_redirect(
    params: &HashMap<String, String>,
) -> (Result<CallbackParams, AuthError>, &'static str) {
    if let Some(reason) = params.get("error") {
        return (
            Err(AuthError::AuthorizationDenied {
                reason: reason.clone(),
            }),
            DENIED_PAGE,
        );
    }

    let Some(code) = params.get("code") else {
        return (
            Err(AuthError::MalformedRedirect(
                "missing code parameter".into(),
            )),
            DENIED_PAGE,
        );
    };

    let Some(challenge_id) = params.get("challenge_id").and_then(|v| v.parse().ok()) else {
        return (
            Err(AuthError::MalformedRedirect(
                "missing or non-numeric challenge_id parameter".into(),
            )),
            DENIED_PAGE,
        );
    };

    (
        Ok(CallbackParams {
            code: code.clone(),
            challenge_id,
        }),
        SUCCESS_PAGE,
    )
}

async fn wait_for_ctrl_c() {
    // If the signal handler cannot be installed, never resolve this branch
    // rather than cancelling a healthy login.
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn hit(port: u16, query: &str) -> String {
        // Give the listener a moment to bind.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let url = format!("http://127.0.0.1:{port}/?{query}");
        reqwest::get(&url).await.unwrap().text().await.unwrap()
    }

    #[tokio::test]
    async fn test_redirect_with_code_resolves_params() {
        let port = 48395;
        let wait = tokio::spawn(CallbackServer::wait_for_redirect(
            port,
            Duration::from_secs(5),
        ));

        let body = hit(port, "code=abc123&challenge_id=42").await;
        assert!(body.contains("Login successful"));

        let params = wait.await.unwrap().unwrap();
        assert_eq!(
            params,
            CallbackParams {
                code: "abc123".into(),
                challenge_id: 42,
            }
        );
    }

    #[tokio::test]
    async fn test_error_param_is_authorization_denied() {
        let port = 48396;
        let wait = tokio::spawn(CallbackServer::wait_for_redirect(
            port,
            Duration::from_secs(5),
        ));

        let body = hit(port, "error=access_denied").await;
        assert!(body.contains("was not completed"));

        let err = wait.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            AuthError::AuthorizationDenied { reason } if reason == "access_denied"
        ));
    }

    #[tokio::test]
    async fn test_missing_challenge_id_is_malformed() {
        let port = 48397;
        let wait = tokio::spawn(CallbackServer::wait_for_redirect(
            port,
            Duration::from_secs(5),
        ));

        hit(port, "code=abc123").await;

        let err = wait.await.unwrap().unwrap_err();
        assert!(matches!(err, AuthError::MalformedRedirect(_)));
    }

    #[tokio::test]
    async fn test_no_redirect_times_out() {
        let err = CallbackServer::wait_for_redirect(48398, Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::RedirectTimeout));
    }

    #[tokio::test]
    async fn test_port_conflict_is_listener_bind() {
        let port = 48399;
        let holder = TcpListener::bind(("127.0.0.1", port)).await.unwrap();

        let err = CallbackServer::wait_for_redirect(port, Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ListenerBind { .. }));
        drop(holder);
    }
}
