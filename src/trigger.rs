use reqwest::{Client, StatusCode, Url};
use std::fmt;
use tracing::{debug, info, warn};

use crate::config::TriggerRequest;
use crate::error::{Error, Result};
use crate::identity::{TokenCredential, MANAGEMENT_SCOPE};

/// How the function endpoint answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    Triggered,
    Rejected { status: u16, body: String },
}

impl TriggerOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TriggerOutcome::Triggered)
    }
}

impl fmt::Display for TriggerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerOutcome::Triggered => write!(f, "Successfully triggered the Azure Function."),
            TriggerOutcome::Rejected { status, body } => write!(
                f,
                "Failed to trigger the Azure Function. Status code: {}. Response: {}.",
                status, body
            ),
        }
    }
}

/// POST once to the function URL with a management-scoped bearer token
pub async fn trigger(
    credential: &dyn TokenCredential,
    request: &TriggerRequest,
) -> Result<TriggerOutcome> {
    let url = Url::parse(&request.function_url).map_err(|e| {
        Error::InvalidInput(format!(
            "Invalid function URL '{}': {}",
            request.function_url, e
        ))
    })?;

    let token = credential.get_token(MANAGEMENT_SCOPE).await?;

    let client = Client::builder()
        .build()
        .map_err(|e| Error::UnclassifiedNetworkFault {
            url: request.function_url.clone(),
            source: e,
        })?;

    debug!("Triggering function at: {}", url);
    let response = client
        .post(url)
        .bearer_auth(&token.token)
        .body("")
        .send()
        .await
        .map_err(|e| Error::UnclassifiedNetworkFault {
            url: request.function_url.clone(),
            source: e,
        })?;

    let status = response.status();
    if status == StatusCode::OK {
        info!("Function accepted the trigger");
        return Ok(TriggerOutcome::Triggered);
    }

    let body = response.text().await.unwrap_or_default();
    warn!("Function trigger returned status {}", status);
    Ok(TriggerOutcome::Rejected {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::testing::{NoIdentity, StaticCredential};

    #[tokio::test]
    async fn test_trigger_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/run")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let credential = StaticCredential::new("test-token");
        let request = TriggerRequest::new(format!("{}/api/run", server.url())).unwrap();

        let outcome = trigger(&credential, &request).await.unwrap();

        assert!(outcome.is_success());
        assert_eq!(outcome, TriggerOutcome::Triggered);
        assert_eq!(
            outcome.to_string(),
            "Successfully triggered the Azure Function."
        );
        assert_eq!(
            credential.scopes.lock().unwrap().as_slice(),
            &["https://management.azure.com/.default".to_string()]
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_trigger_service_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/run")
            .with_status(503)
            .with_body("unavailable")
            .expect(1)
            .create_async()
            .await;

        let credential = StaticCredential::new("test-token");
        let request = TriggerRequest::new(format!("{}/api/run", server.url())).unwrap();

        let outcome = trigger(&credential, &request).await.unwrap();

        assert!(!outcome.is_success());
        assert_eq!(
            outcome.to_string(),
            "Failed to trigger the Azure Function. Status code: 503. Response: unavailable."
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_trigger_non_200_success_is_still_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/run")
            .with_status(202)
            .with_body("queued")
            .create_async()
            .await;

        let credential = StaticCredential::new("test-token");
        let request = TriggerRequest::new(format!("{}/api/run", server.url())).unwrap();

        let outcome = trigger(&credential, &request).await.unwrap();
        assert!(!outcome.is_success());
        assert_eq!(
            outcome,
            TriggerOutcome::Rejected {
                status: 202,
                body: "queued".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_trigger_without_identity_sends_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/run")
            .expect(0)
            .create_async()
            .await;

        let request = TriggerRequest::new(format!("{}/api/run", server.url())).unwrap();
        let err = trigger(&NoIdentity, &request).await.unwrap_err();

        assert!(matches!(err, Error::Authentication(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_trigger_connection_refused() {
        let credential = StaticCredential::new("test-token");
        let request = TriggerRequest::new("http://127.0.0.1:9/api/run").unwrap();

        let err = trigger(&credential, &request).await.unwrap_err();
        assert!(matches!(err, Error::UnclassifiedNetworkFault { .. }));
    }

    #[tokio::test]
    async fn test_trigger_rejects_malformed_url() {
        let credential = StaticCredential::new("test-token");
        let request = TriggerRequest::new("not a url").unwrap();

        let err = trigger(&credential, &request).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(credential.calls(), 0);
    }
}
