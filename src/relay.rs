use crate::config::RelayCredentials;
use serde::Serialize;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;
use thiserror::Error;

const EMAILJS_SEND_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The template variables the relay's mail template expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateParams {
    pub user_name: String,
    pub user_email: String,
    pub user_subject: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("message relay is not configured")]
    NotConfigured,
    #[error("relay rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("relay transport failed: {0}")]
    Transport(String),
    #[error("relay worker exited before replying")]
    Disconnected,
}

pub trait ContactRelay: Send + Sync {
    fn send(&self, params: &TemplateParams) -> Result<(), RelayError>;
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a TemplateParams,
}

pub struct EmailJsRelay {
    credentials: RelayCredentials,
    agent: ureq::Agent,
    endpoint: String,
}

impl EmailJsRelay {
    pub fn new(credentials: RelayCredentials) -> Self {
        Self::with_endpoint(credentials, EMAILJS_SEND_URL)
    }

    pub fn with_endpoint(credentials: RelayCredentials, endpoint: &str) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            credentials,
            agent,
            endpoint: endpoint.to_string(),
        }
    }

    fn request_body<'a>(&'a self, params: &'a TemplateParams) -> SendRequest<'a> {
        SendRequest {
            service_id: &self.credentials.service_id,
            template_id: &self.credentials.template_id,
            user_id: &self.credentials.public_key,
            template_params: params,
        }
    }
}

impl ContactRelay for EmailJsRelay {
    fn send(&self, params: &TemplateParams) -> Result<(), RelayError> {
        let response = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .send_json(self.request_body(params));

        match response {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                Err(RelayError::Rejected { status, body })
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(RelayError::Transport(transport.to_string()))
            }
        }
    }
}

/// Used when no relay credentials are present; every send fails.
#[derive(Debug, Default)]
pub struct UnconfiguredRelay;

impl ContactRelay for UnconfiguredRelay {
    fn send(&self, _params: &TemplateParams) -> Result<(), RelayError> {
        Err(RelayError::NotConfigured)
    }
}

pub fn relay_from_credentials(credentials: Option<RelayCredentials>) -> Arc<dyn ContactRelay> {
    match credentials {
        Some(credentials) => Arc::new(EmailJsRelay::new(credentials)),
        None => {
            log::info!("contact relay credentials not set; form submissions will fail");
            Arc::new(UnconfiguredRelay)
        }
    }
}

/// Sends on a worker thread. The receiver yields exactly one result.
pub fn spawn_send(
    relay: Arc<dyn ContactRelay>,
    params: TemplateParams,
) -> Receiver<Result<(), RelayError>> {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("contact-relay".to_string())
        .spawn(move || {
            let result = relay.send(&params);
            if let Err(err) = &result {
                log::warn!("contact message was not delivered: {err}");
            }
            let _ = tx.send(result);
        });
    if let Err(err) = spawned {
        log::error!("failed to start relay worker: {err}");
    }
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRelay {
        sent: Mutex<Vec<TemplateParams>>,
        fail: bool,
    }

    impl ContactRelay for RecordingRelay {
        fn send(&self, params: &TemplateParams) -> Result<(), RelayError> {
            self.sent
                .lock()
                .map_err(|_| RelayError::Disconnected)?
                .push(params.clone());
            if self.fail {
                Err(RelayError::Rejected {
                    status: 400,
                    body: "bad template".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn params() -> TemplateParams {
        TemplateParams {
            user_name: "Ana".to_string(),
            user_email: "ana@example.com".to_string(),
            user_subject: "Hi".to_string(),
            message: "Hello there".to_string(),
        }
    }

    #[test]
    fn request_body_uses_relay_field_names() {
        let relay = EmailJsRelay::new(RelayCredentials {
            service_id: "svc".to_string(),
            template_id: "tpl".to_string(),
            public_key: "pub".to_string(),
        });
        let params = params();
        let body = serde_json::to_value(relay.request_body(&params)).expect("serializes");

        assert_eq!(body["service_id"], "svc");
        assert_eq!(body["template_id"], "tpl");
        assert_eq!(body["user_id"], "pub");
        assert_eq!(body["template_params"]["user_name"], "Ana");
        assert_eq!(body["template_params"]["user_email"], "ana@example.com");
        assert_eq!(body["template_params"]["user_subject"], "Hi");
        assert_eq!(body["template_params"]["message"], "Hello there");
    }

    #[test]
    fn unconfigured_relay_always_fails() {
        let relay = UnconfiguredRelay;
        assert!(matches!(
            relay.send(&params()),
            Err(RelayError::NotConfigured)
        ));
    }

    #[test]
    fn spawn_send_reports_worker_result() {
        let relay = Arc::new(RecordingRelay::default());
        let rx = spawn_send(relay.clone(), params());
        let result = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("worker replies");
        assert!(result.is_ok());
        assert_eq!(relay.sent.lock().expect("lock").len(), 1);
    }

    #[test]
    fn spawn_send_propagates_rejection() {
        let relay = Arc::new(RecordingRelay {
            fail: true,
            ..RecordingRelay::default()
        });
        let rx = spawn_send(relay, params());
        let result = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("worker replies");
        assert!(matches!(result, Err(RelayError::Rejected { status: 400, .. })));
    }
}
