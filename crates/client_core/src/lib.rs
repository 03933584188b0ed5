use std::time::Duration;

use async_trait::async_trait;
use lifecycle::{Action, Advisory, CertificateAttachment};
use reqwest::{header, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Actor, Application, ApplicationId, ApplicationStatus, Officiant},
    protocol::{
        AddFeedbackRequest, AssignOfficiantRequest, CancelApplicationRequest,
        CertificateNumberRequest, CompleteApplicationRequest,
    },
};
use tracing::{debug, info, warn};

pub mod config;
pub mod error;

pub use config::{load_settings, Settings};
pub use error::ClientError;

const DEFAULT_CERTIFICATE_MIME: &str = "application/octet-stream";

/// Server copy of the application after a mutation, plus the advisories raised locally.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub application: Application,
    pub advisories: Vec<Advisory>,
}

#[async_trait]
pub trait ClientHandle: Send + Sync {
    fn actor(&self) -> &Actor;
    async fn fetch_application(&self, id: &ApplicationId) -> Result<Application, ClientError>;
    async fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>, ClientError>;
    async fn list_officiants(&self) -> Result<Vec<Officiant>, ClientError>;
    async fn perform(
        &self,
        application: &Application,
        action: Action,
    ) -> Result<ActionOutcome, ClientError>;
}

pub struct MarriageClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    actor: Actor,
}

impl MarriageClient {
    pub fn new(base_url: impl Into<String>, actor: Actor) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            actor,
        }
    }

    pub fn from_settings(settings: &Settings, actor: Actor) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(ClientError::transport)?;
        Ok(Self {
            http,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            token: settings.api_token.clone(),
            actor,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await.map_err(|err| {
            warn!(%err, "request to backend failed");
            ClientError::transport(err)
        })?;

        let status = response.status();
        if !status.is_success() {
            let url = response.url().to_string();
            let body = response.text().await.unwrap_or_default();
            let err = ClientError::remote(status.as_u16(), &body);
            warn!(%url, status = status.as_u16(), %err, "backend rejected request");
            return Err(err);
        }
        response.json().await.map_err(ClientError::transport)
    }

    fn submit(&self, application_id: &ApplicationId, action: Action) -> RequestBuilder {
        let base = format!("/applications/{application_id}");
        match action {
            Action::AssignOfficiant { officiant_id } | Action::ReassignOfficiant { officiant_id } => {
                self.http
                    .post(self.url(&format!("{base}/officiant")))
                    .json(&AssignOfficiantRequest { officiant_id })
            }
            Action::AddMeeting(draft) => self
                .http
                .post(self.url(&format!("{base}/meetings")))
                .json(&draft),
            Action::UpdateMeeting { meeting_id, patch } => self
                .http
                .patch(self.url(&format!("{base}/meetings/{meeting_id}")))
                .json(&patch),
            Action::IssueCertificate {
                number,
                attachment: None,
            } => self
                .http
                .post(self.url(&format!("{base}/certificate")))
                .json(&CertificateNumberRequest {
                    certificate_number: number.trim().to_string(),
                }),
            Action::IssueCertificate {
                number,
                attachment: Some(attachment),
            } => self.upload_certificate(&base, number, attachment),
            Action::RegenerateCertificate { number } => self
                .http
                .put(self.url(&format!("{base}/certificate")))
                .json(&CertificateNumberRequest {
                    certificate_number: number.trim().to_string(),
                }),
            Action::Complete { notes } => self
                .http
                .post(self.url(&format!("{base}/complete")))
                .json(&CompleteApplicationRequest { notes }),
            Action::Cancel { reason } => self
                .http
                .post(self.url(&format!("{base}/cancel")))
                .json(&CancelApplicationRequest {
                    reason: reason.trim().to_string(),
                }),
            Action::AddFeedback { comment } => self
                .http
                .post(self.url(&format!("{base}/feedback")))
                .json(&AddFeedbackRequest {
                    comment: comment.trim().to_string(),
                }),
        }
    }

    fn upload_certificate(
        &self,
        base: &str,
        number: String,
        attachment: CertificateAttachment,
    ) -> RequestBuilder {
        let mime_type = attachment
            .mime_type
            .unwrap_or_else(|| DEFAULT_CERTIFICATE_MIME.to_string());
        self.http
            .post(self.url(&format!("{base}/certificate/upload")))
            .query(&[
                ("certificate_number", number.trim().to_string()),
                ("filename", attachment.filename),
                ("mime_type", mime_type.clone()),
            ])
            .header(header::CONTENT_TYPE, mime_type)
            .body(attachment.bytes)
    }
}

#[async_trait]
impl ClientHandle for MarriageClient {
    fn actor(&self) -> &Actor {
        &self.actor
    }

    async fn fetch_application(&self, id: &ApplicationId) -> Result<Application, ClientError> {
        debug!(application_id = %id, "fetching application");
        self.send(self.http.get(self.url(&format!("/applications/{id}"))))
            .await
    }

    async fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>, ClientError> {
        let mut request = self.http.get(self.url("/applications"));
        if let Some(status) = status {
            request = request.query(&[("status", status.as_wire())]);
        }
        self.send(request).await
    }

    async fn list_officiants(&self) -> Result<Vec<Officiant>, ClientError> {
        self.send(self.http.get(self.url("/officiants"))).await
    }

    /// Checks `action` against the lifecycle rules and only then submits it.
    /// On success the returned record is the server's, not a local projection.
    async fn perform(
        &self,
        application: &Application,
        action: Action,
    ) -> Result<ActionOutcome, ClientError> {
        let kind = action.kind();
        let transition = lifecycle::validate(application, &self.actor, &action)?;
        for advisory in &transition.advisories {
            warn!(application_id = %application.id, action = %kind, %advisory, "advisory");
        }

        let request = self.submit(&application.id, action);
        let updated: Application = self.send(request).await?;
        info!(
            application_id = %updated.id,
            actor_id = %self.actor.id,
            action = %kind,
            status = updated.status.as_wire(),
            "application updated"
        );

        Ok(ActionOutcome {
            application: updated,
            advisories: transition.advisories,
        })
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
