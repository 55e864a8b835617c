use std::{sync::Arc, time::Duration};

use anyhow::anyhow;
use axum::{
    Router,
    extract::Request,
    response::Response,
    routing::{get, post},
    serve::Serve,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Span, info, info_span};
use uuid::Uuid;

use crate::{
    configuration::{Environment, Settings},
    domain::{EmailAddress, MailRoute},
    email_client::EmailClient,
    routes::{contact, health_check},
};

pub struct AppState {
    pub email_client: EmailClient,
    pub recipient: EmailAddress,
    pub environment: Environment,
}

pub fn run(listener: TcpListener, app_state: AppState) -> Serve<TcpListener, Router, Router> {
    // Shared read-only across requests, nothing in here is mutated after startup.
    let app_state = Arc::new(app_state);
    let app = Router::new()
        .route("/health_check", get(health_check))
        .route("/api/contact", post(contact))
        .with_state(app_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let request_id = Uuid::new_v4();
                    info_span!(
                        "http_request",
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        request_id = ?request_id,
                        status = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response, latency: Duration, span: &Span| {
                    let status = response.status();
                    span.record("status", status.as_u16());
                    info!(parent: span, ?status, ?latency, "Response sent");
                }),
        );

    axum::serve(listener, app)
}

pub struct Application {
    port: u16,
    server: Serve<TcpListener, Router, Router>,
}

impl Application {
    pub async fn build(configuration: Settings) -> anyhow::Result<Self> {
        let sender_email = configuration
            .email_client
            .sender()
            .map_err(|e| anyhow!("invalid sender email: {e}"))?;
        let recipient = configuration
            .contact
            .recipient()
            .map_err(|e| anyhow!("invalid recipient email: {e}"))?;
        let MailRoute { sender, recipient } = MailRoute::new(sender_email, recipient)
            .map_err(|e| anyhow!("invalid mail route: {e}"))?;
        let timeout = configuration.email_client.timeout();
        let email_client = EmailClient::new(
            configuration.email_client.base_url,
            sender,
            &configuration.email_client.sender_name,
            configuration.email_client.authorization_token,
            timeout,
        )?;

        let listener = TcpListener::bind(format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        ))
        .await?;
        let port = listener.local_addr()?.port();

        let app_state = AppState {
            email_client,
            recipient,
            environment: configuration.application.environment,
        };
        let server = run(listener, app_state);

        info!(
            port,
            environment = configuration.application.environment.as_str(),
            "Contact relay listening"
        );
        Ok(Self { server, port })
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        Ok(self.server.await?)
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}
