use std::sync::LazyLock;

use contact_relay::{
    configuration::{
        ApplicationSettings, ContactSettings, EmailClientSettings, Environment, Settings,
    },
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};
use serde::Serialize;
use wiremock::MockServer;

// Ensure that the `tracing` stack is only initialised once
static TRACING: LazyLock<()> = LazyLock::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber).expect("Failed to init subscriber");
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber).expect("Failed to init subscriber");
    };
});

pub const RECIPIENT: &str = "inbox@example.com";
pub const AUTHORIZATION_TOKEN: &str = "re_test_token";

pub struct TestApp {
    pub address: String,
    pub email_server: MockServer,
    pub api_client: reqwest::Client,
}

/// A contact form body; `None` fields are left out of the JSON entirely.
#[derive(Serialize, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct ContactBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'a str>,
}

impl ContactBody<'_> {
    pub fn valid() -> Self {
        Self {
            first_name: Some("Ursula"),
            last_name: Some("Le Guin"),
            email: Some("ursula@example.com"),
            phone: Some("+1 555 0100"),
            message: Some("Hello there"),
        }
    }
}

impl TestApp {
    pub async fn post_contact<T: Serialize + ?Sized>(&self, body: &T) -> reqwest::Response {
        self.api_client
            .post(format!("{}/api/contact", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_raw_contact(&self, body: &'static str) -> reqwest::Response {
        self.api_client
            .post(format!("{}/api/contact", &self.address))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// The JSON body of the `n`-th request received by the email server.
    pub async fn sent_email(&self, n: usize) -> serde_json::Value {
        let requests = self.email_server.received_requests().await.unwrap();
        serde_json::from_slice(&requests[n].body).unwrap()
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_in(Environment::Development).await
}

pub async fn spawn_app_in(environment: Environment) -> TestApp {
    LazyLock::force(&TRACING);

    // Launch a mock server to stand in for the email API
    let email_server = MockServer::start().await;

    let configuration = Settings {
        application: ApplicationSettings {
            // Use a random OS port
            port: 0,
            host: "127.0.0.1".into(),
            environment,
        },
        email_client: EmailClientSettings {
            base_url: email_server.uri(),
            sender_email: "contact@example.com".into(),
            sender_name: "Website Contact Form".into(),
            authorization_token: AUTHORIZATION_TOKEN.to_string().into(),
            timeout_milliseconds: 500,
        },
        contact: ContactSettings {
            recipient_email: RECIPIENT.into(),
        },
    };

    let application = Application::build(configuration)
        .await
        .expect("Failed to build application.");
    let application_port = application.port();
    tokio::spawn(application.run_until_stopped());

    TestApp {
        address: format!("http://127.0.0.1:{}", application_port),
        email_server,
        api_client: reqwest::Client::new(),
    }
}
