// ABOUTME: Integration tests for notification channels against a mock HTTP server.
// ABOUTME: Checks request shape, authentication, and rejection handling per channel.

mod support;

use keel::deploy::DeploymentOutcome;
use keel::notify::{
    DeploymentEvent, GitHubStatusChannel, Notice, NotifyChannel, NotifyError, Provenance,
    Repository, SlackChannel, WebhookChannel,
};
use keel::types::DeploymentId;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn notice(event: DeploymentEvent) -> Notice {
    Notice {
        event,
        application: "shop".to_string(),
        environment: "prod".to_string(),
    }
}

fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

async fn only_body(server: &MockServer) -> serde_json::Value {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    requests[0].body_json().unwrap()
}

mod slack {
    use super::*;

    #[tokio::test]
    async fn posts_colored_attachment_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat.postMessage"))
            .and(header("authorization", "Bearer xoxb-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;
        let channel = SlackChannel::new(reqwest::Client::new(), secret("xoxb-1"), "#deploys")
            .with_endpoint(format!("{}/api/chat.postMessage", server.uri()));

        channel
            .send(&notice(DeploymentEvent::Started))
            .await
            .unwrap();

        let body = only_body(&server).await;
        assert_eq!(body["channel"], "#deploys");
        assert_eq!(body["attachments"][0]["color"], "warning");
        assert_eq!(
            body["attachments"][0]["text"],
            "🚀 Deployment started for shop to prod"
        );
        assert!(body["attachments"][0]["ts"].is_i64());
    }

    #[tokio::test]
    async fn api_level_rejection_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": false, "error": "channel_not_found"})),
            )
            .mount(&server)
            .await;
        let channel = SlackChannel::new(reqwest::Client::new(), secret("xoxb-1"), "#nope")
            .with_endpoint(server.uri());

        let err = channel
            .send(&notice(DeploymentEvent::Failed("x".to_string())))
            .await
            .unwrap_err();

        assert!(matches!(err, NotifyError::Rejected { .. }));
        assert!(err.to_string().contains("channel_not_found"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_request_error() {
        let channel = SlackChannel::new(reqwest::Client::new(), secret("xoxb-1"), "#deploys")
            .with_endpoint("http://127.0.0.1:9/");

        let err = channel
            .send(&notice(DeploymentEvent::Started))
            .await
            .unwrap_err();

        assert!(matches!(err, NotifyError::Request { .. }));
        assert_eq!(err.channel(), "slack");
    }
}

mod github {
    use super::*;

    fn channel(server: &MockServer) -> GitHubStatusChannel {
        GitHubStatusChannel::new(
            reqwest::Client::new(),
            secret("ghp_abc"),
            &server.uri(),
            Repository::parse("acme/shop").unwrap(),
            1234,
        )
    }

    #[tokio::test]
    async fn success_status_links_environment_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/shop/deployments/1234/statuses"))
            .and(header("authorization", "Bearer ghp_abc"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        let outcome =
            DeploymentOutcome::succeeded(DeploymentId::rollback(), "http://shop.prod.svc.cluster.local");

        channel(&server)
            .send(&notice(DeploymentEvent::Succeeded(outcome)))
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert!(
            requests[0]
                .headers
                .get("user-agent")
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("keel/")
        );
        let body: serde_json::Value = requests[0].body_json().unwrap();
        assert_eq!(body["state"], "success");
        assert_eq!(body["environment_url"], "http://shop.prod.svc.cluster.local");
        assert_eq!(body["description"], "Deployment success for shop");
    }

    #[tokio::test]
    async fn rejected_status_update_keeps_response_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
            .mount(&server)
            .await;

        let err = channel(&server)
            .send(&notice(DeploymentEvent::Started))
            .await
            .unwrap_err();

        match err {
            NotifyError::Rejected { status, body, .. } => {
                assert_eq!(status, 404);
                assert!(body.contains("Not Found"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}

mod webhook {
    use super::*;

    fn channel(server: &MockServer) -> WebhookChannel {
        let provenance = Provenance {
            repository: Repository::parse("acme/shop"),
            commit: Some("abc123".to_string()),
            actor: Some("octocat".to_string()),
            ..Default::default()
        };
        WebhookChannel::new(
            reqwest::Client::new(),
            Url::parse(&format!("{}/hooks/deploy", server.uri())).unwrap(),
            provenance,
        )
    }

    #[tokio::test]
    async fn posts_status_payload_as_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hooks/deploy"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        let outcome = DeploymentOutcome::succeeded(DeploymentId::rollback(), "http://localhost:80");

        channel(&server)
            .send(&notice(DeploymentEvent::Succeeded(outcome)))
            .await
            .unwrap();

        let body = only_body(&server).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["application"], "shop");
        assert_eq!(body["environment"], "prod");
        assert_eq!(body["deploymentUrl"], "http://localhost:80");
        assert_eq!(body["repository"]["repo"], "shop");
        assert_eq!(body["commit"], "abc123");
        assert_eq!(body["actor"], "octocat");
    }

    #[tokio::test]
    async fn server_error_is_a_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = channel(&server)
            .send(&notice(DeploymentEvent::Failed("boom".to_string())))
            .await
            .unwrap_err();

        assert_eq!(err.channel(), "webhook");
        match err {
            NotifyError::Rejected { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream down");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
