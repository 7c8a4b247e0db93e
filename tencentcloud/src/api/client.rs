use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HOST};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tfplug::context::Context;
use tfplug::retry::RetryConfig;

use super::error::ApiError;
use super::ratelimit::{RateLimiter, DEFAULT_LIMIT};
use super::sign::{self, SigningRequest};

/// A TencentCloud API group: endpoint prefix plus the API version it speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Service {
    pub name: &'static str,
    pub version: &'static str,
}

impl Service {
    pub const CDB: Service = Service {
        name: "cdb",
        version: "2017-03-20",
    };
    pub const AS: Service = Service {
        name: "as",
        version: "2018-04-19",
    };
    pub const MARIADB: Service = Service {
        name: "mariadb",
        version: "2017-03-12",
    };
    pub const VPC: Service = Service {
        name: "vpc",
        version: "2017-03-12",
    };
    pub const MPS: Service = Service {
        name: "mps",
        version: "2019-06-12",
    };
}

#[derive(Clone)]
pub struct Credential {
    pub secret_id: String,
    pub secret_key: String,
    pub token: Option<String>,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"***")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub region: String,
    /// `HTTPS` or `HTTP`
    pub protocol: String,
    pub domain: String,
    /// Full URL used for every service instead of `{protocol}://{service}.{domain}/`
    pub endpoint: Option<String>,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub read_retry_timeout: Duration,
    pub write_retry_timeout: Duration,
    pub retry_min_interval: Duration,
    pub retry_max_interval: Duration,
    pub rate_limit_per_second: NonZeroU32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            region: "ap-guangzhou".to_string(),
            protocol: "HTTPS".to_string(),
            domain: "tencentcloudapi.com".to_string(),
            endpoint: None,
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            read_retry_timeout: Duration::from_secs(3 * 60),
            write_retry_timeout: Duration::from_secs(5 * 60),
            retry_min_interval: Duration::from_millis(500),
            retry_max_interval: Duration::from_secs(10),
            rate_limit_per_second: DEFAULT_LIMIT,
        }
    }
}

/// TencentCloud API client shared by every resource of one provider instance
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    credential: Credential,
    config: ClientConfig,
    rate_limiter: RateLimiter,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "Response")]
    response: serde_json::Value,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Message", default)]
    message: String,
}

impl Client {
    pub fn new(credential: Credential, config: ClientConfig) -> Result<Self, ApiError> {
        Self::with_rate_limiter(
            credential,
            RateLimiter::new(config.rate_limit_per_second),
            config,
        )
    }

    pub fn with_rate_limiter(
        credential: Credential,
        rate_limiter: RateLimiter,
        config: ClientConfig,
    ) -> Result<Self, ApiError> {
        if credential.secret_id.is_empty() || credential.secret_key.is_empty() {
            return Err(ApiError::Config(
                "secret_id and secret_key must not be empty".to_string(),
            ));
        }
        match config.protocol.to_ascii_uppercase().as_str() {
            "HTTPS" | "HTTP" => {}
            other => {
                return Err(ApiError::Config(format!(
                    "unsupported protocol {:?}, expected HTTPS or HTTP",
                    other
                )))
            }
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                credential,
                config,
                rate_limiter,
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn region(&self) -> &str {
        &self.inner.config.region
    }

    /// Budget for lookups and for polling asynchronous tasks
    pub fn read_retry(&self) -> RetryConfig {
        RetryConfig::new(self.inner.config.read_retry_timeout).with_intervals(
            self.inner.config.retry_min_interval,
            self.inner.config.retry_max_interval,
        )
    }

    /// Budget for mutating calls
    pub fn write_retry(&self) -> RetryConfig {
        RetryConfig::new(self.inner.config.write_retry_timeout).with_intervals(
            self.inner.config.retry_min_interval,
            self.inner.config.retry_max_interval,
        )
    }

    pub fn mysql(&self) -> crate::api::mysql::MysqlApi<'_> {
        crate::api::mysql::MysqlApi::new(self)
    }

    pub fn autoscaling(&self) -> crate::api::autoscaling::AutoScalingApi<'_> {
        crate::api::autoscaling::AutoScalingApi::new(self)
    }

    pub fn mariadb(&self) -> crate::api::mariadb::MariadbApi<'_> {
        crate::api::mariadb::MariadbApi::new(self)
    }

    pub fn vpc(&self) -> crate::api::vpc::VpcApi<'_> {
        crate::api::vpc::VpcApi::new(self)
    }

    pub fn mps(&self) -> crate::api::mps::MpsApi<'_> {
        crate::api::mps::MpsApi::new(self)
    }

    /// Endpoint for `service`, honouring the `endpoint` override
    pub fn endpoint_url(&self, service: Service) -> Result<url::Url, ApiError> {
        let raw = match &self.inner.config.endpoint {
            Some(endpoint) => format!("{}/", endpoint.trim_end_matches('/')),
            None => format!(
                "{}://{}.{}/",
                self.inner.config.protocol.to_ascii_lowercase(),
                service.name,
                self.inner.config.domain
            ),
        };
        url::Url::parse(&raw).map_err(|e| ApiError::Config(format!("invalid endpoint {}: {}", raw, e)))
    }

    /// Issues one signed API call and unwraps the `Response` envelope.
    ///
    /// Blocks on the per-action rate limiter first. Remote errors come back
    /// as [`ApiError::Service`] with code and message untouched.
    pub async fn call<Req, Resp>(
        &self,
        ctx: &Context,
        service: Service,
        action: &str,
        request: &Req,
    ) -> Result<Resp, ApiError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        self.inner.rate_limiter.check(action).await;

        let log_id = ctx.log_id().await;
        let payload = serde_json::to_string(request)
            .map_err(|e| ApiError::ParseError(format!("Failed to encode request: {}", e)))?;

        let text = tokio::select! {
            result = self.send(service, action, &payload) => result,
            _ = ctx.cancelled() => Err(ApiError::Cancelled),
        };

        let result = text.and_then(|(status, text)| {
            parse_response::<Resp>(status, &text).map(|resp| (resp, text))
        });

        match result {
            Ok((resp, text)) => {
                tracing::debug!(
                    "{} api[{}] success, request body [{}], response body [{}]",
                    log_id,
                    action,
                    payload,
                    text
                );
                Ok(resp)
            }
            Err(e) => {
                tracing::error!(
                    "{} api[{}] fail, request body [{}], reason[{}]",
                    log_id,
                    action,
                    payload,
                    e
                );
                Err(e)
            }
        }
    }

    async fn send(
        &self,
        service: Service,
        action: &str,
        payload: &str,
    ) -> Result<(u16, String), ApiError> {
        let url = self.endpoint_url(service)?;
        let host = match (url.host_str(), url.port()) {
            (Some(h), Some(p)) => format!("{}:{}", h, p),
            (Some(h), None) => h.to_string(),
            (None, _) => return Err(ApiError::Config(format!("endpoint {} has no host", url))),
        };

        let now = chrono::Utc::now();
        let timestamp = now.timestamp();
        let date = now.format("%Y-%m-%d").to_string();
        let credential = &self.inner.credential;

        let authorization = sign::authorization(&SigningRequest {
            secret_id: &credential.secret_id,
            secret_key: &credential.secret_key,
            service: service.name,
            host: &host,
            timestamp,
            date: &date,
            payload,
        })?;

        let mut builder = self
            .inner
            .http_client
            .post(url)
            .header(HOST, &host)
            .header(CONTENT_TYPE, sign::CONTENT_TYPE)
            .header(AUTHORIZATION, authorization)
            .header("X-TC-Action", action)
            .header("X-TC-Version", service.version)
            .header("X-TC-Timestamp", timestamp.to_string())
            .header("X-TC-Region", &self.inner.config.region);
        if let Some(token) = &credential.token {
            builder = builder.header("X-TC-Token", token);
        }

        let response = builder.body(payload.to_string()).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        Ok((status, text))
    }
}

fn parse_response<Resp: DeserializeOwned>(status: u16, text: &str) -> Result<Resp, ApiError> {
    let envelope = match serde_json::from_str::<Envelope>(text) {
        Ok(envelope) => envelope,
        Err(e) if (200..300).contains(&status) => {
            return Err(ApiError::ParseError(format!(
                "Failed to parse response: {}, body: {}",
                e, text
            )))
        }
        Err(_) => {
            return Err(ApiError::Http {
                status,
                message: text.to_string(),
            })
        }
    };

    if let Some(error) = envelope.response.get("Error") {
        let body: ErrorBody = serde_json::from_value(error.clone())
            .map_err(|e| ApiError::ParseError(format!("Malformed error body: {}", e)))?;
        let request_id = envelope
            .response
            .get("RequestId")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        return Err(ApiError::Service {
            code: body.code,
            message: body.message,
            request_id,
        });
    }

    if !(200..300).contains(&status) {
        return Err(ApiError::Http {
            status,
            message: text.to_string(),
        });
    }

    serde_json::from_value(envelope.response)
        .map_err(|e| ApiError::ParseError(format!("Failed to parse response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Activity {
        #[serde(rename = "ActivityId")]
        activity_id: String,
    }

    fn credential() -> Credential {
        Credential {
            secret_id: "AKIDtest".to_string(),
            secret_key: "secret".to_string(),
            token: None,
        }
    }

    fn client_for(url: &str) -> Client {
        Client::new(
            credential(),
            ClientConfig {
                endpoint: Some(url.to_string()),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn call_sends_signed_headers_and_unwraps_envelope() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("x-tc-action", "ExecuteScalingPolicy")
            .match_header("x-tc-version", "2018-04-19")
            .match_header("x-tc-region", "ap-guangzhou")
            .match_header("content-type", "application/json; charset=utf-8")
            .match_header(
                "authorization",
                Matcher::Regex(
                    r"^TC3-HMAC-SHA256 Credential=AKIDtest/\d{4}-\d{2}-\d{2}/as/tc3_request, SignedHeaders=content-type;host, Signature=[0-9a-f]{64}$".to_string(),
                ),
            )
            .match_body(Matcher::PartialJson(json!({"AutoScalingPolicyId": "asp-1"})))
            .with_status(200)
            .with_body(r#"{"Response":{"ActivityId":"act-123","RequestId":"req-1"}}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let resp: Activity = client
            .call(
                &Context::new(),
                Service::AS,
                "ExecuteScalingPolicy",
                &json!({"AutoScalingPolicyId": "asp-1"}),
            )
            .await
            .unwrap();

        assert_eq!(resp.activity_id, "act-123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn call_surfaces_remote_error_unmodified() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(
                r#"{"Response":{"Error":{"Code":"InvalidParameterValue","Message":"bad id"},"RequestId":"req-9"}}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server.url());
        let result: Result<Activity, _> = client
            .call(&Context::new(), Service::AS, "ExecuteScalingPolicy", &json!({}))
            .await;

        match result {
            Err(ApiError::Service {
                code,
                message,
                request_id,
            }) => {
                assert_eq!(code, "InvalidParameterValue");
                assert_eq!(message, "bad id");
                assert_eq!(request_id, "req-9");
            }
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn call_reports_http_errors_without_envelope() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let client = client_for(&server.url());
        let result: Result<Activity, _> = client
            .call(&Context::new(), Service::AS, "ExecuteScalingPolicy", &json!({}))
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 502, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn call_sends_security_token_when_present() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("x-tc-token", "sts-token")
            .with_body(r#"{"Response":{"ActivityId":"act-1","RequestId":"r"}}"#)
            .create_async()
            .await;

        let client = Client::new(
            Credential {
                token: Some("sts-token".to_string()),
                ..credential()
            },
            ClientConfig {
                endpoint: Some(server.url()),
                ..Default::default()
            },
        )
        .unwrap();

        let _: Activity = client
            .call(&Context::new(), Service::AS, "ExecuteScalingPolicy", &json!({}))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[test]
    fn endpoint_url_per_service() {
        let client = Client::new(credential(), ClientConfig::default()).unwrap();
        assert_eq!(
            client.endpoint_url(Service::CDB).unwrap().as_str(),
            "https://cdb.tencentcloudapi.com/"
        );

        let client = Client::new(
            credential(),
            ClientConfig {
                protocol: "HTTP".to_string(),
                domain: "internal.tencentcloudapi.com".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            client.endpoint_url(Service::MPS).unwrap().as_str(),
            "http://mps.internal.tencentcloudapi.com/"
        );
    }

    #[test]
    fn new_rejects_bad_configuration() {
        let empty = Credential {
            secret_id: String::new(),
            ..credential()
        };
        assert!(matches!(
            Client::new(empty, ClientConfig::default()),
            Err(ApiError::Config(_))
        ));

        let ftp = ClientConfig {
            protocol: "FTP".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            Client::new(credential(), ftp),
            Err(ApiError::Config(_))
        ));
    }

    #[test]
    fn credential_debug_hides_secrets() {
        let debug = format!("{:?}", credential());
        assert!(debug.contains("AKIDtest"));
        assert!(!debug.contains("secret\""));
    }

    #[test]
    fn retry_budgets_follow_config() {
        let client = Client::new(credential(), ClientConfig::default()).unwrap();
        assert_eq!(client.read_retry().timeout, Duration::from_secs(180));
        assert_eq!(client.write_retry().timeout, Duration::from_secs(300));
    }
}
