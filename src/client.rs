use crate::canonical::canonical_query_string;
use crate::config::{BceClientConfig, ConfigOverride, Endpoint};
use crate::constants::{X_BCE_DATE, X_BCE_SECURITY_TOKEN};
use crate::credentials::Credentials;
use crate::error::BceError;
use crate::handler::ResponseHandler;
use crate::signature::{self, canonical_time, Sign};
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, RequestBody, Transport};
use crate::types::{BceResponse, QueryParams, ResponseMetadata};
use base64::engine::general_purpose;
use base64::Engine;
use http::header::{AUTHORIZATION, CONTENT_LENGTH, HOST, USER_AGENT};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Base64 encoded MD5 digest, the value of a `Content-MD5` header.
pub fn content_md5(content: &[u8]) -> String {
    general_purpose::STANDARD.encode(md5::compute(content).as_ref())
}

/// Everything that stays the same between the attempts of one request.
struct PreparedRequest<'a> {
    config: BceClientConfig,
    credentials: Credentials,
    method: Method,
    path: &'a str,
    url: Url,
    headers: HeaderMap,
    params: &'a QueryParams,
    body: RequestBody,
    body_offset: Option<u64>,
    refresh_date: bool,
}

/// Generic request pipeline shared by all service clients: sign, send,
/// retry and turn the response into a [`BceResponse`] or an error.
#[derive(Debug, Clone)]
pub struct BceHttpClient {
    config: BceClientConfig,
    transport: Arc<dyn Transport>,
}

impl BceHttpClient {
    pub fn new(config: BceClientConfig) -> Self {
        Self {
            config,
            transport: Arc::new(ReqwestTransport::new()),
        }
    }

    pub fn with_transport(config: BceClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn try_from_env() -> Result<Self, BceError> {
        Ok(Self::new(BceClientConfig::try_from_env()?))
    }

    pub fn config(&self) -> &BceClientConfig {
        &self.config
    }

    /// Sends one request through `handlers` and retries it according to the
    /// retry policy of the (merged) config.
    ///
    /// `path` must be canonical already, see
    /// [`canonical_uri`](crate::canonical::canonical_uri). Local validation
    /// errors are returned as they are, everything which happens once the
    /// request is on its way is wrapped into [`BceError::Http`] together with
    /// the number of retries.
    #[allow(clippy::too_many_arguments)]
    #[tracing::instrument(level = "debug", skip_all, fields(method = %method, path = path))]
    pub async fn send_request(
        &self,
        overrides: Option<&ConfigOverride>,
        signer: &dyn Sign,
        handlers: &[&dyn ResponseHandler],
        method: Method,
        path: &str,
        body: RequestBody,
        headers: HeaderMap,
        params: &QueryParams,
    ) -> Result<BceResponse, BceError> {
        let prepared = self
            .prepare(overrides, method, path, body, headers, params)
            .await?;

        let mut retries_attempted = 0;
        loop {
            let err = match self
                .attempt(&prepared, signer, handlers, retries_attempted)
                .await
            {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            let policy = &prepared.config.retry_policy;
            if !policy.should_retry(&err, &prepared.method, retries_attempted) {
                debug!("giving up after {} retries: {}", retries_attempted, err);
                return Err(BceError::Http {
                    retries: retries_attempted,
                    last_error: Box::new(err),
                });
            }

            let delay = policy.delay_before_next_retry(&err, retries_attempted);
            warn!(
                "request failed, retrying in {} ms: {}",
                delay.as_millis(),
                err
            );
            tokio::time::sleep(delay).await;
            retries_attempted += 1;
        }
    }

    async fn prepare<'a>(
        &self,
        overrides: Option<&ConfigOverride>,
        method: Method,
        path: &'a str,
        body: RequestBody,
        mut headers: HeaderMap,
        params: &'a QueryParams,
    ) -> Result<PreparedRequest<'a>, BceError> {
        let config = match overrides {
            Some(overrides) => self.config.merge(overrides),
            None => self.config.clone(),
        };
        let credentials = config.credentials()?.clone();
        let endpoint = config.endpoint()?;
        if !path.starts_with('/') {
            return Err(BceError::Client(format!(
                "request path must start with '/': '{}'",
                path
            )));
        }

        if !headers.contains_key(USER_AGENT) {
            headers.insert(USER_AGENT, HeaderValue::try_from(config.user_agent.as_str())?);
        }
        headers.insert(HOST, HeaderValue::try_from(endpoint.host_header())?);
        headers.insert(
            CONTENT_LENGTH,
            HeaderValue::from(body.content_length()),
        );
        if let Some(token) = &config.security_token {
            headers.insert(
                HeaderName::from_static(X_BCE_SECURITY_TOKEN),
                HeaderValue::try_from(token.as_str())?,
            );
        }

        let url = build_url(&endpoint, path, params)?;
        let body_offset = body.position().await?;
        let refresh_date = !headers.contains_key(X_BCE_DATE);

        Ok(PreparedRequest {
            config,
            credentials,
            method,
            path,
            url,
            headers,
            params,
            body,
            body_offset,
            refresh_date,
        })
    }

    async fn attempt(
        &self,
        prepared: &PreparedRequest<'_>,
        signer: &dyn Sign,
        handlers: &[&dyn ResponseHandler],
        retries_attempted: u32,
    ) -> Result<BceResponse, BceError> {
        let mut headers = prepared.headers.clone();
        if prepared.refresh_date {
            headers.insert(
                HeaderName::from_static(X_BCE_DATE),
                HeaderValue::try_from(canonical_time(0)?)?,
            );
        }
        let authorization = signer.sign(
            &prepared.credentials,
            &prepared.method,
            prepared.path,
            &headers,
            prepared.params,
        )?;
        headers.insert(AUTHORIZATION, HeaderValue::try_from(authorization)?);

        if retries_attempted > 0 {
            if let Some(offset) = prepared.body_offset {
                prepared.body.rewind(offset).await?;
            }
        }

        let request = HttpRequest {
            method: prepared.method.clone(),
            url: prepared.url.clone(),
            headers,
            body: prepared.body.clone(),
            connection_timeout: prepared.config.connection_timeout,
            send_buf_size: prepared.config.send_buf_size,
            recv_buf_size: prepared.config.recv_buf_size,
        };
        let mut http_response = self.transport.send(request).await?;
        debug!(
            "{} {} -> {}",
            prepared.method,
            prepared.url,
            http_response.status
        );

        let mut response = BceResponse {
            metadata: ResponseMetadata::from(&http_response.headers),
            ..Default::default()
        };
        let outcome = run_handlers(handlers, &mut http_response, &mut response).await;
        http_response.close();

        outcome.map(|_| response)
    }

    /// Builds a URL which grants access to `path` until `expiration_seconds`
    /// after `timestamp` (`0` = now) without further credentials.
    pub fn generate_pre_signed_url(
        &self,
        method: &Method,
        path: &str,
        params: &QueryParams,
        headers: &HeaderMap,
        timestamp: i64,
        expiration_seconds: u32,
    ) -> Result<Url, BceError> {
        let credentials = self.config.credentials()?;
        let endpoint = self.config.endpoint()?;

        let mut headers = headers.clone();
        headers.insert(HOST, HeaderValue::try_from(endpoint.host_header())?);
        let headers_to_sign = BTreeSet::from([HOST.as_str().to_string()]);

        let authorization = signature::sign(
            credentials,
            method,
            path,
            &headers,
            params,
            timestamp,
            expiration_seconds,
            Some(&headers_to_sign),
        )?;

        let mut params = params.clone();
        params.insert(AUTHORIZATION.as_str().to_string(), Some(authorization));
        build_url(&endpoint, path, &params)
    }
}

async fn run_handlers(
    handlers: &[&dyn ResponseHandler],
    http_response: &mut HttpResponse,
    response: &mut BceResponse,
) -> Result<(), BceError> {
    for handler in handlers {
        if handler.handle(http_response, response).await? {
            break;
        }
    }
    Ok(())
}

fn build_url(endpoint: &Endpoint, path: &str, params: &QueryParams) -> Result<Url, BceError> {
    let mut url = format!("{}{}", endpoint.base_url(), path);
    let query = canonical_query_string(params, false);
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query);
    }
    Ok(Url::parse(&url)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Protocol;
    use crate::handler::{JsonHandler, ListHandler, DEFAULT_HANDLERS};
    use crate::retry::{BackOffRetryPolicy, NoRetryPolicy};
    use crate::signature::BceV1Signer;
    use crate::transport::collect_body;
    use crate::transport::testing::response;
    use async_trait::async_trait;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::io::{self, Cursor};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tracing_test::traced_test;

    #[derive(Debug)]
    enum Scripted {
        Respond(u16, &'static [(&'static str, &'static str)], &'static str),
        Fail,
    }

    #[derive(Debug)]
    struct Recorded {
        method: Method,
        url: String,
        headers: HeaderMap,
        body: Bytes,
        send_buf_size: usize,
    }

    #[derive(Debug, Default)]
    struct MockTransport {
        script: Mutex<VecDeque<Scripted>>,
        requests: Mutex<Vec<Recorded>>,
        closed: Arc<AtomicUsize>,
    }

    impl MockTransport {
        fn new(script: Vec<Scripted>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                ..Default::default()
            })
        }

        fn closed(&self) -> usize {
            self.closed.load(Ordering::SeqCst)
        }

        fn sent(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BceError> {
            let send_buf_size = request.send_buf_size;
            let body = collect_body(request.body, send_buf_size).await?;
            self.requests.lock().unwrap().push(Recorded {
                method: request.method,
                url: request.url.to_string(),
                headers: request.headers,
                body,
                send_buf_size,
            });

            let next = self.script.lock().unwrap().pop_front();
            match next.expect("no scripted response left") {
                Scripted::Fail => Err(BceError::Io(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "connection reset by peer",
                ))),
                Scripted::Respond(status, headers, body) => {
                    let mut map = HeaderMap::new();
                    for &(name, value) in headers {
                        map.insert(name, HeaderValue::from_static(value));
                    }
                    Ok(response(status, map, body, self.closed.clone()))
                }
            }
        }
    }

    fn client(transport: Arc<MockTransport>) -> BceHttpClient {
        let mut config = BceClientConfig::new(Credentials::new("my_ak", "my_sk"), "bj.bcebos.com");
        config.retry_policy = Arc::new(BackOffRetryPolicy {
            base_interval: Duration::from_millis(1),
            ..Default::default()
        });
        BceHttpClient::with_transport(config, transport)
    }

    fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
        headers.get(name).unwrap().to_str().unwrap()
    }

    #[traced_test]
    #[tokio::test]
    async fn test_send_success() {
        let transport = MockTransport::new(vec![Scripted::Respond(
            200,
            &[("x-bce-request-id", "req-1"), ("content-type", "application/json")],
            r#"{"bucketName": "b", "isTruncated": false}"#,
        )]);
        let client = client(transport.clone());

        let mut params = QueryParams::new();
        params.insert("maxKeys".to_string(), Some("10".to_string()));
        params.insert("prefix".to_string(), Some("a b".to_string()));
        params.insert("acl".to_string(), None);

        let res = client
            .send_request(
                None,
                &BceV1Signer::default(),
                &DEFAULT_HANDLERS,
                Method::GET,
                "/v1/bucket",
                RequestBody::Empty,
                HeaderMap::new(),
                &params,
            )
            .await
            .unwrap();

        assert_eq!(res.get_str("bucket_name"), Some("b"));
        assert_eq!(res.get("is_truncated"), Some(&serde_json::Value::Bool(false)));
        assert_eq!(res.metadata.bce_request_id.as_deref(), Some("req-1"));
        assert_eq!(transport.closed(), 1);

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.method, Method::GET);
        assert_eq!(
            req.url,
            "http://bj.bcebos.com/v1/bucket?acl=&maxKeys=10&prefix=a%20b"
        );
        assert_eq!(header(&req.headers, "host"), "bj.bcebos.com");
        assert_eq!(header(&req.headers, "content-length"), "0");
        assert!(header(&req.headers, "user-agent").starts_with("bce-sdk-rust/"));
        assert_eq!(header(&req.headers, X_BCE_DATE).len(), 20);
        let auth = header(&req.headers, "authorization");
        assert!(auth.starts_with("bce-auth-v1/my_ak/"));
        assert!(auth.contains("/1800//"));
        assert!(req.body.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let transport = MockTransport::new(vec![Scripted::Respond(
            404,
            &[("x-bce-request-id", "req-404")],
            r#"{"code": "NoSuchKey", "message": "not here"}"#,
        )]);
        let client = client(transport.clone());

        let err = client
            .send_request(
                None,
                &BceV1Signer::default(),
                &DEFAULT_HANDLERS,
                Method::GET,
                "/v1/bucket/key",
                RequestBody::Empty,
                HeaderMap::new(),
                &QueryParams::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, BceError::Http { retries: 0, .. }));
        let server = err.server_error().unwrap();
        assert_eq!(server.status_code, 404);
        assert_eq!(server.code, "NoSuchKey");
        assert_eq!(server.message, "not here");
        assert_eq!(server.request_id.as_deref(), Some("req-404"));
        assert_eq!(transport.sent(), 1);
        assert_eq!(transport.closed(), 1);
    }

    #[traced_test]
    #[tokio::test]
    async fn test_transport_failure_is_retried_and_resigned() {
        let transport = MockTransport::new(vec![
            Scripted::Fail,
            Scripted::Fail,
            Scripted::Respond(200, &[], "{}"),
        ]);
        let client = client(transport.clone());

        let signed = Arc::new(AtomicUsize::new(0));
        let counter = signed.clone();
        let signer = move |c: &Credentials,
                           m: &Method,
                           p: &str,
                           h: &HeaderMap,
                           q: &QueryParams|
              -> Result<String, BceError> {
            counter.fetch_add(1, Ordering::SeqCst);
            BceV1Signer::default().sign(c, m, p, h, q)
        };

        client
            .send_request(
                None,
                &signer,
                &DEFAULT_HANDLERS,
                Method::GET,
                "/v1/bucket",
                RequestBody::Empty,
                HeaderMap::new(),
                &QueryParams::new(),
            )
            .await
            .unwrap();

        assert_eq!(transport.sent(), 3);
        assert_eq!(signed.load(Ordering::SeqCst), 3);
        assert_eq!(transport.closed(), 1);
        for req in transport.requests.lock().unwrap().iter() {
            assert!(req.headers.contains_key(AUTHORIZATION));
        }
    }

    #[tokio::test]
    async fn test_transport_failure_not_retried_for_post() {
        let transport = MockTransport::new(vec![Scripted::Fail]);
        let client = client(transport.clone());

        let err = client
            .send_request(
                None,
                &BceV1Signer::default(),
                &DEFAULT_HANDLERS,
                Method::POST,
                "/v1/instance",
                RequestBody::from(r#"{"name":"x"}"#),
                HeaderMap::new(),
                &QueryParams::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, BceError::Http { retries: 0, .. }));
        assert!(err.is_transport());
        assert_eq!(transport.sent(), 1);
        assert_eq!(transport.closed(), 0);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let transport = MockTransport::new(vec![
            Scripted::Respond(503, &[], ""),
            Scripted::Respond(503, &[], ""),
            Scripted::Respond(503, &[], ""),
        ]);
        let client = client(transport.clone());
        let overrides = ConfigOverride {
            retry_policy: Some(Arc::new(BackOffRetryPolicy {
                max_error_retry: 2,
                base_interval: Duration::from_millis(1),
                ..Default::default()
            })),
            ..Default::default()
        };

        let err = client
            .send_request(
                Some(&overrides),
                &BceV1Signer::default(),
                &DEFAULT_HANDLERS,
                Method::DELETE,
                "/v1/bucket/key",
                RequestBody::Empty,
                HeaderMap::new(),
                &QueryParams::new(),
            )
            .await
            .unwrap_err();

        match &err {
            BceError::Http {
                retries,
                last_error,
            } => {
                assert_eq!(*retries, 2);
                let server = last_error.server_error().unwrap();
                assert_eq!(server.status_code, 503);
                assert_eq!(server.message, "Service Unavailable");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(transport.sent(), 3);
        assert_eq!(transport.closed(), 3);
    }

    #[tokio::test]
    async fn test_no_retry_override() {
        let transport = MockTransport::new(vec![Scripted::Fail]);
        let client = client(transport.clone());
        let overrides = ConfigOverride {
            retry_policy: Some(Arc::new(NoRetryPolicy)),
            ..Default::default()
        };

        let err = client
            .send_request(
                Some(&overrides),
                &BceV1Signer::default(),
                &DEFAULT_HANDLERS,
                Method::GET,
                "/v1/bucket",
                RequestBody::Empty,
                HeaderMap::new(),
                &QueryParams::new(),
            )
            .await
            .unwrap_err();
        assert!(err.is_transport());
        assert_eq!(transport.sent(), 1);
    }

    #[tokio::test]
    async fn test_stream_body_rewound_on_retry() {
        let transport = MockTransport::new(vec![Scripted::Fail, Scripted::Respond(200, &[], "")]);
        let client = client(transport.clone());
        let overrides = ConfigOverride {
            send_buf_size: Some(3),
            ..Default::default()
        };

        let data = b"0123456789".to_vec();
        let mut cursor = Cursor::new(data.clone());
        cursor.set_position(2);
        let body = RequestBody::from_reader(cursor, 8);

        client
            .send_request(
                Some(&overrides),
                &BceV1Signer::default(),
                &DEFAULT_HANDLERS,
                Method::PUT,
                "/v1/bucket/object",
                body,
                HeaderMap::new(),
                &QueryParams::new(),
            )
            .await
            .unwrap();

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        for req in requests.iter() {
            assert_eq!(req.body.as_ref(), &data[2..]);
            assert_eq!(header(&req.headers, "content-length"), "8");
            assert_eq!(req.send_buf_size, 3);
        }
        // the shared client config is untouched by the override
        assert_eq!(client.config().send_buf_size, crate::constants::DEFAULT_SEND_BUF_SIZE);
    }

    #[tokio::test]
    async fn test_parse_failure_releases_response() {
        let transport = MockTransport::new(vec![Scripted::Respond(200, &[], "{broken")]);
        let client = client(transport.clone());

        let err = client
            .send_request(
                None,
                &BceV1Signer::default(),
                &[&JsonHandler],
                Method::GET,
                "/v1/bucket",
                RequestBody::Empty,
                HeaderMap::new(),
                &QueryParams::new(),
            )
            .await
            .unwrap_err();

        match err {
            BceError::Http { last_error, .. } => {
                assert!(matches!(*last_error, BceError::SerdeJson(_)))
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(transport.sent(), 1);
        assert_eq!(transport.closed(), 1);
    }

    #[tokio::test]
    async fn test_list_response() {
        let transport =
            MockTransport::new(vec![Scripted::Respond(200, &[], r#"[{"instanceId":"i-1"}]"#)]);
        let client = client(transport.clone());

        let res = client
            .send_request(
                None,
                &BceV1Signer::default(),
                &[&crate::handler::ErrorHandler, &ListHandler],
                Method::GET,
                "/v2/instance",
                RequestBody::Empty,
                HeaderMap::new(),
                &QueryParams::new(),
            )
            .await
            .unwrap();

        #[derive(serde::Deserialize)]
        struct Instance {
            instance_id: String,
        }
        let instances = res.deserialize_result::<Vec<Instance>>().unwrap();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].instance_id, "i-1");
        assert_eq!(transport.closed(), 1);
    }

    #[tokio::test]
    async fn test_client_errors_before_sending() {
        let transport = MockTransport::new(vec![]);
        let config = BceClientConfig {
            credentials: Some(Credentials::new("ak", "sk")),
            ..Default::default()
        };
        let no_endpoint = BceHttpClient::with_transport(config, transport.clone());

        let err = no_endpoint
            .send_request(
                None,
                &BceV1Signer::default(),
                &DEFAULT_HANDLERS,
                Method::GET,
                "/v1/bucket",
                RequestBody::Empty,
                HeaderMap::new(),
                &QueryParams::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BceError::Client(_)));

        let err = client(transport.clone())
            .send_request(
                None,
                &BceV1Signer::default(),
                &DEFAULT_HANDLERS,
                Method::GET,
                "v1/bucket",
                RequestBody::Empty,
                HeaderMap::new(),
                &QueryParams::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BceError::Client(_)));
        assert_eq!(transport.sent(), 0);
    }

    #[tokio::test]
    async fn test_security_token_and_fixed_date() {
        let transport = MockTransport::new(vec![Scripted::Respond(200, &[], "")]);
        let client = client(transport.clone());
        let overrides = ConfigOverride {
            security_token: Some("token".to_string()),
            endpoint: Some("https://bj.bcebos.com:8443".to_string()),
            protocol: Some(Protocol::Http),
            ..Default::default()
        };
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(X_BCE_DATE),
            HeaderValue::from_static("2014-06-13T05:57:36Z"),
        );

        client
            .send_request(
                Some(&overrides),
                &BceV1Signer::default().with_headers_to_sign(["host"]),
                &DEFAULT_HANDLERS,
                Method::HEAD,
                "/v1/bucket",
                RequestBody::Empty,
                headers,
                &QueryParams::new(),
            )
            .await
            .unwrap();

        let requests = transport.requests.lock().unwrap();
        let req = &requests[0];
        assert_eq!(req.url, "https://bj.bcebos.com:8443/v1/bucket");
        assert_eq!(header(&req.headers, "host"), "bj.bcebos.com:8443");
        assert_eq!(header(&req.headers, X_BCE_SECURITY_TOKEN), "token");
        assert_eq!(header(&req.headers, X_BCE_DATE), "2014-06-13T05:57:36Z");
        assert!(header(&req.headers, "authorization")
            .contains("/host;x-bce-date;x-bce-security-token/"));
    }

    #[test]
    fn test_pre_signed_url() {
        let client = client(MockTransport::new(vec![]));
        let mut params = QueryParams::new();
        params.insert(
            "responseContentDisposition".to_string(),
            Some("attachment".to_string()),
        );

        let url = client
            .generate_pre_signed_url(
                &Method::GET,
                "/v1/bucket/object1",
                &params,
                &HeaderMap::new(),
                1402639056,
                1800,
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://bj.bcebos.com/v1/bucket/object1?authorization=bce-auth-v1%2Fmy_ak%2F\
             2014-06-13T05%3A57%3A36Z%2F1800%2Fhost%2F\
             7c530b572aadc8cca47e6908c94aaf9ecb85a62b3ae77afa8cf75b036eea9e89\
             &responseContentDisposition=attachment"
        );
    }

    #[test]
    fn test_content_md5() {
        assert_eq!(content_md5(b""), "1B2M2Y8AsgTpgAmY7PhCfg==");
    }

    /// Talks to a real endpoint configured through `.env`.
    #[ignore]
    #[traced_test]
    #[tokio::test]
    async fn test_live_list_buckets() -> Result<(), BceError> {
        dotenvy::dotenv().ok();
        let client = BceHttpClient::try_from_env()?;

        let res = client
            .send_request(
                None,
                &BceV1Signer::default(),
                &DEFAULT_HANDLERS,
                Method::GET,
                "/v1",
                RequestBody::Empty,
                HeaderMap::new(),
                &QueryParams::new(),
            )
            .await?;
        assert!(res.metadata.bce_request_id.is_some());

        Ok(())
    }
}
