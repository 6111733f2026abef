use crate::error::BceError;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::stream::{self, Stream, TryStreamExt};
use http::{HeaderMap, Method, StatusCode};
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::fmt::{self, Debug, Formatter};
use std::io::{self, SeekFrom};
use std::pin::Pin;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

/// Any seekable async reader, e.g. a `tokio::fs::File` or an in memory cursor.
pub trait SeekRead: AsyncRead + AsyncSeek + Send + Sync + Unpin {}

impl<T> SeekRead for T where T: AsyncRead + AsyncSeek + Send + Sync + Unpin {}

pub type BodyStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + Sync + 'static>>;

/// Request payload. Readers are shared so the dispatcher can rewind them
/// between attempts.
#[derive(Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Bytes(Bytes),
    Reader {
        reader: Arc<Mutex<Box<dyn SeekRead>>>,
        content_length: u64,
    },
}

impl Debug for RequestBody {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "RequestBody::Empty"),
            Self::Bytes(bytes) => write!(f, "RequestBody::Bytes({} bytes)", bytes.len()),
            Self::Reader { content_length, .. } => {
                write!(f, "RequestBody::Reader({} bytes)", content_length)
            }
        }
    }
}

impl From<Bytes> for RequestBody {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(value))
    }
}

impl From<String> for RequestBody {
    fn from(value: String) -> Self {
        Self::Bytes(Bytes::from(value))
    }
}

impl From<&'static str> for RequestBody {
    fn from(value: &'static str) -> Self {
        Self::Bytes(Bytes::from_static(value.as_bytes()))
    }
}

impl RequestBody {
    /// Streams `content_length` bytes from `reader`, starting at its current
    /// position.
    pub fn from_reader<R>(reader: R, content_length: u64) -> Self
    where
        R: SeekRead + 'static,
    {
        Self::Reader {
            reader: Arc::new(Mutex::new(Box::new(reader))),
            content_length,
        }
    }

    pub fn json<T: Serialize>(value: &T) -> Result<Self, BceError> {
        Ok(Self::Bytes(Bytes::from(serde_json::to_vec(value)?)))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Bytes(bytes) => bytes.is_empty(),
            Self::Reader { content_length, .. } => *content_length == 0,
        }
    }

    pub fn content_length(&self) -> u64 {
        match self {
            Self::Empty => 0,
            Self::Bytes(bytes) => bytes.len() as u64,
            Self::Reader { content_length, .. } => *content_length,
        }
    }

    /// Position of a reader, so it can be rewound for a retry.
    pub(crate) async fn position(&self) -> Result<Option<u64>, BceError> {
        match self {
            Self::Reader { reader, .. } => Ok(Some(reader.lock().await.stream_position().await?)),
            _ => Ok(None),
        }
    }

    pub(crate) async fn rewind(&self, offset: u64) -> Result<(), BceError> {
        if let Self::Reader { reader, .. } = self {
            reader.lock().await.seek(SeekFrom::Start(offset)).await?;
        }
        Ok(())
    }

    /// Body as a stream of chunks of at most `chunk_size` bytes. A reader
    /// running dry before `content_length` fails the stream.
    pub fn into_stream(self, chunk_size: usize) -> BodyStream {
        match self {
            Self::Empty => Box::pin(stream::empty::<io::Result<Bytes>>()),
            Self::Bytes(bytes) => {
                let chunk_size = chunk_size.max(1);
                let chunks = (0..bytes.len())
                    .step_by(chunk_size)
                    .map(|start| Ok(bytes.slice(start..(start + chunk_size).min(bytes.len()))))
                    .collect::<Vec<io::Result<Bytes>>>();
                Box::pin(stream::iter(chunks))
            }
            Self::Reader {
                reader,
                content_length,
            } => Box::pin(reader_stream(reader, content_length, chunk_size.max(1))),
        }
    }
}

fn reader_stream(
    reader: Arc<Mutex<Box<dyn SeekRead>>>,
    content_length: u64,
    chunk_size: usize,
) -> impl Stream<Item = io::Result<Bytes>> + Send + Sync + 'static {
    stream::try_unfold((reader, 0u64), move |(reader, sent)| async move {
        if sent >= content_length {
            return Ok(None);
        }

        let size = (content_length - sent).min(chunk_size as u64) as usize;
        let mut buf = vec![0u8; size];
        let read = {
            let mut guard = reader.lock().await;
            guard.read(&mut buf).await?
        };
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Insufficient data, only {} bytes available while Content-Length is {}",
                    sent, content_length
                ),
            ));
        }
        buf.truncate(read);

        Ok(Some((Bytes::from(buf), (reader, sent + read as u64))))
    })
}

/// One fully prepared and signed request.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
    pub connection_timeout: Duration,
    pub send_buf_size: usize,
    pub recv_buf_size: usize,
}

/// Source of the response payload, released through `close`.
#[async_trait]
pub trait ResponseBody: Send {
    async fn read_all(&mut self) -> Result<Bytes, BceError>;

    fn close(&mut self);
}

/// Status, headers and body of one response. The body is released exactly
/// once: on the first `close` or when the envelope is dropped.
pub struct HttpResponse {
    pub status: StatusCode,
    pub reason: String,
    pub headers: HeaderMap,
    body: Box<dyn ResponseBody>,
    closed: bool,
}

impl Debug for HttpResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("reason", &self.reason)
            .field("headers", &self.headers)
            .field("closed", &self.closed)
            .finish()
    }
}

impl HttpResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Box<dyn ResponseBody>) -> Self {
        Self {
            status,
            reason: status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            headers,
            body,
            closed: false,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub async fn read(&mut self) -> Result<Bytes, BceError> {
        if self.closed {
            return Err(BceError::Client(
                "response body has already been released".to_string(),
            ));
        }
        self.body.read_all().await
    }

    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.body.close();
        }
    }
}

impl Drop for HttpResponse {
    fn drop(&mut self) {
        self.close();
    }
}

/// Sends one request over a fresh connection.
#[async_trait]
pub trait Transport: Debug + Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BceError>;
}

/// `reqwest` backed transport. Idle connections are never kept, so every
/// request opens its own connection.
#[derive(Debug, Default)]
pub struct ReqwestTransport {
    clients: StdMutex<HashMap<Duration, reqwest::Client>>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_client(&self, connection_timeout: Duration) -> Result<reqwest::Client, BceError> {
        let mut clients = self
            .clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(client) = clients.get(&connection_timeout) {
            return Ok(client.clone());
        }

        let mut builder = reqwest::Client::builder()
            .brotli(true)
            .connect_timeout(connection_timeout)
            .pool_max_idle_per_host(0);
        if env::var("BCE_DANGER_ALLOW_INSECURE").as_deref() == Ok("true") {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder.build()?;
        clients.insert(connection_timeout, client.clone());
        Ok(client)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BceError> {
        let client = self.get_client(request.connection_timeout)?;

        let builder = client
            .request(request.method, request.url)
            .headers(request.headers);
        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Bytes(bytes) => builder.body(bytes),
            body => builder.body(reqwest::Body::wrap_stream(
                body.into_stream(request.send_buf_size),
            )),
        };

        let res = builder.send().await?;
        debug!("response status: {}", res.status());

        let status = res.status();
        let headers = res.headers().clone();
        let body = ReqwestBody {
            response: Some(res),
            recv_buf_size: request.recv_buf_size,
        };
        Ok(HttpResponse::new(status, headers, Box::new(body)))
    }
}

struct ReqwestBody {
    response: Option<reqwest::Response>,
    recv_buf_size: usize,
}

#[async_trait]
impl ResponseBody for ReqwestBody {
    async fn read_all(&mut self) -> Result<Bytes, BceError> {
        let Some(response) = self.response.as_mut() else {
            return Ok(Bytes::new());
        };

        let capacity = response
            .content_length()
            .unwrap_or_default()
            .min(self.recv_buf_size as u64) as usize;
        let mut buf = BytesMut::with_capacity(capacity);
        while let Some(chunk) = response.chunk().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok(buf.freeze())
    }

    fn close(&mut self) {
        // dropping the response hands the connection back to hyper
        self.response.take();
    }
}

/// Collects a body stream, mainly useful for transports that need the whole
/// payload at once.
pub async fn collect_body(body: RequestBody, chunk_size: usize) -> Result<Bytes, BceError> {
    let chunks = body
        .into_stream(chunk_size)
        .try_collect::<Vec<Bytes>>()
        .await?;
    let mut buf = BytesMut::with_capacity(chunks.iter().map(Bytes::len).sum());
    for chunk in chunks {
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}


#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use pretty_assertions::assert_eq;
    use crate::transport::testing::MockBody;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_bytes_body_chunks() {
        let body = RequestBody::from(vec![1u8; 10]);
        let chunks = body
            .into_stream(4)
            .map(|c| c.unwrap().len())
            .collect::<Vec<usize>>()
            .await;
        assert_eq!(chunks, vec![4, 4, 2]);
    }

    #[tokio::test]
    async fn test_reader_body_is_bounded_by_content_length() {
        let data = (0u8..100).collect::<Vec<u8>>();
        let body = RequestBody::from_reader(Cursor::new(data.clone()), 30);
        let chunks = body
            .clone()
            .into_stream(8)
            .map(|c| c.unwrap())
            .collect::<Vec<Bytes>>()
            .await;
        assert_eq!(
            chunks.iter().map(Bytes::len).collect::<Vec<usize>>(),
            vec![8, 8, 8, 6]
        );
        assert_eq!(chunks.concat(), data[..30].to_vec());

        // rewinding makes the same bytes available again
        body.rewind(0).await.unwrap();
        let again = collect_body(body, 1024).await.unwrap();
        assert_eq!(again.as_ref(), &data[..30]);
    }

    #[tokio::test]
    async fn test_reader_body_insufficient_data() {
        let body = RequestBody::from_reader(Cursor::new(vec![0u8; 5]), 10);
        let err = collect_body(body, 4).await.unwrap_err();
        assert!(err.to_string().contains("Insufficient data, only 5 bytes"));
    }

    #[tokio::test]
    async fn test_reader_position() {
        let mut cursor = Cursor::new(vec![0u8; 10]);
        cursor.set_position(3);
        let body = RequestBody::from_reader(cursor, 7);
        assert_eq!(body.position().await.unwrap(), Some(3));
        assert_eq!(RequestBody::Empty.position().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_response_released_once() {
        let closed = Arc::new(AtomicUsize::new(0));
        let mut res = HttpResponse::new(
            StatusCode::OK,
            HeaderMap::new(),
            Box::new(MockBody::new("{}", closed.clone())),
        );
        assert_eq!(res.reason, "OK");
        assert_eq!(res.read().await.unwrap().as_ref(), b"{}");
        res.close();
        res.close();
        assert!(res.read().await.is_err());
        drop(res);
        assert_eq!(closed.load(Ordering::SeqCst), 1);

        let res = HttpResponse::new(
            StatusCode::OK,
            HeaderMap::new(),
            Box::new(MockBody::new("{}", closed.clone())),
        );
        drop(res);
        assert_eq!(closed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_reason_for_unknown_status() {
        let closed = Arc::new(AtomicUsize::new(0));
        let status = StatusCode::from_u16(599).unwrap();
        let res = HttpResponse::new(status, HeaderMap::new(), Box::new(MockBody::new("", closed)));
        assert_eq!(res.reason, "HTTP 599");
    }
}
