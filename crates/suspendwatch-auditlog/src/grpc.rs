//! Cloud Logging gRPC transport.

use crate::proto::{TailLogEntriesRequest, TailLogEntriesResponse, TAIL_LOG_ENTRIES_PATH};
use crate::transport::{EntryStream, TailRequest, TailTransport, TransportError};
use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use serde::Deserialize;
use std::time::Duration;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::metadata::AsciiMetadataValue;
use tonic::service::interceptor::InterceptedService;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tracing::debug;

pub const LOGGING_ENDPOINT: &str = "https://logging.googleapis.com";

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Environment variable holding a pre-issued OAuth access token.
pub const ACCESS_TOKEN_VAR: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Attaches a bearer token to every call.
#[derive(Clone)]
pub struct BearerInterceptor(AsciiMetadataValue);

impl BearerInterceptor {
    pub fn new(token: &str) -> Result<Self, TransportError> {
        let header = format!("Bearer {token}")
            .parse()
            .map_err(|e| TransportError::Auth(format!("token is not a valid header: {e}")))?;
        Ok(Self(header))
    }
}

impl tonic::service::Interceptor for BearerInterceptor {
    fn call(
        &mut self,
        mut request: tonic::Request<()>,
    ) -> Result<tonic::Request<()>, tonic::Status> {
        request
            .metadata_mut()
            .insert("authorization", self.0.clone());
        Ok(request)
    }
}

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
}

/// Where OAuth access tokens come from.
#[derive(Debug, Clone)]
pub enum TokenSource {
    /// A fixed token, typically from [`ACCESS_TOKEN_VAR`].
    Static(String),
    /// The GCE/GKE metadata server.
    MetadataServer(reqwest::Client),
}

impl TokenSource {
    /// Use [`ACCESS_TOKEN_VAR`] when set, the metadata server otherwise.
    pub fn from_env() -> Result<Self, TransportError> {
        match std::env::var(ACCESS_TOKEN_VAR) {
            Ok(token) if !token.is_empty() => Ok(Self::Static(token)),
            _ => {
                let client = reqwest::Client::builder()
                    .timeout(Duration::from_secs(10))
                    .build()
                    .map_err(|e| TransportError::Setup(e.to_string()))?;
                Ok(Self::MetadataServer(client))
            }
        }
    }

    pub async fn token(&self) -> Result<String, TransportError> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::MetadataServer(client) => {
                let response = client
                    .get(METADATA_TOKEN_URL)
                    .header("Metadata-Flavor", "Google")
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| TransportError::Auth(e.to_string()))?;
                let token: MetadataToken = response
                    .json()
                    .await
                    .map_err(|e| TransportError::Auth(e.to_string()))?;
                Ok(token.access_token)
            }
        }
    }
}

/// [`TailTransport`] speaking to the Cloud Logging API.
pub struct GrpcTailTransport {
    channel: Channel,
    tokens: TokenSource,
}

impl GrpcTailTransport {
    /// Prepare a lazily connected TLS channel to `endpoint`.
    pub fn new(endpoint: &str, tokens: TokenSource) -> Result<Self, TransportError> {
        let channel = Endpoint::from_shared(endpoint.to_string())
            .map_err(|e| TransportError::Setup(e.to_string()))?
            .tls_config(ClientTlsConfig::new().with_native_roots())
            .map_err(|e| TransportError::Setup(e.to_string()))?
            .connect_timeout(Duration::from_secs(30))
            .http2_keep_alive_interval(Duration::from_secs(301))
            .connect_lazy();

        Ok(Self { channel, tokens })
    }
}

#[async_trait]
impl TailTransport for GrpcTailTransport {
    async fn open(&self, request: &TailRequest) -> Result<EntryStream, TransportError> {
        let token = self.tokens.token().await?;
        let service = InterceptedService::new(self.channel.clone(), BearerInterceptor::new(&token)?);
        let mut grpc = tonic::client::Grpc::new(service);

        grpc.ready()
            .await
            .map_err(|e| tonic::Status::unavailable(format!("service was not ready: {e}")))?;

        // One request, then keep the send side open for the life of the session.
        let outbound = stream::iter([TailLogEntriesRequest::from(request)]).chain(stream::pending());
        let codec: ProstCodec<TailLogEntriesRequest, TailLogEntriesResponse> = ProstCodec::default();

        let response = grpc
            .streaming(
                tonic::Request::new(outbound),
                PathAndQuery::from_static(TAIL_LOG_ENTRIES_PATH),
                codec,
            )
            .await?;

        debug!("tail session opened");
        Ok(response
            .into_inner()
            .map(|batch| batch.map(|r| r.entries).map_err(TransportError::from))
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::service::Interceptor;

    #[test]
    fn test_bearer_header() {
        let mut interceptor = BearerInterceptor::new("ya29.token").unwrap();
        let request = interceptor.call(tonic::Request::new(())).unwrap();
        assert_eq!(
            request.metadata().get("authorization").unwrap(),
            "Bearer ya29.token"
        );
    }

    #[test]
    fn test_bearer_rejects_unprintable_token() {
        assert!(matches!(
            BearerInterceptor::new("bad\ntoken"),
            Err(TransportError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn test_static_token() {
        let source = TokenSource::Static("abc".to_string());
        assert_eq!(source.token().await.unwrap(), "abc");
    }
}
