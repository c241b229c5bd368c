//! Signed request construction and dispatch.

use bytes::Bytes;
use ecoflow_auth::canonical::{CONTENT_TYPE_JSON, canonical_params};
use ecoflow_auth::signer::{Clock, NonceGenerator, Signer};
use ecoflow_core::ClientConfig;
use http::Method;
use http::header::{CONTENT_TYPE, HeaderValue};
use http_body::Body;
use http_body_util::{BodyExt, Full};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{BoxError, ClientError};
use crate::transport::{HttpTransport, ReqwestTransport};

/// Body type produced by the request constructors.
pub type RequestBody = Full<Bytes>;

/// Client for the EcoFlow OpenPlatform API.
///
/// The client owns its configuration, so any number of clients with
/// different credentials can be used side by side. All methods take `&self`
/// and keep no per-request state.
#[derive(Debug)]
pub struct Client<T = ReqwestTransport> {
    config: ClientConfig,
    signer: Signer,
    transport: T,
}

impl Client<ReqwestTransport> {
    /// Create a client over a default `reqwest` transport.
    #[must_use]
    pub fn from_config(config: ClientConfig) -> Self {
        Self::new(config, ReqwestTransport::default())
    }
}

impl<T: HttpTransport> Client<T> {
    /// Create a client over the given transport.
    #[must_use]
    pub fn new(config: ClientConfig, transport: T) -> Self {
        let signer = Signer::new(config.access_key.clone(), config.secret_key.clone());
        Self {
            config,
            signer,
            transport,
        }
    }

    /// Replace the nonce source used when signing.
    #[must_use]
    pub fn with_nonce_generator(mut self, nonce: impl NonceGenerator + 'static) -> Self {
        self.signer = self.signer.with_nonce_generator(nonce);
        self
    }

    /// Replace the clock used when signing.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.signer = self.signer.with_clock(clock);
        self
    }

    /// The configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Join the configured host with `path`.
    ///
    /// Path segments are appended to whatever path the host already has.
    /// Empty and `.` segments are dropped, `..` removes the previous segment
    /// and a trailing `/` is kept. `path` is taken as already escaped: a
    /// `%20` in it reaches the wire as `%20`, while characters that are not
    /// allowed in a path are percent-encoded.
    pub fn build_url(&self, path: &str) -> Result<Url, ClientError> {
        let host = &self.config.host;
        let mut url = Url::parse(host).map_err(|source| ClientError::ParseUrl {
            url: host.clone(),
            source,
        })?;
        if url.cannot_be_a_base() {
            return Err(ClientError::CannotBeABase { url: host.clone() });
        }

        let base = url.path().to_owned();
        let mut segments: Vec<&str> = Vec::new();
        for segment in base.split('/').chain(path.split('/')) {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s => segments.push(s),
            }
        }

        let mut joined = format!("/{}", segments.join("/"));
        if path.ends_with('/') && !joined.ends_with('/') {
            joined.push('/');
        }
        url.set_path(&joined);

        Ok(url)
    }

    /// Build a request for `path` on the configured host.
    ///
    /// `body` is `None` for requests without a body.
    pub fn new_request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<http::Request<Option<B>>, ClientError> {
        self.new_request_with_query(method, path, &[], body)
    }

    /// Build a request for `path` with the given query parameters.
    pub fn new_request_with_query<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<B>,
    ) -> Result<http::Request<Option<B>>, ClientError> {
        let mut url = self.build_url(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        let uri: http::Uri = url.as_str().parse()?;
        Ok(http::Request::builder().method(method).uri(uri).body(body)?)
    }

    /// Build a request whose body is `payload` serialized as JSON.
    pub fn new_json_request<S>(
        &self,
        method: Method,
        path: &str,
        payload: &S,
    ) -> Result<http::Request<Option<RequestBody>>, ClientError>
    where
        S: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(payload).map_err(ClientError::Encode)?;
        let mut request = self.new_request(method, path, Some(Full::new(Bytes::from(body))))?;
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
        Ok(request)
    }

    /// Buffer the body, derive the canonical parameters and attach the
    /// signature headers, without sending anything.
    pub async fn sign_request<B>(
        &self,
        request: http::Request<Option<B>>,
    ) -> Result<http::Request<Bytes>, ClientError>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let (mut parts, body) = request.into_parts();

        let body = match body {
            Some(body) => Some(
                body.collect()
                    .await
                    .map_err(|e| ClientError::ReadBody(e.into()))?
                    .to_bytes(),
            ),
            None => None,
        };

        let params = canonical_params(&parts, body.as_deref()).map_err(ClientError::Params)?;
        let signature = self.signer.sign(&params).map_err(ClientError::Signature)?;
        signature
            .apply_headers(self.signer.access_key(), &mut parts.headers)
            .map_err(ClientError::Signature)?;

        Ok(http::Request::from_parts(parts, body.unwrap_or_default()))
    }

    /// Sign `request` and send it through the transport.
    ///
    /// Nothing is sent if the request cannot be signed. Transport errors are
    /// returned as [`ClientError::Transport`] with the original error inside.
    pub async fn execute<B>(
        &self,
        request: http::Request<Option<B>>,
    ) -> Result<http::Response<Bytes>, ClientError>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let request = self.sign_request(request).await?;

        debug!(
            method = %request.method(),
            uri = %request.uri(),
            "Dispatching signed request"
        );

        let response = self
            .transport
            .send(request)
            .await
            .map_err(ClientError::Transport)?;

        debug!(status = %response.status(), "Received response");

        Ok(response)
    }

    /// Send `request` and deserialize the response body as JSON.
    pub async fn execute_json<B, R>(
        &self,
        request: http::Request<Option<B>>,
    ) -> Result<R, ClientError>
    where
        B: Body,
        B::Error: Into<BoxError>,
        R: DeserializeOwned,
    {
        let response = self.execute(request).await?;
        serde_json::from_slice(response.body()).map_err(ClientError::Decode)
    }
}
