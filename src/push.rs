//! Server push: options, validation and the synthetic request behind a promise.

use http::header::{CONTENT_ENCODING, CONTENT_LENGTH, EXPECT, HOST, TE, TRAILER};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Uri};

use crate::error::{Error, Result};
use crate::hpack::{extend_with_header_map, H2Header};

/// Scheme used when the request URI does not carry one
pub const DEFAULT_SCHEME: &str = "https";

/// Headers a promised request must not carry
const FORBIDDEN_PUSH_HEADERS: [HeaderName; 6] =
    [CONTENT_LENGTH, CONTENT_ENCODING, TRAILER, TE, EXPECT, HOST];

/// Options for a push. The method defaults to GET.
#[derive(Debug, Clone, Default)]
pub struct PushOptions {
    pub method: Option<Method>,
    pub header: HeaderMap,
}

impl PushOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.header.append(name, value);
        self
    }
}

/// Scheme and authority of the request a response belongs to; pushes
/// inherit them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub scheme: String,
    pub authority: Option<String>,
}

impl Origin {
    pub fn new(scheme: impl Into<String>, authority: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            authority: Some(authority.into()),
        }
    }

    /// Take the authority from the request URI, falling back to `Host`.
    /// Origin-form requests carry no scheme and are assumed to be TLS (`https`).
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let scheme = request.uri().scheme_str().unwrap_or(DEFAULT_SCHEME).to_string();
        let authority = request
            .uri()
            .authority()
            .map(|a| a.as_str().to_string())
            .or_else(|| {
                request
                    .headers()
                    .get(HOST)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            });
        Self { scheme, authority }
    }
}

/// A validated push: the promise's header fields and the request the
/// handler will see for it.
#[derive(Debug)]
pub(crate) struct PromisedRequest {
    pub fields: Vec<H2Header>,
    pub request: Request<()>,
}

pub(crate) fn promise_request(
    origin: &Origin,
    target: &str,
    options: Option<&PushOptions>,
) -> Result<PromisedRequest> {
    let method = options.and_then(|o| o.method.clone()).unwrap_or(Method::GET);
    if method != Method::GET && method != Method::HEAD {
        return Err(Error::InvalidPushMethod(method));
    }

    let (scheme, authority, path) = if target.starts_with('/') {
        let authority = origin
            .authority
            .clone()
            .ok_or_else(|| Error::InvalidPushTarget("request has no authority".to_string()))?;
        (origin.scheme.clone(), authority, target.to_string())
    } else {
        let uri: Uri = target
            .parse()
            .map_err(|e| Error::InvalidPushTarget(format!("{}: {}", target, e)))?;
        let (scheme, authority) = match (uri.scheme_str(), uri.authority()) {
            (Some(s), Some(a)) if !a.as_str().is_empty() => (s.to_string(), a.as_str().to_string()),
            _ => {
                return Err(Error::InvalidPushTarget(format!(
                    "{}: URL must have a scheme and host",
                    target
                )))
            }
        };
        if scheme != origin.scheme {
            return Err(Error::InvalidPushTarget(format!(
                "cannot push URL with scheme {} from request with scheme {}",
                scheme, origin.scheme
            )));
        }
        let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/").to_string();
        (scheme, authority, path)
    };

    let header = options.map(|o| o.header.clone()).unwrap_or_default();
    if let Some(name) = header.keys().find(|name| FORBIDDEN_PUSH_HEADERS.contains(name)) {
        return Err(Error::ForbiddenPushHeader(name.clone()));
    }

    let mut fields = vec![
        H2Header::new(":method", method.as_str()),
        H2Header::new(":scheme", scheme.as_str()),
        H2Header::new(":authority", authority.as_str()),
        H2Header::new(":path", path.as_str()),
    ];
    extend_with_header_map(&mut fields, &header);

    let mut request = Request::builder()
        .method(method)
        .uri(format!("{}://{}{}", scheme, authority, path))
        .body(())
        .map_err(|e| Error::InvalidPushTarget(format!("{}: {}", target, e)))?;
    *request.headers_mut() = header;

    Ok(PromisedRequest { fields, request })
}
