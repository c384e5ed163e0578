//! Outgoing request interceptors.
//!
//! A [`RequestInterceptor`] sees every request before it is sent and returns
//! the request that should go out instead. [`SignerInterceptor`] signs the
//! two transaction routes and lets everything else through untouched;
//! [`PassthroughInterceptor`] never changes anything.
//!
//! ## Key material
//!
//! The private key is taken from a [`SigningKey`] request extension when one
//! is present, and from the `_privateKey` query parameter otherwise. The query
//! parameter exists for generated SDKs that cannot attach extensions; it is
//! left in the URL, so anything logging request URLs will see it.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use cardinal::canonical::{game_transaction_message, persona_creation_message};
use cardinal::proto::PersonaSigner;
use cardinal::{MessageSigner, SigningError, TxKind};
use cardinal_evm::PersonaKey;
use http::header::CONTENT_LENGTH;
use http::{Extensions, HeaderValue};
use reqwest::{Body, Request};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::{debug, instrument, trace};

use crate::constants::{
    BODY_FIELD, NAMESPACE_PARAM, PERSONA_TAG_FIELD, PRIVATE_KEY_PARAM, SIGNATURE_FIELD,
};
use crate::error::InterceptError;
use crate::namespace::NamespaceResolver;

/// Rewrites an outgoing request before it reaches the transport.
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    /// Returns the request to send in place of `request`.
    ///
    /// # Errors
    ///
    /// Returns [`InterceptError`] if the request cannot be prepared; the
    /// request is then not sent.
    async fn intercept(
        &self,
        request: Request,
        extensions: &Extensions,
    ) -> Result<Request, InterceptError>;
}

/// An interceptor that returns every request unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughInterceptor;

#[async_trait]
impl RequestInterceptor for PassthroughInterceptor {
    async fn intercept(
        &self,
        request: Request,
        _extensions: &Extensions,
    ) -> Result<Request, InterceptError> {
        Ok(request)
    }
}

/// Request-scoped private key, attached as a request extension.
///
/// Never rendered by `Debug` and never placed in the URL.
#[derive(Clone)]
pub struct SigningKey(Arc<SecretString>);

impl SigningKey {
    /// Wraps a hex-encoded private key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(Arc::new(SecretString::from(key.into())))
    }

    fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey([REDACTED])")
    }
}

/// Where a [`SignerInterceptor`] gets the namespace from.
#[derive(Debug, Clone)]
pub enum NamespaceSource {
    /// Fetch it from `GET /world` through a shared resolver.
    Remote(Arc<NamespaceResolver>),
    /// Read it from the `_namespace` query parameter.
    ///
    /// Legacy: callers must know the namespace up front, and a missing
    /// parameter signs with an empty namespace.
    QueryParameter,
}

/// Signs persona-creation and game-transaction requests.
#[derive(Debug, Clone)]
pub struct SignerInterceptor {
    namespace: NamespaceSource,
}

impl SignerInterceptor {
    /// Creates a signer that resolves the namespace through `resolver`.
    #[must_use]
    pub const fn new(resolver: Arc<NamespaceResolver>) -> Self {
        Self {
            namespace: NamespaceSource::Remote(resolver),
        }
    }

    /// Creates the legacy signer that trusts the `_namespace` query parameter.
    #[must_use]
    pub const fn with_query_namespace() -> Self {
        Self {
            namespace: NamespaceSource::QueryParameter,
        }
    }

    /// Returns where this signer takes the namespace from.
    #[must_use]
    pub const fn namespace_source(&self) -> &NamespaceSource {
        &self.namespace
    }

    async fn namespace(&self, url: &Url) -> Result<String, InterceptError> {
        match &self.namespace {
            NamespaceSource::Remote(resolver) => resolver
                .resolve(url)
                .await
                .map_err(InterceptError::NamespaceUnavailable),
            NamespaceSource::QueryParameter => {
                Ok(query_param(url, NAMESPACE_PARAM).unwrap_or_default())
            }
        }
    }
}

#[async_trait]
impl RequestInterceptor for SignerInterceptor {
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "cardinal.interceptor.sign", skip_all, err)
    )]
    async fn intercept(
        &self,
        mut request: Request,
        extensions: &Extensions,
    ) -> Result<Request, InterceptError> {
        let Some(kind) = TxKind::from_path(request.url().path()) else {
            #[cfg(feature = "telemetry")]
            trace!(path = request.url().path(), "Route is not signed, passing through");
            return Ok(request);
        };

        let mut body = read_body(&request)?;
        let key = signing_key(&request, extensions)?;
        let namespace = self.namespace(request.url()).await?;
        let persona_tag = body
            .get(PERSONA_TAG_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        match kind {
            TxKind::CreatePersona => {
                sign_persona_creation(&mut body, &key, &persona_tag, &namespace)?;
            }
            TxKind::GameTransaction => {
                sign_game_transaction(&mut body, &key, &persona_tag, &namespace)?;
            }
        }

        #[cfg(feature = "telemetry")]
        debug!(kind = kind.as_str(), signer = %key.address(), "Signed transaction");

        replace_body(&mut request, &body)?;
        Ok(request)
    }
}

/// Adds `signature` and replaces `body` with the `{personaTag, signerAddress}`
/// record.
fn sign_persona_creation(
    body: &mut Map<String, Value>,
    signer: &impl MessageSigner,
    persona_tag: &str,
    namespace: &str,
) -> Result<(), InterceptError> {
    let record = PersonaSigner {
        persona_tag: persona_tag.to_owned(),
        signer_address: signer.signer_address(),
    };
    let message =
        persona_creation_message(persona_tag, namespace, &record).map_err(SigningError::from)?;
    let signature = signer.sign_message(&message)?;
    let record = serde_json::to_value(record).map_err(SigningError::from)?;

    body.insert(SIGNATURE_FIELD.to_owned(), Value::String(signature.into()));
    body.insert(BODY_FIELD.to_owned(), record);
    Ok(())
}

/// Adds `signature`; the payload and every other field stay as they were.
fn sign_game_transaction(
    body: &mut Map<String, Value>,
    signer: &impl MessageSigner,
    persona_tag: &str,
    namespace: &str,
) -> Result<(), InterceptError> {
    let payload = body.get(BODY_FIELD).unwrap_or(&Value::Null);
    let message =
        game_transaction_message(persona_tag, namespace, payload).map_err(SigningError::from)?;
    let signature = signer.sign_message(&message)?;

    body.insert(SIGNATURE_FIELD.to_owned(), Value::String(signature.into()));
    Ok(())
}

fn read_body(request: &Request) -> Result<Map<String, Value>, InterceptError> {
    let Some(body) = request.body() else {
        return Ok(Map::new());
    };
    let bytes = body.as_bytes().ok_or(InterceptError::UnbufferedBody)?;
    if bytes.is_empty() {
        return Ok(Map::new());
    }
    serde_json::from_slice(bytes).map_err(InterceptError::MalformedBody)
}

fn signing_key(request: &Request, extensions: &Extensions) -> Result<PersonaKey, InterceptError> {
    if let Some(key) = extensions.get::<SigningKey>() {
        return Ok(PersonaKey::from_hex(key.expose())?);
    }
    let key = query_param(request.url(), PRIVATE_KEY_PARAM)
        .map(SecretString::from)
        .ok_or(InterceptError::InvalidPrivateKey("no private key supplied"))?;
    Ok(PersonaKey::from_hex(key.expose_secret())?)
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

fn replace_body(request: &mut Request, body: &Map<String, Value>) -> Result<(), InterceptError> {
    let bytes = serde_json::to_vec(body).map_err(SigningError::from)?;
    if request.headers().contains_key(CONTENT_LENGTH) {
        request
            .headers_mut()
            .insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
    }
    *request.body_mut() = Some(Body::from(bytes));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardinal::SignatureHex;
    use cardinal_evm::verify::verify;
    use http::header::CONTENT_TYPE;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const OTHER_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
    const ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const PERSONA_SIGNATURE: &str = "f8e9cfa58f120ec6305c934296c4c8f39f9cd3f48a9763d4561ec742a5dfd94d318d6a5a43631fccc681778506bd1532a2fca420aa906df536a6b588ff235ac11c";
    const GAME_SIGNATURE: &str = "3510706a7aff98450a2026ea816f3c1676e5942cca063c3ad07848c02c8271974f441d035425afd6b45700c8d56b6b7acd89ea66cb6db2807c9346c736aa427a1b";

    async fn world_server(namespace: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/world"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "namespace": namespace })))
            .mount(&server)
            .await;
        server
    }

    fn remote_signer() -> SignerInterceptor {
        SignerInterceptor::new(Arc::new(NamespaceResolver::new()))
    }

    fn post(url: &str, body: &Value) -> Request {
        reqwest::Client::new()
            .post(url)
            .header("x-trace-id", "abc")
            .timeout(Duration::from_secs(7))
            .json(body)
            .build()
            .unwrap()
    }

    fn body_text(request: &Request) -> String {
        let bytes = request.body().unwrap().as_bytes().unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_create_persona_fixture() {
        let server = world_server("test-ns").await;
        let url = format!(
            "{}/tx/persona/create-persona?_privateKey={KEY}&_namespace=ignored",
            server.uri()
        );
        let request = post(&url, &json!({ "personaTag": "alice" }));

        let signed = remote_signer()
            .intercept(request, &Extensions::new())
            .await
            .unwrap();

        let expected = format!(
            r#"{{"personaTag":"alice","signature":"{PERSONA_SIGNATURE}","body":{{"personaTag":"alice","signerAddress":"{ADDRESS}"}}}}"#
        );
        assert_eq!(body_text(&signed), expected);
        assert_eq!(signed.method(), http::Method::POST);
        assert_eq!(signed.url().as_str(), url);
        assert_eq!(signed.headers()["x-trace-id"], "abc");
        assert_eq!(signed.headers()["content-type"], "application/json");
        assert_eq!(signed.timeout(), Some(&Duration::from_secs(7)));
    }

    #[tokio::test]
    async fn test_game_transaction_fixture() {
        let server = world_server("test-ns").await;
        let url = format!("{}/tx/game/move?_privateKey={KEY}", server.uri());
        let request = post(
            &url,
            &json!({ "personaTag": "alice", "body": { "direction": "up", "steps": 3 } }),
        );

        let signed = remote_signer()
            .intercept(request, &Extensions::new())
            .await
            .unwrap();

        let expected = format!(
            r#"{{"personaTag":"alice","body":{{"direction":"up","steps":3}},"signature":"{GAME_SIGNATURE}"}}"#
        );
        assert_eq!(body_text(&signed), expected);
    }

    #[tokio::test]
    async fn test_game_transaction_preserves_original_fields() {
        let server = world_server("test-ns").await;
        let url = format!("{}/tx/game/attack?_privateKey={KEY}", server.uri());
        let original = json!({
            "zeta": [1, 2, {"b": 2, "a": 1}],
            "personaTag": "alice",
            "body": { "target": "bob", "power": 9001, "crit": false },
            "alpha": null
        });
        let request = post(&url, &original);

        let signed = remote_signer()
            .intercept(request, &Extensions::new())
            .await
            .unwrap();

        let rebuilt: Map<String, Value> = serde_json::from_str(&body_text(&signed)).unwrap();
        let keys: Vec<&str> = rebuilt.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "personaTag", "body", "alpha", "signature"]);
        for (key, value) in original.as_object().unwrap() {
            assert_eq!(&rebuilt[key], value);
        }

        let signature: SignatureHex = rebuilt["signature"].as_str().unwrap().parse().unwrap();
        let message = r#"alicetest-ns0{"target":"bob","power":9001,"crit":false}"#;
        let key = PersonaKey::from_hex(KEY).unwrap();
        verify(message, &signature, key.address()).unwrap();
    }

    #[tokio::test]
    async fn test_game_transaction_keeps_number_literals() {
        let url = format!("http://localhost:4040/tx/game/move?_privateKey={KEY}&_namespace=test-ns");
        let payload =
            r#"{"big":123456789012345678901234567890,"exp":1e3,"frac":0.1000000000000000055511151231257827}"#;
        let raw = format!(r#"{{"personaTag":"alice","body":{payload}}}"#);
        let request = reqwest::Client::new()
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(raw.clone())
            .build()
            .unwrap();

        let signed = SignerInterceptor::with_query_namespace()
            .intercept(request, &Extensions::new())
            .await
            .unwrap();

        let text = body_text(&signed);
        let prefix = format!(r#"{},"signature":""#, &raw[..raw.len() - 1]);
        assert!(text.starts_with(&prefix), "{text}");

        let rebuilt: Value = serde_json::from_str(&text).unwrap();
        let signature: SignatureHex = rebuilt["signature"].as_str().unwrap().parse().unwrap();
        let message = format!("alicetest-ns0{payload}");
        let key = PersonaKey::from_hex(KEY).unwrap();
        verify(&message, &signature, key.address()).unwrap();
    }

    #[tokio::test]
    async fn test_create_persona_overrides_in_place() {
        let url = format!(
            "http://localhost:4040/tx/persona/create-persona?_privateKey={KEY}&_namespace=test-ns"
        );
        let original = json!({
            "zeta": 1,
            "signature": "stale",
            "personaTag": "alice",
            "body": { "stale": true },
            "extra": [1]
        });
        let request = post(&url, &original);

        let signed = SignerInterceptor::with_query_namespace()
            .intercept(request, &Extensions::new())
            .await
            .unwrap();

        let rebuilt: Map<String, Value> = serde_json::from_str(&body_text(&signed)).unwrap();
        let keys: Vec<&str> = rebuilt.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "signature", "personaTag", "body", "extra"]);
        assert_eq!(rebuilt["signature"], PERSONA_SIGNATURE);
        assert_eq!(
            rebuilt["body"],
            json!({ "personaTag": "alice", "signerAddress": ADDRESS })
        );
        assert_eq!(rebuilt["zeta"], 1);
        assert_eq!(rebuilt["personaTag"], "alice");
        assert_eq!(rebuilt["extra"], json!([1]));
    }

    #[tokio::test]
    async fn test_content_length_follows_signed_body() {
        let url = format!("http://localhost:4040/tx/game/move?_privateKey={KEY}&_namespace=test-ns");
        let raw = r#"{"personaTag":"alice","body":{"direction":"up","steps":3}}"#;
        let request = reqwest::Client::new()
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_LENGTH, raw.len().to_string())
            .body(raw)
            .build()
            .unwrap();
        assert_eq!(request.headers()[CONTENT_LENGTH], raw.len().to_string().as_str());

        let signed = SignerInterceptor::with_query_namespace()
            .intercept(request, &Extensions::new())
            .await
            .unwrap();

        let text = body_text(&signed);
        assert!(text.len() > raw.len());
        assert_eq!(
            signed.headers()[CONTENT_LENGTH],
            text.len().to_string().as_str()
        );
    }

    #[tokio::test]
    async fn test_content_length_not_added_when_absent() {
        let url = format!("http://localhost:4040/tx/game/move?_privateKey={KEY}&_namespace=test-ns");
        let request = post(&url, &json!({ "personaTag": "alice", "body": {} }));
        assert!(!request.headers().contains_key(CONTENT_LENGTH));

        let signed = SignerInterceptor::with_query_namespace()
            .intercept(request, &Extensions::new())
            .await
            .unwrap();
        assert!(!signed.headers().contains_key(CONTENT_LENGTH));
    }

    #[tokio::test]
    async fn test_unsigned_route_passes_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/world"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let url = format!("{}/health?_privateKey={KEY}", server.uri());
        let request = reqwest::Client::new()
            .post(&url)
            .body("not json at all")
            .build()
            .unwrap();

        let passed = remote_signer()
            .intercept(request, &Extensions::new())
            .await
            .unwrap();
        assert_eq!(body_text(&passed), "not json at all");
        assert_eq!(passed.url().as_str(), url);
    }

    #[tokio::test]
    async fn test_passthrough_interceptor() {
        let request = post(
            "http://localhost:4040/tx/game/move",
            &json!({ "personaTag": "alice" }),
        );
        let passed = PassthroughInterceptor
            .intercept(request, &Extensions::new())
            .await
            .unwrap();
        assert_eq!(body_text(&passed), r#"{"personaTag":"alice"}"#);
    }

    #[tokio::test]
    async fn test_legacy_query_namespace() {
        let url = format!(
            "http://localhost:4040/tx/persona/create-persona?_privateKey={KEY}&_namespace=test-ns"
        );
        let request = post(&url, &json!({ "personaTag": "alice" }));

        let signed = SignerInterceptor::with_query_namespace()
            .intercept(request, &Extensions::new())
            .await
            .unwrap();

        let rebuilt: Value = serde_json::from_str(&body_text(&signed)).unwrap();
        assert_eq!(rebuilt["signature"], PERSONA_SIGNATURE);
    }

    #[tokio::test]
    async fn test_extension_key_takes_precedence() {
        let server = world_server("test-ns").await;
        let url = format!("{}/tx/game/move?_privateKey={OTHER_KEY}", server.uri());
        let request = post(
            &url,
            &json!({ "personaTag": "alice", "body": { "direction": "up", "steps": 3 } }),
        );
        let mut extensions = Extensions::new();
        extensions.insert(SigningKey::new(KEY));

        let signed = remote_signer().intercept(request, &extensions).await.unwrap();

        let rebuilt: Value = serde_json::from_str(&body_text(&signed)).unwrap();
        assert_eq!(rebuilt["signature"], GAME_SIGNATURE);
    }

    #[tokio::test]
    async fn test_missing_fields_are_signed_permissively() {
        let url = format!("http://localhost:4040/tx/persona/create-persona?_privateKey={KEY}");
        let request = reqwest::Client::new().post(&url).build().unwrap();

        let signed = SignerInterceptor::with_query_namespace()
            .intercept(request, &Extensions::new())
            .await
            .unwrap();

        let rebuilt: Value = serde_json::from_str(&body_text(&signed)).unwrap();
        assert_eq!(
            rebuilt["body"],
            json!({ "personaTag": "", "signerAddress": ADDRESS })
        );
        let signature: SignatureHex = rebuilt["signature"].as_str().unwrap().parse().unwrap();
        let message = format!(r#"0{{"personaTag":"","signerAddress":"{ADDRESS}"}}"#);
        let key = PersonaKey::from_hex(KEY).unwrap();
        verify(&message, &signature, key.address()).unwrap();
    }

    #[tokio::test]
    async fn test_invalid_key_fails_before_namespace_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/world"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "namespace": "x" })))
            .expect(0)
            .mount(&server)
            .await;

        for query in ["?_privateKey=0x1234", ""] {
            let url = format!("{}/tx/game/move{query}", server.uri());
            let request = post(&url, &json!({ "personaTag": "alice", "body": {} }));
            let err = remote_signer()
                .intercept(request, &Extensions::new())
                .await
                .unwrap_err();
            assert!(matches!(err, InterceptError::InvalidPrivateKey(_)), "{err}");
        }
    }

    #[tokio::test]
    async fn test_namespace_failure_aborts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/world"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let url = format!("{}/tx/persona/create-persona?_privateKey={KEY}", server.uri());
        let request = post(&url, &json!({ "personaTag": "alice" }));
        let err = remote_signer()
            .intercept(request, &Extensions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, InterceptError::NamespaceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_non_object_body_is_rejected() {
        let url = format!("http://localhost:4040/tx/game/move?_privateKey={KEY}&_namespace=ns");
        let request = post(&url, &json!(["personaTag", "alice"]));
        let err = SignerInterceptor::with_query_namespace()
            .intercept(request, &Extensions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, InterceptError::MalformedBody(_)));
    }

    #[test]
    fn test_signing_key_debug_is_redacted() {
        let rendered = format!("{:?}", SigningKey::new(KEY));
        assert!(!rendered.contains(&KEY[2..]));
    }
}
