//! # Authentication & Authorization Middleware
//!
//! The principal source for the resource-serving endpoints.
//!
//! ## Token Format
//!
//! ```text
//! Bearer {role}:{organization_id}:{secret}   (organization id may be empty)
//! Bearer {secret}                            (legacy, treated as admin)
//! ```
//!
//! The secret is compared in constant time against the configured token.
//! Token issuance lives outside this service.
//!
//! ## CallerIdentity
//!
//! Every authenticated request gets a [`CallerIdentity`] injected into the
//! request extensions. Handlers extract it via the `FromRequestParts` impl
//! and hand the wrapped [`Principal`] to the access scope resolver.

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ecolk_core::{can_access_site, OrganizationId, Principal, Role};
use subtle::ConstantTimeEq;

use crate::error::{AppError, ErrorBody, ErrorDetail};

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// The authenticated caller, as injected by [`auth_middleware`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity(pub Principal);

impl CallerIdentity {
    pub fn principal(&self) -> &Principal {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.0.is_admin()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// Reject non-admin callers with 403.
pub fn require_admin(caller: &CallerIdentity) -> Result<(), AppError> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "role 'admin' required, caller has '{}'",
            caller.0.role.as_str()
        )))
    }
}

/// Resolve access to a site-scoped resource.
///
/// `owner` is the owning organization of the target, or `None` when the
/// target does not exist. Non-admins get the same 403 for a missing resource
/// as for one they may not see; admins get a 404 naming `what`.
pub fn authorize_site_access(
    caller: &CallerIdentity,
    owner: Option<OrganizationId>,
    what: impl FnOnce() -> String,
) -> Result<OrganizationId, AppError> {
    match owner {
        Some(org) if can_access_site(caller.principal(), org) => Ok(org),
        Some(org) => {
            tracing::warn!(
                role = %caller.0.role,
                caller_org = ?caller.0.organization_id,
                target_org = %org,
                "site access denied"
            );
            Err(AppError::site_forbidden())
        }
        None => Err(site_not_found(caller, what)),
    }
}

/// The error [`authorize_site_access`] reports for a site that does not exist.
pub fn site_not_found(caller: &CallerIdentity, what: impl FnOnce() -> String) -> AppError {
    if caller.is_admin() {
        AppError::NotFound(what())
    } else {
        AppError::site_forbidden()
    }
}

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Token Validation ────────────────────────────────────────────────────────

fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse a bearer token into the caller's principal.
pub fn parse_bearer_token(provided: &str, expected_secret: &str) -> Result<CallerIdentity, String> {
    let parts: Vec<&str> = provided.splitn(3, ':').collect();

    match parts.as_slice() {
        [secret] => {
            if constant_time_token_eq(secret, expected_secret) {
                Ok(CallerIdentity(Principal::admin()))
            } else {
                Err("invalid bearer token".into())
            }
        }
        [role_str, org_str, secret] => {
            if !constant_time_token_eq(secret, expected_secret) {
                return Err("invalid bearer token".into());
            }

            let role = Role::parse(role_str).ok_or_else(|| format!("unknown role: {role_str}"))?;

            let organization_id = if org_str.is_empty() {
                None
            } else {
                Some(OrganizationId::new(
                    org_str
                        .parse::<i64>()
                        .map_err(|e| format!("invalid organization_id: {e}"))?,
                ))
            };

            Ok(CallerIdentity(Principal {
                role,
                organization_id,
            }))
        }
        _ => Err(
            "invalid token format: expected {role}:{organization_id}:{secret} or {secret}".into(),
        ),
    }
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Validate the Bearer token and inject the caller's [`CallerIdentity`].
///
/// When `AuthConfig.token` is `None`, every request runs as an admin
/// (development mode).
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let expected_token = request.extensions().get::<AuthConfig>().cloned();

    match expected_token {
        Some(AuthConfig {
            token: Some(ref expected),
        }) => {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok());

            match auth_header.map(|v| v.strip_prefix("Bearer ")) {
                Some(Some(provided)) => match parse_bearer_token(provided, expected) {
                    Ok(identity) => {
                        request.extensions_mut().insert(identity);
                        next.run(request).await
                    }
                    Err(msg) => {
                        tracing::warn!(reason = %msg, "authentication failed: invalid bearer token");
                        unauthorized_response(&msg)
                    }
                },
                Some(None) => {
                    tracing::warn!("authentication failed: non-Bearer authorization scheme");
                    unauthorized_response("authorization header must use Bearer scheme")
                }
                None => {
                    tracing::warn!("authentication failed: missing authorization header");
                    unauthorized_response("missing authorization header")
                }
            }
        }
        _ => {
            request
                .extensions_mut()
                .insert(CallerIdentity(Principal::admin()));
            next.run(request).await
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn whoami(caller: CallerIdentity) -> String {
        format!(
            "{}:{}",
            caller.0.role,
            caller
                .0
                .organization_id
                .map(|o| o.to_string())
                .unwrap_or_default()
        )
    }

    fn test_app(token: Option<String>) -> Router {
        Router::new()
            .route("/test", get(whoami))
            .layer(from_fn(auth_middleware))
            .layer(axum::Extension(AuthConfig { token }))
    }

    async fn call(app: Router, auth: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = auth {
            builder = builder.header("Authorization", value);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn legacy_token_is_admin() {
        let (status, body) = call(test_app(Some("s3cret".into())), Some("Bearer s3cret")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "admin:");
    }

    #[tokio::test]
    async fn scoped_token_carries_organization() {
        let (status, body) =
            call(test_app(Some("s3cret".into())), Some("Bearer client:5:s3cret")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "client:5");
    }

    #[tokio::test]
    async fn scoped_token_with_empty_organization() {
        let (status, body) =
            call(test_app(Some("s3cret".into())), Some("Bearer manager::s3cret")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "manager:");
    }

    #[tokio::test]
    async fn wrong_secret_rejected() {
        let (status, body) =
            call(test_app(Some("s3cret".into())), Some("Bearer client:5:nope")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let err: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(err["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn missing_header_rejected() {
        let (status, body) = call(test_app(Some("s3cret".into())), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("missing"));
    }

    #[tokio::test]
    async fn non_bearer_scheme_rejected() {
        let (status, body) =
            call(test_app(Some("s3cret".into())), Some("Basic dXNlcjpwYXNz")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Bearer scheme"));
    }

    #[tokio::test]
    async fn auth_disabled_runs_as_admin() {
        let (status, body) = call(test_app(None), Some("Bearer client:5:whatever")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "admin:");
    }

    #[test]
    fn token_parsing_errors() {
        assert!(parse_bearer_token("auditor:1:s", "s")
            .unwrap_err()
            .contains("unknown role"));
        assert!(parse_bearer_token("client:abc:s", "s")
            .unwrap_err()
            .contains("invalid organization_id"));
        assert!(parse_bearer_token("client:s", "s")
            .unwrap_err()
            .contains("invalid token format"));
    }

    #[test]
    fn constant_time_eq_rejects_prefix() {
        assert!(constant_time_token_eq("secret", "secret"));
        assert!(!constant_time_token_eq("secret", "secret-token-123"));
        assert!(!constant_time_token_eq("", "secret"));
    }

    #[test]
    fn debug_redacts_token() {
        let config = AuthConfig {
            token: Some("hunter2".into()),
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn site_access_hides_existence_from_non_admins() {
        let client = CallerIdentity(Principal::client(OrganizationId::new(1)));
        let admin = CallerIdentity(Principal::admin());
        let what = || "site 9".to_string();

        assert!(authorize_site_access(&client, Some(OrganizationId::new(1)), what).is_ok());
        assert!(matches!(
            authorize_site_access(&client, Some(OrganizationId::new(2)), what),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            authorize_site_access(&client, None, what),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            authorize_site_access(&admin, None, what),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            site_not_found(&client, what),
            AppError::Forbidden(_)
        ));
        assert!(matches!(site_not_found(&admin, what), AppError::NotFound(_)));
    }

    #[test]
    fn require_admin_rejects_clients() {
        assert!(require_admin(&CallerIdentity(Principal::admin())).is_ok());
        assert!(matches!(
            require_admin(&CallerIdentity(Principal::client(OrganizationId::new(1)))),
            Err(AppError::Forbidden(_))
        ));
    }
}
