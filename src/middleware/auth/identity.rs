//! Bearer token → Principal を extensions に入れる (全リクエスト共通)
//!
//! - token が無い / 壊れている / 署名不一致 → 匿名のまま次へ進む (エラーにしない)
//! - 拒否は guards 側の責務。public / protected の route が同じ middleware を共有できる

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::Principal;
use crate::services::auth::{IdentityClaims, TokenCodec};
use crate::state::AppState;

/// Outcome of reading the request's credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Authenticated(IdentityClaims),
    Anonymous,
}

/// Attach identity extraction to every route of `router`.
///
/// Must wrap the routes that carry guards, so apply it with `layer` (not `route_layer`)
/// on the outermost API router.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, identity_middleware))
}

async fn identity_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Identity::Authenticated(claims) = resolve_identity(req.headers(), &state.tokens) {
        req.extensions_mut().insert(Principal::from(claims));
    }

    next.run(req).await
}

/// Never fails: every problem with the credential degrades to `Anonymous`.
pub fn resolve_identity(headers: &HeaderMap, tokens: &TokenCodec) -> Identity {
    let Some(token) = bearer_token(headers) else {
        return Identity::Anonymous;
    };

    match tokens.verify(token) {
        Ok(claims) => Identity::Authenticated(claims),
        Err(err) => {
            tracing::debug!(error = %err, "ignoring invalid bearer token");
            Identity::Anonymous
        }
    }
}

/// `Authorization: Bearer <token>`, scheme case-insensitive, whitespace tolerant.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, rest) = value.split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = rest.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers_with(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    fn codec() -> TokenCodec {
        TokenCodec::new("identity-test-secret").unwrap()
    }

    #[test]
    fn bearer_scheme_is_case_insensitive_and_trimmed() {
        assert_eq!(bearer_token(&headers_with("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("  BEARER   abc  ")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("Bearer\tabc")), Some("abc"));
    }

    #[test]
    fn non_bearer_headers_yield_no_token() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers_with("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers_with("Bearer")), None);
        assert_eq!(bearer_token(&headers_with("Bearer    ")), None);
        assert_eq!(bearer_token(&headers_with("abc.def.ghi")), None);
    }

    #[test]
    fn valid_token_resolves_to_claims() {
        let codec = codec();
        let claims = IdentityClaims::new(1, "test");
        let token = codec.issue(&claims).unwrap();

        let identity = resolve_identity(&headers_with(&format!("Bearer {token}")), &codec);

        assert_eq!(identity, Identity::Authenticated(claims));
    }

    #[test]
    fn missing_header_is_anonymous() {
        assert_eq!(resolve_identity(&HeaderMap::new(), &codec()), Identity::Anonymous);
    }

    #[test]
    fn token_signed_with_other_secret_is_anonymous() {
        let foreign = TokenCodec::new("NOT_SECRET_KEY")
            .unwrap()
            .issue(&IdentityClaims::new(1, "test"))
            .unwrap();

        let identity = resolve_identity(&headers_with(&format!("Bearer {foreign}")), &codec());

        assert_eq!(identity, Identity::Anonymous);
    }

    #[test]
    fn garbage_token_is_anonymous() {
        let identity = resolve_identity(&headers_with("Bearer not.a.jwt"), &codec());
        assert_eq!(identity, Identity::Anonymous);
    }
}
