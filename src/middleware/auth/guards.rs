//! Route guards: one-shot pass/fail decisions taken after identity extraction.
//!
//! Each guard is a pure check (testable without HTTP) plus a `route_layer` wrapper
//! that short-circuits with `AppError` before the handler runs.
//!
//! Routes attach at most one guard. When combining, put `require_resource_owner`
//! last: it is the only one that does I/O.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};
use thiserror::Error;

use crate::api::v1::extractors::{Principal, parse_path_id};
use crate::error::AppError;
use crate::repos::error::RepoError;
use crate::services::ownership::{OwnerLookup, OwnerLookupError};
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum AuthzError {
    /// No principal, wrong principal, or an unparsable subject parameter.
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("resource not found")]
    NotFound,
    #[error("owner lookup failed")]
    Lookup(#[source] RepoError),
}

/// Same parsing as the handlers' `PathId`; anything unparsable matches nothing.
fn parse_id(raw: Option<&str>) -> Option<i32> {
    parse_path_id(raw?)
}

pub fn check_authenticated(principal: Option<&Principal>) -> Result<&Principal, AuthzError> {
    principal.ok_or(AuthzError::Unauthenticated)
}

pub fn check_matching_subject(
    principal: Option<&Principal>,
    raw_subject_id: Option<&str>,
) -> Result<(), AuthzError> {
    let principal = check_authenticated(principal)?;
    match parse_id(raw_subject_id) {
        Some(subject_id) if subject_id == principal.subject_id => Ok(()),
        _ => Err(AuthzError::Unauthenticated),
    }
}

/// Looks the owner up first, so a missing resource is `NotFound` even for anonymous callers.
pub async fn check_resource_owner(
    principal: Option<&Principal>,
    raw_resource_id: Option<&str>,
    owners: &dyn OwnerLookup,
) -> Result<(), AuthzError> {
    let resource_id = parse_id(raw_resource_id).ok_or(AuthzError::NotFound)?;

    let owner_id = owners
        .owner_of(resource_id)
        .await
        .map_err(|e| match e {
            OwnerLookupError::NotFound => AuthzError::NotFound,
            OwnerLookupError::Backend(err) => AuthzError::Lookup(err),
        })?;

    let principal = check_authenticated(principal)?;
    if principal.subject_id != owner_id {
        return Err(AuthzError::Unauthenticated);
    }

    Ok(())
}

/// Guarded route requires any authenticated principal.
pub fn require_authenticated(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn(authenticated_middleware))
}

/// Guarded route requires the principal's subject id to equal path parameter `param`.
pub fn require_matching_subject(
    route: MethodRouter<AppState>,
    param: &'static str,
) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn_with_state(
        param,
        matching_subject_middleware,
    ))
}

/// Guarded route requires the principal to own the resource named by path parameter `param`.
pub fn require_resource_owner(
    route: MethodRouter<AppState>,
    owners: Arc<dyn OwnerLookup>,
    param: &'static str,
) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn_with_state(
        OwnerGuard { owners, param },
        resource_owner_middleware,
    ))
}

#[derive(Clone)]
struct OwnerGuard {
    owners: Arc<dyn OwnerLookup>,
    param: &'static str,
}

async fn authenticated_middleware(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    check_authenticated(req.extensions().get::<Principal>())?;
    Ok(next.run(req).await)
}

async fn matching_subject_middleware(
    State(param): State<&'static str>,
    Path(params): Path<HashMap<String, String>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let raw = path_param(&params, param);
    if let Err(err) = check_matching_subject(req.extensions().get::<Principal>(), raw) {
        tracing::debug!(param, value = ?raw, "subject guard rejected request");
        return Err(err.into());
    }

    Ok(next.run(req).await)
}

async fn resource_owner_middleware(
    State(guard): State<OwnerGuard>,
    Path(params): Path<HashMap<String, String>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let principal = req.extensions().get::<Principal>().cloned();
    let raw = path_param(&params, guard.param);

    // The lookup must resolve before the handler is allowed to run.
    if let Err(err) = check_resource_owner(principal.as_ref(), raw, guard.owners.as_ref()).await {
        tracing::debug!(param = guard.param, value = ?raw, error = %err, "owner guard rejected request");
        return Err(err.into());
    }

    Ok(next.run(req).await)
}

fn path_param<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    let value = params.get(name).map(String::as_str);
    if value.is_none() {
        tracing::warn!(param = name, "guard configured with a path parameter the route does not have");
    }
    value
}
