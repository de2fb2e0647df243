use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::warn;
use std::rc::Rc;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::store::Store;

/// Resolves the `Authorization` token of each request into an `AuthenticatedUser`.
///
/// Accepts `Token <key>` and `Bearer <key>`. A request without the header, or
/// with another scheme, passes through anonymous; whether that is allowed is
/// decided later by `PermissionGate`. A token that does not resolve to a user
/// is rejected with 401.
pub struct TokenAuthentication;

impl<S, B> Transform<S, ServiceRequest> for TokenAuthentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = TokenAuthenticationService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TokenAuthenticationService {
            service: Rc::new(service),
        }))
    }
}

pub struct TokenAuthenticationService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for TokenAuthenticationService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if let Err(err) = resolve_caller(&req).await {
                return Ok(req.error_response(err).map_into_right_body());
            }
            service
                .call(req)
                .await
                .map(|res| res.map_into_left_body())
        })
    }
}

/// Looks up the presented token and records its owner on the request.
async fn resolve_caller(req: &ServiceRequest) -> Result<(), AppError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or_default().to_string());
    let Some(key) = token_from_header(header.as_deref())? else {
        return Ok(());
    };

    let store = req
        .app_data::<web::Data<dyn Store>>()
        .cloned()
        .ok_or_else(|| AppError::InternalServerError("Store is not configured".into()))?;

    match store.find_user_by_token(&key).await? {
        Some(user) => {
            req.extensions_mut().insert(AuthenticatedUser(user));
            Ok(())
        }
        None => {
            warn!("Rejected unknown token on {} {}", req.method(), req.path());
            Err(AppError::Unauthorized("Invalid token.".into()))
        }
    }
}

/// Extracts the key from an `Authorization` header value.
///
/// `Ok(None)` means the request carries no token credentials at all.
pub fn token_from_header(value: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let mut parts = value.split_whitespace();
    let scheme = parts.next().unwrap_or_default();
    if !scheme.eq_ignore_ascii_case("token") && !scheme.eq_ignore_ascii_case("bearer") {
        return Ok(None);
    }
    match (parts.next(), parts.next()) {
        (Some(key), None) => Ok(Some(key.to_string())),
        (None, _) => Err(AppError::Unauthorized(
            "Invalid token header. No credentials provided.".into(),
        )),
        (Some(_), Some(_)) => Err(AppError::Unauthorized(
            "Invalid token header. Token string should not contain spaces.".into(),
        )),
    }
}
