//! Per-action access rules.
//!
//! Every route is wrapped in a `PermissionGate` that knows which resource it
//! serves and whether it is a collection, member or custom-action endpoint.
//! The gate turns the HTTP method into an `Action`, asks the `AccessPolicy`
//! which `Permission` that action needs, and rejects anonymous callers of
//! protected actions before the handler runs.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::fmt;
use std::str::FromStr;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    AllowAny,
    IsAuthenticated,
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "allow_any" | "any" => Ok(Permission::AllowAny),
            "authenticated" | "is_authenticated" => Ok(Permission::IsAuthenticated),
            other => Err(format!(
                "unknown permission '{}', expected 'allow_any' or 'authenticated'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Users,
    Posts,
    Comments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    PartialUpdate,
    Destroy,
    Register,
    Login,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Action::List => "list",
            Action::Retrieve => "retrieve",
            Action::Create => "create",
            Action::Update => "update",
            Action::PartialUpdate => "partial_update",
            Action::Destroy => "destroy",
            Action::Register => "register",
            Action::Login => "login",
        };
        f.write_str(name)
    }
}

/// Which permission each (resource, action) pair requires.
///
/// Users are always protected except for `register` and `login`. Posts and
/// comments follow the configured default.
#[derive(Debug, Clone, Copy)]
pub struct AccessPolicy {
    content_default: Permission,
}

impl AccessPolicy {
    pub fn new(content_default: Permission) -> Self {
        Self { content_default }
    }

    pub fn required(&self, resource: Resource, action: Action) -> Permission {
        match (resource, action) {
            (Resource::Users, Action::Register | Action::Login) => Permission::AllowAny,
            (Resource::Users, _) => Permission::IsAuthenticated,
            (Resource::Posts | Resource::Comments, _) => self.content_default,
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(Permission::AllowAny)
    }
}

/// The kind of route a gate protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `/things/`: GET lists, POST creates.
    Collection,
    /// `/things/{id}/`: GET, PUT, PATCH, DELETE.
    Member,
    /// A named action such as `/users/login/`.
    Custom(Action),
}

impl Endpoint {
    /// `None` for methods the endpoint does not serve; routing answers those with 405.
    pub fn action_for(&self, method: &Method) -> Option<Action> {
        match self {
            Endpoint::Collection => match *method {
                Method::GET => Some(Action::List),
                Method::POST => Some(Action::Create),
                _ => None,
            },
            Endpoint::Member => match *method {
                Method::GET => Some(Action::Retrieve),
                Method::PUT => Some(Action::Update),
                Method::PATCH => Some(Action::PartialUpdate),
                Method::DELETE => Some(Action::Destroy),
                _ => None,
            },
            Endpoint::Custom(action) => Some(*action),
        }
    }
}

pub struct PermissionGate {
    resource: Resource,
    endpoint: Endpoint,
}

impl PermissionGate {
    pub fn collection(resource: Resource) -> Self {
        Self {
            resource,
            endpoint: Endpoint::Collection,
        }
    }

    pub fn member(resource: Resource) -> Self {
        Self {
            resource,
            endpoint: Endpoint::Member,
        }
    }

    pub fn action(resource: Resource, action: Action) -> Self {
        Self {
            resource,
            endpoint: Endpoint::Custom(action),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for PermissionGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = PermissionGateService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(PermissionGateService {
            service,
            resource: self.resource,
            endpoint: self.endpoint,
        }))
    }
}

pub struct PermissionGateService<S> {
    service: S,
    resource: Resource,
    endpoint: Endpoint,
}

impl<S, B> Service<ServiceRequest> for PermissionGateService<S>
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
        if let Some(action) = self.endpoint.action_for(req.method()) {
            let policy = req
                .app_data::<web::Data<AccessPolicy>>()
                .map(|policy| *policy.get_ref())
                .unwrap_or_default();

            let required = policy.required(self.resource, action);
            let authenticated = req.extensions().contains::<AuthenticatedUser>();
            if required == Permission::IsAuthenticated && !authenticated {
                log::debug!("Anonymous {} on {:?} refused", action, self.resource);
                let err = AppError::Unauthorized(
                    "Authentication credentials were not provided.".into(),
                );
                return Box::pin(ready(Ok(req.error_response(err).map_into_right_body())));
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
    }
}
