pub mod credentials;
pub mod extractors;
pub mod middleware;
pub mod password;
pub mod permissions;

pub use credentials::authenticate;
pub use extractors::AuthenticatedUser;
pub use middleware::TokenAuthentication;
pub use password::PasswordHasher;
pub use permissions::{AccessPolicy, Action, Permission, PermissionGate, Resource};
