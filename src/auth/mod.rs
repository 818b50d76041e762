//! Authentication: password hashing, JWT issuing and the `AuthUser` extractor.

pub mod extractors;
pub mod jwt;
pub mod password;
pub mod routes;
pub mod services;

pub use extractors::AuthUser;
pub use jwt::{Claims, JwtService};
pub use password::PasswordHasher;
pub use routes::router;
