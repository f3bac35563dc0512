/// Authentication and authorization primitives
///
/// - [`password`]: Argon2id hashing and constant-time verification
/// - [`jwt`]: HS256 token issuance and validation (1 hour validity)
/// - [`middleware`]: request context types used by the API's auth layers

pub mod jwt;
pub mod middleware;
pub mod password;
