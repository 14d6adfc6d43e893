use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload used for authentication.
///
/// Claims are immutable once issued: the admin flag a token carries is the
/// one checked by the gates, even if the user record changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,      // user ID
    pub is_admin: bool, // grants mutating catalog operations
    pub iat: usize,     // issued at (unix timestamp)
    pub exp: usize,     // expires at (unix timestamp)
    pub iss: String,    // issuer
    pub aud: String,    // audience
}
