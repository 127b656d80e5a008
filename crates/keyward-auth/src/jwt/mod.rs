//! JWT token encoding, decoding, and claims.
//!
//! Access and refresh tokens are signed with different secrets, so a
//! token of one kind never verifies as the other even if the type claim
//! were tampered with.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::{AccessClaims, RefreshClaims, TokenClaims, TokenType};
pub use decoder::JwtDecoder;
pub use encoder::{IssuedToken, JwtEncoder, TokenPair};
