pub mod password;
pub mod token;

pub use token::{IdentityClaims, TokenCodec, TokenError};
