//! Authentication utilities

mod jwt;
mod password;

pub use jwt::{Claims, JwtService, TokenPair, TokenType};
pub use password::{
    hash_password, validate_password_strength, verify_against_dummy, verify_password,
    MIN_PASSWORD_LENGTH,
};
