//! Password hashing and sign-up policy enforcement.

pub mod hasher;
pub mod validator;

pub use hasher::PasswordHasher;
pub use validator::CredentialValidator;
