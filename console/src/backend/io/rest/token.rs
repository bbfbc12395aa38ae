//! Reading the authorization claim out of an issued access token.
//!
//! The console does not hold the signing secret, so the token is decoded
//! without signature verification. The role only drives which screens are
//! offered; every backend call is still authorized server-side.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use log::warn;
use serde::Deserialize;
use shared::Role;

#[derive(Debug, Deserialize)]
struct RoleClaims {
    #[serde(default)]
    role: Option<String>,
}

fn unverified_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}

/// Role carried by the token's `role` claim. Tokens that cannot be decoded
/// or carry no claim give the least privileged role.
pub fn role_from_token(access_token: &str) -> Role {
    match decode::<RoleClaims>(access_token, &DecodingKey::from_secret(&[]), &unverified_validation()) {
        Ok(data) => Role::from_claim(data.claims.role.as_deref()),
        Err(e) => {
            warn!("Could not read role claim from access token: {}", e);
            Role::Operator
        }
    }
}
