//! JWT authentication against an OpenID Connect identity provider.
//!
//! - [`extract`]: where a request carries its token
//! - [`keys`]: signing-key resolution and the cached JWKS provider
//! - [`validator`]: signature and claim checks
//! - [`claims`]: handing validated claims to handlers

pub mod claims;
pub mod error;
pub mod extract;
pub mod keys;
pub mod validator;

pub use claims::{Claims, get_claims, insert_claims};
pub use error::AuthError;
pub use extract::{
    AuthHeaderTokenExtractor, CookieTokenExtractor, MultiTokenExtractor, ParameterTokenExtractor,
    TokenExtractor,
};
pub use keys::{CachingJwksProvider, DEFAULT_JWKS_REFRESH_INTERVAL, KeyResolver, StaticKeyResolver};
pub use validator::{
    CustomClaims, DEFAULT_ALLOWED_CLOCK_SKEW, JwtValidator, NoCustomClaims, RegisteredClaims,
    ScopeClaims, TokenValidator, ValidatedClaims,
};

/// Whether `expected` is one of the space-separated entries of `scopes`.
///
/// Matches whole entries only. Empty input on either side never matches.
pub fn has_scope(scopes: &str, expected: &str) -> bool {
    if scopes.is_empty() || expected.is_empty() {
        return false;
    }
    scopes.split(' ').any(|scope| scope == expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_has_scope() {
        assert!(has_scope("a b", "a"));
        assert!(has_scope("a b", "b"));
        assert!(has_scope("read:messages", "read:messages"));
        assert!(!has_scope("a:b", "b"));
        assert!(!has_scope("read:messages", "read"));
        assert!(!has_scope("", "a"));
        assert!(!has_scope("a b", ""));
        assert!(!has_scope("", ""));
    }

    #[test]
    fn test_has_scope_tolerates_extra_spaces() {
        assert!(has_scope("  a  b ", "a"));
        assert!(has_scope("  a  b ", "b"));
        assert!(has_scope("a a", "a"));
        assert!(!has_scope("   ", "a"));
    }

    proptest! {
        #[test]
        fn prop_has_scope_matches_whole_tokens(
            tokens in prop::collection::vec("[a-z:]{1,8}", 0..6),
            expected in "[a-z:]{0,8}",
            pad in " {0,3}",
        ) {
            let scopes = format!("{pad}{}{pad}", tokens.join("  "));
            let want = !expected.is_empty() && tokens.contains(&expected);
            prop_assert_eq!(has_scope(&scopes, &expected), want);
        }
    }
}
