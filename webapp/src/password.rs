//! Password placeholder encoding.
//!
//! NOT a hash: this is reversible base64 of the UTF-8 bytes and offers no
//! protection. It only exists so the frontend and the stored rows agree on a
//! format; replace it with a real password hash before storing real secrets.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

pub struct PasswordHasher;

impl PasswordHasher {
    pub fn hash(password: &str) -> String {
        STANDARD.encode(password.as_bytes())
    }

    pub fn verify(password: &str, hashed: &str) -> bool {
        Self::hash(password) == hashed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn encodes_standard_base64() {
        assert_eq!(PasswordHasher::hash("secret"), "c2VjcmV0");
        assert_eq!(PasswordHasher::hash(""), "");
        assert_eq!(PasswordHasher::hash("pässword"), "cMOkc3N3b3Jk");
    }

    #[rstest]
    #[case::empty("", "")]
    #[case::ascii("hunter2", "hunter2")]
    #[case::unicode("pässwörd🔑", "pässwörd🔑")]
    #[case::whitespace_only("   ", "   ")]
    fn verify_accepts_own_encoding(#[case] password: &str, #[case] attempt: &str) {
        assert!(PasswordHasher::verify(attempt, &PasswordHasher::hash(password)));
    }

    #[rstest]
    #[case::case_differs("hunter2", "Hunter2")]
    #[case::leading_space("hunter2", " hunter2")]
    #[case::trailing_space("hunter2", "hunter2 ")]
    #[case::empty_vs_space("", " ")]
    #[case::accent_differs("pässword", "password")]
    #[case::prefix("secret", "secre")]
    fn verify_rejects_other_passwords(#[case] password: &str, #[case] attempt: &str) {
        assert!(!PasswordHasher::verify(attempt, &PasswordHasher::hash(password)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn any_password_verifies_against_its_hash(password in any::<String>()) {
            prop_assert!(PasswordHasher::verify(&password, &PasswordHasher::hash(&password)));
        }

        #[test]
        fn distinct_passwords_never_verify(a in any::<String>(), b in any::<String>()) {
            prop_assume!(a != b);
            prop_assert!(!PasswordHasher::verify(&a, &PasswordHasher::hash(&b)));
        }

        #[test]
        fn near_miss_passwords_never_verify(password in "\\PC{0,24}", suffix in "\\PC{1,4}") {
            let attempt = format!("{password}{suffix}");
            prop_assert!(!PasswordHasher::verify(&attempt, &PasswordHasher::hash(&password)));
        }
    }
}
