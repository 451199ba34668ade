use std::path::PathBuf;
use std::{env, fs};

use crate::data::user::PasswordHash;

const PASSWORD_SALT: &str = "password.salt";
const JWT_SECRET: &str = "jwt.secret";

pub type Salt = [u8; 16];

/// Secret material the backend needs at runtime: the password salt and the
/// HS256 signing secret for auth cookies. Missing files are generated on
/// first start.
#[derive(Debug, Clone)]
pub struct Security {
    pub salt: Salt,
    pub jwt_secret: Vec<u8>,
}

#[inline]
fn security_dir() -> PathBuf {
    PathBuf::from(env::var("SECURITY_DIR").unwrap_or("./security".to_string()))
}

impl Security {
    pub fn load() -> Security {
        let dir = security_dir();

        fs::create_dir_all(dir.clone())
            .expect("unable to create directory for storing security information");

        tracing::info!("Loading password salt...");
        let salt: Salt = match fs::read(dir.join(PASSWORD_SALT))
            .ok()
            .and_then(|s| s.try_into().ok())
        {
            Some(salt) => {
                tracing::info!("Salt found and loaded.");
                salt
            }
            None => {
                tracing::info!("Salt not found in '{}'.", dir.join(PASSWORD_SALT).display());
                tracing::info!("Generating a new password salt.");
                let salt: Salt = rand::random();
                fs::write(dir.join(PASSWORD_SALT), salt).expect("unable to write salt");
                salt
            }
        };

        tracing::info!("Loading JWT signing secret...");
        let jwt_secret = match fs::read(dir.join(JWT_SECRET)) {
            Ok(secret) if !secret.is_empty() => {
                tracing::info!("Loaded JWT secret.");
                secret
            }
            _ => {
                tracing::info!("Unable to load JWT secret. Generating a new one.");
                let secret: [u8; 32] = rand::random();
                fs::write(dir.join(JWT_SECRET), secret).expect("unable to write JWT secret");
                secret.to_vec()
            }
        };

        Security { salt, jwt_secret }
    }
}

/// Injectable credential collaborator. Routes never compare secrets
/// directly; they go through whatever implementation the server manages.
pub trait CredentialVerifier: Send + Sync {
    fn hash(&self, presented: &str) -> PasswordHash;

    fn verify(&self, presented: &str, stored: &PasswordHash) -> bool {
        &self.hash(presented) == stored
    }
}

/// Default verifier: sha256 then bcrypt over the server salt.
pub struct SaltedBcrypt {
    salt: Salt,
}

impl SaltedBcrypt {
    pub fn new(salt: Salt) -> SaltedBcrypt {
        SaltedBcrypt { salt }
    }
}

impl CredentialVerifier for SaltedBcrypt {
    fn hash(&self, presented: &str) -> PasswordHash {
        PasswordHash::new(presented, &self.salt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifier_accepts_matching_password_only() {
        let verifier = SaltedBcrypt::new([7u8; 16]);
        let stored = verifier.hash("correct-horse");

        assert!(verifier.verify("correct-horse", &stored));
        assert!(!verifier.verify("correct-hosre", &stored));
    }

    #[test]
    fn different_salts_produce_different_hashes() {
        let a = SaltedBcrypt::new([1u8; 16]).hash("same-password");
        let b = SaltedBcrypt::new([2u8; 16]).hash("same-password");

        assert_ne!(a, b);
    }
}
