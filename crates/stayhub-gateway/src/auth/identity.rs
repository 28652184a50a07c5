//! Local identity provider
//!
//! Registration, login and password change on top of the user and
//! credential repositories. Tokens carry the credential's version, so a
//! password change revokes everything issued before it.

use std::sync::Arc;

use async_trait::async_trait;
use stayhub_core::{
    normalize_email, Caller, CredentialRepository, EmailTaken, PasswordCredential, ServiceError,
    ServiceResult, User, UserRepository,
};
use stayhub_storage::PasswordHasher;
use tracing::{debug, info, warn};

use super::token::TokenSigner;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

const BAD_CREDENTIALS: &str = "Invalid email or password";
const EMAIL_REGISTERED: &str = "Email is already registered";
const WRONG_CURRENT_PASSWORD: &str = "Current password is incorrect";

/// Resolves a bearer token to the calling identity.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, token: &str) -> ServiceResult<Caller>;
}

pub struct IdentityService {
    users: Arc<dyn UserRepository>,
    credentials: Arc<dyn CredentialRepository>,
    hasher: PasswordHasher,
    signer: TokenSigner,
}

fn check_password_rules(password: &str) -> ServiceResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::invalid(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

impl IdentityService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        credentials: Arc<dyn CredentialRepository>,
        hasher: PasswordHasher,
        signer: TokenSigner,
    ) -> Self {
        Self {
            users,
            credentials,
            hasher,
            signer,
        }
    }

    /// PBKDF2 runs on the blocking pool
    async fn hash(&self, password: &str) -> ServiceResult<String> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(anyhow::Error::from)??;
        Ok(hash)
    }

    async fn verify(&self, password: &str, encoded: &str) -> ServiceResult<bool> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let encoded = encoded.to_string();
        let ok = tokio::task::spawn_blocking(move || hasher.verify(&password, &encoded))
            .await
            .map_err(anyhow::Error::from)??;
        Ok(ok)
    }

    /// Create a guest account and sign it in
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> ServiceResult<(User, String)> {
        let email = normalize_email(email);
        if !email.contains('@') {
            return Err(ServiceError::invalid("Invalid email address"));
        }
        check_password_rules(password)?;

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(ServiceError::conflict(EMAIL_REGISTERED));
        }

        let user = User::new(email, first_name.trim(), last_name.trim());
        let credential = PasswordCredential::new(&user.id, self.hash(password).await?);

        // The lookup above is advisory; the unique index decides concurrent races
        self.users
            .create_with_credential(&user, &credential)
            .await
            .map_err(|e| {
                if e.is::<EmailTaken>() {
                    ServiceError::conflict(EMAIL_REGISTERED)
                } else {
                    ServiceError::from(e)
                }
            })?;

        info!(user_id = %user.id, "[Identity] Registered user");

        let token = self.signer.issue(&user.id, credential.token_version);
        Ok((user, token))
    }

    /// Exchange email and password for a token
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<(User, String)> {
        let email = normalize_email(email);
        let Some(user) = self.users.get_by_email(&email).await? else {
            debug!("[Identity] Login for unknown email");
            return Err(ServiceError::unauthenticated(BAD_CREDENTIALS));
        };
        let Some(credential) = self.credentials.get(&user.id).await? else {
            warn!(user_id = %user.id, "[Identity] User has no password credential");
            return Err(ServiceError::unauthenticated(BAD_CREDENTIALS));
        };

        if !self.verify(password, &credential.password_hash).await? {
            debug!(user_id = %user.id, "[Identity] Wrong password");
            return Err(ServiceError::unauthenticated(BAD_CREDENTIALS));
        }

        info!(user_id = %user.id, "[Identity] User logged in");

        let token = self.signer.issue(&user.id, credential.token_version);
        Ok((user, token))
    }

    /// Replace the caller's password and revoke all their tokens
    pub async fn change_password(
        &self,
        caller: &Caller,
        current_password: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        let mut credential = self
            .credentials
            .get(&caller.user_id)
            .await?
            .ok_or_else(|| ServiceError::invalid(WRONG_CURRENT_PASSWORD))?;

        if !self.verify(current_password, &credential.password_hash).await? {
            return Err(ServiceError::invalid(WRONG_CURRENT_PASSWORD));
        }
        check_password_rules(new_password)?;

        credential.rotate(self.hash(new_password).await?);
        self.credentials.upsert(&credential).await?;

        info!(
            user_id = %caller.user_id,
            token_version = credential.token_version,
            "[Identity] Password changed, earlier tokens revoked"
        );

        Ok(())
    }

    /// Issue a fresh token for an existing user (current credential version)
    pub async fn issue_token(&self, user_id: &str) -> ServiceResult<String> {
        let credential = self
            .credentials
            .get(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User has no credential"))?;
        Ok(self.signer.issue(user_id, credential.token_version))
    }
}

#[async_trait]
impl Authenticator for IdentityService {
    async fn authenticate(&self, token: &str) -> ServiceResult<Caller> {
        let claims = self.signer.validate(token).map_err(|e| {
            debug!("[Auth] Token rejected: {}", e);
            ServiceError::unauthenticated("Invalid or expired token")
        })?;

        let current_version = self
            .credentials
            .get(&claims.sub)
            .await?
            .map(|c| c.token_version);
        if current_version != Some(claims.ver) {
            debug!(user_id = %claims.sub, "[Auth] Token version revoked");
            return Err(ServiceError::unauthenticated("Token has been revoked"));
        }

        let user = self
            .users
            .get(&claims.sub)
            .await?
            .ok_or_else(|| ServiceError::unauthenticated("User no longer exists"))?;

        Ok(Caller::from(&user))
    }
}
