//! External identity provider, consumed only through this trait. Credential
//! verification is deliberately absent from the interface.

pub mod rest;

use async_trait::async_trait;
use thiserror::Error;

pub use rest::RestIdentityProvider;

#[derive(Clone, Debug, Default)]
pub struct NewIdentityUser {
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Clone, Debug)]
pub struct IdentityUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("email already registered")]
    EmailExists,
    #[error("invalid phone number")]
    InvalidPhone,
    #[error("phone number already registered")]
    PhoneExists,
    #[error("user not found")]
    NotFound,
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_user(&self, new_user: NewIdentityUser) -> Result<IdentityUser, IdentityError>;
    async fn fetch_user(&self, uid: &str) -> Result<IdentityUser, IdentityError>;
}

/// Create a provider user, retrying once without the phone number when the
/// provider rejects it as invalid or already enrolled.
pub async fn create_user_with_phone_fallback(
    provider: &dyn IdentityProvider,
    new_user: NewIdentityUser,
) -> Result<IdentityUser, IdentityError> {
    let retry = NewIdentityUser {
        phone: None,
        ..new_user.clone()
    };
    match provider.create_user(new_user).await {
        Err(IdentityError::InvalidPhone) | Err(IdentityError::PhoneExists) => {
            provider.create_user(retry).await
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct PhoneRejectingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IdentityProvider for PhoneRejectingProvider {
        async fn create_user(
            &self,
            new_user: NewIdentityUser,
        ) -> Result<IdentityUser, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if new_user.phone.is_some() {
                return Err(IdentityError::InvalidPhone);
            }
            Ok(IdentityUser {
                uid: "uid-1".into(),
                email: Some(new_user.email),
                display_name: new_user.display_name,
                phone: None,
            })
        }

        async fn fetch_user(&self, _uid: &str) -> Result<IdentityUser, IdentityError> {
            Err(IdentityError::NotFound)
        }
    }

    #[tokio::test]
    async fn retries_without_phone_when_rejected() {
        let provider = PhoneRejectingProvider {
            calls: AtomicUsize::new(0),
        };
        let user = create_user_with_phone_fallback(
            &provider,
            NewIdentityUser {
                email: "r@obra.mx".into(),
                password: "secreta123".into(),
                phone: Some("+521234567890".into()),
                display_name: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(user.uid, "uid-1");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        struct AlwaysTaken;
        #[async_trait]
        impl IdentityProvider for AlwaysTaken {
            async fn create_user(
                &self,
                _new_user: NewIdentityUser,
            ) -> Result<IdentityUser, IdentityError> {
                Err(IdentityError::EmailExists)
            }
            async fn fetch_user(&self, _uid: &str) -> Result<IdentityUser, IdentityError> {
                Err(IdentityError::NotFound)
            }
        }
        let err = create_user_with_phone_fallback(
            &AlwaysTaken,
            NewIdentityUser {
                email: "r@obra.mx".into(),
                password: "secreta123".into(),
                phone: None,
                display_name: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, IdentityError::EmailExists));
    }
}
