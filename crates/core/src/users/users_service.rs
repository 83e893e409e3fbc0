use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::users_model::{normalize_email, CoinAdjustment, NewUser, User, UserUpdate};
use super::users_traits::{UserRepositoryTrait, UserServiceTrait};
use crate::errors::{Result, ValidationError};
use crate::events::{DomainEvent, DomainEventSink};

/// Service for managing users and their coin balances.
pub struct UserService {
    repository: Arc<dyn UserRepositoryTrait>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl UserService {
    pub fn new(
        repository: Arc<dyn UserRepositoryTrait>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            repository,
            event_sink,
        }
    }

    fn ensure_email_free(&self, email: &str, current_user: Option<&str>) -> Result<()> {
        match self.repository.find_by_email(email)? {
            Some(existing) if Some(existing.id.as_str()) != current_user => Err(
                ValidationError::invalid(format!("Email {} is already registered", email)).into(),
            ),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl UserServiceTrait for UserService {
    async fn register(&self, mut new_user: NewUser) -> Result<User> {
        new_user.email = normalize_email(&new_user.email);
        new_user.name = new_user.name.trim().to_string();
        self.ensure_email_free(&new_user.email, None)?;
        debug!("Registering user {}", new_user.email);
        self.repository.create(new_user).await
    }

    fn get_user(&self, user_id: &str) -> Result<User> {
        self.repository.get_by_id(user_id)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.repository.find_by_email(&normalize_email(email))
    }

    async fn update_profile(&self, user_id: &str, mut update: UserUpdate) -> Result<User> {
        if let Some(email) = update.email.as_deref() {
            let email = normalize_email(email);
            self.ensure_email_free(&email, Some(user_id))?;
            update.email = Some(email);
        }
        update.name = update.name.map(|n| n.trim().to_string());
        self.repository.update(user_id, update).await
    }

    async fn adjust_coins(&self, user_id: &str, delta: i64) -> Result<CoinAdjustment> {
        let adjustment = self.repository.adjust_coins(user_id, delta).await?;
        if adjustment.delta != 0 {
            self.event_sink.emit(DomainEvent::coins_adjusted(
                user_id,
                adjustment.delta,
                adjustment.balance_after,
            ));
        }
        Ok(adjustment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MockDomainEventSink;
    use crate::users::testing::InMemoryUserRepository;

    fn service() -> (UserService, Arc<InMemoryUserRepository>, MockDomainEventSink) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let sink = MockDomainEventSink::new();
        let svc = UserService::new(repo.clone(), Arc::new(sink.clone()));
        (svc, repo, sink)
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: " Asha ".into(),
            email: email.into(),
            password_hash: "hash".into(),
        }
    }

    #[tokio::test]
    async fn test_register_normalizes_and_rejects_duplicates() {
        let (svc, _, _) = service();
        let user = svc.register(new_user("Asha@Example.com")).await.unwrap();
        assert_eq!(user.email, "asha@example.com");
        assert_eq!(user.name, "Asha");

        let err = svc.register(new_user("asha@example.com ")).await.unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }

    #[tokio::test]
    async fn test_update_profile_allows_keeping_own_email() {
        let (svc, _, _) = service();
        let user = svc.register(new_user("asha@example.com")).await.unwrap();
        let updated = svc
            .update_profile(
                &user.id,
                UserUpdate {
                    name: Some("Asha K".into()),
                    email: Some("ASHA@example.com".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Asha K");
        assert_eq!(updated.email, "asha@example.com");
    }

    #[tokio::test]
    async fn test_adjust_coins_emits_event_only_on_change() {
        let (svc, _, sink) = service();
        let user = svc.register(new_user("asha@example.com")).await.unwrap();

        let debit = svc.adjust_coins(&user.id, -5).await.unwrap();
        assert_eq!(debit.delta, 0);
        assert!(sink.is_empty());

        let credit = svc.adjust_coins(&user.id, 12).await.unwrap();
        assert_eq!(credit.balance_after, 12);
        assert_eq!(
            sink.events(),
            vec![DomainEvent::coins_adjusted(user.id.clone(), 12, 12)]
        );
    }
}
