//! Tests for auth module
//!
//! These tests verify:
//! - Token verification against the shared secret and issuer
//! - User sync and webhook mirroring
//! - Profile update validation and partial updates

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::test_support::{create_test_user, test_pool};
    use crate::common::{ApiError, AppConfig, Validator};
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use models::User;

    fn sign(claims: &models::Claims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("Failed to encode token")
    }

    fn claims(sub: &str, iss: Option<&str>) -> models::Claims {
        models::Claims {
            sub: sub.to_string(),
            exp: 9999999999,
            email: Some("driver@example.com".to_string()),
            name: Some("Driver".to_string()),
            iss: iss.map(str::to_string),
        }
    }

    // ============================================================================
    // Token verification
    // ============================================================================

    #[test]
    fn test_verify_token_accepts_bearer_prefix() {
        let config = AppConfig::for_tests();
        let token = sign(&claims("idp|123", None), &config.jwt_secret);

        let decoded = extractors::verify_token(&config, &format!("Bearer {}", token)).unwrap();
        assert_eq!(decoded.sub, "idp|123");
        assert_eq!(decoded.email.as_deref(), Some("driver@example.com"));
    }

    #[test]
    fn test_verify_token_rejects_wrong_secret() {
        let config = AppConfig::for_tests();
        let token = sign(&claims("idp|123", None), "wrong_secret_key");

        let result = extractors::verify_token(&config, &token);
        assert!(matches!(result, Err(ApiError::NotAuthenticated(_))));
    }

    #[test]
    fn test_verify_token_checks_issuer_when_configured() {
        let mut config = AppConfig::for_tests();
        config.jwt_issuer = Some("https://id.carfolio.app".to_string());

        let good = sign(
            &claims("idp|123", Some("https://id.carfolio.app")),
            &config.jwt_secret,
        );
        let bad = sign(&claims("idp|123", Some("https://evil.example")), &config.jwt_secret);

        assert!(extractors::verify_token(&config, &good).is_ok());
        assert!(extractors::verify_token(&config, &bad).is_err());
    }

    #[test]
    fn test_secrets_match() {
        assert!(handlers::secrets_match("whsec_test", "whsec_test"));
        assert!(!handlers::secrets_match("whsec_tesT", "whsec_test"));
        assert!(!handlers::secrets_match("", "whsec_test"));
    }

    // ============================================================================
    // User sync and webhooks
    // ============================================================================

    #[tokio::test]
    async fn test_sync_creates_then_refreshes_user() {
        let pool = test_pool().await;
        let service = UsersService::new(pool);

        let created = service
            .upsert_from_identity("idp|abc", Some("a@example.com"), Some("Ann"), None)
            .await
            .unwrap();
        assert_eq!(created.plan, "free");
        assert_eq!(created.name.as_deref(), Some("Ann"));

        let refreshed = service
            .upsert_from_identity("idp|abc", Some("ann@example.com"), None, None)
            .await
            .unwrap();
        assert_eq!(refreshed.id, created.id);
        assert_eq!(refreshed.email, "ann@example.com");
        assert_eq!(refreshed.name.as_deref(), Some("Ann"));
    }

    #[tokio::test]
    async fn test_sync_without_email_fails_for_new_user() {
        let pool = test_pool().await;
        let service = UsersService::new(pool);

        let result = service.upsert_from_identity("idp|nomail", None, None, None).await;
        assert!(matches!(result, Err(ApiError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_webhook_lifecycle() {
        let pool = test_pool().await;
        let service = UsersService::new(pool);

        let created: models::IdentityWebhookEvent = serde_json::from_value(serde_json::json!({
            "type": "user.created",
            "data": { "id": "idp|hook", "email": "hook@example.com", "imageUrl": "https://img.example/a.png" }
        }))
        .unwrap();
        let outcome = service.apply_webhook(created).await.unwrap();
        let user_id = match outcome {
            services::WebhookOutcome::Upserted(id) => id,
            other => panic!("unexpected outcome: {:?}", other),
        };

        let user = service.get_by_id(&user_id).await.unwrap();
        assert_eq!(user.avatar_url.as_deref(), Some("https://img.example/a.png"));

        let updated: models::IdentityWebhookEvent = serde_json::from_value(serde_json::json!({
            "type": "user.updated",
            "data": { "id": "idp|hook", "name": "Hooked" }
        }))
        .unwrap();
        service.apply_webhook(updated).await.unwrap();
        let user = service.get_by_id(&user_id).await.unwrap();
        assert_eq!(user.name.as_deref(), Some("Hooked"));
        assert_eq!(user.email, "hook@example.com");

        let deleted: models::IdentityWebhookEvent = serde_json::from_value(serde_json::json!({
            "type": "user.deleted",
            "data": { "id": "idp|hook" }
        }))
        .unwrap();
        assert_eq!(
            service.apply_webhook(deleted).await.unwrap(),
            services::WebhookOutcome::Deleted
        );
        assert!(matches!(
            service.get_by_id(&user_id).await,
            Err(ApiError::NotFound(_))
        ));
    }

    // ============================================================================
    // Profile updates
    // ============================================================================

    #[test]
    fn test_profile_validator_rejects_bad_username() {
        let request = models::UpdateProfileRequest {
            username: Some("no spaces allowed".to_string()),
            ..Default::default()
        };
        let result = validators::ProfileValidator.validate(&request);
        assert!(result.has_error_for("username"));
    }

    #[test]
    fn test_profile_validator_requires_a_field() {
        let result = validators::ProfileValidator.validate(&models::UpdateProfileRequest::default());
        assert!(result.has_error_for("general"));
    }

    #[tokio::test]
    async fn test_update_profile_is_partial_and_enforces_unique_username() {
        let pool = test_pool().await;
        let alice = create_test_user(&pool, "alice").await;
        create_test_user(&pool, "bob").await;
        let service = UsersService::new(pool);

        let updated = service
            .update_profile(
                &alice.id,
                &models::UpdateProfileRequest {
                    bio: Some("Boosted and bagged".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.bio.as_deref(), Some("Boosted and bagged"));
        assert_eq!(updated.username.as_deref(), Some("alice"));

        let taken = service
            .update_profile(
                &alice.id,
                &models::UpdateProfileRequest {
                    username: Some("bob".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(taken, Err(ApiError::ValidationError(_))));
    }
}
