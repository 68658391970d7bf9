use super::*;

const SECRET: &str = "test-secret";

mod test_helpers {
    use super::*;

    /// Builds a token from raw JSON header/payload signed with `secret`
    pub fn create_raw_token(
        secret: &str,
        header: &serde_json::Value,
        payload: &serde_json::Value,
    ) -> String {
        let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(header).unwrap());
        let payload_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
        let signing_input = format!("{header_b64}.{payload_b64}");

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signing_input.as_bytes());
        let sig_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{signing_input}.{sig_b64}")
    }

    pub fn claims_at(now: i64) -> JwsPayload {
        JwsPayload {
            issuer: ISSUER.to_string(),
            subject: Uuid::new_v4().to_string(),
            issued_at: now,
            expires_at: now + 60,
        }
    }
}

mod token_parsing {
    use super::*;

    #[test]
    fn test_parse_issued_token() {
        let manager = JwtManager::new(SECRET);
        let user_id = Uuid::new_v4();
        let token = manager.issue_token(user_id, TOKEN_EXPIRATION).unwrap();

        let parts = JwsTokenParts::try_from(token.as_str()).unwrap();
        assert_eq!(parts.header, JwsHeader::default());
        assert_eq!(parts.payload.subject, user_id.to_string());
        assert_eq!(parts.payload.issuer, ISSUER);
        assert_eq!(parts.signature.len(), 32);
    }

    #[test]
    fn test_reject_token_with_wrong_parts() {
        let malformed_tokens = vec![
            ("missing_parts", "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiJ0ZXN0In0"),
            (
                "extra_parts",
                "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiJ0ZXN0In0.sig.extra",
            ),
            ("invalid_base64_header", "not!base64.eyJzdWIiOiJ0ZXN0In0.sig"),
            ("empty_parts", ".."),
            ("only_dots", "..."),
            ("empty", ""),
        ];

        for (test_name, malformed_token) in malformed_tokens {
            let result = JwsTokenParts::try_from(malformed_token);
            assert!(
                matches!(result, Err(JwtError::InvalidToken)),
                "Should reject malformed token: {test_name}"
            );
        }
    }

    #[test]
    fn test_reject_unknown_header_field() {
        let token = test_helpers::create_raw_token(
            SECRET,
            &serde_json::json!({"alg": "HS256", "typ": "JWT", "kid": "extra"}),
            &serde_json::to_value(test_helpers::claims_at(chrono::Utc::now().timestamp()))
                .unwrap(),
        );

        let result = JwsTokenParts::try_from(token.as_str());
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }
}

mod signature_validation {
    use super::*;

    #[test]
    fn test_validate_round_trip() {
        let manager = JwtManager::new(SECRET);
        let user_id = Uuid::new_v4();
        let token = manager.issue_token(user_id, TOKEN_EXPIRATION).unwrap();

        assert_eq!(manager.validate_user(&token).unwrap(), user_id);
    }

    #[test]
    fn test_reject_token_signed_with_other_secret() {
        let token = JwtManager::new("other-secret")
            .issue_token(Uuid::new_v4(), TOKEN_EXPIRATION)
            .unwrap();

        let result = JwtManager::new(SECRET).validate(&token);
        assert!(matches!(result, Err(JwtError::InvalidSignature)));
    }

    #[test]
    fn test_reject_tampered_payload() {
        let manager = JwtManager::new(SECRET);
        let token = manager.issue_token(Uuid::new_v4(), TOKEN_EXPIRATION).unwrap();
        let signature = token.rsplit('.').next().unwrap();

        let forged = craft_signing_input(
            &JwsHeader::default(),
            &JwsPayload::for_user(Uuid::new_v4(), chrono::Utc::now().timestamp(), TOKEN_EXPIRATION),
        )
        .unwrap();
        let forged = format!("{forged}.{signature}");

        let result = manager.validate(&forged);
        assert!(matches!(result, Err(JwtError::InvalidSignature)));
    }

    #[test]
    fn test_reject_wrong_algorithm() {
        let now = chrono::Utc::now().timestamp();
        let token = test_helpers::create_raw_token(
            SECRET,
            &serde_json::json!({"alg": "none", "typ": "JWT"}),
            &serde_json::to_value(test_helpers::claims_at(now)).unwrap(),
        );

        let result = JwtManager::new(SECRET).validate(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_reject_non_uuid_subject() {
        let manager = JwtManager::new(SECRET);
        let mut claims = test_helpers::claims_at(chrono::Utc::now().timestamp());
        claims.subject = "not-a-uuid".to_string();
        let token = manager.sign(&JwsHeader::default(), &claims).unwrap();

        assert!(manager.validate(&token).is_ok());
        assert!(matches!(
            manager.validate_user(&token),
            Err(JwtError::InvalidClaims("sub"))
        ));
    }
}

mod claims_validation {
    use super::*;

    #[test]
    fn test_expired_token_rejected() {
        let now = 1_700_000_000;
        let claims = JwsPayload {
            expires_at: now - 120,
            ..test_helpers::claims_at(now - 600)
        };

        let result = validate_claims(&claims, now, 60);
        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_expired_token_with_skew_accepted() {
        let now = 1_700_000_000;
        let claims = JwsPayload {
            expires_at: now - 30,
            ..test_helpers::claims_at(now - 600)
        };

        assert!(validate_claims(&claims, now, 60).is_ok());
    }

    #[test]
    fn test_future_iat_rejected() {
        let now = 1_700_000_000;
        let claims = test_helpers::claims_at(now + 3600);

        let result = validate_claims(&claims, now, 60);
        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_boundary_conditions_exact_expiry() {
        let now = 1_700_000_000;
        let claims = JwsPayload {
            expires_at: now,
            ..test_helpers::claims_at(now - 10)
        };

        assert!(validate_claims(&claims, now, 0).is_ok());
        assert!(validate_claims(&claims, now + 1, 0).is_err());
    }

    #[test]
    fn test_issuer_enforced() {
        let now = 1_700_000_000;
        let claims = JwsPayload {
            issuer: "someone-else".to_string(),
            ..test_helpers::claims_at(now)
        };

        assert!(matches!(
            validate_claims(&claims, now, 60),
            Err(JwtError::InvalidClaims("iss"))
        ));
    }
}
