#[cfg(test)]
mod tests {
    use rocket::http::{ContentType, Header, Status};
    use rocket::local::asynchronous::Client;
    use sqlx::PgPool;
    use time::{Duration, OffsetDateTime};
    use uuid::Uuid;
    use shared::models::*;

    use crate::auth::AdminToken;
    use crate::config::{ServiceConfig, DEFAULT_VOTES_PER_WINDOW};
    use crate::cors::is_dev_origin;
    use crate::error::ApiError;
    use crate::queries::Queries;
    use crate::rate_limiter::RateLimiter;
    use crate::routes::*;
    use crate::utils::{ensure_nominee_in_category, parse_uuid};

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
    }

    // Requests in these tests are rejected before any query runs, so the pool never connects.
    async fn client(admin_token: Option<&str>) -> Client {
        let pool = PgPool::connect_lazy("postgres://postgres@localhost/awards_test").unwrap();
        let config = ServiceConfig {
            admin_token: admin_token.map(str::to_string),
            ..ServiceConfig::default()
        };
        let rocket = rocket::build()
            .manage(AppState::new(pool, &config))
            .mount("/api", rocket::routes![get_user_votes, submit_vote, delete_user_votes, list_voters, list_votes])
            .register("/", rocket::catchers![crate::catchers::unauthorized]);
        Client::tracked(rocket).await.unwrap()
    }

    /// Database-backed tests run only against a database named by `DATABASE_URL`.
    async fn database() -> Option<PgPool> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let pool = PgPool::connect(&url).await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        Some(pool)
    }

    fn nominee(id: &str, category_id: &str) -> Nominee {
        Nominee {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            image_url: String::new(),
            category_id: category_id.to_string(),
        }
    }

    fn vote(category_id: &str, nominee_id: &str) -> SubmitVoteRequest {
        SubmitVoteRequest { category_id: category_id.to_string(), nominee_id: nominee_id.to_string() }
    }

    #[test]
    fn test_nominee_must_belong_to_category() {
        let in_game = nominee("nominee-1", "best-game");

        assert!(ensure_nominee_in_category(Some(&in_game), &vote("best-game", "nominee-1")).is_ok());

        let err = ensure_nominee_in_category(Some(&in_game), &vote("best-art", "nominee-1")).unwrap_err();
        assert_eq!(err.status(), Status::BadRequest);
        assert_eq!(err.to_string(), "Nominee nominee-1 is not part of category best-art");

        let err = ensure_nominee_in_category(None, &vote("best-game", "nominee-404")).unwrap_err();
        assert_eq!(err.status(), Status::BadRequest);
        assert_eq!(err.to_string(), "Unknown nominee: nominee-404");
    }

    #[rocket::async_test]
    async fn test_record_vote_updates_existing_row() {
        let Some(pool) = database().await else { return };
        let suffix = Uuid::new_v4().simple().to_string();
        let game = format!("best-game-{}", suffix);
        let art = format!("best-art-{}", suffix);
        let first = format!("nominee-1-{}", suffix);
        let second = format!("nominee-2-{}", suffix);
        let painter = format!("nominee-3-{}", suffix);
        let user = format!("user-{}", suffix);

        for id in [&game, &art] {
            let category = Category { id: id.clone(), name: id.clone(), description: String::new(), icon: String::new() };
            Queries::insert_category(&pool, &category).await.unwrap();
        }
        Queries::insert_nominee(&pool, &nominee(&first, &game)).await.unwrap();
        Queries::insert_nominee(&pool, &nominee(&second, &game)).await.unwrap();
        Queries::insert_nominee(&pool, &nominee(&painter, &art)).await.unwrap();

        Queries::record_vote(&pool, &user, &vote(&game, &first)).await.unwrap();
        Queries::record_vote(&pool, &user, &vote(&game, &second)).await.unwrap();

        let votes = Queries::fetch_user_votes(&pool, &user).await.unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes.get(&game), Some(&second));

        let rejected = Queries::record_vote(&pool, &user, &vote(&game, &painter)).await.unwrap_err();
        assert_eq!(rejected.status(), Status::BadRequest);

        // the schema refuses cross-category votes written around the check
        let raw = sqlx::query("INSERT INTO votes (user_id, category_id, nominee_id) VALUES ($1, $2, $3)")
            .bind(&user)
            .bind(&art)
            .bind(&first)
            .execute(&pool)
            .await
            .unwrap_err();
        assert_eq!(ApiError::from(raw).status(), Status::BadRequest);

        let voters = Queries::list_voters(&pool).await.unwrap();
        let summary = voters.iter().find(|v| v.user_id == user).unwrap();
        assert_eq!(summary.vote_count, 1);
        assert!(summary.first_vote_at <= summary.last_vote_at);

        for id in [&game, &art] {
            Queries::delete_category(&pool, id).await.unwrap();
        }
    }

    #[test]
    fn test_admin_token_verification() {
        let token = AdminToken::new(Some("s3cret".into()));
        assert!(token.verify(Some("Bearer s3cret")));
        assert!(!token.verify(Some("Bearer wrong")));
        assert!(!token.verify(Some("s3cret")));
        assert!(!token.verify(None));

        let disabled = AdminToken::new(None);
        assert!(!disabled.verify(Some("Bearer ")));
    }

    #[test]
    fn test_service_config_from_lookup() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("ADMIN_TOKEN", "  token-1 "),
            ("VOTES_PER_WINDOW", "5"),
            ("VOTE_WINDOW_SECS", "not-a-number"),
        ]));
        assert_eq!(config.admin_token.as_deref(), Some("token-1"));
        assert_eq!(config.votes_per_window, 5);
        assert_eq!(config.vote_window_secs, 60);

        let empty = ServiceConfig::from_lookup(lookup(&[("ADMIN_TOKEN", "   ")]));
        assert_eq!(empty.admin_token, None);
        assert_eq!(empty.votes_per_window, DEFAULT_VOTES_PER_WINDOW);
    }

    #[test]
    fn test_rate_limiter_window() {
        let limiter = RateLimiter::new(2, 60);
        let start = OffsetDateTime::now_utc();

        assert!(limiter.check_at("submit_vote:user-42", start).is_ok());
        assert!(limiter.check_at("submit_vote:user-42", start).is_ok());
        let limited = limiter.check_at("submit_vote:user-42", start + Duration::seconds(10)).unwrap_err();
        assert_eq!(limited.retry_after_secs, 50);

        assert!(limiter.check_at("submit_vote:user-7", start).is_ok());
        assert!(limiter.check_at("submit_vote:user-42", start + Duration::seconds(61)).is_ok());
    }

    #[test]
    fn test_rate_limiter_prune() {
        let limiter = RateLimiter::new(1, 60);
        let start = OffsetDateTime::now_utc();
        limiter.check_at("a", start).unwrap();
        limiter.check_at("b", start + Duration::seconds(50)).unwrap();

        assert_eq!(limiter.prune(start + Duration::seconds(90)), 1);
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn test_api_error_status() {
        assert_eq!(ApiError::NotFound.status(), Status::NotFound);
        assert_eq!(ApiError::RateLimited(3).status(), Status::TooManyRequests);
        assert_eq!(ApiError::Conflict("dup".into()).status(), Status::Conflict);
        assert_eq!(ApiError::from(shared::ValidationError::EmptyId).status(), Status::BadRequest);
        assert_eq!(ApiError::RateLimited(3).to_string(), "Too many votes. Please try again in 3 seconds.");
    }

    #[test]
    fn test_parse_uuid_and_origins() {
        assert!(parse_uuid("6f1c1f9e-1b1a-4c59-9f59-3f0f3c1d2e4a").is_ok());
        assert!(matches!(parse_uuid("not-a-uuid"), Err(ApiError::InvalidId(_))));

        assert!(is_dev_origin("http://localhost:8080"));
        assert!(!is_dev_origin("https://evil.example.com"));
    }

    #[rocket::async_test]
    async fn test_admin_routes_require_token() {
        let client = client(Some("s3cret")).await;

        let response = client.delete("/api/users/user-42/votes").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);

        let response = client.get("/api/voters").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);

        let response = client
            .get("/api/votes")
            .header(Header::new("Authorization", "Bearer wrong"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);
        let body: serde_json::Value = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(body["status"], 401);
        assert_eq!(body["error"], "Admin authorization required.");
    }

    #[rocket::async_test]
    async fn test_invalid_vote_requests_rejected() {
        let client = client(None).await;

        let long_user = "u".repeat(200);
        let response = client.get(format!("/api/users/{}/votes", long_user)).dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);

        let response = client
            .put("/api/users/user-42/votes")
            .header(ContentType::JSON)
            .body(r#"{"category_id":"Best Game","nominee_id":"nominee-1"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
        let body: shared::ErrorResponse = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert!(body.error.contains("Invalid identifier"), "unexpected error: {}", body.error);
    }
}
