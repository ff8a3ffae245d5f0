use std::sync::Arc;

use backend::{
    catchers::{bad_request, forbidden, internal_error, not_found, too_many_requests, unauthorized, unprocessable},
    config::ServiceConfig,
    cors::CORS,
    rate_limiter::RateLimiter,
    routes::*,
};
use rocket::{routes, catchers};
use shuttle_runtime::CustomError;
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::time::{interval, Duration};
use tracing::{debug, info};

async fn run_limiter_cleanup(limiter: Arc<RateLimiter>, every: Duration) {
    let mut interval = interval(every);
    info!("🧹 Rate limit cleanup started");

    loop {
        interval.tick().await;
        let removed = limiter.prune(OffsetDateTime::now_utc());
        if removed > 0 {
            debug!("Pruned {} expired rate limit windows, {} still tracked", removed, limiter.tracked_keys());
        }
    }
}

#[shuttle_runtime::main]
async fn rocket(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secret_store: shuttle_runtime::SecretStore,
) -> shuttle_rocket::ShuttleRocket {
    info!("🚀 Starting awards vote service");

    let config = ServiceConfig::from_lookup(|key| secret_store.get(key));

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(CustomError::new)?;

    info!("📋 Migrations complete");

    let app_state = AppState::new(pool, &config);
    let window = Duration::from_secs(config.vote_window_secs.max(1) as u64);
    tokio::spawn(run_limiter_cleanup(Arc::clone(&app_state.vote_limiter), window));

    let rocket = rocket::build()
        .attach(CORS)
        .manage(app_state)
        .mount(
            "/api",
            routes![
                all_options,
                get_user_votes,
                submit_vote,
                delete_user_votes,
                list_voters,
                list_votes,
                leaderboard,
                list_categories,
                create_category,
                update_category,
                delete_category,
                list_nominees,
                create_nominee,
                update_nominee,
                delete_nominee,
                list_events,
                create_event,
                update_event,
                delete_event,
                create_reservation,
                list_reservations
            ],
        )
        .register(
            "/",
            catchers![
                unauthorized,
                forbidden,
                too_many_requests,
                bad_request,
                unprocessable,
                internal_error,
                not_found
            ],
        );

    Ok(rocket.into())
}
