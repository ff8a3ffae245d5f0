use std::sync::Arc;

use rocket::{State, get, post, put, patch, delete, http::Status, serde::json::Json};
use rustrict::CensorStr;
use sqlx::PgPool;
use tracing::{debug, info, instrument};
use shared::{models::*, validation::*};
use crate::{
    auth::{Admin, AdminToken},
    config::ServiceConfig,
    error::ApiError,
    queries::Queries,
    rate_limiter::RateLimiter,
    utils::parse_uuid,
};

pub struct AppState {
    pub db: PgPool,
    pub vote_limiter: Arc<RateLimiter>,
    pub admin: AdminToken,
}

impl AppState {
    pub fn new(pool: PgPool, config: &ServiceConfig) -> Self {
        Self {
            db: pool,
            vote_limiter: Arc::new(RateLimiter::new(config.votes_per_window, config.vote_window_secs)),
            admin: AdminToken::new(config.admin_token.clone()),
        }
    }
}

#[rocket::options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}

#[get("/users/<user_id>/votes")]
pub async fn get_user_votes(state: &State<AppState>, user_id: &str) -> Result<Json<UserVotes>, ApiError> {
    validate_user_id(user_id)?;
    let votes = Queries::fetch_user_votes(&state.db, user_id).await?;
    debug!("Fetched {} votes for {}", votes.len(), user_id);
    Ok(Json(UserVotes { user_id: user_id.to_string(), votes }))
}

#[instrument(skip(state, request), fields(category = %request.category_id))]
#[put("/users/<user_id>/votes", format = "json", data = "<request>")]
pub async fn submit_vote(
    state: &State<AppState>,
    user_id: &str,
    request: Json<SubmitVoteRequest>,
) -> Result<Json<SubmitVoteResponse>, ApiError> {
    let vote = request.into_inner();
    validate_user_id(user_id)?;
    validate_vote_request(&vote)?;

    state.vote_limiter
        .check(&format!("submit_vote:{}", user_id))
        .map_err(|limited| ApiError::RateLimited(limited.retry_after_secs))?;

    Queries::record_vote(&state.db, user_id, &vote).await?;
    info!("Recorded vote of {} for {}", user_id, vote.nominee_id);
    Ok(Json(SubmitVoteResponse::ok()))
}

#[delete("/users/<user_id>/votes")]
pub async fn delete_user_votes(_admin: Admin, state: &State<AppState>, user_id: &str) -> Result<Status, ApiError> {
    validate_user_id(user_id)?;
    let removed = Queries::delete_user_votes(&state.db, user_id).await?;
    info!("Removed {} votes of {}", removed, user_id);
    Ok(Status::NoContent)
}

#[get("/voters")]
pub async fn list_voters(_admin: Admin, state: &State<AppState>) -> Result<Json<Vec<VoterSummary>>, ApiError> {
    Queries::list_voters(&state.db).await.map(Json)
}

#[get("/votes")]
pub async fn list_votes(_admin: Admin, state: &State<AppState>) -> Result<Json<Vec<VoteRecord>>, ApiError> {
    Queries::list_votes(&state.db).await.map(Json)
}

#[get("/leaderboard")]
pub async fn leaderboard(state: &State<AppState>) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    Queries::leaderboard(&state.db).await.map(Json)
}

#[get("/categories")]
pub async fn list_categories(state: &State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    Queries::list_categories(&state.db).await.map(Json)
}

#[post("/categories", format = "json", data = "<category>")]
pub async fn create_category(
    _admin: Admin,
    state: &State<AppState>,
    category: Json<Category>,
) -> Result<(Status, Json<Category>), ApiError> {
    let category = category.into_inner();
    validate_category(&category)?;
    Queries::insert_category(&state.db, &category).await?;
    info!("Created category {}", category.id);
    Ok((Status::Created, Json(category)))
}

#[patch("/categories/<id>", format = "json", data = "<update>")]
pub async fn update_category(
    _admin: Admin,
    state: &State<AppState>,
    id: &str,
    update: Json<CategoryUpdate>,
) -> Result<Json<Category>, ApiError> {
    let mut category = Queries::get_category(&state.db, id).await?.ok_or(ApiError::NotFound)?;
    category.apply(update.into_inner());
    validate_category(&category)?;
    Queries::update_category(&state.db, &category).await?;
    Ok(Json(category))
}

#[delete("/categories/<id>")]
pub async fn delete_category(_admin: Admin, state: &State<AppState>, id: &str) -> Result<Status, ApiError> {
    if !Queries::delete_category(&state.db, id).await? {
        return Err(ApiError::NotFound);
    }
    info!("Deleted category {}", id);
    Ok(Status::NoContent)
}

#[get("/nominees")]
pub async fn list_nominees(state: &State<AppState>) -> Result<Json<Vec<Nominee>>, ApiError> {
    Queries::list_nominees(&state.db).await.map(Json)
}

#[post("/nominees", format = "json", data = "<nominee>")]
pub async fn create_nominee(
    _admin: Admin,
    state: &State<AppState>,
    nominee: Json<Nominee>,
) -> Result<(Status, Json<Nominee>), ApiError> {
    let nominee = nominee.into_inner();
    validate_nominee(&nominee)?;
    Queries::insert_nominee(&state.db, &nominee).await?;
    info!("Created nominee {} in {}", nominee.id, nominee.category_id);
    Ok((Status::Created, Json(nominee)))
}

#[patch("/nominees/<id>", format = "json", data = "<update>")]
pub async fn update_nominee(
    _admin: Admin,
    state: &State<AppState>,
    id: &str,
    update: Json<NomineeUpdate>,
) -> Result<Json<Nominee>, ApiError> {
    let mut nominee = Queries::get_nominee(&state.db, id).await?.ok_or(ApiError::NotFound)?;
    nominee.apply(update.into_inner());
    validate_nominee(&nominee)?;
    Queries::update_nominee(&state.db, &nominee).await?;
    Ok(Json(nominee))
}

#[delete("/nominees/<id>")]
pub async fn delete_nominee(_admin: Admin, state: &State<AppState>, id: &str) -> Result<Status, ApiError> {
    if !Queries::delete_nominee(&state.db, id).await? {
        return Err(ApiError::NotFound);
    }
    info!("Deleted nominee {}", id);
    Ok(Status::NoContent)
}

#[get("/events")]
pub async fn list_events(state: &State<AppState>) -> Result<Json<Vec<AwardEvent>>, ApiError> {
    Queries::list_events(&state.db).await.map(Json)
}

#[post("/events", format = "json", data = "<event>")]
pub async fn create_event(
    _admin: Admin,
    state: &State<AppState>,
    event: Json<NewEvent>,
) -> Result<(Status, Json<AwardEvent>), ApiError> {
    let event = event.into_inner();
    validate_event(&event)?;
    let created = Queries::insert_event(&state.db, &event).await?;
    info!("Created event {} ({})", created.title, created.id);
    Ok((Status::Created, Json(created)))
}

#[patch("/events/<id>", format = "json", data = "<update>")]
pub async fn update_event(
    _admin: Admin,
    state: &State<AppState>,
    id: &str,
    update: Json<EventUpdate>,
) -> Result<Json<AwardEvent>, ApiError> {
    let id = parse_uuid(id)?;
    let mut event = Queries::get_event(&state.db, id).await?.ok_or(ApiError::NotFound)?;
    event.apply(update.into_inner());
    validate_event(&event.as_new())?;
    Queries::update_event(&state.db, &event).await?;
    Ok(Json(event))
}

#[delete("/events/<id>")]
pub async fn delete_event(_admin: Admin, state: &State<AppState>, id: &str) -> Result<Status, ApiError> {
    let id = parse_uuid(id)?;
    if !Queries::delete_event(&state.db, id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(Status::NoContent)
}

#[post("/reservations", format = "json", data = "<reservation>")]
pub async fn create_reservation(
    state: &State<AppState>,
    reservation: Json<NewReservation>,
) -> Result<(Status, Json<Reservation>), ApiError> {
    let reservation = reservation.into_inner();
    validate_reservation(&reservation)?;

    if reservation.user_name.is_inappropriate() {
        return Err(ApiError::BadRequest(format!(
            "Possible profanity detected in name: {}",
            reservation.user_name
        )));
    }

    let event = Queries::find_event_by_title(&state.db, &reservation.event_title)
        .await?
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown event: {}", reservation.event_title)))?;
    if !event.reservable {
        return Err(ApiError::BadRequest(format!("Event {} does not take reservations", event.title)));
    }

    let created = Queries::insert_reservation(&state.db, &reservation).await?;
    info!("Reservation {} for {}", created.id, created.event_title);
    Ok((Status::Created, Json(created)))
}

#[get("/reservations")]
pub async fn list_reservations(_admin: Admin, state: &State<AppState>) -> Result<Json<Vec<Reservation>>, ApiError> {
    Queries::list_reservations(&state.db).await.map(Json)
}
