//! HTTP client for the vote persistence service.

use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use js_sys::encode_uri_component;
use serde::de::DeserializeOwned;
use shared::{models::*, Error, ErrorCode, ErrorResponse, Result, VoteService};
use crate::config::CONFIG;

fn network(e: gloo_net::Error) -> Error {
    Error::network(e.to_string())
}

fn users_votes_url(base_url: &str, user_id: &str) -> String {
    format!("{}/users/{}/votes", base_url, String::from(encode_uri_component(user_id)))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    if !response.ok() {
        let status = response.status();
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => response.status_text(),
        };
        return Err(Error::from_status(status, message));
    }

    response.json::<T>().await.map_err(|e| {
        Error::with_details(ErrorCode::SystemError, "Unexpected response from vote service", e.to_string())
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HttpVoteService {
    base_url: &'static str,
}

impl Default for HttpVoteService {
    fn default() -> Self {
        Self { base_url: CONFIG.api_base_url }
    }
}

#[async_trait(?Send)]
impl VoteService for HttpVoteService {
    async fn fetch_user_votes(&self, user_id: &str) -> Result<VoteMap> {
        let response = Request::get(&users_votes_url(self.base_url, user_id))
            .send()
            .await
            .map_err(network)?;
        let user_votes: UserVotes = read_json(response).await?;
        Ok(user_votes.votes)
    }

    async fn submit_vote(&self, user_id: &str, category_id: &str, nominee_id: &str) -> Result<()> {
        let body = SubmitVoteRequest {
            category_id: category_id.to_string(),
            nominee_id: nominee_id.to_string(),
        };
        let response = Request::put(&users_votes_url(self.base_url, user_id))
            .json(&body)
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;

        let result: SubmitVoteResponse = read_json(response).await?;
        if result.success {
            Ok(())
        } else {
            Err(Error::new(ErrorCode::SystemError, result.error.unwrap_or_else(|| "Vote was not recorded".into())))
        }
    }
}

async fn get_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let response = Request::get(&format!("{}{}", CONFIG.api_base_url, path))
        .send()
        .await
        .map_err(network)?;
    read_json(response).await
}

pub async fn fetch_categories() -> Result<Vec<Category>> {
    get_json("/categories").await
}

pub async fn fetch_nominees() -> Result<Vec<Nominee>> {
    get_json("/nominees").await
}

pub async fn fetch_leaderboard() -> Result<Vec<LeaderboardEntry>> {
    get_json("/leaderboard").await
}

pub async fn fetch_events() -> Result<Vec<AwardEvent>> {
    get_json("/events").await
}

pub async fn create_reservation(reservation: &NewReservation) -> Result<Reservation> {
    let response = Request::post(&format!("{}/reservations", CONFIG.api_base_url))
        .json(reservation)
        .map_err(network)?
        .send()
        .await
        .map_err(network)?;
    read_json(response).await
}
