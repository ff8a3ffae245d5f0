use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use uuid::Uuid;

pub type CategoryId = String;
pub type NomineeId = String;
pub type UserId = String;

/// Category -> nominee selections of a single voter.
pub type VoteMap = BTreeMap<CategoryId, NomineeId>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "backend", derive(sqlx::FromRow))]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "backend", derive(sqlx::FromRow))]
pub struct Nominee {
    pub id: NomineeId,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub category_id: CategoryId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NomineeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
}

/// One row of the remote vote table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "backend", derive(sqlx::FromRow))]
pub struct VoteRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub category_id: CategoryId,
    pub nominee_id: NomineeId,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmitVoteRequest {
    pub category_id: CategoryId,
    pub nominee_id: NomineeId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmitVoteResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmitVoteResponse {
    pub fn ok() -> Self {
        Self { success: true, error: None }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserVotes {
    pub user_id: UserId,
    pub votes: VoteMap,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "backend", derive(sqlx::FromRow))]
pub struct LeaderboardEntry {
    pub category_id: CategoryId,
    pub nominee_id: NomineeId,
    pub vote_count: i64,
}

/// Voter activity as seen by admins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "backend", derive(sqlx::FromRow))]
pub struct VoterSummary {
    pub user_id: UserId,
    pub vote_count: i64,
    pub first_vote_at: OffsetDateTime,
    pub last_vote_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "backend", derive(sqlx::Type))]
#[cfg_attr(feature = "backend", sqlx(type_name = "event_phase"))]
pub enum EventPhase {
    #[serde(rename = "Pre-Event")]
    #[cfg_attr(feature = "backend", sqlx(rename = "Pre-Event"))]
    PreEvent,
    #[serde(rename = "On-Event")]
    #[cfg_attr(feature = "backend", sqlx(rename = "On-Event"))]
    OnEvent,
}

/// A scheduled side event of the awards week.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "backend", derive(sqlx::FromRow))]
pub struct AwardEvent {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub venue: Option<String>,
    pub speakers: Option<String>,
    pub reservable: bool,
    pub phase: EventPhase,
    pub day_label: String,
    /// `YYYY-MM-DD`, used for ordering.
    pub event_date: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewEvent {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub speakers: Option<String>,
    pub reservable: bool,
    pub phase: EventPhase,
    pub day_label: String,
    pub event_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speakers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<EventPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "backend", derive(sqlx::FromRow))]
pub struct Reservation {
    pub id: Uuid,
    pub user_name: String,
    pub event_title: String,
    pub contact_info: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewReservation {
    pub event_title: String,
    pub user_name: String,
    pub contact_info: String,
}

impl Category {
    pub fn apply(&mut self, update: CategoryUpdate) {
        if let Some(name) = update.name { self.name = name; }
        if let Some(description) = update.description { self.description = description; }
        if let Some(icon) = update.icon { self.icon = icon; }
    }
}

impl Nominee {
    pub fn apply(&mut self, update: NomineeUpdate) {
        if let Some(name) = update.name { self.name = name; }
        if let Some(description) = update.description { self.description = description; }
        if let Some(image_url) = update.image_url { self.image_url = image_url; }
        if let Some(category_id) = update.category_id { self.category_id = category_id; }
    }
}

impl AwardEvent {
    pub fn apply(&mut self, update: EventUpdate) {
        if let Some(title) = update.title { self.title = title; }
        if update.description.is_some() { self.description = update.description; }
        if update.start_time.is_some() { self.start_time = update.start_time; }
        if update.end_time.is_some() { self.end_time = update.end_time; }
        if update.venue.is_some() { self.venue = update.venue; }
        if update.speakers.is_some() { self.speakers = update.speakers; }
        if let Some(reservable) = update.reservable { self.reservable = reservable; }
        if let Some(phase) = update.phase { self.phase = phase; }
        if let Some(day_label) = update.day_label { self.day_label = day_label; }
        if let Some(event_date) = update.event_date { self.event_date = event_date; }
    }

    /// Field set used to re-validate an event after an update.
    pub fn as_new(&self) -> NewEvent {
        NewEvent {
            title: self.title.clone(),
            description: self.description.clone(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            venue: self.venue.clone(),
            speakers: self.speakers.clone(),
            reservable: self.reservable,
            phase: self.phase,
            day_label: self.day_label.clone(),
            event_date: self.event_date.clone(),
        }
    }
}
