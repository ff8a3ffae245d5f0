use shared::models::{Nominee, SubmitVoteRequest};
use uuid::Uuid;
use crate::error::ApiError;

pub fn parse_uuid(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::InvalidId(id.to_string()))
}

/// A vote may only name a nominee of the category it is cast in.
pub fn ensure_nominee_in_category(nominee: Option<&Nominee>, vote: &SubmitVoteRequest) -> Result<(), ApiError> {
    let nominee = nominee
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown nominee: {}", vote.nominee_id)))?;
    if nominee.category_id != vote.category_id {
        return Err(ApiError::BadRequest(format!(
            "Nominee {} is not part of category {}",
            vote.nominee_id, vote.category_id
        )));
    }
    Ok(())
}
