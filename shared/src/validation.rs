use time::{Date, macros::format_description};
use crate::models::{Category, NewEvent, NewReservation, Nominee, SubmitVoteRequest};

pub const MAX_ID_LENGTH: usize = 64;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;
pub const MAX_ICON_LENGTH: usize = 16;
pub const MAX_URL_LENGTH: usize = 500;
pub const MAX_EVENT_TITLE_LENGTH: usize = 150;
pub const MAX_DAY_LABEL_LENGTH: usize = 40;
pub const MAX_CONTACT_LENGTH: usize = 150;
pub const MAX_USER_ID_LENGTH: usize = 128;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Identifier must not be empty")]
    EmptyId,
    #[error("Identifier exceeds maximum length of {MAX_ID_LENGTH}")]
    IdTooLong,
    #[error("Invalid identifier: {0} (lowercase letters, digits and '-' only)")]
    InvalidId(String),
    #[error("Name must not be empty")]
    EmptyName,
    #[error("Name exceeds maximum length of {MAX_NAME_LENGTH}")]
    NameTooLong,
    #[error("Description exceeds maximum length of {MAX_DESCRIPTION_LENGTH}")]
    DescriptionTooLong,
    #[error("Icon exceeds maximum length of {MAX_ICON_LENGTH}")]
    IconTooLong,
    #[error("Invalid image url: {0}")]
    InvalidImageUrl(String),
    #[error("Event title must not be empty")]
    EmptyTitle,
    #[error("Event title exceeds maximum length of {MAX_EVENT_TITLE_LENGTH}")]
    TitleTooLong,
    #[error("Invalid event date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("Day label exceeds maximum length of {MAX_DAY_LABEL_LENGTH}")]
    DayLabelTooLong,
    #[error("Invalid user id: {0}")]
    InvalidUserId(String),
    #[error("Contact information must not be empty")]
    EmptyContact,
    #[error("Contact information exceeds maximum length of {MAX_CONTACT_LENGTH}")]
    ContactTooLong,
}

pub fn validate_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() { return Err(ValidationError::EmptyId); }
    if id.len() > MAX_ID_LENGTH { return Err(ValidationError::IdTooLong); }
    if !id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err(ValidationError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// User ids come from the identity provider, so only their shape is checked.
pub fn validate_user_id(user_id: &str) -> Result<(), ValidationError> {
    if user_id.is_empty()
        || user_id.len() > MAX_USER_ID_LENGTH
        || user_id.chars().any(|c| c.is_whitespace() || c == '/')
    {
        return Err(ValidationError::InvalidUserId(user_id.to_string()));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() { return Err(ValidationError::EmptyName); }
    if name.chars().count() > MAX_NAME_LENGTH { return Err(ValidationError::NameTooLong); }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::DescriptionTooLong);
    }
    Ok(())
}

pub fn validate_image_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() { return Ok(()); }
    if url.len() > MAX_URL_LENGTH || !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(ValidationError::InvalidImageUrl(url.to_string()));
    }
    Ok(())
}

pub fn validate_event_date(date: &str) -> Result<(), ValidationError> {
    Date::parse(date, format_description!("[year]-[month]-[day]"))
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidDate(date.to_string()))
}

pub fn validate_category(category: &Category) -> Result<(), ValidationError> {
    validate_id(&category.id)?;
    validate_name(&category.name)?;
    validate_description(&category.description)?;
    if category.icon.chars().count() > MAX_ICON_LENGTH { return Err(ValidationError::IconTooLong); }
    Ok(())
}

pub fn validate_nominee(nominee: &Nominee) -> Result<(), ValidationError> {
    validate_id(&nominee.id)?;
    validate_id(&nominee.category_id)?;
    validate_name(&nominee.name)?;
    validate_description(&nominee.description)?;
    validate_image_url(&nominee.image_url)
}

pub fn validate_event(event: &NewEvent) -> Result<(), ValidationError> {
    if event.title.trim().is_empty() { return Err(ValidationError::EmptyTitle); }
    if event.title.chars().count() > MAX_EVENT_TITLE_LENGTH { return Err(ValidationError::TitleTooLong); }
    if event.day_label.chars().count() > MAX_DAY_LABEL_LENGTH { return Err(ValidationError::DayLabelTooLong); }
    if let Some(description) = &event.description {
        validate_description(description)?;
    }
    validate_event_date(&event.event_date)
}

pub fn validate_reservation(reservation: &NewReservation) -> Result<(), ValidationError> {
    if reservation.event_title.trim().is_empty() { return Err(ValidationError::EmptyTitle); }
    validate_name(&reservation.user_name)?;
    if reservation.contact_info.trim().is_empty() { return Err(ValidationError::EmptyContact); }
    if reservation.contact_info.chars().count() > MAX_CONTACT_LENGTH { return Err(ValidationError::ContactTooLong); }
    Ok(())
}

pub fn validate_vote_request(request: &SubmitVoteRequest) -> Result<(), ValidationError> {
    validate_id(&request.category_id)?;
    validate_id(&request.nominee_id)
}
