use sqlx::PgPool;
use uuid::Uuid;
use shared::{count_votes, models::*};
use crate::{error::ApiError, utils::ensure_nominee_in_category};

pub struct Queries;

impl Queries {
    pub async fn fetch_user_votes(pool: &PgPool, user_id: &str) -> Result<VoteMap, ApiError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT category_id, nominee_id FROM votes WHERE user_id = $1"
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// Insert-or-update keyed on `(user_id, category_id)`. The nominee row is
    /// share-locked so it cannot move to another category before the write lands.
    pub async fn record_vote(pool: &PgPool, user_id: &str, vote: &SubmitVoteRequest) -> Result<(), ApiError> {
        let mut tx = pool.begin().await?;

        let nominee = sqlx::query_as::<_, Nominee>(
            "SELECT id, name, description, image_url, category_id FROM nominees WHERE id = $1 FOR SHARE"
        )
        .bind(&vote.nominee_id)
        .fetch_optional(&mut *tx)
        .await?;
        ensure_nominee_in_category(nominee.as_ref(), vote)?;

        sqlx::query(
            "INSERT INTO votes (user_id, category_id, nominee_id)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT unique_user_category
             DO UPDATE SET nominee_id = EXCLUDED.nominee_id, updated_at = NOW()"
        )
        .bind(user_id)
        .bind(&vote.category_id)
        .bind(&vote.nominee_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn list_voters(pool: &PgPool) -> Result<Vec<VoterSummary>, ApiError> {
        let voters = sqlx::query_as::<_, VoterSummary>(
            "SELECT user_id, COUNT(*) AS vote_count,
                    MIN(created_at) AS first_vote_at, MAX(updated_at) AS last_vote_at
             FROM votes GROUP BY user_id ORDER BY last_vote_at DESC"
        )
        .fetch_all(pool)
        .await?;
        Ok(voters)
    }

    pub async fn delete_user_votes(pool: &PgPool, user_id: &str) -> Result<u64, ApiError> {
        let result = sqlx::query("DELETE FROM votes WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_votes(pool: &PgPool) -> Result<Vec<VoteRecord>, ApiError> {
        let votes = sqlx::query_as::<_, VoteRecord>(
            "SELECT id, user_id, category_id, nominee_id, created_at, updated_at
             FROM votes ORDER BY created_at DESC"
        )
        .fetch_all(pool)
        .await?;
        Ok(votes)
    }

    pub async fn leaderboard(pool: &PgPool) -> Result<Vec<LeaderboardEntry>, ApiError> {
        let pairs: Vec<(String, String)> = sqlx::query_as("SELECT category_id, nominee_id FROM votes")
            .fetch_all(pool)
            .await?;
        Ok(count_votes(pairs.iter().map(|(c, n)| (c.as_str(), n.as_str()))))
    }

    pub async fn list_categories(pool: &PgPool) -> Result<Vec<Category>, ApiError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, icon FROM categories ORDER BY name"
        )
        .fetch_all(pool)
        .await?;
        Ok(categories)
    }

    pub async fn get_category(pool: &PgPool, id: &str) -> Result<Option<Category>, ApiError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, icon FROM categories WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(category)
    }

    pub async fn insert_category(pool: &PgPool, category: &Category) -> Result<(), ApiError> {
        sqlx::query("INSERT INTO categories (id, name, description, icon) VALUES ($1, $2, $3, $4)")
            .bind(&category.id)
            .bind(&category.name)
            .bind(&category.description)
            .bind(&category.icon)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn update_category(pool: &PgPool, category: &Category) -> Result<(), ApiError> {
        sqlx::query("UPDATE categories SET name = $2, description = $3, icon = $4 WHERE id = $1")
            .bind(&category.id)
            .bind(&category.name)
            .bind(&category.description)
            .bind(&category.icon)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn delete_category(pool: &PgPool, id: &str) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_nominees(pool: &PgPool) -> Result<Vec<Nominee>, ApiError> {
        let nominees = sqlx::query_as::<_, Nominee>(
            "SELECT id, name, description, image_url, category_id FROM nominees ORDER BY category_id, name"
        )
        .fetch_all(pool)
        .await?;
        Ok(nominees)
    }

    pub async fn get_nominee(pool: &PgPool, id: &str) -> Result<Option<Nominee>, ApiError> {
        let nominee = sqlx::query_as::<_, Nominee>(
            "SELECT id, name, description, image_url, category_id FROM nominees WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(nominee)
    }

    pub async fn insert_nominee(pool: &PgPool, nominee: &Nominee) -> Result<(), ApiError> {
        sqlx::query(
            "INSERT INTO nominees (id, name, description, image_url, category_id) VALUES ($1, $2, $3, $4, $5)"
        )
        .bind(&nominee.id)
        .bind(&nominee.name)
        .bind(&nominee.description)
        .bind(&nominee.image_url)
        .bind(&nominee.category_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Moving a nominee to another category drops the votes it received in the old one.
    pub async fn update_nominee(pool: &PgPool, nominee: &Nominee) -> Result<(), ApiError> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM votes WHERE nominee_id = $1 AND category_id <> $2")
            .bind(&nominee.id)
            .bind(&nominee.category_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE nominees SET name = $2, description = $3, image_url = $4, category_id = $5 WHERE id = $1"
        )
        .bind(&nominee.id)
        .bind(&nominee.name)
        .bind(&nominee.description)
        .bind(&nominee.image_url)
        .bind(&nominee.category_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn delete_nominee(pool: &PgPool, id: &str) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM nominees WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_events(pool: &PgPool) -> Result<Vec<AwardEvent>, ApiError> {
        let events = sqlx::query_as::<_, AwardEvent>(
            "SELECT id, title, description, start_time, end_time, venue, speakers,
                    reservable, phase, day_label, event_date, created_at
             FROM events ORDER BY event_date, created_at"
        )
        .fetch_all(pool)
        .await?;
        Ok(events)
    }

    pub async fn get_event(pool: &PgPool, id: Uuid) -> Result<Option<AwardEvent>, ApiError> {
        let event = sqlx::query_as::<_, AwardEvent>(
            "SELECT id, title, description, start_time, end_time, venue, speakers,
                    reservable, phase, day_label, event_date, created_at
             FROM events WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(event)
    }

    pub async fn find_event_by_title(pool: &PgPool, title: &str) -> Result<Option<AwardEvent>, ApiError> {
        let event = sqlx::query_as::<_, AwardEvent>(
            "SELECT id, title, description, start_time, end_time, venue, speakers,
                    reservable, phase, day_label, event_date, created_at
             FROM events WHERE title = $1 ORDER BY event_date LIMIT 1"
        )
        .bind(title)
        .fetch_optional(pool)
        .await?;
        Ok(event)
    }

    pub async fn insert_event(pool: &PgPool, event: &NewEvent) -> Result<AwardEvent, ApiError> {
        let created = sqlx::query_as::<_, AwardEvent>(
            "INSERT INTO events
             (title, description, start_time, end_time, venue, speakers, reservable, phase, day_label, event_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING id, title, description, start_time, end_time, venue, speakers,
                       reservable, phase, day_label, event_date, created_at"
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.start_time)
        .bind(&event.end_time)
        .bind(&event.venue)
        .bind(&event.speakers)
        .bind(event.reservable)
        .bind(event.phase)
        .bind(&event.day_label)
        .bind(&event.event_date)
        .fetch_one(pool)
        .await?;
        Ok(created)
    }

    pub async fn update_event(pool: &PgPool, event: &AwardEvent) -> Result<(), ApiError> {
        sqlx::query(
            "UPDATE events SET title = $2, description = $3, start_time = $4, end_time = $5, venue = $6,
                    speakers = $7, reservable = $8, phase = $9, day_label = $10, event_date = $11
             WHERE id = $1"
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.start_time)
        .bind(&event.end_time)
        .bind(&event.venue)
        .bind(&event.speakers)
        .bind(event.reservable)
        .bind(event.phase)
        .bind(&event.day_label)
        .bind(&event.event_date)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn delete_event(pool: &PgPool, id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn insert_reservation(pool: &PgPool, reservation: &NewReservation) -> Result<Reservation, ApiError> {
        let created = sqlx::query_as::<_, Reservation>(
            "INSERT INTO event_reservations (event_title, user_name, contact_info)
             VALUES ($1, $2, $3)
             RETURNING id, user_name, event_title, contact_info, created_at"
        )
        .bind(&reservation.event_title)
        .bind(&reservation.user_name)
        .bind(&reservation.contact_info)
        .fetch_one(pool)
        .await?;
        Ok(created)
    }

    pub async fn list_reservations(pool: &PgPool) -> Result<Vec<Reservation>, ApiError> {
        let reservations = sqlx::query_as::<_, Reservation>(
            "SELECT id, user_name, event_title, contact_info, created_at
             FROM event_reservations ORDER BY created_at DESC"
        )
        .fetch_all(pool)
        .await?;
        Ok(reservations)
    }
}
