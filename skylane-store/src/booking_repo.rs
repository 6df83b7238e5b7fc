use async_trait::async_trait;
use skylane_core::booking::Booking;
use skylane_core::repository::{BookingRepository, RepoError};
use skylane_shared::{BookingStatus, CabinClass};
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

pub struct PostgresBookingRepository {
    pub pool: sqlx::PgPool,
}

fn booking_from_row(row: &PgRow) -> Result<Booking, RepoError> {
    let cabin: String = row.try_get("cabin_class")?;
    let status: String = row.try_get("status")?;
    Ok(Booking {
        id: row.try_get("id")?,
        booking_number: row.try_get("booking_number")?,
        user_id: row.try_get("user_id")?,
        template_id: row.try_get("template_id")?,
        flight_date: row.try_get("flight_date")?,
        cabin_class: cabin.parse::<CabinClass>()?,
        passenger_name: row.try_get("passenger_name")?,
        member_number: row.try_get("member_number")?,
        total_price: row.try_get("total_price")?,
        checked_in: row.try_get("checked_in")?,
        points_awarded: row.try_get("points_awarded")?,
        status: status.parse::<BookingStatus>()?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn list_pending_settlement(&self) -> Result<Vec<Booking>, RepoError> {
        let rows = sqlx::query(
            "SELECT id, booking_number, user_id, template_id, flight_date, cabin_class, \
                    passenger_name, member_number, total_price, checked_in, points_awarded, \
                    status, created_at \
             FROM bookings \
             WHERE points_awarded = FALSE \
               AND status IN ('CONFIRMED', 'CHECKED_IN', 'COMPLETED') \
             ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(booking_from_row).collect()
    }

    async fn settle(
        &self,
        booking_id: Uuid,
        user_id: Uuid,
        points: i64,
    ) -> Result<bool, RepoError> {
        let mut tx = self.pool.begin().await?;

        // Compare-and-set on the awarded flag; a concurrent or repeated run
        // finds zero rows here and must not touch the balance.
        let flagged = sqlx::query(
            "UPDATE bookings \
             SET points_awarded = TRUE, status = 'COMPLETED' \
             WHERE id = $1 AND points_awarded = FALSE",
        )
        .bind(booking_id)
        .execute(&mut *tx)
        .await?;

        if flagged.rows_affected() == 0 {
            tx.rollback().await?;
            debug!(%booking_id, "settlement guard missed; booking already awarded");
            return Ok(false);
        }

        sqlx::query("UPDATE users SET points = points + $1 WHERE id = $2")
            .bind(points)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
