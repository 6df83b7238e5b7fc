use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use skylane_shared::{BookingStatus, CabinClass};
use uuid::Uuid;

/// A paid reservation against a route template on a travel date.
///
/// Created by the booking flow and mutated here only by settlement, which
/// flips `points_awarded` and moves the status to COMPLETED.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub booking_number: String,
    pub user_id: Option<Uuid>,
    pub template_id: Uuid,
    pub flight_date: NaiveDate,
    pub cabin_class: CabinClass,
    pub passenger_name: String,
    /// Optional loyalty reference entered at booking time; resolved against
    /// an account id or an email during settlement.
    pub member_number: Option<String>,
    pub total_price: f64,
    pub checked_in: bool,
    pub points_awarded: bool,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    /// Mileage balance; incremented atomically by settlement, decremented by
    /// the out-of-scope redemption flow.
    pub points: i64,
}
