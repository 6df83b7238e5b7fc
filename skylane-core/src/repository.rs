use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::booking::{Booking, User};
use crate::flight::{FlightInstance, RouteTemplate};

pub type RepoError = Box<dyn std::error::Error + Send + Sync>;

/// Read access to the schedule templates (admin-owned, read-only here).
#[async_trait]
pub trait RouteTemplateRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<RouteTemplate>, RepoError>;

    async fn get(&self, id: Uuid) -> Result<Option<RouteTemplate>, RepoError>;
}

/// Access to per-day flight occurrences.
#[async_trait]
pub trait FlightInstanceRepository: Send + Sync {
    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<FlightInstance>, RepoError>;

    /// Insert instances that do not exist yet. A (template_id, flight_date)
    /// conflict is a no-op, so concurrent callers for the same date cannot
    /// duplicate rows or perturb an instance already in progress. Returns how
    /// many rows were actually inserted.
    async fn insert_missing(&self, instances: &[FlightInstance]) -> Result<u64, RepoError>;

    /// Persist a lifecycle step for one instance: status plus scheduled and
    /// actual instants (scheduled times move when a delay is applied).
    async fn apply_progress(&self, instance: &FlightInstance) -> Result<(), RepoError>;
}

/// Access to bookings for the settlement batch.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// All bookings with `points_awarded = false` in a settleable status.
    async fn list_pending_settlement(&self) -> Result<Vec<Booking>, RepoError>;

    /// Atomically credit `points` to the user and mark the booking settled
    /// (flag + COMPLETED status) in one transaction. The awarded flag is
    /// re-checked inside the transaction; returns false when the guard no
    /// longer matches and nothing was written.
    async fn settle(&self, booking_id: Uuid, user_id: Uuid, points: i64)
        -> Result<bool, RepoError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    /// Resolve a loyalty member reference, matching account id first and
    /// email second.
    async fn find_by_member_ref(&self, member_ref: &str) -> Result<Option<User>, RepoError>;
}
