//! Idempotent batch settlement of loyalty mileage from completed travel.
//!
//! A scheduled trigger scans every booking that has not been awarded yet,
//! waits out a post-arrival buffer, and credits a distance/cabin/revenue
//! award exactly once. The `points_awarded` flag is the idempotency anchor:
//! it is filtered on here and re-checked inside the store's per-booking
//! transaction, so neither a crash between writes nor a concurrent pass can
//! double-pay.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use skylane_core::booking::{Booking, User};
use skylane_core::clock::Clock;
use skylane_core::flight::RouteTemplate;
use skylane_core::repository::{
    BookingRepository, RepoError, RouteTemplateRepository, UserRepository,
};
use skylane_core::schedule::{self, ScheduleError};
use skylane_shared::CabinClass;
use skylane_store::SettlementRules;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    #[error("a settlement pass is already running")]
    AlreadyRunning,
    #[error("storage failure: {0}")]
    Storage(#[from] RepoError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Per-run monitoring output: how many bookings were credited this pass out
/// of everything still unsettled.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SettlementSummary {
    pub processed: usize,
    pub total_pending: usize,
}

/// Accrual multiplier on estimated flown distance.
pub fn cabin_base_coefficient(cabin: CabinClass) -> f64 {
    match cabin {
        CabinClass::Economy => 1.0,
        CabinClass::PremiumEconomy => 1.2,
        CabinClass::Business => 1.5,
        CabinClass::FirstClass => 2.0,
    }
}

/// Accrual multiplier on ticket revenue.
pub fn cabin_revenue_coefficient(cabin: CabinClass) -> f64 {
    match cabin {
        CabinClass::Economy => 0.5,
        CabinClass::PremiumEconomy => 0.75,
        CabinClass::Business => 1.0,
        CabinClass::FirstClass => 1.5,
    }
}

/// `floor(distance * base_coef + price * revenue_coef)`.
pub fn mileage_award(distance_miles: f64, cabin: CabinClass, total_price: f64) -> i64 {
    let base_miles = distance_miles * cabin_base_coefficient(cabin);
    let revenue_bonus = total_price * cabin_revenue_coefficient(cabin);
    (base_miles + revenue_bonus).floor() as i64
}

pub struct SettlementEngine {
    bookings: Arc<dyn BookingRepository>,
    users: Arc<dyn UserRepository>,
    templates: Arc<dyn RouteTemplateRepository>,
    clock: Arc<dyn Clock>,
    rules: SettlementRules,
    run_lock: tokio::sync::Mutex<()>,
}

impl SettlementEngine {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        users: Arc<dyn UserRepository>,
        templates: Arc<dyn RouteTemplateRepository>,
        clock: Arc<dyn Clock>,
        rules: SettlementRules,
    ) -> Self {
        Self {
            bookings,
            users,
            templates,
            clock,
            rules,
            run_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// One settlement pass over all pending bookings. A booking that fails
    /// (unparseable schedule, unresolvable account) is logged and left
    /// pending for the next run; it never aborts the batch. Overlapping
    /// invocations are rejected with [`SettlementError::AlreadyRunning`].
    pub async fn run(&self) -> Result<SettlementSummary, SettlementError> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| SettlementError::AlreadyRunning)?;

        let now = self.clock.now();
        let pending = self.bookings.list_pending_settlement().await?;
        let total_pending = pending.len();
        info!(total_pending, "starting mileage settlement pass");

        let templates: HashMap<Uuid, RouteTemplate> = self
            .templates
            .list_all()
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let mut processed = 0usize;
        for booking in &pending {
            match self.settle_one(booking, &templates, now).await {
                Ok(true) => processed += 1,
                Ok(false) => {}
                Err(err) => {
                    warn!(
                        booking = %booking.booking_number,
                        error = %err,
                        "settlement skipped for this booking"
                    );
                }
            }
        }

        info!(processed, total_pending, "mileage settlement pass complete");
        Ok(SettlementSummary {
            processed,
            total_pending,
        })
    }

    async fn settle_one(
        &self,
        booking: &Booking,
        templates: &HashMap<Uuid, RouteTemplate>,
        now: DateTime<Utc>,
    ) -> Result<bool, SettlementError> {
        let Some(template) = templates.get(&booking.template_id) else {
            warn!(
                booking = %booking.booking_number,
                "booking references an unknown route template; left pending"
            );
            return Ok(false);
        };

        let arrival = schedule::arrival_instant(
            booking.flight_date,
            &template.departure_time,
            &template.arrival_time,
        )?;
        let eligible_at = arrival + Duration::hours(self.rules.arrival_buffer_hours);
        if now < eligible_at {
            return Ok(false);
        }

        let Some(user) = self.resolve_account(booking).await? else {
            warn!(
                booking = %booking.booking_number,
                member_number = booking.member_number.as_deref().unwrap_or(""),
                "no loyalty account resolves for booking; left pending"
            );
            return Ok(false);
        };

        let hours = template.duration_hours()?;
        let distance = (hours * self.rules.average_speed_mph).round();
        let points = mileage_award(distance, booking.cabin_class, booking.total_price);

        let applied = self.bookings.settle(booking.id, user.id, points).await?;
        if applied {
            info!(
                booking = %booking.booking_number,
                user = %user.email,
                points,
                "mileage credited"
            );
        }
        Ok(applied)
    }

    /// The member-number reference wins when it resolves; otherwise the
    /// booking's owning user is credited.
    async fn resolve_account(&self, booking: &Booking) -> Result<Option<User>, SettlementError> {
        if let Some(member_ref) = booking
            .member_number
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
        {
            if let Some(user) = self.users.find_by_member_ref(member_ref).await? {
                return Ok(Some(user));
            }
        }
        match booking.user_id {
            Some(user_id) => Ok(self.users.find_by_id(user_id).await?),
            None => Ok(None),
        }
    }
}
