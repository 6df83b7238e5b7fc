pub mod booking;
pub mod calendar;
pub mod clock;
pub mod flight;
pub mod occupancy;
pub mod repository;
pub mod rng;
pub mod schedule;
