pub mod checkin;
pub mod tags;
