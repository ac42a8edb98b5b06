pub mod attendee;
pub mod tag;
pub mod tag_state;

pub use attendee::Entity as Attendee;
pub use tag::Entity as Tag;
