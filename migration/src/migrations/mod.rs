pub mod m202610010001_create_tags;
pub mod m202610010002_create_attendees;
pub mod m202610010003_add_tag_warn_on_duplicates;
