pub mod messages;
pub mod progression;
