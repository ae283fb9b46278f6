pub mod quest_dto;
pub mod request;
pub mod response;
