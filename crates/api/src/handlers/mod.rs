pub mod approval_request;
pub mod notification;
pub mod procurement;
pub mod project;
pub mod team;
pub mod template;
