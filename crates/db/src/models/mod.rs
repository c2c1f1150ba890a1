pub mod approval_request;
pub mod audit;
pub mod directory;
pub mod event;
pub mod inventory;
pub mod notification;
pub mod procurement;
pub mod project;
pub mod task;
pub mod team_member;
pub mod workflow_template;
