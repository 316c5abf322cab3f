pub mod attachments;
pub mod health;
