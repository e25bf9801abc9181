pub mod auth;
pub mod categories;
pub mod health;
pub mod todos;
pub mod users;
