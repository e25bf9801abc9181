pub mod category_repo;
pub mod error;
pub mod partial_update;
pub mod todo_repo;
pub mod user_repo;
