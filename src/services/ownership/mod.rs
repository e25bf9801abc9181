pub mod lookup;
pub mod memory;
pub mod postgres;

pub use lookup::{OwnerLookup, OwnerLookupError};
pub use memory::InMemoryOwners;
pub use postgres::PgTodoOwners;
