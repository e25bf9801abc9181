pub mod path_id;
pub mod principal;

pub use path_id::{PathId, parse_path_id};
pub use principal::{CurrentPrincipal, Principal};
