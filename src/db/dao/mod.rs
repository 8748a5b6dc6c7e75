pub mod error;
pub mod session_dao;

pub use error::{DaoLayerError, DaoResult};
pub use session_dao::SessionDao;
