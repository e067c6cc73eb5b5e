pub mod movie_detail;
pub mod session;

pub use movie_detail::*;
pub use session::*;
