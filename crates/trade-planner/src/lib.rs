pub mod error;
pub mod models;
pub mod planner;
pub mod sizer;


pub use error::*;
pub use models::*;
pub use planner::*;
