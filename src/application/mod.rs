mod error;
mod response;
mod service;

pub use error::*;
pub use response::*;
pub use service::*;
