pub mod requests;
pub mod response;

pub use requests::Request;
pub use response::ApiResponse;
