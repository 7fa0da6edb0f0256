// Session module - token lifecycle and authenticated transport

pub mod manager;
pub mod models;
pub mod transport;


pub use manager::SessionManager;
pub use models::{Session, SignUpRequest, UserInfo};
pub use transport::{HttpTransport, ReqwestTransport, TransportRequest, TransportResponse};
