pub mod qr_request;
pub mod user;
