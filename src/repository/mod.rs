pub mod qr_repository;
