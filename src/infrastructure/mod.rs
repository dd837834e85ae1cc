pub mod cart_repo;
pub mod catalog_client;
pub mod coupon_client;
pub mod models;
pub mod remote;
