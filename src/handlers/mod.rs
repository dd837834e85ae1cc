pub mod cart;
pub mod envelope;
