//! Wire data model for the SIWF protocol
//!
//! Field names follow the Gateway and SIWF wire contracts exactly; Rust
//! naming is mapped through serde renames.

pub mod credential;
pub mod payload;
pub mod request;
pub mod response;

pub use credential::*;
pub use payload::*;
pub use request::*;
pub use response::*;
