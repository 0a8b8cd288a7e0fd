//! Domain enums and request payloads

pub mod order;
pub mod product;
pub mod role;
pub mod user;

pub use order::{CreateOrderRequest, OrderLineInput, OrderStatus};
pub use product::ProductCategory;
pub use role::Role;
pub use user::{
    ForgotPasswordRequest, LinkQuery, LoginRequest, ResetPasswordRequest, SignupRequest,
};
