//! Database Models

pub mod serde_helpers;

pub mod link_code;
pub mod order;
pub mod product;
pub mod task;
pub mod user;

pub use link_code::LinkCode;
pub use order::{Order, OrderId, OrderItem};
pub use product::{DEFAULT_RATINGS, Product, ProductCreate, ProductId, ProductUpdate};
pub use task::{TaskCreate, TaskId, TaskRecord, TaskState};
pub use user::{DEFAULT_AVATAR, User, UserCreate, UserId, UserUpdate};
