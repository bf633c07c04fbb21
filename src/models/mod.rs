mod order;
mod user;

pub use order::{parse_order_date, Order, OrderStatus};
pub use user::SessionUser;
