mod category;
mod product;
mod user;

pub use category::*;
pub use product::*;
pub use user::*;
