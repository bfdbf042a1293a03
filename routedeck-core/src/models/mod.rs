mod card;
mod route;

pub use card::*;
pub use route::*;
