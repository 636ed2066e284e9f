pub mod customers;
pub mod system;

pub use customers::*;
pub use system::*;
