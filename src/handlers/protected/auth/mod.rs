pub mod logout;

pub use logout::logout;
