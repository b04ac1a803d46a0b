// handlers/public/auth/mod.rs - token acquisition endpoints

pub mod login;
pub mod refresh;
pub mod register;
pub mod utils;

pub use login::login;
pub use refresh::refresh;
pub use register::register;
