mod handler;
mod model;

pub use handler::{delete_me, read_me, register, update_me, update_password_me};
pub use model::{UpdatePassword, UserPublic, UserRegister};
