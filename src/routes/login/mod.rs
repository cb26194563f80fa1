mod handler;
mod model;

pub use handler::{login_access_token, test_token};
pub use model::{LoginForm, Token};
