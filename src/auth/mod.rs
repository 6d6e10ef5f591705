mod log_in;
mod log_out;
mod middleware;
mod password;
mod register;
pub(crate) mod token;

pub use log_in::{AuthResponse, LogInData, log_in};
pub use log_out::log_out;
pub use middleware::{AuthState, Session, auth_guard};
pub use password::{PasswordHash, ValidatedPassword};
pub use register::{RegisterForm, register_user};
pub use token::{create_token_table, delete_expired_tokens};
