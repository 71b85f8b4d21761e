// Authentication module
// Login with JWT issuance, role-gated user administration

pub mod error;
pub mod handlers;
pub mod memory;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod seed;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use memory::InMemoryUserStore;
pub use middleware::{require_admin, AuthenticatedUser, RequireRole};
pub use models::{AuthResponse, CreateUserRequest, LoginRequest, MeResponse, Role, User, UserResponse};
pub use password::{PasswordPolicy, PasswordService};
pub use repository::{PgUserStore, UserStore};
pub use service::AuthService;
pub use token::{Claims, TokenService};
