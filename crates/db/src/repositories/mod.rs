mod role_repo;
mod user_repo;

pub use role_repo::RoleRepo;
pub use user_repo::UserRepo;
