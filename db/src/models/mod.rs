pub mod attendance;
pub mod organization;
pub mod show;
pub mod user;

pub use attendance::Entity as Attendance;
pub use organization::Entity as Organization;
pub use show::Entity as Show;
pub use user::Entity as User;
