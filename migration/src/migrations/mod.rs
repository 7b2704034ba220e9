pub mod m202507150001_create_organizations;
pub mod m202507150002_create_users;
pub mod m202507150003_create_shows;
pub mod m202507150004_create_attendance;
