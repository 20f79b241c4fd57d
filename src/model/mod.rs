pub mod attendance;
pub mod availability;
pub mod employee;
pub mod interview;
pub mod pto;
pub mod role;
pub mod user;
