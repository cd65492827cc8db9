pub mod delete;
pub mod dispatch;
pub mod list;
pub mod scan;
pub mod schema;
pub mod show;
