pub mod list;
pub mod print;
pub mod roll;
