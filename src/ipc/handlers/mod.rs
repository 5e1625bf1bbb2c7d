pub mod core;
pub mod dashboard;
pub mod grades;
