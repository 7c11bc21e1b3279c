pub mod assignment;
pub mod catalog;
pub mod roster;
