pub mod console;
pub mod ticker;
