pub mod camera;
pub mod mediakit;
pub mod path;
pub mod response;
pub mod segment;
