// Game modules

pub mod construction;
