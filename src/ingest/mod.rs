pub mod hasher;
pub mod images;
