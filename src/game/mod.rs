pub mod collision;
pub mod formation;
pub mod models;
pub mod projectiles;
pub mod session;
pub mod wave;
