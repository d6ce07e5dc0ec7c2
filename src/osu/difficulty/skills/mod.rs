pub mod speed;
pub mod strain;
