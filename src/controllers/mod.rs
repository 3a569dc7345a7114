pub mod audio;
pub mod health;
pub mod history;
pub mod speech;
