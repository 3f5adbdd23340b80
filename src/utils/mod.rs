pub mod cmd;
pub mod md;
