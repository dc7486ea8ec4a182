pub mod dao;
pub mod entities;
