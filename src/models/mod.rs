//! 数据模型模块

pub mod audit;
pub mod common;
pub mod movement;
pub mod order;
pub mod product;
pub mod supplier;
pub mod user;
pub mod warehouse;
