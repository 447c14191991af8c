pub mod auth;
pub mod favorite;
pub mod message;
pub mod product;
pub mod purchase;
pub mod review;
pub mod shared;
pub mod user;
