pub mod admin;
pub mod auth;
pub mod favorite;
pub mod files;
pub mod message;
pub mod product;
pub mod purchase;
pub mod review;
pub mod wallet;
