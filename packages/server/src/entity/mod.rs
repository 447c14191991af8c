pub mod favorite;
pub mod like;
pub mod message;
pub mod product;
pub mod purchase;
pub mod review;
pub mod user;
