pub mod cell;
pub mod messages;
pub mod shared;
pub mod view;
pub mod view_model;
