pub mod item;
pub mod location;
pub mod transfer_line;
pub mod transfer_order;
