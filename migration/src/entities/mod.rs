pub mod add_to_cart_event;
pub mod hit;
pub mod link_tracker;
pub mod product;
pub mod review;
pub mod variant;
