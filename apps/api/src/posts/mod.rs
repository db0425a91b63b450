// Saved posts: owner-scoped storage and the HTTP handlers over it.

pub mod handlers;
pub mod store;
