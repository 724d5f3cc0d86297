pub mod models;
pub mod paypal;
pub mod store;
pub mod supabase;
