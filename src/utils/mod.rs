pub mod business_days;
pub mod profile_cache;
