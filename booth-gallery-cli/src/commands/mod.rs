pub mod backfill;
pub mod capture;
pub mod options;
pub mod render;
