pub mod progress_db;
