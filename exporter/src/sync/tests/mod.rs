mod common;
mod service_tests;
mod store_tests;
