pub mod config;

pub use config::{ChainConfig, Epoch, MAINNET_CONFIG, Slot};
