//! Data source implementations

pub mod mariadb;

pub use mariadb::UpgradePriceDataSource;
