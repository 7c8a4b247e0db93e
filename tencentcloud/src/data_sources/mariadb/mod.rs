//! TencentDB for MariaDB data sources

pub mod data_source_upgrade_price;

pub use data_source_upgrade_price::UpgradePriceDataSource;
