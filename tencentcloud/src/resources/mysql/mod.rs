//! TencentDB for MySQL resources

pub mod resource_dr_instance_to_mater;
pub mod resource_switch_proxy;

pub use resource_dr_instance_to_mater::DrInstanceToMaterResource;
pub use resource_switch_proxy::SwitchProxyResource;
