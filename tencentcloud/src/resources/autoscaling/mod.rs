//! Auto Scaling resources

pub mod resource_execute_scaling_policy;

pub use resource_execute_scaling_policy::ExecuteScalingPolicyResource;
