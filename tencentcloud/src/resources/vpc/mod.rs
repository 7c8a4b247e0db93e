//! VPC resources

pub mod resource_local_gateway;

pub use resource_local_gateway::LocalGatewayResource;
