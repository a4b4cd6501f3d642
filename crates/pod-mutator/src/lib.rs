pub extern crate k8s_openapi;
pub extern crate kube;

pub mod admission_request;
pub mod admission_response;
pub mod cluster;
pub mod errors;
pub mod gvk;
pub mod handler;
pub mod mutation;
