//! Infrastructure adapters

mod s3_dag_service;

pub use s3_dag_service::S3DagService;
