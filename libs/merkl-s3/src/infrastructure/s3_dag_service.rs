//! S3 Node Store Implementation
//!
//! This module implements the `DagService` trait using AWS S3 as the backend.
//! It handles all S3 operations and converts AWS errors to domain errors.

use aws_sdk_s3::{primitives::ByteStream, Client};
use merkl_domain::{ports::DagService, AddError, Cid, Node};
use tracing::{debug, error, info, instrument, warn};

/// Prefix of every block object in the bucket
const BLOCK_PREFIX: &str = "blocks";

/// S3-based implementation of the DagService port
///
/// Each node is stored as one object holding its encoded bytes, keyed by its
/// identifier. Since keys are content-derived, re-adding a node overwrites it
/// with identical bytes.
///
/// ## Error Handling
///
/// Missing objects map to `AddError::NotFound`; every other AWS SDK error is
/// converted to `AddError::StorageFailure` with the failing key.
#[derive(Clone)]
pub struct S3DagService {
    client: Client,
    bucket: String,
}

impl S3DagService {
    /// Create a new S3 node store
    ///
    /// # Arguments
    ///
    /// * `client` - Configured AWS S3 client
    /// * `bucket` - Name of the S3 bucket to use
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use aws_sdk_s3::Client;
    /// use merkl_s3::S3DagService;
    ///
    /// # async fn example() {
    /// let config = aws_config::load_from_env().await;
    /// let s3_client = Client::new(&config);
    /// let store = S3DagService::new(s3_client, "my-bucket".to_string());
    /// # }
    /// ```
    pub fn new(client: Client, bucket: String) -> Self {
        info!(bucket = %bucket, "Initializing S3DagService");
        Self { client, bucket }
    }

    /// Create a store from the ambient AWS configuration
    ///
    /// Uses path-style addressing so MinIO endpoints work unchanged.
    pub async fn from_env(bucket: String) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
            .force_path_style(true)
            .build();
        Self::new(Client::from_conf(s3_config), bucket)
    }

    /// Get the bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Generate the S3 key for a node
    fn generate_key(cid: &Cid) -> String {
        format!("{}/{}", BLOCK_PREFIX, cid)
    }
}

impl DagService for S3DagService {
    #[instrument(skip(self, node), fields(cid = %node.cid(), size = node.encoded().len()))]
    fn add(&self, node: Node) -> impl std::future::Future<Output = Result<(), AddError>> + Send {
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let key = Self::generate_key(node.cid());
        let body = ByteStream::from(node.encoded().clone());

        async move {
            debug!(key = %key, bucket = %bucket, "Saving node to S3");

            match client
                .put_object()
                .bucket(&bucket)
                .key(&key)
                .body(body)
                .send()
                .await
            {
                Ok(_) => {
                    debug!(key = %key, "Saved node to S3");
                    Ok(())
                }
                Err(err) => {
                    error!(key = %key, error = ?err, "Failed to save node to S3");
                    Err(AddError::storage_failure(format!(
                        "S3 put_object failed for key '{}': {}",
                        key, err
                    )))
                }
            }
        }
    }

    #[instrument(skip(self), fields(cid = %cid))]
    fn get(&self, cid: &Cid) -> impl std::future::Future<Output = Result<Node, AddError>> + Send {
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let key = Self::generate_key(cid);
        let cid = cid.clone();

        async move {
            debug!(key = %key, bucket = %bucket, "Retrieving node from S3");

            let output = match client.get_object().bucket(&bucket).key(&key).send().await {
                Ok(output) => output,
                Err(err) => {
                    if err.as_service_error().is_some_and(|e| e.is_no_such_key()) {
                        debug!(key = %key, "Node does not exist in S3");
                        return Err(AddError::NotFound(cid));
                    }
                    warn!(key = %key, error = ?err, "Failed to retrieve node from S3");
                    return Err(AddError::storage_failure(format!(
                        "S3 get_object failed for key '{}': {}",
                        key, err
                    )));
                }
            };

            match output.body.collect().await {
                Ok(data) => {
                    let bytes = data.into_bytes();
                    debug!(key = %key, size = bytes.len(), "Retrieved node from S3");
                    Node::decode(cid, bytes)
                }
                Err(err) => {
                    error!(key = %key, error = ?err, "Failed to read S3 object body");
                    Err(AddError::storage_failure(format!(
                        "Failed to read S3 object body for key '{}': {}",
                        key, err
                    )))
                }
            }
        }
    }

    #[instrument(skip(self), fields(cid = %cid))]
    fn has(&self, cid: &Cid) -> impl std::future::Future<Output = Result<bool, AddError>> + Send {
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let key = Self::generate_key(cid);

        async move {
            debug!(key = %key, bucket = %bucket, "Checking if node exists in S3");

            match client.head_object().bucket(&bucket).key(&key).send().await {
                Ok(_) => Ok(true),
                Err(err) => {
                    if err.as_service_error().is_some_and(|e| e.is_not_found()) {
                        debug!(key = %key, "Node does not exist in S3");
                        Ok(false)
                    } else {
                        error!(key = %key, error = ?err, "Failed to check node existence in S3");
                        Err(AddError::storage_failure(format!(
                            "S3 head_object failed for key '{}': {}",
                            key, err
                        )))
                    }
                }
            }
        }
    }

    #[instrument(skip(self), fields(cid = %cid))]
    fn remove(&self, cid: &Cid) -> impl std::future::Future<Output = Result<(), AddError>> + Send {
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let key = Self::generate_key(cid);

        async move {
            debug!(key = %key, bucket = %bucket, "Deleting node from S3");

            match client
                .delete_object()
                .bucket(&bucket)
                .key(&key)
                .send()
                .await
            {
                Ok(_) => {
                    info!(key = %key, "Deleted node from S3");
                    Ok(())
                }
                Err(err) => {
                    error!(key = %key, error = ?err, "Failed to delete node from S3");
                    Err(AddError::storage_failure(format!(
                        "S3 delete_object failed for key '{}': {}",
                        key, err
                    )))
                }
            }
        }
    }
}
