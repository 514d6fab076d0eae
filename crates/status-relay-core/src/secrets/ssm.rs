//! AWS Systems Manager Parameter Store adapter.
//!
//! Fetches parameters with decryption enabled so SecureString parameters
//! (the GitHub token) come back as plain text. Errors from the SDK are
//! mapped onto the store-agnostic [`ParameterStoreError`] taxonomy.

use async_trait::async_trait;
use aws_sdk_ssm::error::SdkError;
use aws_sdk_ssm::operation::get_parameter::GetParameterError;
use tracing::{debug, error, instrument};

use crate::secrets::{ParameterStore, ParameterStoreError};

/// [`ParameterStore`] backed by AWS SSM Parameter Store.
#[derive(Clone)]
pub struct SsmParameterStore {
    client: aws_sdk_ssm::Client,
}

impl SsmParameterStore {
    /// Create a store from a configured SSM client.
    pub fn new(client: aws_sdk_ssm::Client) -> Self {
        Self { client }
    }
}

impl std::fmt::Debug for SsmParameterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsmParameterStore").finish()
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    #[instrument(skip(self))]
    async fn get_parameter(&self, name: &str) -> Result<String, ParameterStoreError> {
        debug!(parameter = %name, "Fetching parameter from SSM");

        let result = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await;

        match result {
            Ok(output) => output
                .parameter()
                .and_then(|parameter| parameter.value())
                .map(str::to_string)
                .ok_or_else(|| ParameterStoreError::Internal {
                    message: format!("parameter {} has no value", name),
                }),
            Err(sdk_error) => {
                error!(parameter = %name, error = %sdk_error, "SSM GetParameter failed");
                Err(map_sdk_error(name, &sdk_error))
            }
        }
    }
}

/// Map an SSM SDK failure to [`ParameterStoreError`].
///
/// `ParameterNotFound` is a modeled service error; access denial arrives as
/// an unmodeled error and is recognized by its error code text, the same way
/// the service's other adapters map SDK error strings.
fn map_sdk_error(name: &str, sdk_error: &SdkError<GetParameterError>) -> ParameterStoreError {
    if let Some(service_error) = sdk_error.as_service_error() {
        if service_error.is_parameter_not_found()
            || service_error.is_parameter_version_not_found()
        {
            return ParameterStoreError::ParameterNotFound {
                name: name.to_string(),
            };
        }
    }

    let message = sdk_error.to_string();
    if message.contains("AccessDenied") || message.contains("Unauthorized") {
        ParameterStoreError::AccessDenied {
            name: name.to_string(),
            reason: message,
        }
    } else if matches!(
        sdk_error,
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_)
    ) {
        ParameterStoreError::ServiceUnavailable { message }
    } else {
        ParameterStoreError::Internal { message }
    }
}
