// AWS SSM Parameter Store backend

use aws_config::{BehaviorVersion, Region};
use aws_sdk_ssm::error::{DisplayErrorContext, SdkError};
use aws_sdk_ssm::operation::delete_parameter::DeleteParameterError;
use aws_sdk_ssm::operation::get_parameter::GetParameterError;
use aws_sdk_ssm::operation::put_parameter::PutParameterError;
use aws_sdk_ssm::primitives::DateTime as SdkDateTime;
use aws_sdk_ssm::types::{Parameter as SdkParameter, ParameterType, ResourceTypeForTagging, Tag};
use aws_sdk_ssm::Client;
use chrono::{DateTime, Utc};
use tokio::runtime::Runtime;

use super::{Parameter, ParameterPage, ParameterStore, PutRequest, Tags};
use crate::error::Error;

#[derive(Debug, thiserror::Error)]
#[error("malformed response: {0}")]
struct MalformedResponse(&'static str);

/// Blocking adapter over the async SDK client. Each trait call is a single
/// request driven to completion on a private current-thread runtime.
pub struct SsmStore {
    client: Client,
    runtime: Runtime,
}

impl SsmStore {
    /// Load credentials and settings the usual AWS way (env, profile, IMDS),
    /// optionally pinning the region.
    pub fn connect(region: Option<&str>) -> Result<Self, Error> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        let sdk_config = runtime.block_on(loader.load());
        tracing::debug!(region = ?sdk_config.region(), "SSM client configured");

        Ok(Self {
            client: Client::new(&sdk_config),
            runtime,
        })
    }
}

fn fault<E, R>(operation: &'static str, err: SdkError<E, R>) -> Error
where
    SdkError<E, R>: std::error::Error + Send + Sync + 'static,
{
    Error::Store {
        operation,
        message: DisplayErrorContext(&err).to_string(),
        source: Box::new(err),
    }
}

fn put_failure<R>(name: &str, err: SdkError<PutParameterError, R>) -> Error
where
    SdkError<PutParameterError, R>: std::error::Error + Send + Sync + 'static,
{
    if err
        .as_service_error()
        .is_some_and(|e| e.is_parameter_already_exists())
    {
        Error::AlreadyExists(name.to_string())
    } else {
        fault("PutParameter", err)
    }
}

fn get_failure<R>(name: &str, err: SdkError<GetParameterError, R>) -> Error
where
    SdkError<GetParameterError, R>: std::error::Error + Send + Sync + 'static,
{
    if err.as_service_error().is_some_and(|e| e.is_parameter_not_found()) {
        Error::NotFound(name.to_string())
    } else {
        fault("GetParameter", err)
    }
}

fn delete_failure<R>(name: &str, err: SdkError<DeleteParameterError, R>) -> Error
where
    SdkError<DeleteParameterError, R>: std::error::Error + Send + Sync + 'static,
{
    if err.as_service_error().is_some_and(|e| e.is_parameter_not_found()) {
        Error::NotFound(name.to_string())
    } else {
        fault("DeleteParameter", err)
    }
}

fn to_chrono(date: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(date.secs(), date.subsec_nanos())
}

fn convert(parameter: &SdkParameter) -> Parameter {
    Parameter {
        name: parameter.name().unwrap_or_default().to_string(),
        value: parameter.value().unwrap_or_default().to_string(),
        kind: parameter
            .r#type()
            .map(|t| t.as_str().to_string())
            .unwrap_or_default(),
        version: u64::try_from(parameter.version()).unwrap_or_default(),
        last_modified: parameter.last_modified_date().and_then(to_chrono),
        description: None,
        tier: None,
    }
}

impl ParameterStore for SsmStore {
    fn put_parameter(&self, request: &PutRequest<'_>) -> Result<u64, Error> {
        let mut call = self
            .client
            .put_parameter()
            .name(request.name)
            .value(request.value)
            .r#type(ParameterType::SecureString)
            .overwrite(request.overwrite);
        if let Some(key_id) = request.key_id {
            call = call.key_id(key_id);
        }

        match self.runtime.block_on(call.send()) {
            Ok(output) => Ok(u64::try_from(output.version()).unwrap_or_default()),
            Err(err) => Err(put_failure(request.name, err)),
        }
    }

    fn get_parameter(&self, name: &str, with_decryption: bool) -> Result<Parameter, Error> {
        let call = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(with_decryption);

        match self.runtime.block_on(call.send()) {
            Ok(output) => output.parameter().map(convert).ok_or_else(|| {
                Error::store("GetParameter", MalformedResponse("missing parameter"))
            }),
            Err(err) => Err(get_failure(name, err)),
        }
    }

    fn get_parameters_by_path(
        &self,
        path: &str,
        recursive: bool,
        with_decryption: bool,
        next_token: Option<&str>,
    ) -> Result<ParameterPage, Error> {
        let call = self
            .client
            .get_parameters_by_path()
            .path(path)
            .recursive(recursive)
            .with_decryption(with_decryption)
            .set_next_token(next_token.map(str::to_string));

        let output = self
            .runtime
            .block_on(call.send())
            .map_err(|e| fault("GetParametersByPath", e))?;

        Ok(ParameterPage {
            parameters: output.parameters().iter().map(convert).collect(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    fn delete_parameter(&self, name: &str) -> Result<(), Error> {
        let call = self.client.delete_parameter().name(name);

        match self.runtime.block_on(call.send()) {
            Ok(_) => Ok(()),
            Err(err) => Err(delete_failure(name, err)),
        }
    }

    fn add_tags(&self, name: &str, tags: &Tags) -> Result<(), Error> {
        let sdk_tags = tags
            .iter()
            .map(|(key, value)| Tag::builder().key(key).value(value).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| Error::store("AddTagsToResource", e))?;

        let call = self
            .client
            .add_tags_to_resource()
            .resource_type(ResourceTypeForTagging::Parameter)
            .resource_id(name)
            .set_tags(Some(sdk_tags));

        self.runtime
            .block_on(call.send())
            .map_err(|e| fault("AddTagsToResource", e))?;
        Ok(())
    }

    fn list_tags(&self, name: &str) -> Result<Tags, Error> {
        let call = self
            .client
            .list_tags_for_resource()
            .resource_type(ResourceTypeForTagging::Parameter)
            .resource_id(name);

        let output = self
            .runtime
            .block_on(call.send())
            .map_err(|e| fault("ListTagsForResource", e))?;

        Ok(output
            .tag_list()
            .iter()
            .map(|tag| (tag.key().to_string(), tag.value().to_string()))
            .collect())
    }
}
