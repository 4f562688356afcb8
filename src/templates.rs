use std::path::{Path, PathBuf};

use reqwest::multipart;
use serde_json::Value as JsonValue;
use url::Url;

use crate::filter::{filter_list, FilterSpec};
use crate::{Client, Error};

const COLLECTION: &str = "templates";

/// Payload for creating or updating a template. Only `code` is required;
/// unset fields are left out of the request entirely.
///
/// The remote API expects exactly one of `volume_id` or `image_id` and
/// enforces that itself, the client does not check it.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct TemplateParams {
    /// Unique, short, human readable code for the template.
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Bootable volume to base the template on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_id: Option<String>,
    /// Glance image or other template to base the template on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_username: Option<String>,
    /// Local path to a cloud-config script, uploaded as a multipart part
    /// rather than sent as a parameter.
    #[serde(skip)]
    pub cloud_config: Option<PathBuf>,
}

impl TemplateParams {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    pub fn id(mut self, value: impl Into<String>) -> Self {
        self.id = Some(value.into());
        self
    }

    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.name = Some(value.into());
        self
    }

    pub fn volume_id(mut self, value: impl Into<String>) -> Self {
        self.volume_id = Some(value.into());
        self
    }

    pub fn image_id(mut self, value: impl Into<String>) -> Self {
        self.image_id = Some(value.into());
        self
    }

    pub fn short_description(mut self, value: impl Into<String>) -> Self {
        self.short_description = Some(value.into());
        self
    }

    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into());
        self
    }

    pub fn default_username(mut self, value: impl Into<String>) -> Self {
        self.default_username = Some(value.into());
        self
    }

    pub fn cloud_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.cloud_config = Some(path.into());
        self
    }
}

fn cloud_config_form(path: &Path) -> Result<multipart::Form, Error> {
    let content = std::fs::read(path).map_err(|err| {
        tracing::error!("unable to read cloud config {:?}: {:?}", path, err);
        Error::CloudConfigUnreadable(err)
    })?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("cloud_config"));
    let part = multipart::Part::bytes(content).file_name(filename);
    Ok(multipart::Form::new().part("cloud_config", part))
}

/// Resource client for the template collection.
///
/// Every operation issues a single request and hands the JSON body back
/// verbatim, whatever the status code; callers inspect the response shape
/// to detect remote errors.
#[derive(Clone, Debug)]
pub struct Templates<'a> {
    client: &'a Client,
}

impl<'a> Templates<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn interpolate(&self, suffix: &str) -> String {
        let base = &self.client.url;
        if base.ends_with('/') {
            format!("{base}{COLLECTION}{suffix}")
        } else {
            format!("{base}/{COLLECTION}{suffix}")
        }
    }

    fn build_url(&self, suffix: &str) -> Result<Url, Error> {
        let raw = self.interpolate(suffix);
        Url::parse(&raw).map_err(|err| {
            tracing::error!("unable to build request url from {:?}: {:?}", raw, err);
            Error::UrlInvalid(err)
        })
    }

    fn payload_request(
        &self,
        req: reqwest::RequestBuilder,
        params: &TemplateParams,
    ) -> Result<reqwest::RequestBuilder, Error> {
        let req = req.query(params);
        match params.cloud_config {
            Some(ref path) => Ok(req.multipart(cloud_config_form(path)?)),
            None => Ok(req),
        }
    }

    async fn execute(&self, req: reqwest::RequestBuilder) -> Result<JsonValue, Error> {
        let res = req
            .headers(self.client.headers.clone())
            .send()
            .await
            .map_err(|err| {
                tracing::error!("unable to execute request: {:?}", err);
                Error::RequestFailed(err)
            })?;
        res.json().await.map_err(|err| {
            tracing::error!("unable to decode response body: {:?}", err);
            Error::ResponseInvalid(err)
        })
    }

    pub async fn create(&self, params: TemplateParams) -> Result<JsonValue, Error> {
        tracing::debug!("creating template {}", params.code);
        let url = self.build_url("")?;
        let req = self.payload_request(self.client.http.post(url), &params)?;
        self.execute(req).await
    }

    pub async fn list(&self, filter: Option<&FilterSpec>) -> Result<JsonValue, Error> {
        tracing::debug!("listing templates");
        let url = self.build_url("")?;
        let body = self.execute(self.client.http.get(url)).await?;
        Ok(match filter {
            Some(spec) => JsonValue::Array(filter_list(&body, spec)),
            None => body,
        })
    }

    pub async fn update(
        &self,
        template_id: &str,
        params: TemplateParams,
    ) -> Result<JsonValue, Error> {
        tracing::debug!("updating template {}", template_id);
        let url = self.build_url(&format!("/{template_id}"))?;
        let req = self.payload_request(self.client.http.put(url), &params)?;
        self.execute(req).await
    }

    pub async fn delete(&self, template_id: &str) -> Result<JsonValue, Error> {
        tracing::debug!("deleting template {}", template_id);
        let url = self.build_url(&format!("/{template_id}"))?;
        self.execute(self.client.http.delete(url)).await
    }
}
