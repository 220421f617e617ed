//! Inbound body extraction
//!
//! Everything here runs before the backend is contacted: a body that cannot be
//! read the way the route declares ends the request with a local 400.

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::StatusCode,
};
use reqwest::multipart::{Form, Part};
use serde::de::IgnoredAny;

use super::error::{GatewayError, MalformedInput};
use super::forward::OutboundBody;
use super::route::BodyKind;

pub const FILE_FIELD: &str = "file";

pub async fn read_body(kind: BodyKind, req: Request) -> Result<OutboundBody, GatewayError> {
    match kind {
        BodyKind::None => Ok(OutboundBody::None),
        BodyKind::Json => read_json(req).await.map(OutboundBody::Json),
        BodyKind::Multipart => read_multipart(req).await.map(OutboundBody::Multipart),
        BodyKind::Raw => Ok(OutboundBody::Stream(reqwest::Body::wrap_stream(
            req.into_body().into_data_stream(),
        ))),
    }
}

/// Checks that the body is one well-formed JSON document and forwards it as
/// received. Empty bodies are rejected like any other invalid JSON.
pub async fn read_json(req: Request) -> Result<Bytes, GatewayError> {
    let bytes = Bytes::from_request(req, &()).await.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            GatewayError::PayloadTooLarge
        } else {
            MalformedInput::InvalidJson.into()
        }
    })?;

    serde_json::from_slice::<IgnoredAny>(&bytes).map_err(|_| MalformedInput::InvalidJson)?;

    Ok(bytes)
}

/// Rebuilds a multipart upload for the backend. The `file` part is required;
/// other text fields and extra file parts are carried along.
pub async fn read_multipart(req: Request) -> Result<Form, GatewayError> {
    let mut multipart = Multipart::from_request(req, &())
        .await
        .map_err(|_| MalformedInput::InvalidMultipart)?;

    let mut form = Form::new();
    let mut has_file = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);

        if name == FILE_FIELD || file_name.is_some() {
            let data = field.bytes().await.map_err(multipart_error)?;
            has_file |= name == FILE_FIELD;
            form = form.part(name, file_part(data, file_name, content_type.as_deref()));
        } else {
            let text = field.text().await.map_err(multipart_error)?;
            form = form.text(name, text);
        }
    }

    if !has_file {
        return Err(MalformedInput::NoFile.into());
    }

    Ok(form)
}

fn file_part(data: Bytes, file_name: Option<String>, content_type: Option<&str>) -> Part {
    let length = data.len() as u64;
    let build = |data: Bytes| {
        let part = Part::stream_with_length(data, length);
        match &file_name {
            Some(file_name) => part.file_name(file_name.clone()),
            None => part,
        }
    };

    // an unparseable declared type falls back to reqwest's default
    match content_type {
        Some(content_type) => build(data.clone())
            .mime_str(content_type)
            .unwrap_or_else(|_| build(data)),
        None => build(data),
    }
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> GatewayError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::PayloadTooLarge
    } else {
        MalformedInput::InvalidMultipart.into()
    }
}
