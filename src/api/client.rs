use super::{
    io_msg::{HookContentInput, HookContentResult, UpdateHookInput, UpdateHookResult},
    Url,
};
use crate::{
    api::io_msg::HttpResult,
    common::{
        config::Settings,
        error::{errors, throw, WarnResult, Warning},
    },
};
use hyper::{header, Body, Client, Method, Request, Response};
use serde::Serialize;
use std::time::Duration;
use tracing::trace;

async fn run_request(req: Request<Body>) -> WarnResult<Response<Body>> {
    let client = Client::new();
    match client.request(req).await {
        Ok(result) => Ok(result),
        Err(err) => throw!(Warning::CommandFail(format!(
            "warn, client request\n{:indent$}",
            err,
            indent = 2
        ))),
    }
}

/// Send the request and read the whole response
async fn exchange(req: Request<Body>) -> WarnResult<HttpResult> {
    let mut resp = run_request(req).await?;
    let body_resp = resp.body_mut();
    if let Ok(resp_bytes) = hyper::body::to_bytes(body_resp).await {
        match serde_json::from_slice(&resp_bytes) {
            Ok(http_result) => Ok(http_result),
            Err(err) => {
                throw!(Warning::CommandFail(format!(
                    "parse HTTP response failed with err:\n{:indent$}",
                    err,
                    indent = 2
                )))
            }
        }
    } else {
        throw!(Warning::CommandFail(
            "hyper failed to read body bytes".to_string(),
        ))
    }
}

/// Post a json body to `target_uri`. The `timeout` bounds the whole
/// exchange, from the connection to the last byte of the response.
async fn build<T: Serialize>(
    not_serialized_body: T,
    target_uri: String,
    timeout: Duration,
) -> WarnResult<HttpResult> {
    trace!("command: {}", target_uri);
    let body = match serde_json::to_string(&not_serialized_body) {
        Ok(body) => body,
        Err(err) => throw!(Warning::CommandFail(format!(
            "unable to serialize request body: {err}"
        ))),
    };
    let req = Request::builder()
        .method(Method::POST)
        .uri(target_uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))?;
    match tokio::time::timeout(timeout, exchange(req)).await {
        Ok(result) => result,
        Err(_) => throw!(errors::WARN_INFO_TIMEOUT),
    }
}

/// Ask the agent at `target` for the content of a hook file. Return a
/// `Warning` if the connection failed, if the agent answered with an error,
/// or if it don't success after `settings.response_timeout` milliseconds.
///
/// Note: The warning should be managed by the direct parent function and
/// translated as an `Error` if needed
pub(crate) async fn post_hook_content(
    target: &Url,
    settings: &Settings,
    input: HookContentInput,
) -> WarnResult<HookContentResult> {
    trace!("read hook {} on {}", input.key, target);
    match build(
        input,
        target.endpoint("hook_content"),
        settings.get_response_timeout(),
    )
    .await
    {
        Ok(HttpResult::HookContent(result)) => Ok(result),
        Ok(HttpResult::Error(err_result)) => {
            throw!(Warning::BadResult(err_result))
        }
        Err(warn) => throw!(*warn),
        _ => throw!(Warning::WrongResult(
            "unexpected result on received 'hook_content' response",
        )),
    }
}

/// Push a hook content to the agent at `target`, which writes it on disk.
///
/// Note: The warning should be managed by the direct parent function and
/// translated as an `Error` if needed
pub(crate) async fn post_update_hook(
    target: &Url,
    settings: &Settings,
    input: UpdateHookInput,
) -> WarnResult<UpdateHookResult> {
    trace!("update hook {} on {}", input.key, target);
    match build(
        input,
        target.endpoint("update_hook"),
        settings.get_response_timeout(),
    )
    .await
    {
        Ok(HttpResult::UpdateHook(result)) => Ok(result),
        Ok(HttpResult::Error(err_result)) => {
            throw!(Warning::BadResult(err_result))
        }
        Err(warn) => throw!(*warn),
        _ => throw!(Warning::WrongResult(
            "unexpected result on received 'update_hook' response",
        )),
    }
}
