use super::io_msg::{HookContentInput, HttpErrorResult, HttpResult, UpdateHookInput};
use crate::{
    agent::HookAgent,
    common::error::{errors, throw, Error, ErrorResult, ServerError},
};
use hyper::server::conn::AddrStream;
use hyper::service::{make_service_fn, service_fn};
use hyper::{body::Bytes, header, Uri};
use hyper::{Body, Request, Response, Server};
use hyper::{Method, StatusCode};
use serde::Deserialize;
use std::{convert::Infallible, future::Future, net::SocketAddr};
use tracing::{error, trace, warn};

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to install CTRL+C signal handler: {}", err);
        std::future::pending::<()>().await
    }
}

async fn body_to_bytes(body: Body) -> Result<Bytes, ServerError> {
    match hyper::body::to_bytes(body).await {
        Ok(body) => Ok(body),
        Err(err) => Err(ServerError::CannotDeserializeBody(format!(
            "error while reading the body: {:?}",
            err
        ))),
    }
}

fn deserialize_body<'a, T: Deserialize<'a>>(body_bytes: &'a Bytes) -> Result<T, ServerError> {
    match serde_json::from_slice(body_bytes) {
        Ok(res) => Ok(res),
        Err(err) => Err(ServerError::CannotDeserializeBody(format!(
            "error while deserialization: {}",
            err
        ))),
    }
}

fn write_result(response: &mut Response<Body>, result: HttpResult) {
    *response.body_mut() = match serde_json::to_string(&result) {
        Ok(body) => body.into(),
        Err(err) => {
            error!("cannot serialize response: {}", err);
            errors::ERR_SERIALIZATION.clone().into()
        }
    };
}

async fn on_receive_hook_content(agent: &HookAgent, bytes: &Bytes, response: &mut Response<Body>) {
    let input: HookContentInput = match deserialize_body(bytes) {
        Ok(input) => input,
        Err(err) => return bad_request(response, err),
    };
    trace!("receive hook content request for {}", input.key);
    let res = match agent.read_hook(&input.key).await {
        Ok(res) => HttpResult::HookContent(res),
        Err(err) => {
            warn!("read hook {} failed: {}", input.key, err);
            HttpResult::Error(err.into())
        }
    };
    write_result(response, res)
}

async fn on_receive_update_hook(agent: &HookAgent, bytes: &Bytes, response: &mut Response<Body>) {
    let input: UpdateHookInput = match deserialize_body(bytes) {
        Ok(input) => input,
        Err(err) => return bad_request(response, err),
    };
    trace!("receive update hook request for {}", input.key);
    let key = input.key.clone();
    let res = match agent.write_hook(input).await {
        Ok(res) => HttpResult::UpdateHook(res),
        Err(err) => {
            warn!("update hook {} failed: {}", key, err);
            HttpResult::Error(err.into())
        }
    };
    write_result(response, res)
}

fn bad_request(response: &mut Response<Body>, err: ServerError) {
    warn!("bad request: {:?}", err);
    *response.status_mut() = StatusCode::BAD_REQUEST;
    let ServerError::CannotDeserializeBody(message) = err;
    write_result(
        response,
        HttpResult::Error(HttpErrorResult {
            err_id: errors::AGENT_BAD_REQUEST.to_string(),
            message,
        }),
    )
}

async fn dispatch_commands(
    body: Body,
    method: &Method,
    uri: &Uri,
    agent: &HookAgent,
) -> Result<Response<Body>, ServerError> {
    let mut response = Response::new(Body::empty());
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    let bytes = body_to_bytes(body).await?;
    match (method, uri.path()) {
        (&Method::POST, "/hook_content") => {
            on_receive_hook_content(agent, &bytes, &mut response).await
        }
        (&Method::POST, "/update_hook") => {
            on_receive_update_hook(agent, &bytes, &mut response).await
        }
        _ => {
            *response.status_mut() = StatusCode::NOT_FOUND;
        }
    };
    Ok(response)
}

fn manage_server_error(result: Result<Response<Body>, ServerError>) -> Response<Body> {
    match result {
        Ok(response) => response,
        Err(err) => {
            error!("Server error: {:?}", err);
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}

async fn service(req: Request<Body>, agent: HookAgent) -> Result<Response<Body>, hyper::Error> {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let body = req.into_body();
    let res = dispatch_commands(body, &method, &uri, &agent).await;
    Ok(manage_server_error(res))
}

/// Serve the agent api until CTRL+C
pub async fn new(agent: HookAgent) -> ErrorResult<()> {
    serve(agent, shutdown_signal()).await
}

/// Serve the agent api until `shutdown` resolves
pub async fn serve(agent: HookAgent, shutdown: impl Future<Output = ()>) -> ErrorResult<()> {
    let full_addr = &format!("{}:{}", agent.settings.addr, agent.settings.port);
    trace!("Startup agent server on {}", full_addr);
    let socket_addr: SocketAddr = match full_addr.parse() {
        Ok(addr) => addr,
        Err(err) => throw!(Error::CannotStartRpcServer(format!("{:?}", err))),
    };
    let builder = match Server::try_bind(&socket_addr) {
        Ok(builder) => builder,
        Err(err) => throw!(Error::CannotStartRpcServer(err.to_string())),
    };
    let service = make_service_fn(move |_conn: &AddrStream| {
        let agent_clone = agent.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                service(req, agent_clone.clone())
            }))
        }
    });

    let server = builder.serve(service);

    let graceful = server.with_graceful_shutdown(shutdown);
    if let Err(e) = graceful.await {
        error!("server error: {}", e);
    }
    Ok(())
}
