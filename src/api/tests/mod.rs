use super::{
    client,
    gateway::HttpHookGateway,
    io_msg::{HookContentInput, UpdateHookInput},
    server, Url,
};
use crate::{
    agent::HookAgent,
    audit::TracingAuditReporter,
    command::UpdateHookParameters,
    common::{
        checksum,
        config::Settings,
        error::{errors, Error, Warning},
        interfaces::{HookGateway, HookStore},
    },
    manager::HookManager,
    model::{ClusterId, Hook, HookContent, HookStage, HookStatus, Server, ServerId, ServerStatus},
    store::{InMemoryHookStore, InMemoryServerDirectory},
};
use hyper::{Body, Client, Method, Request, StatusCode};
use std::{path::Path, sync::Arc, time::Duration};
use tempfile::TempDir;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::oneshot,
    time::Instant,
};

/// Run an agent on `port` serving `root` until the returned sender is
/// dropped or used.
async fn start_agent(port: &str, root: &Path) -> (Settings, oneshot::Sender<()>) {
    let settings = Settings {
        port: port.to_string(),
        hooks_dir: root.display().to_string(),
        ..Default::default()
    };
    let agent = HookAgent::new_with_settings(settings.clone());
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        server::serve(agent, async move {
            let _ = rx.await;
        })
        .await
        .unwrap();
    });
    tokio::time::sleep(Duration::from_millis(200)).await;
    (settings, tx)
}

/// Peer answering every request with headers and the first byte of a body
/// that never ends.
async fn start_stalled_agent() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\n{")
                    .await;
                tokio::time::sleep(Duration::from_secs(30)).await;
            });
        }
    });
    addr.into()
}

fn agent_server(cluster_id: ClusterId, settings: &Settings) -> Server {
    Server {
        id: ServerId::new(),
        name: format!("agent-{}", settings.port),
        cluster_id,
        host: format!("{}:{}", settings.addr, settings.port).into(),
        status: ServerStatus::Up,
    }
}

fn hook(cluster_id: ClusterId, content: &str) -> Hook {
    Hook::new(
        cluster_id,
        "add-brick",
        HookStage::Pre,
        "S28Quota-enable-root-xattr-heal.sh",
        HookContent::Text(content.to_string()),
    )
}

#[tokio::test]
#[serial_test::serial]
async fn client_reads_and_writes_hooks() {
    let dir = TempDir::new().unwrap();
    let (settings, _stop) = start_agent("3101", dir.path()).await;
    let target: Url = format!("{}:{}", settings.addr, settings.port).into();
    let hook = hook(ClusterId::new(), "#!/bin/bash\nexit 0\n");

    let content = HookContent::Text("#!/bin/bash\necho quota\n".to_string());
    let written = client::post_update_hook(
        &target,
        &settings,
        UpdateHookInput {
            key: hook.key(),
            content: content.clone(),
            checksum: checksum::of(&content),
        },
    )
    .await
    .unwrap();
    assert_eq!(written.checksum, checksum::of(&content));
    let on_disk = std::fs::read(dir.path().join(hook.key().relative_path())).unwrap();
    assert_eq!(on_disk, content.as_bytes());

    let read = client::post_hook_content(&target, &settings, HookContentInput { key: hook.key() })
        .await
        .unwrap();
    assert_eq!(read.content, content);
    assert_eq!(read.checksum, written.checksum);
}

#[tokio::test]
#[serial_test::serial]
async fn agent_errors_reach_the_client() {
    let dir = TempDir::new().unwrap();
    let (settings, _stop) = start_agent("3102", dir.path()).await;
    let target: Url = format!("{}:{}", settings.addr, settings.port).into();
    let mut key = hook(ClusterId::new(), "").key();

    match *client::post_hook_content(&target, &settings, HookContentInput { key: key.clone() })
        .await
        .unwrap_err()
    {
        Warning::BadResult(err) => assert_eq!(err.err_id, errors::GLUSTER_HOOK_NOT_FOUND),
        other => panic!("unexpected warning {other}"),
    }

    let content = HookContent::Text("echo".to_string());
    match *client::post_update_hook(
        &target,
        &settings,
        UpdateHookInput {
            key: key.clone(),
            content,
            checksum: "d41d8cd98f00b204e9800998ecf8427e".to_string(),
        },
    )
    .await
    .unwrap_err()
    {
        Warning::BadResult(err) => {
            assert_eq!(err.err_id, errors::GLUSTER_HOOK_CHECKSUM_MISMATCH)
        }
        other => panic!("unexpected warning {other}"),
    }

    key.name = "../../etc/passwd".to_string();
    match *client::post_hook_content(&target, &settings, HookContentInput { key })
        .await
        .unwrap_err()
    {
        Warning::BadResult(err) => assert_eq!(err.err_id, errors::GLUSTER_HOOK_INVALID_KEY),
        other => panic!("unexpected warning {other}"),
    }
}

#[tokio::test]
#[serial_test::serial]
async fn agent_rejects_unknown_requests() {
    let dir = TempDir::new().unwrap();
    let (settings, _stop) = start_agent("3103", dir.path()).await;
    let client = Client::new();

    let req = Request::builder()
        .method(Method::POST)
        .uri(format!("http://{}:{}/update_hook", settings.addr, settings.port))
        .body(Body::from("{\"not\": \"a hook\"}"))
        .unwrap();
    let res = client.request(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = hyper::body::to_bytes(res.into_body()).await.unwrap();
    assert!(String::from_utf8_lossy(&body).contains(errors::AGENT_BAD_REQUEST));

    let req = Request::builder()
        .method(Method::POST)
        .uri(format!("http://{}:{}/request_vote", settings.addr, settings.port))
        .body(Body::empty())
        .unwrap();
    let res = client.request(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial_test::serial]
async fn gateway_applies_then_fetches() {
    let (dir1, dir2) = (TempDir::new().unwrap(), TempDir::new().unwrap());
    let (settings1, _stop1) = start_agent("3104", dir1.path()).await;
    let (settings2, _stop2) = start_agent("3105", dir2.path()).await;
    let cluster_id = ClusterId::new();
    let (server1, server2) = (
        agent_server(cluster_id, &settings1),
        agent_server(cluster_id, &settings2),
    );
    let directory = Arc::new(InMemoryServerDirectory::new());
    directory.insert(server1.clone()).await;
    directory.insert(server2.clone()).await;
    let gateway = HttpHookGateway::new(Settings::default(), directory);

    let hook = hook(cluster_id, "");
    let content = HookContent::Binary(vec![0x7f, b'E', b'L', b'F', 0, 0xff]);
    gateway
        .apply_hook(&hook, &content, &[server1.id, server2.id])
        .await
        .unwrap();
    for dir in [&dir1, &dir2] {
        let on_disk = std::fs::read(dir.path().join(hook.key().relative_path())).unwrap();
        assert_eq!(on_disk, content.as_bytes());
    }
    assert_eq!(
        gateway.fetch_hook_content(&hook, server2.id).await.unwrap(),
        content
    );
}

#[tokio::test]
#[serial_test::serial]
async fn gateway_reports_unreachable_and_unknown_servers() {
    let dir = TempDir::new().unwrap();
    let (settings, _stop) = start_agent("3106", dir.path()).await;
    let cluster_id = ClusterId::new();
    let reachable = agent_server(cluster_id, &settings);
    let unreachable = Server {
        host: "127.0.0.1:1".into(),
        ..agent_server(cluster_id, &settings)
    };
    let directory = Arc::new(InMemoryServerDirectory::new());
    directory.insert(reachable.clone()).await;
    directory.insert(unreachable.clone()).await;
    let gateway = HttpHookGateway::new(Settings::default(), directory);
    let hook = hook(cluster_id, "exit 0");

    let err = gateway
        .fetch_hook_content(&hook, ServerId::new())
        .await
        .unwrap_err();
    assert_eq!(err.code, errors::SERVER_NOT_FOUND);

    let err = gateway
        .fetch_hook_content(&hook, unreachable.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, errors::AGENT_NETWORK_ERROR);

    // One failing server keeps its own code, the others are still written
    let err = gateway
        .apply_hook(&hook, &hook.content, &[reachable.id, unreachable.id])
        .await
        .unwrap_err();
    assert_eq!(err.code, errors::AGENT_NETWORK_ERROR);
    assert!(dir.path().join(hook.key().relative_path()).exists());

    let err = gateway
        .apply_hook(
            &hook,
            &hook.content,
            &[unreachable.id, ServerId::new(), reachable.id],
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, errors::GLUSTER_HOOK_UPDATE_FAILED);
}

#[tokio::test]
#[serial_test::serial]
async fn manager_resolves_a_conflict_across_agents() {
    let (dir1, dir2) = (TempDir::new().unwrap(), TempDir::new().unwrap());
    let (settings1, _stop1) = start_agent("3107", dir1.path()).await;
    let (settings2, _stop2) = start_agent("3108", dir2.path()).await;
    let cluster_id = ClusterId::new();
    let (server1, server2) = (
        agent_server(cluster_id, &settings1),
        agent_server(cluster_id, &settings2),
    );

    // gfs2 runs a locally edited copy
    let mut hook = hook(cluster_id, "#!/bin/sh\nexit 0\n");
    let custom = "#!/bin/sh\nlogger quota\nexit 0\n";
    let custom_path = dir2.path().join(hook.key().relative_path());
    std::fs::create_dir_all(custom_path.parent().unwrap()).unwrap();
    std::fs::write(&custom_path, custom).unwrap();
    hook.observe(server1.id, None);
    hook.observe(
        server2.id,
        Some((HookStatus::Enabled, checksum::of_bytes(custom.as_bytes()))),
    );
    assert!(hook.is_in_conflict());

    let store = Arc::new(InMemoryHookStore::new());
    store.insert(hook.clone()).await;
    let directory = Arc::new(InMemoryServerDirectory::new());
    directory.insert(server1.clone()).await;
    directory.insert(server2.clone()).await;
    let gateway = Arc::new(HttpHookGateway::new(Settings::default(), directory.clone()));
    let manager = HookManager::new_with_settings(
        Settings::default(),
        store.clone(),
        directory,
        gateway,
        Arc::new(TracingAuditReporter),
    );

    let res = manager
        .update_hook(UpdateHookParameters::from_server(hook.id, server2.id))
        .await
        .unwrap();
    assert!(res.succeeded);
    let on_disk = std::fs::read(dir1.path().join(hook.key().relative_path())).unwrap();
    assert_eq!(on_disk, custom.as_bytes());
    let stored = store.get(hook.id).await.unwrap().unwrap();
    assert_eq!(stored.content, HookContent::Text(custom.to_string()));
    assert!(!stored.is_in_conflict());

    // A missing source copy fails the command and keeps the conflict
    std::fs::remove_file(&custom_path).unwrap();
    let mut conflicting = stored.clone();
    conflicting.observe(server1.id, Some((HookStatus::Enabled, "0".repeat(32))));
    store.insert(conflicting).await;
    let err = manager
        .update_hook(UpdateHookParameters::from_server(hook.id, server2.id))
        .await
        .unwrap_err();
    match *err {
        Error::Remote(err) => assert_eq!(err.code, errors::GLUSTER_HOOK_NOT_FOUND),
        other => panic!("unexpected error {other}"),
    }
    assert!(store.get(hook.id).await.unwrap().unwrap().is_in_conflict());
}

#[tokio::test]
async fn client_times_out_on_stalled_body() {
    let target = start_stalled_agent().await;
    let settings = Settings {
        response_timeout: 200,
        ..Default::default()
    };
    let key = hook(ClusterId::new(), "").key();

    let start = Instant::now();
    let res = tokio::time::timeout(
        Duration::from_secs(3),
        client::post_hook_content(&target, &settings, HookContentInput { key }),
    )
    .await
    .expect("request should end with the response timeout");
    assert!(start.elapsed() < Duration::from_secs(2));
    match *res.unwrap_err() {
        Warning::Timeout(_) => {}
        other => panic!("unexpected warning {other}"),
    }
}

#[tokio::test]
async fn gateway_reports_stalled_agents_as_network_errors() {
    let stalled = start_stalled_agent().await;
    let cluster_id = ClusterId::new();
    let server = Server {
        id: ServerId::new(),
        name: "gfs-stalled".to_string(),
        cluster_id,
        host: stalled,
        status: ServerStatus::Up,
    };
    let directory = Arc::new(InMemoryServerDirectory::new());
    directory.insert(server.clone()).await;
    let settings = Settings {
        response_timeout: 200,
        ..Default::default()
    };
    let gateway = HttpHookGateway::new(settings, directory);
    let hook = hook(cluster_id, "exit 0");

    let start = Instant::now();
    let err = tokio::time::timeout(
        Duration::from_secs(3),
        gateway.fetch_hook_content(&hook, server.id),
    )
    .await
    .expect("fetch should end with the response timeout")
    .unwrap_err();
    assert_eq!(err.code, errors::AGENT_NETWORK_ERROR);

    let err = tokio::time::timeout(
        Duration::from_secs(3),
        gateway.apply_hook(&hook, &hook.content, &[server.id]),
    )
    .await
    .expect("apply should end with the response timeout")
    .unwrap_err();
    assert_eq!(err.code, errors::AGENT_NETWORK_ERROR);
    assert!(start.elapsed() < Duration::from_secs(3));
}
