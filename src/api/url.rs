use serde::{Deserialize, Serialize};
use std::{
    fmt::Display,
    net::{IpAddr, SocketAddr as StdSocketAddr},
};
/// Address of a hook agent, `ip:port`
#[derive(Clone, Hash, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Url(String);

impl Url {
    pub fn endpoint(&self, path: &str) -> String {
        format!("http://{}/{}", self.0, path.trim_start_matches('/'))
    }
}

impl From<String> for Url {
    fn from(url: String) -> Self {
        Url(url)
    }
}

impl From<&String> for Url {
    fn from(url: &String) -> Self {
        Url(url.to_owned())
    }
}

impl Display for Url {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<StdSocketAddr> for Url {
    fn from(u: StdSocketAddr) -> Self {
        Self(u.to_string())
    }
}

impl From<IpAddr> for Url {
    fn from(u: IpAddr) -> Self {
        Self(u.to_string())
    }
}

impl From<&'static str> for Url {
    fn from(u: &'static str) -> Self {
        Self(u.to_string())
    }
}

#[cfg(test)]
#[test]
fn endpoint_builds_http_uri() {
    let url = Url::from("10.0.0.5:3000");
    assert_eq!(url.endpoint("/hook_content"), "http://10.0.0.5:3000/hook_content");
    assert_eq!(url.endpoint("update_hook"), "http://10.0.0.5:3000/update_hook");
}
