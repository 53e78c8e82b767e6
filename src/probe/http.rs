//! Website reachability via HTTP GET.

use std::time::{Duration, Instant};
use url::Url;

use crate::config::ProbeConfig;
use crate::health::{HealthResult, ProbeError};
use crate::registry::ConnectionId;

/// Issues HTTP requests for website connections.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    degraded_after: Option<Duration>,
}

impl HttpProbe {
    pub fn from_config(config: &ProbeConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            degraded_after: config.degraded_after(),
        })
    }

    /// GET `base_url` + `check_path`. 2xx and 3xx count as reachable.
    pub async fn check(
        &self,
        connection_id: ConnectionId,
        base_url: &str,
        check_path: Option<&str>,
    ) -> Result<HealthResult, ProbeError> {
        let url = target_url(base_url, check_path)?;
        let start = Instant::now();

        match self.client.get(url).send().await {
            Ok(response) => {
                let latency = start.elapsed();
                let status = response.status();
                if status.is_success() || status.is_redirection() {
                    Ok(HealthResult::reachable(connection_id, latency, self.degraded_after))
                } else {
                    Ok(HealthResult::offline(connection_id, format!("HTTP {}", status.as_u16())))
                }
            }
            Err(e) => Ok(HealthResult::offline(connection_id, e.to_string())),
        }
    }
}

/// Join a base URL and an optional check path.
pub fn target_url(base_url: &str, check_path: Option<&str>) -> Result<Url, ProbeError> {
    let raw = match check_path.filter(|p| !p.is_empty()) {
        Some(path) => format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        ),
        None => base_url.to_string(),
    };

    Url::parse(&raw).map_err(|e| ProbeError::InvalidTarget(format!("{}: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_url_joins_path() {
        let url = target_url("https://nas.lan/", Some("/api/ping")).unwrap();
        assert_eq!(url.as_str(), "https://nas.lan/api/ping");

        let url = target_url("https://nas.lan", Some("status")).unwrap();
        assert_eq!(url.as_str(), "https://nas.lan/status");

        let url = target_url("https://nas.lan/ui", Some("")).unwrap();
        assert_eq!(url.as_str(), "https://nas.lan/ui");
    }

    #[test]
    fn test_target_url_rejects_garbage() {
        assert!(matches!(target_url("not a url", None), Err(ProbeError::InvalidTarget(_))));
    }
}
