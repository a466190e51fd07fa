use crate::server::ServerLaunch;
use crate::{Error, Result};
use reqwest::StatusCode;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::process::Child;
use tracing::{debug, info, warn};
use url::Host;

pub const CHECK_ALIVE_TIMEOUT: Duration = Duration::from_secs(120);
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const STOP_GRACE_PERIOD: Duration = Duration::from_secs(5);
const PING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    Dead,
    /// Nothing answered; worth retrying while the server boots.
    Unreachable,
}

/// Keeps a CoreNLP server reachable, launching it when configured to.
#[derive(Debug)]
pub struct RobustService {
    endpoint: String,
    host: Host,
    port: u16,
    http: reqwest::Client,
    launch: Option<ServerLaunch>,
    ignore_binding_error: bool,
    check_alive_timeout: Duration,
    child: Option<Child>,
    active: bool,
}

impl RobustService {
    pub fn new(
        endpoint: &url::Url,
        http: reqwest::Client,
        launch: Option<ServerLaunch>,
        ignore_binding_error: bool,
        check_alive_timeout: Duration,
    ) -> Result<Self> {
        let host = endpoint
            .host()
            .ok_or_else(|| Error::config(format!("Endpoint {} has no host", endpoint)))?
            .to_owned();
        let port = endpoint
            .port_or_known_default()
            .ok_or_else(|| Error::config(format!("Endpoint {} has no port", endpoint)))?;

        Ok(Self {
            endpoint: endpoint.as_str().trim_end_matches('/').to_string(),
            host,
            port,
            http,
            launch,
            ignore_binding_error,
            check_alive_timeout,
            child: None,
            active: false,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether this service spawned the server process it talks to.
    pub fn owns_process(&self) -> bool {
        self.child.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub async fn probe(&mut self) -> Liveness {
        if !self.ignore_binding_error {
            if let Some(child) = self.child.as_mut() {
                if let Ok(Some(status)) = child.try_wait() {
                    warn!("CoreNLP server process exited with {}", status);
                    return Liveness::Dead;
                }
            }
        }

        let url = format!("{}/ping", self.endpoint);
        match self.http.get(&url).timeout(PING_TIMEOUT).send().await {
            Ok(response) if response.status() == StatusCode::OK => Liveness::Alive,
            Ok(response) => {
                debug!("Ping returned {}", response.status());
                Liveness::Dead
            }
            Err(e) => {
                debug!("Ping failed: {}", e);
                Liveness::Unreachable
            }
        }
    }

    pub async fn ensure_alive(&mut self) -> Result<()> {
        if self.active {
            match self.probe().await {
                Liveness::Alive => return Ok(()),
                Liveness::Dead => self.stop().await?,
                Liveness::Unreachable => {}
            }
        }

        if self.child.is_none() {
            self.start().await?;
        }

        let started = Instant::now();
        loop {
            if self.probe().await == Liveness::Alive {
                break;
            }
            if started.elapsed() >= self.check_alive_timeout {
                return Err(Error::permanently_failed(
                    "Timed out waiting for service to come alive.",
                ));
            }
            debug!("Waiting for CoreNLP server at {}", self.endpoint);
            tokio::time::sleep(POLL_INTERVAL).await;
        }

        self.active = true;
        Ok(())
    }

    /// Spawns the server unless one is already listening on the port.
    pub async fn start(&mut self) -> Result<()> {
        let Some(launch) = self.launch.as_ref() else {
            return Ok(());
        };
        if self.child.is_some() {
            return Ok(());
        }

        match self.bind_port().await {
            Ok(listener) => drop(listener),
            Err(e) if self.ignore_binding_error => {
                info!(
                    "Port {} is busy ({}); using the server already running there",
                    self.port, e
                );
                return Ok(());
            }
            Err(_) => return Err(Error::PortInUse { port: self.port }),
        }

        info!("Starting CoreNLP server: {}", launch);
        self.child = Some(launch.command().spawn()?);
        Ok(())
    }

    /// Binds the endpoint's port to see whether it is free.
    async fn bind_port(&self) -> std::io::Result<TcpListener> {
        match &self.host {
            Host::Ipv4(ip) => TcpListener::bind((*ip, self.port)).await,
            Host::Ipv6(ip) => TcpListener::bind((*ip, self.port)).await,
            Host::Domain(name) => TcpListener::bind((name.as_str(), self.port)).await,
        }
    }

    pub async fn stop(&mut self) -> Result<()> {
        self.active = false;
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        if request_termination(&child) {
            match tokio::time::timeout(STOP_GRACE_PERIOD, child.wait()).await {
                Ok(status) => {
                    info!("CoreNLP server exited with {}", status?);
                    return Ok(());
                }
                Err(_) => warn!(
                    "CoreNLP server still running after {:?}; killing it",
                    STOP_GRACE_PERIOD
                ),
            }
        }

        child.kill().await?;
        info!("CoreNLP server killed");
        Ok(())
    }
}

#[cfg(unix)]
fn request_termination(child: &Child) -> bool {
    match child.id() {
        // SAFETY: kill(2) with a pid we spawned and still hold; no memory is shared.
        Some(pid) => unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) == 0 },
        None => false,
    }
}

#[cfg(not(unix))]
fn request_termination(_child: &Child) -> bool {
    false
}
