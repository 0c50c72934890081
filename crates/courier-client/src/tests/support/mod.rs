//! Harness shared by transport unit tests and behaviour scenarios.

mod fake_server;

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use courier_config::{Config, LogFormat, ServerEndpoint};
use courier_pipeline::{InMemoryCookieStore, InMemorySessionStore, standard_providers};
use courier_protocol::{Command, default_registry};
use rstest::fixture;

use crate::{ClientError, TransportClient};

pub(crate) use fake_server::{FakeServer, Reply, closed_port};

/// State carried between behaviour steps.
#[derive(Default)]
pub(crate) struct TestWorld {
    pub server: Option<FakeServer>,
    pub sessions: Arc<InMemorySessionStore>,
    pub cookies: Arc<InMemoryCookieStore>,
    pub endpoint: Option<ServerEndpoint>,
    pub reply: Option<Result<Box<dyn Command>, ClientError>>,
    pub requests: Vec<String>,
}

impl TestWorld {
    pub(crate) fn start_server(&mut self, reply: Reply) -> Result<()> {
        let server = FakeServer::spawn(reply)?;
        self.endpoint = Some(ServerEndpoint::tcp("127.0.0.1", server.port()));
        self.server = Some(server);
        Ok(())
    }

    pub(crate) fn client(&self) -> Result<TransportClient> {
        let endpoint = self
            .endpoint
            .clone()
            .context("no server endpoint configured")?;
        let config = Config {
            server_endpoint: endpoint,
            connect_timeout_secs: 2,
            request_timeout_secs: 2,
            ..Config::default()
        };
        let registry = Arc::new(default_registry().context("default registry")?);
        let providers = standard_providers(self.sessions.clone(), self.cookies.clone());
        TransportClient::connect(&config, registry, &providers).context("build client")
    }

    pub(crate) fn send(&mut self, command: &dyn Command) -> Result<()> {
        let client = self.client()?;
        self.reply = Some(client.send(command));
        if let Some(server) = self.server.as_mut() {
            self.requests = server.take_requests()?;
        }
        Ok(())
    }

    pub(crate) fn reply(&self) -> Result<&dyn Command> {
        match self.reply.as_ref() {
            Some(Ok(command)) => Ok(command.as_ref()),
            Some(Err(error)) => Err(anyhow!("send failed: {error}")),
            None => Err(anyhow!("nothing was sent")),
        }
    }

    pub(crate) fn error(&self) -> Result<&ClientError> {
        match self.reply.as_ref() {
            Some(Err(error)) => Ok(error),
            Some(Ok(command)) => Err(anyhow!("send unexpectedly succeeded with {command:?}")),
            None => Err(anyhow!("nothing was sent")),
        }
    }
}

#[fixture]
pub(crate) fn world() -> std::cell::RefCell<TestWorld> {
    let config = Config {
        log_format: LogFormat::Compact,
        ..Config::default()
    };
    courier_runtime::telemetry::initialise(&config).expect("telemetry installs");
    std::cell::RefCell::new(TestWorld::default())
}
