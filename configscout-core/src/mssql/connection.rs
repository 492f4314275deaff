//! SQL Server session establishment.
//!
//! Builds the driver configuration from [`ConnectionParams`], opens the TCP
//! transport (through the SQL Browser for named instances) and performs the
//! login. A single routing redirect from the server is followed.

use super::MssqlClient;
use super::diagnostic::connection_error;
use crate::error::{ConnectStage, ConnectionError};
use crate::security::{AuthSelection, ConnectionParams, DEFAULT_PORT, ServerAddress};
use tiberius::{AuthMethod, Client, Config, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::TokioAsyncWriteCompatExt;
use tracing::debug;

/// Application name reported to the server in the login record.
const APPLICATION_NAME: &str = "configscout";

/// Builds the driver configuration for `params`.
pub(crate) fn build_config(
    params: &ConnectionParams,
    address: &ServerAddress,
) -> Result<Config, ConnectionError> {
    let mut config = Config::new();

    match address {
        ServerAddress::Host { host, port } => {
            config.host(host);
            config.port(port.unwrap_or(DEFAULT_PORT));
        }
        ServerAddress::Instance { host, instance } => {
            config.host(host);
            config.instance_name(instance);
        }
    }

    config.database(params.database.trim());
    config.application_name(APPLICATION_NAME);

    if params.trust_server_certificate {
        config.trust_cert();
    }

    config.authentication(auth_method(params.auth())?);

    Ok(config)
}

fn auth_method(auth: AuthSelection<'_>) -> Result<AuthMethod, ConnectionError> {
    match auth {
        AuthSelection::SqlServer(creds) => {
            Ok(AuthMethod::sql_server(creds.username(), creds.password()))
        }
        AuthSelection::Integrated => integrated_auth(),
    }
}

#[cfg(any(windows, feature = "integrated-auth-gssapi"))]
#[allow(clippy::unnecessary_wraps)]
fn integrated_auth() -> Result<AuthMethod, ConnectionError> {
    Ok(AuthMethod::Integrated)
}

#[cfg(not(any(windows, feature = "integrated-auth-gssapi")))]
fn integrated_auth() -> Result<AuthMethod, ConnectionError> {
    Err(ConnectionError::new(
        ConnectStage::DriverConnect,
        "integrated authentication is not available on this platform; \
         supply a username or build with the integrated-auth-gssapi feature",
    ))
}

/// Opens an authenticated client, bounded by the configured connect timeout.
pub(crate) async fn connect(params: &ConnectionParams) -> Result<MssqlClient, ConnectionError> {
    let address = params.address()?;
    let config = build_config(params, &address)?;
    let named = matches!(address, ServerAddress::Instance { .. });

    debug!("Opening SQL Server session to {}", address);

    tokio::time::timeout(params.connect_timeout, establish(config, named))
        .await
        .unwrap_or_else(|_| {
            Err(ConnectionError::new(
                ConnectStage::Timeout,
                format!(
                    "no session established within {}s",
                    params.connect_timeout.as_secs()
                ),
            ))
        })
}

async fn establish(config: Config, named: bool) -> Result<MssqlClient, ConnectionError> {
    let tcp = open_tcp(&config, named).await?;

    match Client::connect(config.clone(), tcp.compat_write()).await {
        Ok(client) => Ok(client),
        Err(tiberius::error::Error::Routing { host, port }) => {
            debug!("Server redirected the session to {}:{}", host, port);

            let mut redirected = config;
            redirected.host(&host);
            redirected.port(port);

            let tcp = open_tcp(&redirected, false).await?;
            Client::connect(redirected, tcp.compat_write())
                .await
                .map_err(|e| connection_error(ConnectStage::DriverConnect, &e))
        }
        Err(e) => Err(connection_error(ConnectStage::DriverConnect, &e)),
    }
}

async fn open_tcp(config: &Config, named: bool) -> Result<TcpStream, ConnectionError> {
    let tcp = if named {
        TcpStream::connect_named(config)
            .await
            .map_err(|e| connection_error(ConnectStage::TcpConnect, &e))?
    } else {
        TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| ConnectionError::new(ConnectStage::TcpConnect, e.to_string()))?
    };

    tcp.set_nodelay(true)
        .map_err(|e| ConnectionError::new(ConnectStage::TcpConnect, e.to_string()))?;

    Ok(tcp)
}
