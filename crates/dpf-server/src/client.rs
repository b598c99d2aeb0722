//! Client side: a connection to a server and models backed by it.

use std::io::BufReader;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use dpf_mesh::MeshedRegion;
use dpf_model::{Model, ModelResult, ResultSource};
use dpf_results::{EvalRequest, FieldsContainer, ResultInfo, TimeFreqSupport};
use tracing::{debug, info};

use crate::address::ServerAddress;
use crate::protocol::{Handle, Request, Response, read_message, write_message};
use crate::version::{MIN_SERVER_VERSION, SERVER_VERSION, meets_version};
use crate::{ServerError, ServerResult};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

struct Channel {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

/// A live connection to a server. Requests from several threads are
/// serialized over the one stream.
pub struct ServerConnection {
    address: ServerAddress,
    server_version: String,
    channel: Mutex<Channel>,
}

impl ServerConnection {
    /// Connect and check that the server is recent enough.
    pub fn connect(address: &ServerAddress) -> ServerResult<Arc<Self>> {
        let stream = open_stream(address)?;
        let reader = BufReader::new(stream.try_clone()?);
        let mut connection = Self {
            address: address.clone(),
            server_version: String::new(),
            channel: Mutex::new(Channel {
                reader,
                writer: stream,
            }),
        };
        let hello = connection.request(&Request::Hello {
            client_version: SERVER_VERSION.to_string(),
        })?;
        let server_version = match hello {
            Response::Hello { server_version } => server_version,
            other => return Err(ServerError::UnexpectedResponse(other.name().to_string())),
        };
        if !meets_version(&server_version, MIN_SERVER_VERSION)? {
            return Err(ServerError::IncompatibleVersion {
                server: server_version,
                required: MIN_SERVER_VERSION.to_string(),
            });
        }
        info!(%address, %server_version, "connected to server");
        connection.server_version = server_version;
        Ok(Arc::new(connection))
    }

    /// Connect to the address given by `DPF_IP` and `DPF_PORT`.
    pub fn connect_from_env() -> ServerResult<Arc<Self>> {
        Self::connect(&ServerAddress::from_env()?)
    }

    pub fn address(&self) -> &ServerAddress {
        &self.address
    }

    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    /// True when the server is at least `version`.
    pub fn meets_version(&self, version: &str) -> ServerResult<bool> {
        meets_version(&self.server_version, version)
    }

    /// Send one request and wait for its response. Error responses become
    /// [`ServerError::Remote`].
    pub fn request(&self, request: &Request) -> ServerResult<Response> {
        let mut channel = self.channel.lock().unwrap_or_else(PoisonError::into_inner);
        write_message(&mut channel.writer, request)?;
        match read_message::<Response>(&mut channel.reader)? {
            Some(Response::Error { kind, message }) => Err(ServerError::Remote { kind, message }),
            Some(response) => Ok(response),
            None => Err(ServerError::ConnectionClosed),
        }
    }

    /// Open a result file on the server. The path is resolved by the server.
    pub fn open_model(self: &Arc<Self>, path: impl AsRef<Path>) -> ServerResult<Model> {
        let path = path.as_ref().display().to_string();
        let response = self.request(&Request::Open { path: path.clone() })?;
        let handle = match response {
            Response::Opened { handle } => handle,
            other => return Err(ServerError::UnexpectedResponse(other.name().to_string())),
        };
        debug!(%path, %handle, "opened remote model");
        let source = RemoteSource {
            connection: self.clone(),
            handle,
            path,
        };
        Ok(Model::with_source(Arc::new(source))?)
    }

    /// Ask the server to stop accepting clients.
    pub fn shutdown_server(&self) -> ServerResult<()> {
        expect_ack(self.request(&Request::Shutdown)?)
    }
}

fn open_stream(address: &ServerAddress) -> ServerResult<TcpStream> {
    let mut last_error = None;
    for addr in (address.ip.as_str(), address.port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
            Ok(stream) => {
                stream.set_nodelay(true)?;
                return Ok(stream);
            }
            Err(err) => last_error = Some(err),
        }
    }
    Err(match last_error {
        Some(err) => err.into(),
        None => ServerError::InvalidAddress(format!("`{address}` did not resolve")),
    })
}

fn expect_ack(response: Response) -> ServerResult<()> {
    match response {
        Response::Ack => Ok(()),
        other => Err(ServerError::UnexpectedResponse(other.name().to_string())),
    }
}

/// A result file held open by a server.
pub struct RemoteSource {
    connection: Arc<ServerConnection>,
    handle: Handle,
    path: String,
}

impl RemoteSource {
    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl ResultSource for RemoteSource {
    fn source_label(&self) -> String {
        format!("dpf://{}/{}", self.connection.address(), self.path)
    }

    fn result_info(&self) -> ModelResult<ResultInfo> {
        let response = self.connection.request(&Request::ResultInfo {
            handle: self.handle.clone(),
        })?;
        match response {
            Response::ResultInfo { info } => Ok(info),
            other => Err(ServerError::UnexpectedResponse(other.name().to_string()).into()),
        }
    }

    fn meshed_region(&self) -> ModelResult<MeshedRegion> {
        let response = self.connection.request(&Request::Mesh {
            handle: self.handle.clone(),
        })?;
        match response {
            Response::Mesh { mesh } => Ok(mesh.to_region()?),
            other => Err(ServerError::UnexpectedResponse(other.name().to_string()).into()),
        }
    }

    fn time_freq_support(&self) -> ModelResult<TimeFreqSupport> {
        let response = self.connection.request(&Request::TimeFreqSupport {
            handle: self.handle.clone(),
        })?;
        match response {
            Response::TimeFreqSupport { support } => Ok(support),
            other => Err(ServerError::UnexpectedResponse(other.name().to_string()).into()),
        }
    }

    fn evaluate(&self, request: &EvalRequest) -> ModelResult<FieldsContainer> {
        let response = self.connection.request(&Request::Evaluate {
            handle: self.handle.clone(),
            request: request.clone(),
        })?;
        match response {
            Response::Fields { container } => Ok(container),
            other => Err(ServerError::UnexpectedResponse(other.name().to_string()).into()),
        }
    }
}

impl Drop for RemoteSource {
    fn drop(&mut self) {
        let closed = self.connection.request(&Request::Close {
            handle: self.handle.clone(),
        });
        if let Err(err) = closed.and_then(expect_ack) {
            debug!(handle = %self.handle, error = %err, "failed to close remote file");
        }
    }
}
