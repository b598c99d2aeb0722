//! TCP server exposing result files opened in its own process.

use std::collections::HashMap;
use std::io::BufReader;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use dpf_file::MeshDef;
use dpf_model::{LocalSource, ModelError, ResultSource};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{ServerError, ServerResult};
use crate::address::ServerAddress;
use crate::protocol::{Handle, Request, Response, read_message, write_message};
use crate::version::SERVER_VERSION;

/// State shared by every client thread.
#[derive(Default)]
struct Shared {
    sources: RwLock<HashMap<Handle, Arc<LocalSource>>>,
    shutdown: AtomicBool,
}

pub struct DpfServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    shared: Arc<Shared>,
}

impl DpfServer {
    /// Bind to `address`; port 0 picks a free port.
    pub fn bind(address: &ServerAddress) -> ServerResult<Self> {
        let listener = TcpListener::bind((address.ip.as_str(), address.port))?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
            shared: Arc::new(Shared::default()),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn address(&self) -> ServerAddress {
        ServerAddress::new(self.local_addr.ip().to_string(), self.local_addr.port())
    }

    /// Accept clients until a `Shutdown` request arrives, one thread per client.
    pub fn run(self) -> ServerResult<()> {
        info!(address = %self.local_addr, "server listening");
        for stream in self.listener.incoming() {
            if self.shared.shutdown.load(Ordering::SeqCst) {
                break;
            }
            let stream = match stream {
                Ok(stream) => stream,
                Err(err) => {
                    warn!(error = %err, "failed to accept connection");
                    continue;
                }
            };
            let shared = self.shared.clone();
            let local_addr = self.local_addr;
            thread::spawn(move || {
                let peer = stream
                    .peer_addr()
                    .map(|a| a.to_string())
                    .unwrap_or_default();
                debug!(%peer, "client connected");
                if let Err(err) = serve_client(stream, &shared, local_addr) {
                    warn!(%peer, error = %err, "client connection failed");
                }
                debug!(%peer, "client disconnected");
            });
        }
        info!(address = %self.local_addr, "server stopped");
        Ok(())
    }

    /// Run on a background thread.
    pub fn spawn(self) -> ServerHandle {
        let address = self.address();
        let local_addr = self.local_addr;
        let shared = self.shared.clone();
        let thread = thread::spawn(move || self.run());
        ServerHandle {
            address,
            local_addr,
            shared,
            thread,
        }
    }
}

pub struct ServerHandle {
    address: ServerAddress,
    local_addr: SocketAddr,
    shared: Arc<Shared>,
    thread: JoinHandle<ServerResult<()>>,
}

impl ServerHandle {
    pub fn address(&self) -> &ServerAddress {
        &self.address
    }

    /// Number of files currently opened by clients.
    pub fn open_files(&self) -> usize {
        self.shared
            .sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Stop accepting clients and wait for the accept loop to exit.
    pub fn stop(self) -> ServerResult<()> {
        request_shutdown(&self.shared, self.local_addr);
        match self.thread.join() {
            Ok(result) => result,
            Err(_) => Err(ServerError::ThreadPanicked),
        }
    }
}

/// Flag the accept loop and wake it with a throwaway connection.
fn request_shutdown(shared: &Shared, local_addr: SocketAddr) {
    shared.shutdown.store(true, Ordering::SeqCst);
    let _ = TcpStream::connect(local_addr);
}

/// Serve one client; the files it opened and did not close are released
/// when it disconnects.
fn serve_client(stream: TcpStream, shared: &Shared, local_addr: SocketAddr) -> ServerResult<()> {
    let mut opened = Vec::new();
    let result = client_loop(stream, shared, local_addr, &mut opened);
    if !opened.is_empty() {
        let mut sources = shared
            .sources
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for handle in &opened {
            sources.remove(handle);
        }
        debug!(released = opened.len(), "released files of disconnected client");
    }
    result
}

fn client_loop(
    stream: TcpStream,
    shared: &Shared,
    local_addr: SocketAddr,
    opened: &mut Vec<Handle>,
) -> ServerResult<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;
    loop {
        let request = match read_message::<Request>(&mut reader) {
            Ok(Some(request)) => request,
            Ok(None) => return Ok(()),
            Err(ServerError::Json(err)) => {
                write_message(&mut writer, &Response::error("BadRequest", err.to_string()))?;
                continue;
            }
            Err(err @ ServerError::MessageTooLarge { .. }) => {
                let _ = write_message(&mut writer, &Response::error("BadRequest", err.to_string()));
                return Err(err);
            }
            Err(err) => return Err(err),
        };
        let shutdown = matches!(request, Request::Shutdown);
        let closing = match &request {
            Request::Close { handle } => Some(handle.clone()),
            _ => None,
        };
        let response = dispatch(shared, request);
        match (&response, closing) {
            (Response::Opened { handle }, _) => opened.push(handle.clone()),
            (Response::Ack, Some(handle)) => opened.retain(|h| *h != handle),
            _ => {}
        }
        write_message(&mut writer, &response)?;
        if shutdown {
            request_shutdown(shared, local_addr);
            return Ok(());
        }
    }
}

fn dispatch(shared: &Shared, request: Request) -> Response {
    let result = match request {
        Request::Hello { client_version } => {
            debug!(%client_version, "handshake");
            Ok(Response::Hello {
                server_version: SERVER_VERSION.to_string(),
            })
        }
        Request::Open { path } => open(shared, &path),
        Request::ResultInfo { handle } => {
            source(shared, &handle).map(|s| Response::ResultInfo {
                info: s.parts().info.clone(),
            })
        }
        Request::Mesh { handle } => source(shared, &handle).map(|s| Response::Mesh {
            mesh: MeshDef::from_region(&s.parts().mesh),
        }),
        Request::TimeFreqSupport { handle } => {
            source(shared, &handle).map(|s| Response::TimeFreqSupport {
                support: s.parts().time_freq_support.clone(),
            })
        }
        Request::Evaluate { handle, request } => source(shared, &handle).and_then(|s| {
            s.evaluate(&request)
                .map(|container| Response::Fields { container })
                .map_err(|err| Response::error(err.kind(), err.to_string()))
        }),
        Request::Close { handle } => {
            let removed = shared
                .sources
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&handle);
            match removed {
                Some(_) => {
                    debug!(%handle, "closed");
                    Ok(Response::Ack)
                }
                None => Err(handle_not_found(&handle)),
            }
        }
        Request::Shutdown => {
            info!("shutdown requested");
            Ok(Response::Ack)
        }
    };
    result.unwrap_or_else(|error| error)
}

fn open(shared: &Shared, path: &str) -> Result<Response, Response> {
    let source = LocalSource::open(Path::new(path)).map_err(|err: ModelError| {
        warn!(%path, error = %err, "open failed");
        Response::error(err.kind(), err.to_string())
    })?;
    let handle = Uuid::new_v4().to_string();
    info!(%path, %handle, "opened result file");
    shared
        .sources
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(handle.clone(), Arc::new(source));
    Ok(Response::Opened { handle })
}

fn source(shared: &Shared, handle: &str) -> Result<Arc<LocalSource>, Response> {
    shared
        .sources
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(handle)
        .cloned()
        .ok_or_else(|| handle_not_found(handle))
}

fn handle_not_found(handle: &str) -> Response {
    Response::error("HandleNotFound", format!("no open file with handle {handle}"))
}
