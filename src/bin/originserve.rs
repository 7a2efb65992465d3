//! The concrete origin server binary: reads its listen address, document
//! root, and log verbosity from the environment and command line, then
//! hands off to the library's fixed router. None of this lives in the
//! library itself — it's ambient convenience an embedding binary is free
//! to assemble however it likes.

use originserve::Server;
use std::{env, net::SocketAddr, process::ExitCode};

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_DOC_ROOT: &str = "public";

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let bind_addr = env::args()
        .nth(1)
        .or_else(|| env::var("ORIGINSERVE_BIND").ok())
        .unwrap_or_else(|| DEFAULT_BIND.to_string());
    let doc_root = env::var("ORIGINSERVE_DOC_ROOT").unwrap_or_else(|_| DEFAULT_DOC_ROOT.to_string());

    let addr: SocketAddr = match bind_addr.parse() {
        Ok(addr) => addr,
        Err(err) => {
            log::error!("invalid bind address {bind_addr:?}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let server = match Server::builder().bind(addr).document_root(&doc_root).build().await {
        Ok(server) => server,
        Err(err) => {
            log::error!("failed to start server on {addr} serving {doc_root:?}: {err}");
            return ExitCode::FAILURE;
        }
    };

    log::info!("listening on {addr}, serving {doc_root:?}");

    server.launch().await
}
