use std::sync::Arc;

use tokio::net::TcpListener;

use tinyserve::config::ServerConfig;
use tinyserve::worker::ConnectionWorker;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() {
    run().await
}

async fn run() {
    let config = Arc::new(ServerConfig::from_env());
    let listener = TcpListener::bind(config.bind_addr.as_str()).await.unwrap();
    eprintln!(
        "listening on {}, serving {}",
        config.bind_addr,
        config.document_root.display()
    );

    loop {
        let (socket, _peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                eprintln!("failed to accept connection; err = {:?}", e);
                continue;
            }
        };

        let config = Arc::clone(&config);
        tokio::spawn(async move {
            // worker errors are connection-local, never fatal
            if let Err(e) = ConnectionWorker::new(socket, config).run().await {
                eprintln!("connection failed; err = {:?}", e);
            }
        });
    }
}
