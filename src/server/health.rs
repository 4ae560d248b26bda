use rouille::{Request, Response};
use serde::Serialize;
use std::thread;

/// Port used when neither CLI, env nor settings give one.
pub const DEFAULT_PORT: u16 = 5000;

/// Body returned by `GET /`.
pub const LIVENESS_TEXT: &str = "Local IP TV backend is running!";

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

impl ErrorResponse {
    fn new(msg: &str) -> Self {
        Self {
            success: false,
            error: msg.to_string(),
        }
    }
}

/// Liveness HTTP server
pub struct HealthServer {
    port: u16,
}

impl HealthServer {
    /// Start the server in a background thread.
    ///
    /// Binding happens on that thread; a port already in use is logged and the
    /// dashboard keeps running without the endpoint.
    pub fn start(port: u16) -> std::io::Result<thread::JoinHandle<()>> {
        let server = HealthServer { port };
        thread::Builder::new()
            .name("ipwall-health".into())
            .spawn(move || server.run())
    }

    fn run(self) {
        let addr = format!("0.0.0.0:{}", self.port);
        match rouille::Server::new(&addr, Self::handle_request) {
            Ok(server) => {
                log::info!("Health endpoint listening on http://{}", addr);
                server.run();
            }
            Err(e) => log::error!("Health endpoint failed to bind {}: {}", addr, e),
        }
    }

    fn handle_request(request: &Request) -> Response {
        if request.method() == "OPTIONS" {
            return Response::empty_204()
                .with_additional_header("Access-Control-Allow-Origin", "*")
                .with_additional_header("Access-Control-Allow-Methods", "GET, OPTIONS")
                .with_additional_header("Access-Control-Allow-Headers", "Content-Type");
        }

        let response = rouille::router!(request,
            (GET) ["/"] => {
                Response::text(LIVENESS_TEXT)
            },
            _ => {
                log::debug!("Health endpoint: {} {} not found", request.method(), request.url());
                Response::json(&ErrorResponse::new("Not found")).with_status_code(404)
            }
        );

        response.with_additional_header("Access-Control-Allow-Origin", "*")
    }
}
