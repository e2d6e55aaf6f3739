use std::future::Future;
use std::net::SocketAddr;

use axum::{
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get, post},
    Router,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Upper bound for `/bytes/{n}`.
pub const MAX_BYTES: usize = 64 * 1024 * 1024;

pub fn app() -> Router {
    Router::new()
        .route("/status/{code}", any(status))
        .route("/redirect", get(redirect))
        .route("/redirect-loop", get(redirect_loop))
        .route("/target", get(target))
        .route("/echo", any(echo))
        .route("/submit", post(submit))
        .route("/bytes/{n}", get(bytes))
        .route("/headers", get(custom_headers))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Serve `app()` on a random local port from a background thread with its own
/// runtime. Returns the bound address.
pub fn spawn_background() -> std::io::Result<SocketAddr> {
    serve_in_background(run)
}

/// Answer one connection per entry of `responses`, in order, by writing the
/// entry verbatim and closing. Each request is read up to the end of its head
/// first. Returns the bound address.
///
/// Unlike `app()`, nothing is normalized on the way out, so tests can check
/// exact status lines, header case and field order.
pub fn spawn_scripted(responses: Vec<Vec<u8>>) -> std::io::Result<SocketAddr> {
    serve_in_background(move |listener: TcpListener| async move {
        for response in responses {
            let (mut stream, _) = listener.accept().await?;
            read_request_head(&mut stream).await?;
            stream.write_all(&response).await?;
            stream.shutdown().await?;
        }
        Ok::<_, std::io::Error>(())
    })
}

fn serve_in_background<F, Fut>(serve: F) -> std::io::Result<SocketAddr>
where
    F: FnOnce(TcpListener) -> Fut + Send + 'static,
    Fut: Future<Output = std::io::Result<()>>,
{
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = std_listener.local_addr()?;
    std_listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("mock server runtime failed to start: {e}");
                return;
            }
        };
        let served = rt.block_on(async move {
            let listener = TcpListener::from_std(std_listener)?;
            serve(listener).await
        });
        if let Err(e) = served {
            log::error!("mock server stopped: {e}");
        }
    });

    Ok(addr)
}

/// Consume bytes until the blank line ending a request head, or EOF.
async fn read_request_head(stream: &mut TcpStream) -> std::io::Result<()> {
    let mut head = Vec::new();
    let mut chunk = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        head.extend_from_slice(&chunk[..n]);
    }
    Ok(())
}

async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, format!("status {}", status.as_u16()))
}

async fn redirect() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/target")], "redirecting to /target")
}

async fn redirect_loop() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/redirect-loop")], "again")
}

async fn target() -> &'static str {
    "target reached"
}

/// Reflect the request line, headers and body back as plain text.
async fn echo(method: Method, headers: HeaderMap, body: String) -> String {
    let mut out = format!("{method}\n");
    for (name, value) in &headers {
        out.push_str(name.as_str());
        out.push_str(": ");
        out.push_str(&String::from_utf8_lossy(value.as_bytes()));
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&body);
    out
}

async fn submit(body: String) -> (StatusCode, String) {
    (StatusCode::CREATED, format!("accepted {} bytes", body.len()))
}

/// `n` bytes of a repeating `a..z` pattern.
async fn bytes(Path(n): Path<usize>) -> Result<Vec<u8>, StatusCode> {
    if n > MAX_BYTES {
        return Err(StatusCode::PAYLOAD_TOO_LARGE);
    }
    Ok(pattern(n))
}

pub fn pattern(n: usize) -> Vec<u8> {
    (0..n).map(|i| b'a' + (i % 26) as u8).collect()
}

async fn custom_headers() -> impl IntoResponse {
    ([("x-mock", "yes"), ("x-trace", "abc123")], "with headers")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_cycles_through_alphabet() {
        let p = pattern(28);
        assert_eq!(&p[..3], b"abc");
        assert_eq!(p[25], b'z');
        assert_eq!(&p[26..], b"ab");
    }

    #[test]
    fn pattern_of_zero_is_empty() {
        assert!(pattern(0).is_empty());
    }

    #[test]
    fn scripted_server_replies_verbatim_in_order() {
        use std::io::{Read, Write};

        let first = b"HTTP/1.1 204 Nothing Here\r\nX-A: 1\r\n\r\n".to_vec();
        let second = b"HTTP/1.0 200 Fine\r\n\r\nbye".to_vec();
        let addr = spawn_scripted(vec![first.clone(), second.clone()]).unwrap();

        for expected in [first, second] {
            let mut stream = std::net::TcpStream::connect(addr).unwrap();
            stream.write_all(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();
            let mut reply = Vec::new();
            stream.read_to_end(&mut reply).unwrap();
            assert_eq!(reply, expected);
        }
    }
}
