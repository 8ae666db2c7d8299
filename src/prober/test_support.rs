use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::time::{timeout, Duration};

/// A loopback port whose accept queue is full, so new SYNs are dropped and
/// connects hang until they time out.
pub struct HangingPort {
    pub port: u16,
    _listener: TcpListener,
    _queued: Vec<TcpStream>,
}

impl HangingPort {
    pub async fn bind() -> Self {
        let socket = TcpSocket::new_v4().unwrap();
        socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let listener = socket.listen(0).unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut queued = Vec::new();
        for _ in 0..16 {
            match timeout(Duration::from_millis(100), TcpStream::connect(("127.0.0.1", port))).await {
                Ok(Ok(conn)) => queued.push(conn),
                _ => break,
            }
        }
        assert!(!queued.is_empty(), "accept queue never filled");

        Self {
            port,
            _listener: listener,
            _queued: queued,
        }
    }
}

/// A loopback port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

#[cfg(target_os = "linux")]
pub fn open_fds() -> usize {
    std::fs::read_dir("/proc/self/fd").unwrap().count()
}
