//! Client and server talking over real sockets.

use integration_service::client::{RunSummary, Runner, ServerConnection};
use tokio::net::TcpStream;

mod common;

async fn run_jobs(addr: std::net::SocketAddr, jobs: &str, verbose: bool) -> (RunSummary, String, String) {
    let conn = ServerConnection::connect(addr).await.unwrap();
    let mut runner = Runner::new(conn, verbose, Vec::new(), Vec::new());
    let summary = runner.run(jobs.as_bytes()).await.unwrap();
    let (out, err) = runner.into_writers();
    (
        summary,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

#[tokio::test]
async fn integrates_a_simple_job() {
    let (addr, server) = common::start_server(0).await;

    let (summary, out, err) = run_jobs(addr, "x*x,0,2,100,1\n", false).await;

    assert_eq!(out, "The integral of x*x from 0.000000 to 2.000000 is 2.666800\n");
    assert_eq!(err, "");
    assert_eq!(summary.answered, 1);

    let stats = server.state.snapshot();
    assert_eq!(stats.expressions_checked, 1);
    assert_eq!(stats.completed_jobs, 1);
    assert_eq!(stats.bad_jobs, 0);
    assert_eq!(stats.total_workers_spawned, 1);

    server.stop().await;
}

#[tokio::test]
async fn bad_expression_is_never_integrated() {
    let (addr, server) = common::start_server(0).await;

    let (summary, out, err) = run_jobs(addr, "x+,0,1,10,1\n", false).await;

    assert_eq!(out, "");
    assert_eq!(err, "intclient: bad expression \"x+\" (line 1)\n");
    assert_eq!(summary.rejected, 1);

    let stats = server.state.snapshot();
    assert_eq!(stats.expressions_checked, 1);
    assert_eq!(stats.bad_jobs, 1);
    assert_eq!(stats.completed_jobs, 0);
    assert_eq!(stats.total_workers_spawned, 0);

    server.stop().await;
}

#[tokio::test]
async fn verbose_output_lists_workers_in_order() {
    let (addr, server) = common::start_server(0).await;

    let (_, out, _) = run_jobs(addr, "x,0,3,30,3\n", true).await;

    assert_eq!(
        out,
        "thread 1:0.000000->1.000000:0.500000\n\
         thread 2:1.000000->2.000000:1.500000\n\
         thread 3:2.000000->3.000000:2.500000\n\
         The integral of x from 0.000000 to 3.000000 is 4.500000\n"
    );

    server.stop().await;
}

#[tokio::test]
async fn job_file_diagnostics_keep_line_numbers() {
    let (addr, server) = common::start_server(0).await;

    let jobs = "# comment\n\
                \n\
                x,1,0,10,1\n\
                x,0,1,10,3\n\
                x,0,1\n\
                2*x,0,1,10,2\n";
    let (summary, out, err) = run_jobs(addr, jobs, false).await;

    assert_eq!(out, "The integral of 2*x from 0.000000 to 1.000000 is 1.000000\n");
    assert_eq!(
        err,
        "intclient: upper bound must be greater than lower bound (line 3)\n\
         intclient: segments must be an integer multiple of threads (line 4)\n\
         intclient: syntax error on line 5\n"
    );
    assert_eq!(
        summary,
        RunSummary {
            answered: 1,
            rejected: 3,
            failed: 0,
        }
    );

    // Locally rejected lines never reach the server.
    assert_eq!(server.state.snapshot().expressions_checked, 1);

    server.stop().await;
}

#[tokio::test]
async fn session_survives_garbage_between_requests() {
    let (addr, server) = common::start_server(0).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let text = common::raw_exchange(
        &mut stream,
        b"GET /validate/x*x HTTP/1.1\r\n\r\nthis is not a request\r\n\r\nGET /integrate/0/1/10/2/x HTTP/1.1\r\n\r\n",
        3,
    )
    .await;

    let statuses: Vec<&str> = text.lines().filter(|l| l.starts_with("HTTP/1.1")).collect();
    assert_eq!(
        statuses,
        vec!["HTTP/1.1 200 OK", "HTTP/1.1 400 Bad Request", "HTTP/1.1 200 OK"]
    );
    assert!(text.ends_with("\r\n\r\n0.500000\n"), "{text:?}");

    let stats = server.state.snapshot();
    assert_eq!(stats.connected_clients, 1);
    assert_eq!(stats.expressions_checked, 2);
    assert_eq!(stats.bad_jobs, 1);
    assert_eq!(stats.completed_jobs, 1);

    drop(stream);
    let state = server.state.clone();
    assert!(common::eventually(|| state.snapshot().connected_clients == 0).await);

    server.stop().await;
}

#[tokio::test]
async fn unknown_path_is_bad_request() {
    let (addr, server) = common::start_server(0).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let text = common::raw_exchange(&mut stream, b"GET /status HTTP/1.1\n\n", 1).await;
    assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{text:?}");

    server.stop().await;
}

#[tokio::test]
async fn oversized_head_drops_the_client() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let (addr, server) = common::start_server(0).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let state = server.state.clone();
    assert!(common::eventually(|| state.snapshot().connected_clients == 1).await);

    // No blank line anywhere, and longer than the default head limit.
    let junk = vec![b'a'; 9000];
    stream.write_all(&junk).await.unwrap();

    let mut buf = [0u8; 64];
    let read = tokio::time::timeout(std::time::Duration::from_secs(5), stream.read(&mut buf))
        .await
        .expect("server kept the session open");
    assert!(matches!(read, Ok(0) | Err(_)), "{read:?}");

    assert!(common::eventually(|| state.snapshot().connected_clients == 0).await);
    assert_eq!(state.snapshot().expressions_checked, 0);

    server.stop().await;
}
