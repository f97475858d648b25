// End-to-end sessions against a served loopback socket.

use crate::config::{Config, ServerConfig};
use crate::constants::{OTHER_SUBDIR, TEXT_SUBDIR};
use crate::core_credentials::parse_users;
use crate::core_network::network;
use crate::core_transport::Channel;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::{TcpListener, TcpStream};

const USER_TABLE: &str = "admin\nlucy,work.secret,root\n";

/// Boots a server on an ephemeral port over a fresh temp tree.
async fn spawn_server<F>(tweak: F) -> (SocketAddr, TempDir)
where
    F: FnOnce(&mut ServerConfig),
{
    let temp = TempDir::new().unwrap();
    let base = temp.path().join("sftp.server");
    std::fs::create_dir_all(base.join(TEXT_SUBDIR)).unwrap();
    std::fs::create_dir_all(base.join(OTHER_SUBDIR)).unwrap();
    let users_file = temp.path().join("users.csv");
    std::fs::write(&users_file, USER_TABLE).unwrap();

    let mut config = Config::default();
    config.server.server_name = String::from("testsrv");
    config.server.root_dir = temp.path().to_string_lossy().into_owned();
    config.server.users_file = users_file.to_string_lossy().into_owned();
    config.server.max_upload_size = None;
    config.server.duplicate_limit = Some(3);
    tweak(&mut config.server);

    let users = Arc::new(parse_users(USER_TABLE).unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(network::serve(listener, Arc::new(config), users));
    (addr, temp)
}

fn server_base(temp: &TempDir) -> PathBuf {
    temp.path().join("sftp.server")
}

async fn connect(addr: SocketAddr) -> Channel {
    Channel::new(TcpStream::connect(addr).await.unwrap())
}

async fn line(channel: &mut Channel) -> String {
    channel.read_line().await.unwrap().unwrap()
}

async fn exchange(channel: &mut Channel, request: &str) -> String {
    channel.write_line(request).await.unwrap();
    line(channel).await
}

/// Greeting plus admin login, the start of most sessions below.
async fn admin_session(addr: SocketAddr) -> Channel {
    let mut channel = connect(addr).await;
    assert_eq!(line(&mut channel).await, "+testsrv SFTP Service");
    assert_eq!(exchange(&mut channel, "USER admin").await, "!admin logged in");
    channel
}

/// Reads listing body lines up to the blank terminator.
async fn drain_listing(channel: &mut Channel) -> Vec<String> {
    let mut entries = Vec::new();
    loop {
        let entry = line(channel).await;
        if entry.is_empty() {
            return entries;
        }
        entries.push(entry);
    }
}

#[tokio::test]
async fn greeting_then_admin_login() {
    let (addr, _temp) = spawn_server(|_| {}).await;
    admin_session(addr).await;
}

#[tokio::test]
async fn gating_follows_login_progress() {
    let (addr, _temp) = spawn_server(|_| {}).await;
    let mut channel = connect(addr).await;
    line(&mut channel).await;

    assert_eq!(exchange(&mut channel, "BOGUS").await, "-Invalid command");
    assert_eq!(
        exchange(&mut channel, "KILL x").await,
        "-No User-id selected"
    );
    assert_eq!(
        exchange(&mut channel, "USER lucy").await,
        "+lucy valid, send account and password"
    );
    assert_eq!(exchange(&mut channel, "KILL x").await, "- No Login found");
    assert_eq!(
        exchange(&mut channel, "ACCT root").await,
        "! Account valid, logged-in"
    );
    assert_eq!(
        exchange(&mut channel, "KILL x").await,
        "-Not deleted because file does not exist"
    );
}

#[tokio::test]
async fn account_and_password_flow_over_the_wire() {
    let (addr, _temp) = spawn_server(|_| {}).await;
    let mut channel = connect(addr).await;
    line(&mut channel).await;

    assert_eq!(
        exchange(&mut channel, "USER lucy").await,
        "+lucy valid, send account and password"
    );
    assert_eq!(
        exchange(&mut channel, "ACCT work").await,
        "+Account valid, send password"
    );
    assert_eq!(
        exchange(&mut channel, "PASS nope").await,
        "-Wrong password, try again"
    );
    assert_eq!(exchange(&mut channel, "PASS secret").await, "! Logged in");
}

#[tokio::test]
async fn out_to_lunch_refuses_the_connection() {
    let (addr, _temp) = spawn_server(|server| server.out_to_lunch = true).await;
    let mut channel = connect(addr).await;
    assert_eq!(line(&mut channel).await, "-testsrv Out to Lunch");
    assert_eq!(channel.read_line().await.unwrap(), None);
}

#[tokio::test]
async fn bypass_accepts_any_credentials() {
    let (addr, _temp) = spawn_server(|server| server.bypass_login = true).await;
    let mut channel = connect(addr).await;
    line(&mut channel).await;

    assert_eq!(exchange(&mut channel, "USER whoever").await, "+ Bypass Login");
    assert_eq!(exchange(&mut channel, "LIST F").await, "+Contents");
    let entries = drain_listing(&mut channel).await;
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn upload_then_download_round_trips_the_bytes() {
    let (addr, temp) = spawn_server(|_| {}).await;
    let mut channel = admin_session(addr).await;

    std::fs::create_dir(server_base(&temp).join("sub")).unwrap();
    let response = exchange(&mut channel, "CDIR sub").await;
    assert!(response.starts_with("!Changed working dir to "));
    assert!(response.ends_with("sub"));

    assert_eq!(exchange(&mut channel, "LIST F").await, "+Contents");
    assert!(drain_listing(&mut channel).await.is_empty());

    assert_eq!(
        exchange(&mut channel, "STOR OLD report.txt").await,
        "+Will create new file"
    );
    assert_eq!(
        exchange(&mut channel, "SIZE 12").await,
        "+ok, waiting for file"
    );
    channel.write_bytes(b"hello world!").await.unwrap();
    let saved = line(&mut channel).await;
    assert!(saved.starts_with("+Saved "));
    assert!(saved.ends_with("report.txt"));

    // the payload was routed under text/, follow it there
    exchange(&mut channel, "CDIR /").await;
    let response = exchange(&mut channel, &format!("CDIR {}", TEXT_SUBDIR)).await;
    assert!(response.starts_with("!Changed working dir to "));

    assert_eq!(exchange(&mut channel, "RETR report.txt").await, "12");
    channel.write_line("SEND").await.unwrap();
    let payload = channel.read_exact_bytes(12, None).await.unwrap();
    assert_eq!(payload.as_slice(), b"hello world!");
    assert_eq!(line(&mut channel).await, "+File Saved on Client's side");
}

#[tokio::test]
async fn stop_cancels_a_staged_retr() {
    let (addr, temp) = spawn_server(|_| {}).await;
    let mut channel = admin_session(addr).await;
    std::fs::write(server_base(&temp).join("keep.bin"), b"abc").unwrap();

    assert_eq!(exchange(&mut channel, "RETR keep.bin").await, "3");
    assert_eq!(exchange(&mut channel, "STOP").await, "+ok, RETR aborted");
    assert_eq!(
        exchange(&mut channel, "SEND").await,
        "-No File selected on remote server"
    );
    assert_eq!(
        exchange(&mut channel, "STOP").await,
        "-No File selected on remote server"
    );
}

#[tokio::test]
async fn new_mode_never_overwrites() {
    let (addr, temp) = spawn_server(|_| {}).await;
    let mut channel = admin_session(addr).await;

    assert_eq!(
        exchange(&mut channel, "STOR NEW dup.txt").await,
        "+File does not exist, will create new file"
    );
    exchange(&mut channel, "SIZE 1").await;
    channel.write_bytes(b"0").await.unwrap();
    line(&mut channel).await;

    assert_eq!(
        exchange(&mut channel, "STOR NEW dup.txt").await,
        "+File exists, will create new generation of file"
    );
    exchange(&mut channel, "SIZE 1").await;
    channel.write_bytes(b"1").await.unwrap();
    let saved = line(&mut channel).await;
    assert!(saved.ends_with("new_0_dup.txt"));

    let text_dir = server_base(&temp).join(TEXT_SUBDIR);
    assert_eq!(std::fs::read(text_dir.join("dup.txt")).unwrap(), b"0");
    assert_eq!(std::fs::read(text_dir.join("new_0_dup.txt")).unwrap(), b"1");
}

#[tokio::test]
async fn append_refuses_non_text_and_leaves_the_file_alone() {
    let (addr, temp) = spawn_server(|_| {}).await;
    let mut channel = admin_session(addr).await;

    exchange(&mut channel, "STOR OLD image.bin").await;
    exchange(&mut channel, "SIZE 7").await;
    channel.write_bytes(b"payload").await.unwrap();
    line(&mut channel).await;

    assert_eq!(
        exchange(&mut channel, "STOR APP image.bin").await,
        "+Will append to file"
    );
    assert_eq!(
        exchange(&mut channel, "SIZE 4").await,
        "+ok, waiting for file"
    );
    channel.write_bytes(b"more").await.unwrap();
    assert_eq!(
        line(&mut channel).await,
        "-Couldn't save because file is not of text type"
    );

    let untouched = server_base(&temp).join(OTHER_SUBDIR).join("image.bin");
    assert_eq!(std::fs::read(untouched).unwrap(), b"payload");
}

#[tokio::test]
async fn oversize_upload_is_refused_before_any_read() {
    let (addr, _temp) = spawn_server(|server| server.max_upload_size = Some(10)).await;
    let mut channel = admin_session(addr).await;

    exchange(&mut channel, "STOR OLD big.txt").await;
    assert_eq!(
        exchange(&mut channel, "SIZE 10").await,
        "-Not enough room, don't send it"
    );

    // no payload was consumed, the next line still parses as a command
    assert_eq!(exchange(&mut channel, "LIST F").await, "+Contents");
    drain_listing(&mut channel).await;

    // the rejection disarmed the store
    assert_eq!(
        exchange(&mut channel, "SIZE 5").await,
        "-STOR operation was not specified"
    );

    exchange(&mut channel, "STOR OLD big.txt").await;
    assert_eq!(
        exchange(&mut channel, "SIZE 9").await,
        "+ok, waiting for file"
    );
    channel.write_bytes(b"123456789").await.unwrap();
    assert!(line(&mut channel).await.starts_with("+Saved "));
}

#[tokio::test]
async fn losing_the_login_clears_an_armed_store() {
    let (addr, _temp) = spawn_server(|_| {}).await;
    let mut channel = connect(addr).await;
    line(&mut channel).await;

    exchange(&mut channel, "USER lucy").await;
    assert_eq!(
        exchange(&mut channel, "ACCT root").await,
        "! Account valid, logged-in"
    );
    assert_eq!(
        exchange(&mut channel, "STOR OLD note.txt").await,
        "+Will create new file"
    );

    // reselecting the user drops the login while the store is armed
    assert_eq!(
        exchange(&mut channel, "USER lucy").await,
        "+lucy valid, send account and password"
    );
    assert_eq!(exchange(&mut channel, "TYPE A").await, "- No Login found");

    // the refusal also disarmed the store, so a fresh login cannot
    // resume the abandoned upload
    assert_eq!(
        exchange(&mut channel, "ACCT root").await,
        "! Account valid, logged-in"
    );
    assert_eq!(
        exchange(&mut channel, "SIZE 3").await,
        "-STOR operation was not specified"
    );
}

#[tokio::test]
async fn size_without_stor_is_an_error() {
    let (addr, _temp) = spawn_server(|_| {}).await;
    let mut channel = admin_session(addr).await;
    assert_eq!(
        exchange(&mut channel, "SIZE 5").await,
        "-STOR operation was not specified"
    );
    assert_eq!(exchange(&mut channel, "SIZE five").await, "-Size is invalid");
}

#[tokio::test]
async fn malformed_commands_do_not_disturb_the_session() {
    let (addr, _temp) = spawn_server(|_| {}).await;
    let mut channel = admin_session(addr).await;

    assert_eq!(exchange(&mut channel, "USER").await, "-Invalid command");
    assert_eq!(exchange(&mut channel, "LIST X").await, "-Invalid command");
    assert_eq!(
        exchange(&mut channel, "STOR BAD name.txt").await,
        "-Invalid command"
    );
    assert_eq!(
        exchange(&mut channel, "STOR NEW ../escape.txt").await,
        "-Invalid command"
    );
    assert_eq!(exchange(&mut channel, "SEND extra").await, "-Invalid command");

    // still logged in and fully operational
    assert_eq!(exchange(&mut channel, "LIST F").await, "+Contents");
    drain_listing(&mut channel).await;
}

#[tokio::test]
async fn type_switches_transmission_mode() {
    let (addr, _temp) = spawn_server(|_| {}).await;
    let mut channel = admin_session(addr).await;

    assert_eq!(exchange(&mut channel, "TYPE A").await, "+Using Ascii mode");
    assert_eq!(exchange(&mut channel, "TYPE B").await, "+Using Binary mode");
    assert_eq!(
        exchange(&mut channel, "TYPE C").await,
        "+Using Continuous mode"
    );
    assert_eq!(exchange(&mut channel, "TYPE X").await, "-Type not valid");
}

#[tokio::test]
async fn rename_and_delete_report_their_paths() {
    let (addr, temp) = spawn_server(|_| {}).await;
    let mut channel = admin_session(addr).await;
    std::fs::write(server_base(&temp).join("draft.txt"), b"x").unwrap();

    assert_eq!(exchange(&mut channel, "NAME draft.txt").await, "+File exists");
    let renamed = exchange(&mut channel, "TOBE final.txt").await;
    assert!(renamed.starts_with('+'));
    assert!(renamed.contains(" renamed to "));
    assert!(renamed.ends_with("final.txt"));

    assert_eq!(
        exchange(&mut channel, "NAME absent.txt").await,
        "-Can't find absent.txt. NAME command is aborted, don't send TOBE"
    );
    assert_eq!(
        exchange(&mut channel, "TOBE other.txt").await,
        "-File wasn't renamed because file is not specified"
    );

    assert_eq!(
        exchange(&mut channel, "KILL final.txt").await,
        "+final.txt deleted"
    );
    assert!(!server_base(&temp).join("final.txt").exists());
}

#[tokio::test]
async fn verbose_listing_reports_timestamps() {
    let (addr, temp) = spawn_server(|_| {}).await;
    let mut channel = admin_session(addr).await;
    std::fs::write(server_base(&temp).join("dated.txt"), b"x").unwrap();

    assert_eq!(exchange(&mut channel, "LIST V").await, "+Contents");
    let entries = drain_listing(&mut channel).await;
    let entry = entries.iter().find(|e| e.contains("dated.txt")).unwrap();
    assert!(entry.contains(" created time: "));
    assert!(entry.contains(" last modified time: "));
}

#[tokio::test]
async fn done_says_goodbye_and_closes() {
    let (addr, _temp) = spawn_server(|_| {}).await;
    let mut channel = admin_session(addr).await;
    assert_eq!(
        exchange(&mut channel, "DONE").await,
        "+ Thanks for using testsrv SFTP Service. Goodbye!"
    );
    assert_eq!(channel.read_line().await.unwrap(), None);
}

#[tokio::test]
async fn sessions_do_not_share_state() {
    let (addr, _temp) = spawn_server(|_| {}).await;
    let mut first = admin_session(addr).await;
    let mut second = admin_session(addr).await;

    let response = exchange(&mut first, &format!("CDIR {}", TEXT_SUBDIR)).await;
    assert!(response.starts_with("!Changed working dir to "));

    // the second session's cursor did not move
    assert_eq!(exchange(&mut second, "LIST F").await, "+Contents");
    let entries = drain_listing(&mut second).await;
    assert_eq!(entries.len(), 2);

    assert_eq!(exchange(&mut first, "LIST F").await, "+Contents");
    assert!(drain_listing(&mut first).await.is_empty());

    // and a store armed on one session is invisible to the other
    exchange(&mut first, "STOR OLD alone.txt").await;
    assert_eq!(
        exchange(&mut second, "SIZE 3").await,
        "-STOR operation was not specified"
    );
}

#[tokio::test]
async fn concurrent_uploads_of_the_same_name_stay_whole() {
    let (addr, temp) = spawn_server(|_| {}).await;
    let mut first = admin_session(addr).await;
    let mut second = admin_session(addr).await;

    exchange(&mut first, "STOR OLD race.txt").await;
    exchange(&mut second, "STOR OLD race.txt").await;
    exchange(&mut first, "SIZE 4").await;
    exchange(&mut second, "SIZE 4").await;

    first.write_bytes(b"aaaa").await.unwrap();
    second.write_bytes(b"bbbb").await.unwrap();
    line(&mut first).await;
    line(&mut second).await;

    // whichever rename landed last, the file is one whole payload
    let saved = std::fs::read(server_base(&temp).join(TEXT_SUBDIR).join("race.txt")).unwrap();
    assert!(saved == b"aaaa" || saved == b"bbbb");
}
