mod test_helpers;

use station_server::link;
use station_server::station_manager::{BlockRequest, NewMemberRequest};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::time::timeout;
use test_helpers::*;

const TAG: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];

#[tokio::test]
async fn test_link_dispatches_lines_and_writes_replies() {
    let setup = TestStationSetup::new();
    setup.manager.dispatch_line(&enrollment_line(TAG)).await;
    setup
        .manager
        .add_member(NewMemberRequest {
            name: "Ada".to_string(),
            team: "Team 1".to_string(),
            tag: None,
        })
        .await
        .unwrap();
    setup.start_session().await;

    let TestStationSetup {
        manager,
        mut outbound,
        ..
    } = setup;

    let (client, server) = tokio::io::duplex(4096);
    let (server_read, server_write) = tokio::io::split(server);
    let link_manager = manager.clone();
    let link_task = tokio::spawn(async move {
        link::serve(server_read, server_write, &link_manager, &mut outbound).await
    });

    let (client_read, mut client_write) = tokio::io::split(client);
    let mut replies = BufReader::new(client_read).lines();

    // Garbage and unknown commands produce nothing
    client_write.write_all(b"boot ok\n#PING\n").await.unwrap();
    client_write
        .write_all(scan_line(4, TAG).as_bytes())
        .await
        .unwrap();

    let reply = timeout(Duration::from_secs(1), replies.next_line())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        reply.as_deref(),
        Some("#BLOCK:4,5,200,150,35,60,102,110,118,102,102,60,0")
    );

    // Operator actions share the same writer
    manager
        .block_box(
            9,
            BlockRequest {
                duration_seconds: Some(60),
                permanent: false,
            },
        )
        .await
        .unwrap();
    let reply = timeout(Duration::from_secs(1), replies.next_line())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        reply.as_deref(),
        Some("#BLOCK:9,3,200,150,35,24,24,24,255,255,24,24,24")
    );

    // Closing the client ends the link
    drop(client_write);
    drop(replies);
    let result = timeout(Duration::from_secs(1), link_task)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());

    let lines = manager.recent_lines().await;
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "boot ok");
}

#[tokio::test]
async fn test_link_reports_status_lines() {
    let TestStationSetup {
        manager,
        mut outbound,
        ..
    } = TestStationSetup::new();

    let input: &[u8] =
        b"#STATUS:sendHealthCheck:NODE_OK:x:3\r\n#STATUS:sendHealthCheck:NODE_OK:x:4\n";
    let mut sink = Vec::new();
    link::serve(input, &mut sink, &manager, &mut outbound)
        .await
        .unwrap();

    let status = manager.box_status().await;
    assert!(status[2]);
    assert!(status[3]);
    assert!(sink.is_empty());
}
