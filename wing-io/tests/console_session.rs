//! End-to-end session tests over the mock transport
//!
//! Each test scripts the console side of a session into a MockTransport,
//! drives a real Console over it, and checks both the decoded events and
//! the bytes the library put on the wire.

use std::time::Duration;
use wing_io::console::Console;
use wing_io::transport::MockTransport;
use wing_io::types::{ConsoleEvent, NodeData, NodeType};

/// Keep-alive period long enough to stay quiet during a test
const QUIET: Duration = Duration::from_secs(7);

fn console_over(mock: &MockTransport, keep_alive: Duration) -> Console {
    Console::over(Box::new(mock.clone()), keep_alive).unwrap()
}

fn drain(console: &mut Console) -> Vec<ConsoleEvent> {
    let mut events = Vec::new();
    while let Some(ev) = console.next_event().unwrap() {
        events.push(ev);
    }
    events
}

#[test]
fn connect_sends_channel_handshake() {
    let mock = MockTransport::new();
    let _console = console_over(&mock, QUIET);
    assert_eq!(mock.get_written(), vec![0xDF, 0xD1]);
}

#[test]
fn channel_select_and_small_int() {
    let mock = MockTransport::new();
    // channel 2, cursor to 0x2A, literal small int 5
    mock.inject_read(&[0xDF, 0xD2, 0xD7, 0x00, 0x00, 0x00, 0x2A, 0x05]);

    let mut console = console_over(&mock, QUIET);
    let events = drain(&mut console);
    assert_eq!(
        events,
        vec![ConsoleEvent::NodeData {
            id: 0x2A,
            data: NodeData::from_i32(5),
        }]
    );
    assert_eq!(console.value_of(0x2A), Some(&NodeData::from_i32(5)));
}

#[test]
fn long_string_and_float_on_existing_cursor() {
    let mock = MockTransport::new();
    let mut stream = vec![0xDF, 0xD2, 0xD7, 0x00, 0x00, 0x00, 0x07];
    stream.extend_from_slice(&[0xD1, 0x02, b'a', b'b', b'c']);
    stream.extend_from_slice(&[0xD7, 0x00, 0x00, 0x00, 0x09]);
    stream.extend_from_slice(&[0xD5, 0x3F, 0x80, 0x00, 0x00]);
    mock.inject_read(&stream);

    let mut console = console_over(&mock, QUIET);
    let events = drain(&mut console);
    assert_eq!(
        events,
        vec![
            ConsoleEvent::NodeData {
                id: 7,
                data: NodeData::from_string("abc"),
            },
            ConsoleEvent::NodeData {
                id: 9,
                data: NodeData::from_f32(1.0),
            },
        ]
    );
}

#[test]
fn definition_record_round_trip() {
    let mut body = Vec::new();
    body.extend_from_slice(&0u32.to_be_bytes()); // parent
    body.extend_from_slice(&5u32.to_be_bytes()); // id
    body.extend_from_slice(&3u16.to_be_bytes()); // index
    body.push(4);
    body.extend_from_slice(b"gain");
    body.push(0);
    body.extend_from_slice(&0x0010u16.to_be_bytes()); // linear float, no unit
    body.extend_from_slice(&(-144.0f32).to_be_bytes());
    body.extend_from_slice(&10.0f32.to_be_bytes());
    body.extend_from_slice(&1540u32.to_be_bytes());

    let mut stream = vec![0xDF, 0xD2];
    stream.extend_from_slice(&[0xDF, 0xDE]); // the 0xDF opcode, escaped
    stream.extend_from_slice(&(body.len() as u16).to_be_bytes());
    stream.extend_from_slice(&body);
    stream.push(0xDE); // request end

    let mock = MockTransport::new();
    mock.inject_read(&stream);

    let mut console = console_over(&mock, QUIET);
    let events = drain(&mut console);
    assert_eq!(events.len(), 2);
    match &events[0] {
        ConsoleEvent::NodeDefinition(def) => {
            assert_eq!(def.id, 5);
            assert_eq!(def.parent_id, 0);
            assert_eq!(def.index, 3);
            assert_eq!(def.name, "gain");
            assert_eq!(def.node_type(), NodeType::LinearFloat);
            assert_eq!(def.min_float, Some(-144.0));
            assert_eq!(def.max_float, Some(10.0));
            assert_eq!(def.steps, Some(1540));
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(events[1], ConsoleEvent::RequestEnd);
}

#[test]
fn writes_reach_the_wire_after_the_handshake() {
    let mock = MockTransport::new();
    let mut console = console_over(&mock, QUIET);
    mock.clear_written();

    console.set_int(0x2A, 5).unwrap();
    console.set_float(9, 1.0).unwrap();
    console.request_node_definition(0).unwrap();

    let mut expected = vec![0xD7, 0x00, 0x00, 0x00, 0x2A, 0x05];
    expected.extend_from_slice(&[0xD7, 0x00, 0x00, 0x00, 0x09, 0xD5, 0x3F, 0x80, 0x00, 0x00]);
    expected.extend_from_slice(&[0xDA, 0xDD]);
    assert_eq!(mock.get_written(), expected);
}

#[test]
fn keep_alive_fires_on_receive_timeout() {
    let mock = MockTransport::new();
    mock.inject_timeout();
    mock.inject_timeout();
    mock.inject_read(&[0xDF, 0xD2, 0x05]);

    // zero period: every blocking point is past the deadline
    let mut console = console_over(&mock, Duration::ZERO);
    let events = drain(&mut console);
    assert_eq!(events.len(), 1);

    // connect handshake plus at least one keep-alive re-send
    let written = mock.get_written();
    assert!(written.len() >= 4, "expected keep-alives, got {:?}", written);
    assert!(written.chunks(2).all(|c| c == [0xDF, 0xD1]));
}

#[test]
fn quiet_reader_does_not_spam_keep_alives() {
    let mock = MockTransport::new();
    mock.inject_timeout();
    mock.inject_read(&[0xDF, 0xD2, 0x05]);

    let mut console = console_over(&mock, QUIET);
    drain(&mut console);

    // within the 7s window: only the connect handshake
    assert_eq!(mock.get_written(), vec![0xDF, 0xD1]);
}

#[test]
fn close_makes_handles_unusable_and_reader_unwind() {
    let mock = MockTransport::new();
    mock.inject_read(&[0xDF, 0xD2, 0x05]);

    let mut console = console_over(&mock, QUIET);
    console.close().unwrap();
    assert!(mock.is_shutdown());

    assert!(matches!(
        console.set_int(1, 2),
        Err(wing_io::Error::Closed)
    ));
    // closing twice is fine
    console.close().unwrap();

    // the pending stream is gone; the reader sees an orderly end
    assert_eq!(console.next_event().unwrap(), None);
}

#[test]
fn writer_handle_works_from_a_callback() {
    struct Echo {
        writer: wing_io::ConsoleWriter,
        seen: Vec<(u32, i32)>,
    }

    impl wing_io::ConsoleHandler for Echo {
        fn on_node_data(&mut self, id: u32, data: &wing_io::NodeData) {
            self.seen.push((id, data.get_int()));
            // write back from inside the callback
            self.writer.set_int(id + 1, data.get_int()).unwrap();
        }
    }

    let mock = MockTransport::new();
    mock.inject_read(&[0xDF, 0xD2, 0xD7, 0x00, 0x00, 0x00, 0x01, 0x09]);

    let mut console = console_over(&mock, QUIET);
    mock.clear_written();

    let mut handler = Echo {
        writer: console.writer().unwrap(),
        seen: Vec::new(),
    };
    console.run(&mut handler).unwrap();

    assert_eq!(handler.seen, vec![(1, 9)]);
    assert_eq!(mock.get_written(), vec![0xD7, 0x00, 0x00, 0x00, 0x02, 0x09]);
}

#[test]
fn malformed_definition_aborts_the_read_loop() {
    let mock = MockTransport::new();
    // definition claiming 32 bytes, stream ends after 2
    mock.inject_read(&[0xDF, 0xD2, 0xDF, 0xDE, 0x00, 0x20, 0x01, 0x02]);

    let mut console = console_over(&mock, QUIET);
    assert!(matches!(
        console.next_event(),
        Err(wing_io::Error::Malformed(_))
    ));
}

#[test]
fn per_connection_state_is_isolated() {
    // two consoles reporting different values for the same id must not
    // share change-detection state
    let mock_a = MockTransport::new();
    let mock_b = MockTransport::new();
    mock_a.inject_read(&[0xDF, 0xD2, 0xD7, 0x00, 0x00, 0x00, 0x01, 0x05]);
    mock_b.inject_read(&[0xDF, 0xD2, 0xD7, 0x00, 0x00, 0x00, 0x01, 0x05]);

    let mut console_a = console_over(&mock_a, QUIET);
    let mut console_b = console_over(&mock_b, QUIET);

    assert_eq!(drain(&mut console_a).len(), 1);
    // same bytes still produce an event on the second connection
    assert_eq!(drain(&mut console_b).len(), 1);
}
