//! TxPath: write queue → transport.

use crate::mock_transport::{ETH_ARP, ETH_IP, PEER, STATION, frame, mock_context};

use spinet::net::frame::{EthernetHeader, HEADER_LEN, MacAddr};
use spinet::{BufferPool, Command, Error, Reply};

#[test]
fn writes_are_sent_in_arrival_order() {
    let (mut ctx, mock) = mock_context();
    let dev = ctx.device();
    let pool = BufferPool::new();
    dev.open(0, pool.adapter()).unwrap();

    let handles: Vec<_> = (0u8..5)
        .map(|i| {
            let buf = pool.insert(&[i; 20]);
            dev.write(ETH_IP, PEER, buf, 20, false).unwrap()
        })
        .collect();

    assert_eq!(ctx.run_tx(), 5);

    let sent = mock.sent();
    assert_eq!(sent.len(), 5);
    for (i, f) in sent.iter().enumerate() {
        assert_eq!(f[HEADER_LEN], i as u8, "frame {i} out of order");
    }
    for h in handles {
        assert!(h.try_result().unwrap().is_ok());
    }
}

#[test]
fn framed_write_synthesizes_header() {
    let (mut ctx, mock) = mock_context();
    let dev = ctx.device();
    let pool = BufferPool::new();
    dev.open(0, pool.adapter()).unwrap();

    let buf = pool.insert(b"who-has");
    let h = dev.write(ETH_ARP, PEER, buf, 7, false).unwrap();
    ctx.run_tx();

    let sent = mock.sent();
    assert_eq!(sent[0], frame(PEER, STATION, ETH_ARP, b"who-has"));

    let t = h.try_result().unwrap().unwrap();
    assert_eq!(t.data_len, 7);
    assert_eq!(t.src, STATION);
    assert_eq!(t.dst, PEER);
    assert!(!t.raw);
    assert!(!t.broadcast);
}

#[test]
fn raw_write_is_sent_verbatim() {
    let (mut ctx, mock) = mock_context();
    let dev = ctx.device();
    let pool = BufferPool::new();
    dev.open(0, pool.adapter()).unwrap();

    let wire = frame(PEER, MacAddr([9; 6]), ETH_IP, &[0xAB; 30]);
    let buf = pool.insert(&wire);
    dev.write(ETH_IP, PEER, buf, wire.len(), true).unwrap();
    ctx.run_tx();

    assert_eq!(mock.sent(), vec![wire]);
}

#[test]
fn broadcast_forces_all_ones_destination() {
    let (mut ctx, mock) = mock_context();
    let dev = ctx.device();
    let pool = BufferPool::new();
    dev.open(0, pool.adapter()).unwrap();

    let buf = pool.insert(&[0u8; 28]);
    let reply = dev
        .begin_io(Command::Broadcast {
            packet_type: ETH_ARP,
            data: buf,
            len: 28,
            raw: false,
        })
        .unwrap();
    let Reply::Pending(h) = reply else {
        panic!("broadcast must be deferred");
    };
    ctx.run_tx();

    let hdr = EthernetHeader::parse(&mock.sent()[0]).unwrap();
    assert_eq!(hdr.dst.octets(), [0xFF; 6]);
    assert!(h.try_result().unwrap().unwrap().broadcast);
}

#[test]
fn max_frame_size_boundary() {
    let (mut ctx, mock) = mock_context();
    let dev = ctx.device();
    let pool = BufferPool::new();
    dev.open(0, pool.adapter()).unwrap();
    let buf = pool.insert(&[0x5A; 1519]);

    assert_eq!(
        dev.write(ETH_IP, PEER, buf, 1519, false).unwrap_err(),
        Error::MtuExceeded
    );

    let h = dev.write(ETH_IP, PEER, buf, 1518, false).unwrap();
    ctx.run_tx();
    assert!(h.try_result().unwrap().is_ok());
    assert_eq!(mock.sent()[0].len(), HEADER_LEN + 1518);
}

#[test]
fn transport_failure_completes_with_wire_error() {
    let (mut ctx, mock) = mock_context();
    let dev = ctx.device();
    let pool = BufferPool::new();
    dev.open(0, pool.adapter()).unwrap();
    mock.log().fail_sends = true;

    let h = dev.write(ETH_IP, PEER, pool.insert(&[1; 4]), 4, false).unwrap();
    assert_eq!(ctx.run_tx(), 0);
    assert_eq!(h.try_result(), Some(Err(Error::GenericWireError)));
}

#[test]
fn short_client_buffer_is_bad_argument() {
    let (mut ctx, mock) = mock_context();
    let dev = ctx.device();
    let pool = BufferPool::new();
    dev.open(0, pool.adapter()).unwrap();

    // Claims 64 bytes, holds 10.
    let h = dev.write(ETH_IP, PEER, pool.insert(&[1; 10]), 64, false).unwrap();
    ctx.run_tx();

    let err = h.try_result().unwrap().unwrap_err();
    assert_eq!(err, Error::BadArgument);
    assert!(mock.sent().is_empty(), "nothing may reach the wire");
}

#[test]
fn writes_queued_before_close_still_go_out() {
    let (mut ctx, mock) = mock_context();
    let dev = ctx.device();
    let pool = BufferPool::new();
    dev.open(0, pool.adapter()).unwrap();

    let h = dev.write(ETH_IP, PEER, pool.insert(&[3; 12]), 12, false).unwrap();
    dev.close();
    assert!(!dev.is_open());

    ctx.run_tx();
    assert!(h.try_result().unwrap().is_ok());
    assert_eq!(mock.sent().len(), 1);
}
