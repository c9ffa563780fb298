//! Abort: best-effort removal of queued requests.

use crate::mock_transport::{ETH_IP, PEER, STATION, frame, mock_context};

use spinet::{AbortOutcome, BufferPool, Error};

#[test]
fn aborted_read_never_sees_its_frame() {
    let (mut ctx, mock) = mock_context();
    let dev = ctx.device();
    let pool = BufferPool::new();
    dev.open(0, pool.adapter()).unwrap();

    let buf = pool.alloc();
    let h = dev.read(ETH_IP, buf, false).unwrap();
    assert_eq!(dev.abort(&h), AbortOutcome::Cancelled);
    assert_eq!(h.try_result(), Some(Err(Error::Aborted)));

    mock.inject(frame(STATION, PEER, ETH_IP, b"late"));
    ctx.run_rx();

    assert_eq!(h.try_result(), None, "no second completion");
    assert_eq!(pool.contents(buf).unwrap(), Vec::<u8>::new());
}

#[test]
fn abort_skips_to_next_matching_read() {
    let (mut ctx, mock) = mock_context();
    let dev = ctx.device();
    let pool = BufferPool::new();
    dev.open(0, pool.adapter()).unwrap();

    let first = dev.read(ETH_IP, pool.alloc(), false).unwrap();
    let second = dev.read(ETH_IP, pool.alloc(), false).unwrap();
    dev.abort(&first);

    mock.inject(frame(STATION, PEER, ETH_IP, &[0; 8]));
    ctx.run_rx();
    assert!(second.try_result().unwrap().is_ok());
}

#[test]
fn queued_write_can_be_aborted() {
    let (mut ctx, mock) = mock_context();
    let dev = ctx.device();
    let pool = BufferPool::new();
    dev.open(0, pool.adapter()).unwrap();

    let keep = dev.write(ETH_IP, PEER, pool.insert(&[1; 4]), 4, false).unwrap();
    let dropped = dev.write(ETH_IP, PEER, pool.insert(&[2; 4]), 4, false).unwrap();
    assert_eq!(dev.abort(&dropped), AbortOutcome::Cancelled);

    assert_eq!(ctx.run_tx(), 1);
    assert!(keep.try_result().unwrap().is_ok());
    assert_eq!(dropped.try_result(), Some(Err(Error::Aborted)));
    assert_eq!(mock.sent().len(), 1);
}

#[test]
fn abort_after_completion_is_not_found() {
    let (mut ctx, _mock) = mock_context();
    let dev = ctx.device();
    let pool = BufferPool::new();
    dev.open(0, pool.adapter()).unwrap();

    let h = dev.write(ETH_IP, PEER, pool.insert(&[1; 4]), 4, false).unwrap();
    ctx.run_tx();

    assert_eq!(dev.abort(&h), AbortOutcome::NotFound);
    assert!(h.try_result().unwrap().is_ok(), "completion must be untouched");
}
