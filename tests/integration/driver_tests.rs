//! Full driver: worker thread, periodic trigger, teardown.

use std::time::Duration;

use futures_lite::future;

use crate::mock_transport::{ETH_ARP, ETH_IP, MockTransport, PEER, STATION, frame};

use spinet::net::frame::MacAddr;
use spinet::{
    BufferPool, Completion, Driver, DriverConfig, Error, LoopbackTransport, RequestHandle,
    Transport,
};

fn fast_config() -> DriverConfig {
    DriverConfig {
        poll_interval_ms: 2,
        ..DriverConfig::default()
    }
}

/// Wait for a completion, giving up after a few seconds.
fn wait_for(h: &RequestHandle) -> Option<Completion> {
    future::block_on(future::or(async { Some(h.wait().await) }, async {
        async_io_mini::Timer::after(Duration::from_secs(5)).await;
        None
    }))
}

#[test]
fn loopback_round_trip_through_worker() {
    let driver = Driver::start(LoopbackTransport::new(STATION), &fast_config()).unwrap();
    let dev = driver.device();
    let pool = BufferPool::new();
    dev.open(0, pool.adapter()).unwrap();

    let bytes = frame(STATION, STATION, ETH_IP, b"through the worker");
    let inb = pool.alloc();
    let r = dev.read(ETH_IP, inb, true).unwrap();
    let w = dev.write(ETH_IP, STATION, pool.insert(&bytes), bytes.len(), true).unwrap();

    assert!(wait_for(&w).expect("write timed out").is_ok());
    let t = wait_for(&r).expect("read timed out").unwrap();
    assert!(t.raw);
    assert_eq!(pool.contents(inb).unwrap(), bytes);

    driver.shutdown();
}

#[test]
fn periodic_trigger_delivers_inbound_frames() {
    let mock = MockTransport::new();
    let driver = Driver::start(mock.clone(), &fast_config()).unwrap();
    let dev = driver.device();
    let pool = BufferPool::new();
    dev.open(0, pool.adapter()).unwrap();

    let buf = pool.alloc();
    let h = dev.read(ETH_ARP, buf, false).unwrap();
    mock.inject(frame(MacAddr::BROADCAST, PEER, ETH_ARP, &[4; 28]));

    let t = wait_for(&h).expect("read timed out").unwrap();
    assert!(t.broadcast);
    assert_eq!(t.src, PEER);
    assert_eq!(pool.contents(buf).unwrap(), vec![4; 28]);
}

#[test]
fn manual_trigger_wakes_receive_side() {
    let config = DriverConfig {
        poll_interval_ms: 60_000,
        ..DriverConfig::default()
    };
    let mock = MockTransport::new();
    let driver = Driver::start(mock.clone(), &config).unwrap();
    let dev = driver.device();
    let pool = BufferPool::new();
    dev.open(0, pool.adapter()).unwrap();

    let h = dev.read(ETH_IP, pool.alloc(), false).unwrap();
    mock.inject(frame(STATION, PEER, ETH_IP, &[1; 10]));
    dev.trigger_poll();

    assert!(wait_for(&h).expect("read timed out").is_ok());
}

#[test]
fn shutdown_aborts_pending_reads() {
    let driver = Driver::start(MockTransport::new(), &fast_config()).unwrap();
    let dev = driver.device();
    let pool = BufferPool::new();
    dev.open(0, pool.adapter()).unwrap();

    let h = dev.read(ETH_IP, pool.alloc(), false).unwrap();
    driver.shutdown();

    assert_eq!(h.try_result(), Some(Err(Error::Aborted)));
}

#[test]
fn requests_after_shutdown_are_refused() {
    let driver = Driver::start(LoopbackTransport::new(STATION), &fast_config()).unwrap();
    let dev = driver.device();
    let pool = BufferPool::new();
    dev.open(0, pool.adapter()).unwrap();
    driver.shutdown();

    assert!(!dev.is_open());
    let buf = pool.insert(&[9; 16]);
    assert_eq!(dev.write(ETH_IP, PEER, buf, 16, false).unwrap_err(), Error::BadArgument);
    assert_eq!(dev.broadcast(ETH_IP, buf, 16, false).unwrap_err(), Error::BadArgument);
    assert_eq!(dev.read(ETH_IP, pool.alloc(), false).unwrap_err(), Error::BadArgument);
    assert_eq!(dev.open(0, pool.adapter()), Err(Error::OpenFailed));
}

#[test]
fn device_outliving_a_dropped_driver_is_closed() {
    let driver = Driver::start(MockTransport::new(), &fast_config()).unwrap();
    let dev = driver.device();
    let pool = BufferPool::new();
    dev.open(0, pool.adapter()).unwrap();
    drop(driver);

    assert!(dev.read(ETH_ARP, pool.alloc(), true).is_err());
    assert_eq!(dev.open_count(), 0);
}

#[test]
fn dropping_the_driver_stops_the_worker() {
    let mock = MockTransport::new();
    let driver = Driver::start(mock.clone(), &fast_config()).unwrap();
    drop(driver);

    let polls = mock.log().receive_calls;
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(mock.log().receive_calls, polls, "worker still polling after drop");
}

#[test]
fn invalid_config_refused() {
    let config = DriverConfig {
        poll_interval_ms: 0,
        ..DriverConfig::default()
    };
    assert!(Driver::start(MockTransport::new(), &config).is_err());
}

struct DeadController;

impl Transport for DeadController {
    type Error = &'static str;

    fn init(&mut self) -> Result<(), &'static str> {
        Err("no controller on bus")
    }

    fn send(&mut self, _frame: &[u8]) -> Result<(), &'static str> {
        Ok(())
    }

    fn receive(&mut self, _buf: &mut [u8]) -> Result<Option<usize>, &'static str> {
        Ok(None)
    }

    fn keep_alive(&mut self) -> Result<(), &'static str> {
        Ok(())
    }

    fn local_address(&mut self) -> MacAddr {
        MacAddr::default()
    }
}

#[test]
fn transport_init_failure_is_fatal() {
    let err = Driver::start(DeadController, &DriverConfig::default())
        .err()
        .expect("start must fail");
    assert!(format!("{err:#}").contains("no controller on bus"));
}
