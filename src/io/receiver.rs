use std::{
    io,
    net::{Ipv4Addr, SocketAddr, UdpSocket},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
};

use log::{debug, error, info};
use nalgebra::UnitQuaternion;

use crate::{
    io::wire::{self, SensorSample},
    math::frame::AxisMap,
    utils::latest::LatestCell,
};

/// Background UDP ingestor for the sensor stream.
///
/// Owns the write side of the shared sample slot: every valid datagram
/// overwrites the slot with the latest converted sample, malformed datagrams
/// are dropped and logged. The receive loop blocks on the socket without a
/// timeout; [`SensorReceiver::shutdown`] stops it cooperatively by raising
/// the stop flag and waking the pending receive with a loopback datagram.
#[derive(Debug)]
pub struct SensorReceiver {
    slot: Arc<LatestCell<SensorSample>>,
    stop: Arc<AtomicBool>,
    socket: UdpSocket,
    local_addr: SocketAddr,
    handle: Option<JoinHandle<()>>,
}

impl SensorReceiver {
    /// Binds `0.0.0.0:port` and spawns the receive thread. Port 0 asks the
    /// OS for an ephemeral port (configuration validation rejects it, but it
    /// is useful for tests; see [`SensorReceiver::local_addr`]).
    pub fn bind(port: u16, axis_map: AxisMap) -> io::Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, port))?;
        let local_addr = socket.local_addr()?;

        let slot = Arc::new(LatestCell::new());
        let stop = Arc::new(AtomicBool::new(false));

        let handle = {
            let socket = socket.try_clone()?;
            let slot = slot.clone();
            let stop = stop.clone();

            thread::Builder::new()
                .name("sensor-receiver".to_string())
                .spawn(move || receive_loop(socket, axis_map, slot, stop))?
        };

        info!("UDP sensor receiver listening on {local_addr}");

        Ok(SensorReceiver {
            slot,
            stop,
            socket,
            local_addr,
            handle: Some(handle),
        })
    }

    /// Shared slot holding the latest sample; the read side for a consumer.
    pub fn slot(&self) -> Arc<LatestCell<SensorSample>> {
        self.slot.clone()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Latest converted orientation, if any sample has arrived yet.
    pub fn current_orientation(&self) -> Option<UnitQuaternion<f64>> {
        self.slot.peek().map(|s| s.quat)
    }

    /// Raises the stop flag, wakes the blocked receive and joins the thread.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        self.stop.store(true, Ordering::Relaxed);

        // The receive has no timeout; an empty datagram to ourselves forces
        // the pending call to return so the loop can observe the flag.
        let wake = SocketAddr::new(Ipv4Addr::LOCALHOST.into(), self.local_addr.port());
        if let Err(e) = self.socket.send_to(&[], wake) {
            error!("Failed to wake receiver for shutdown: {e}");
        }

        if handle.join().is_err() {
            error!("Sensor receiver thread panicked");
        } else {
            info!("UDP sensor receiver stopped");
        }
    }
}

impl Drop for SensorReceiver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn receive_loop(
    socket: UdpSocket,
    axis_map: AxisMap,
    slot: Arc<LatestCell<SensorSample>>,
    stop: Arc<AtomicBool>,
) {
    let mut buf = [0u8; 1024];

    loop {
        if stop.load(Ordering::Relaxed) {
            break;
        }

        match socket.recv(&mut buf) {
            Ok(len) => match wire::parse_datagram(&buf[..len], &axis_map) {
                Ok(sample) => slot.publish(sample),
                Err(e) => debug!("Dropping malformed datagram ({len} bytes): {e}"),
            },
            Err(e) => {
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                error!("Error receiving sensor data: {e}");
            }
        }
    }
}
