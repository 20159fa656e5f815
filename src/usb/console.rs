//! CDC-ACM debug console.
//!
//! Serves the `?` and `c` commands from [`crate::console`]. Statistics live
//! in [`STATS`], written by the relay loop and read here as a snapshot, so
//! formatting a report never runs with interrupts masked. `c` is forwarded
//! to the relay loop over [`COMMANDS`] because only the loop may touch the
//! scheduler.

use super::hid_device::ConsoleClass;
use crate::config;
use crate::console::{self, Command};
use crate::error::Error;
use crate::scheduler::SchedulerConfig;
use crate::stats::SharedStats;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_usb::driver::EndpointError;

/// Worst case: every key seen, plus header and footer.
const REPORT_CAPACITY: usize = 64 * config::KEY_COUNT + 256;

/// Relay statistics shared between the relay loop and the console.
pub static STATS: SharedStats = SharedStats::new();

/// Console commands for the relay loop.
pub static COMMANDS: Channel<CriticalSectionRawMutex, Command, 4> = Channel::new();

/// Serve the console forever - must be spawned as a dedicated Embassy task.
pub async fn console_task(mut class: ConsoleClass, scheduler: SchedulerConfig) -> ! {
    info!("Console task started");

    let mut out: heapless::String<REPORT_CAPACITY> = heapless::String::new();
    let mut packet = [0u8; config::CONSOLE_PACKET_SIZE as usize];

    loop {
        class.wait_connection().await;
        info!("Console connected");

        out.clear();
        if console::write_banner(&mut out, &scheduler).is_err() {
            warn!("{}: banner", Error::BufferOverflow);
        }
        if send(&mut class, out.as_bytes()).await.is_err() {
            continue;
        }

        loop {
            let n = match class.read_packet(&mut packet).await {
                Ok(n) => n,
                Err(_) => break,
            };

            out.clear();
            for command in packet[..n].iter().copied().filter_map(Command::parse) {
                let written = match command {
                    Command::Report => STATS.write_report(&mut out),
                    Command::Clear => {
                        let accepted = COMMANDS.try_send(Command::Clear).is_ok();
                        if !accepted {
                            warn!("Console command queue full");
                        }
                        console::write_cleared(&mut out, accepted)
                    }
                };
                if written.is_err() {
                    warn!("{}: console output truncated", Error::BufferOverflow);
                }
            }
            if send(&mut class, out.as_bytes()).await.is_err() {
                break;
            }
        }
        info!("Console disconnected");
    }
}

async fn send(class: &mut ConsoleClass, bytes: &[u8]) -> Result<(), EndpointError> {
    let max = class.max_packet_size() as usize;
    for chunk in bytes.chunks(max) {
        class.write_packet(chunk).await?;
    }
    // A full-size final packet needs a zero-length packet to end the transfer.
    if !bytes.is_empty() && bytes.len() % max == 0 {
        class.write_packet(&[]).await?;
    }
    Ok(())
}

/// Drain pending console commands into `apply`. Called from the relay loop.
pub fn drain_commands(mut apply: impl FnMut(Command)) {
    while let Ok(command) = COMMANDS.try_receive() {
        apply(command);
    }
}
