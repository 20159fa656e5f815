//! Serial input - buffered UARTE0 receiver feeding the relay loop.
//!
//! Reception runs on `BufferedUarte`: DMA stays armed into a ring buffer
//! (TIMER0 counts received bytes through two PPI channels), so bytes keep
//! landing while this task is not running. The reader task drains the ring
//! into [`BYTES`]; the relay loop takes at most one byte per tick, and only
//! when it is not waiting on a blocked admission.

use crate::config;
use crate::error::Error;
use embassy_nrf::buffered_uarte::{self, BufferedUarte};
use embassy_nrf::gpio::AnyPin;
use embassy_nrf::peripherals::{PPI_CH0, PPI_CH1, PPI_GROUP0, TIMER0, UARTE0};
use embassy_nrf::uarte::{Baudrate, Config, Parity};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    UARTE0_UART0 => buffered_uarte::InterruptHandler<peripherals::UARTE0>;
});

pub type SerialPort = BufferedUarte<'static, UARTE0, TIMER0>;

static RX_RING: StaticCell<[u8; config::UART_RX_RING_SIZE]> = StaticCell::new();
static TX_RING: StaticCell<[u8; config::UART_TX_RING_SIZE]> = StaticCell::new();

/// Received bytes, oldest first.
pub static BYTES: Channel<CriticalSectionRawMutex, u8, { config::UART_QUEUE_DEPTH }> = Channel::new();

/// Peripherals the buffered receiver takes over.
pub struct SerialPins {
    pub uarte: UARTE0,
    pub timer: TIMER0,
    pub ppi_ch0: PPI_CH0,
    pub ppi_ch1: PPI_CH1,
    pub ppi_group: PPI_GROUP0,
    pub rxd: AnyPin,
    pub txd: AnyPin,
}

/// Configure UARTE0 (8N1, [`config::UART_BAUDRATE`]) with DMA ring buffers.
///
/// Must be called exactly once.
pub fn init(p: SerialPins) -> SerialPort {
    let mut uart_config = Config::default();
    uart_config.parity = Parity::EXCLUDED;
    uart_config.baudrate = baudrate(config::UART_BAUDRATE);

    let port = BufferedUarte::new(
        p.uarte,
        p.timer,
        p.ppi_ch0,
        p.ppi_ch1,
        p.ppi_group,
        Irqs,
        p.rxd,
        p.txd,
        uart_config,
        RX_RING.init([0u8; config::UART_RX_RING_SIZE]),
        TX_RING.init([0u8; config::UART_TX_RING_SIZE]),
    );
    info!("UART ready at {=u32} baud", config::UART_BAUDRATE);
    port
}

fn baudrate(rate: u32) -> Baudrate {
    match rate {
        9_600 => Baudrate::BAUD9600,
        19_200 => Baudrate::BAUD19200,
        38_400 => Baudrate::BAUD38400,
        57_600 => Baudrate::BAUD57600,
        230_400 => Baudrate::BAUD230400,
        _ => Baudrate::BAUD115200,
    }
}

/// Drain the receive ring forever - must be spawned as a dedicated Embassy
/// task.
///
/// A full [`BYTES`] queue drops the byte, the same way a UART FIFO overruns.
pub async fn run_reader(mut port: SerialPort) -> ! {
    info!("UART reader task started");

    let mut buf = [0u8; 32];
    loop {
        let n = match port.read(&mut buf).await {
            Ok(n) => n,
            Err(_) => {
                warn!("{}", Error::Uart);
                continue;
            }
        };
        for &byte in &buf[..n] {
            if BYTES.try_send(byte).is_err() {
                warn!("{}: dropped {=u8}", Error::BufferOverflow, byte);
            }
        }
    }
}

/// Next queued byte, if any.
pub fn try_next() -> Option<u8> {
    BYTES.try_receive().ok()
}
