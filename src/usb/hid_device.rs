//! USB composite device - boot keyboard + CDC-ACM console.
//!
//! Initialises the Embassy USB stack on the nRF52840 hardware USB
//! peripheral and exposes one HID keyboard endpoint plus a serial console.

use crate::config;
use crate::error::Error;
use crate::hid::keyboard::{KeyboardReport, KEYBOARD_REPORT_DESCRIPTOR, KEYBOARD_REPORT_SIZE};
use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_nrf::{self, bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_usb::class::cdc_acm::{self, CdcAcmClass};
use embassy_usb::class::hid::{Config as HidConfig, HidWriter, State};
use embassy_usb::{Builder, Config, UsbDevice};
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    USBD => embassy_nrf::usb::InterruptHandler<peripherals::USBD>;
    CLOCK_POWER => embassy_nrf::usb::vbus_detect::InterruptHandler;
});

pub type UsbDriver = Driver<'static, peripherals::USBD, HardwareVbusDetect>;
pub type KeyboardWriter = HidWriter<'static, UsbDriver, KEYBOARD_REPORT_SIZE>;
pub type ConsoleClass = CdcAcmClass<'static, UsbDriver>;

static KB_STATE: StaticCell<State> = StaticCell::new();
static CDC_STATE: StaticCell<cdc_acm::State> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();

/// Keyboard reports from the relay loop to the HID endpoint.
pub static REPORTS: Channel<CriticalSectionRawMutex, KeyboardReport, { config::HID_REPORT_QUEUE_DEPTH }> =
    Channel::new();

/// Build result containing the USB device runner and the two classes.
pub struct UsbParts {
    pub device: UsbDevice<'static, UsbDriver>,
    pub keyboard: KeyboardWriter,
    pub console: ConsoleClass,
}

/// Initialise the USB stack and create the composite device.
///
/// Must be called exactly once.  All static buffers are consumed here.
pub fn init(usbd: peripherals::USBD) -> UsbParts {
    let driver = Driver::new(usbd, Irqs, HardwareVbusDetect::new(Irqs));

    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = 100; // mA
    usb_config.max_packet_size_0 = 64;

    // HID + CDC needs interface association descriptors.
    usb_config.device_class = 0xEF;
    usb_config.device_sub_class = 0x02;
    usb_config.device_protocol = 0x01;
    usb_config.composite_with_iads = true;

    let mut builder = Builder::new(
        driver,
        usb_config,
        USB_CONFIG_DESC.init([0u8; 256]),
        USB_BOS_DESC.init([0u8; 256]),
        USB_MSOS_DESC.init([0u8; 256]),
        USB_CTRL_BUF.init([0u8; 128]),
    );

    let kb_config = HidConfig {
        report_descriptor: KEYBOARD_REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: KEYBOARD_REPORT_SIZE as u16,
    };
    let keyboard = HidWriter::new(&mut builder, KB_STATE.init(State::new()), kb_config);

    let console = CdcAcmClass::new(
        &mut builder,
        CDC_STATE.init(cdc_acm::State::new()),
        config::CONSOLE_PACKET_SIZE,
    );

    let device = builder.build();

    info!("USB composite device initialised (keyboard + console)");

    UsbParts {
        device,
        keyboard,
        console,
    }
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
///
/// This handles USB enumeration, suspend/resume, and endpoint servicing.
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    device.run().await
}

/// HID report forwarding task - drains [`REPORTS`] into the keyboard
/// endpoint.
pub async fn hid_writer_task(mut keyboard: KeyboardWriter) -> ! {
    info!("HID writer task started - waiting for reports");

    let mut buf = [0u8; KEYBOARD_REPORT_SIZE];
    loop {
        let report = REPORTS.receive().await;
        let n = report.serialize(&mut buf);
        if keyboard.write(&buf[..n]).await.is_err() {
            warn!("{}: keyboard write failed", Error::Usb);
        }
    }
}

/// Queue a report without waiting. Returns `false` when the queue is full.
pub fn try_queue(report: KeyboardReport) -> bool {
    REPORTS.try_send(report).is_ok()
}
