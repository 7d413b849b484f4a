use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::digital::OutputPin;
use log::{debug, warn};

use crate::chip_select::ChipSelect;
use crate::config::{Config, INTERRUPT_DEFAULT_VALUE};
use crate::error::{ExpanderError, TransportFault};
use crate::frame::{self, ControlBytes, HardwareAddress};
use crate::registers::{Port, Register, RegisterAddress};
use crate::state::{Completion, CompletionSignal, State, StateMachine, Transaction};
use crate::transport::{with_transport, SharedTransport, TransferMode, Transport};

/// Outcome of issuing a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress<T> {
    /// The transfer finished before the call returned (polling mode).
    Complete(T),
    /// The frame was submitted and the device stays busy until a
    /// [`Completion`] is delivered (interrupt mode).
    InFlight,
}

/// Interrupt input trigger modes for pins configured as inputs.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum InterruptMode {
    /// Interrupts are disabled.
    None,
    /// Raised while the input is `HIGH`, i.e. on the `LOW` to `HIGH` transition.
    ActiveHigh,
    /// Raised while the input is `LOW`, i.e. on the `HIGH` to `LOW` transition.
    ActiveLow,
    /// Raised on every change of the input.
    BothEdges,
}

/// One MCP23S17 on a (possibly shared) SPI bus.
///
/// The transport is borrowed, so several expanders can sit on the same bus,
/// each with its own chip-select line and hardware address. The control bytes
/// are derived from the device's own [`HardwareAddress`] when it is created.
///
/// Every transaction goes through the state machine in [`crate::state`]: a new
/// one is refused with [`ExpanderError::Busy`] unless the device is idle.
pub struct Expander<'a, M: RawMutex, T, CS> {
    transport: &'a SharedTransport<M, T>,
    chip_select: ChipSelect<CS>,
    identity: HardwareAddress,
    control: ControlBytes,
    config: Config,
    machine: StateMachine,
    completion: Option<&'a CompletionSignal<M>>,
}

impl<'a, M, T, CS> Expander<'a, M, T, CS>
where
    M: RawMutex,
    T: Transport,
    CS: OutputPin,
{
    /// Create the driver without touching the chip.
    ///
    /// Most users want [`Expander::initialize`], which also enables hardware
    /// addressing.
    pub fn new(
        identity: HardwareAddress,
        transport: &'a SharedTransport<M, T>,
        chip_select: ChipSelect<CS>,
        config: Config,
    ) -> Self {
        Expander {
            transport,
            chip_select,
            identity,
            control: ControlBytes::for_address(identity),
            config,
            machine: StateMachine::new(),
            completion: None,
        }
    }

    /// Create the driver and program the chip.
    ///
    /// Writes `IOCON` (through the address belonging to `port`) with `HAEN`
    /// set plus the configured polarity/slew/sequencing bits. With
    /// [`Config::interrupt_on_change`] it also sets `DEFVAL` to
    /// [`INTERRUPT_DEFAULT_VALUE`] and enables interrupt-on-change on all eight
    /// pins of `port`.
    ///
    /// The setup writes are always polled, whatever [`Config::mode`] says.
    pub fn initialize(
        identity: HardwareAddress,
        transport: &'a SharedTransport<M, T>,
        chip_select: ChipSelect<CS>,
        port: Port,
        config: Config,
    ) -> Result<Self, ExpanderError> {
        let mut expander = Self::new(identity, transport, chip_select, config);
        expander.chip_select.deselect()?;

        expander.setup(
            RegisterAddress::new(Register::IoConfig, port),
            config.iocon_value(),
        )?;

        if config.interrupt_on_change {
            expander.setup(
                RegisterAddress::new(Register::DefaultValue, port),
                INTERRUPT_DEFAULT_VALUE,
            )?;
            expander.setup(RegisterAddress::new(Register::InterruptEnable, port), 0xFF)?;
        }

        debug!(
            "expander {} initialized on port {:?}, {:?}",
            identity.bits(),
            port,
            config.mode
        );
        Ok(expander)
    }

    /// Attach the channel on which the transport posts completions.
    pub fn with_completion(mut self, signal: &'a CompletionSignal<M>) -> Self {
        self.completion = Some(signal);
        self
    }

    #[allow(missing_docs)]
    pub fn identity(&self) -> HardwareAddress {
        self.identity
    }

    #[allow(missing_docs)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[allow(missing_docs)]
    pub fn state(&self) -> State {
        self.machine.state()
    }

    #[allow(missing_docs)]
    pub fn is_idle(&self) -> bool {
        self.machine.state() == State::Idle
    }

    /// Register and data of the last write that was started.
    pub fn last_write(&self) -> Option<(RegisterAddress, u8)> {
        self.machine.last_write()
    }

    /// Register and value of the last read that completed.
    pub fn last_read(&self) -> Option<(RegisterAddress, u8)> {
        self.machine.last_read()
    }

    #[allow(missing_docs)]
    pub fn read_control_byte(&self) -> u8 {
        self.control.read
    }

    #[allow(missing_docs)]
    pub fn write_control_byte(&self) -> u8 {
        self.control.write
    }

    /// Destroys the driver and releases the chip-select pin.
    pub fn release(self) -> CS {
        self.chip_select.into_inner()
    }

    /// Write `data` to `register`.
    pub fn write_register(
        &mut self,
        register: RegisterAddress,
        data: u8,
    ) -> Result<Progress<()>, ExpanderError> {
        if register.register().is_read_only() {
            warn!("{:?} is read-only", register);
            return Err(ExpanderError::Parameter);
        }
        match self.config.mode {
            TransferMode::Polling => self.write_polled(register, data).map(Progress::Complete),
            TransferMode::Interrupt => self
                .write_submitted(register, data)
                .map(|()| Progress::InFlight),
        }
    }

    /// Read `register`.
    ///
    /// In interrupt mode the value arrives with the completion, see
    /// [`Expander::complete`].
    pub fn read_register(&mut self, register: RegisterAddress) -> Result<Progress<u8>, ExpanderError> {
        match self.config.mode {
            TransferMode::Polling => self.read_polled(register).map(Progress::Complete),
            TransferMode::Interrupt => self.read_submitted(register).map(|()| Progress::InFlight),
        }
    }

    /// Set the direction of all pins of `port`: bit = 1 is an input, bit = 0 an output.
    pub fn configure_direction(&mut self, port: Port, mask: u8) -> Result<Progress<()>, ExpanderError> {
        self.write_register(RegisterAddress::new(Register::Direction, port), mask)
    }

    /// Enable the 100k pull-ups of the pins whose bit is 1.
    pub fn configure_pull_ups(&mut self, port: Port, mask: u8) -> Result<Progress<()>, ExpanderError> {
        self.write_register(RegisterAddress::new(Register::PullUp, port), mask)
    }

    /// Invert the `GPIO` reading of the pins whose bit is 1.
    pub fn configure_polarity(&mut self, port: Port, mask: u8) -> Result<Progress<()>, ExpanderError> {
        self.write_register(RegisterAddress::new(Register::Polarity, port), mask)
    }

    /// Set the output levels of `port`.
    pub fn write_port(&mut self, port: Port, value: u8) -> Result<Progress<()>, ExpanderError> {
        self.write_register(RegisterAddress::new(Register::Gpio, port), value)
    }

    #[allow(missing_docs)]
    pub fn write_output_latch(&mut self, port: Port, value: u8) -> Result<Progress<()>, ExpanderError> {
        self.write_register(RegisterAddress::new(Register::OutputLatch, port), value)
    }

    /// Read the pin levels of `port`.
    pub fn read_port(&mut self, port: Port) -> Result<Progress<u8>, ExpanderError> {
        self.read_register(RegisterAddress::new(Register::Gpio, port))
    }

    /// Which pins of `port` caused the pending interrupt.
    pub fn read_interrupt_flags(&mut self, port: Port) -> Result<Progress<u8>, ExpanderError> {
        self.read_register(RegisterAddress::new(Register::InterruptFlag, port))
    }

    /// Port value captured when the interrupt fired. Reading it clears the interrupt.
    pub fn read_interrupt_capture(&mut self, port: Port) -> Result<Progress<u8>, ExpanderError> {
        self.read_register(RegisterAddress::new(Register::InterruptCapture, port))
    }

    /// Set the pins in `mask` of `port` to the requested [`InterruptMode`].
    ///
    /// | Mode                           | `GPINTEN` | `INTCON` | `DEFVAL` |
    /// |--------------------------------|:---------:|:--------:|:--------:|
    /// | [`InterruptMode::None`]        |    `L`    |    `X`   |   `X`    |
    /// | [`InterruptMode::ActiveHigh`]  |    `H`    |    `H`   |   `L`    |
    /// | [`InterruptMode::ActiveLow`]   |    `H`    |    `H`   |   `H`    |
    /// | [`InterruptMode::BothEdges`]   |    `H`    |    `L`   |   `X`    |
    ///
    /// `X` = unchanged. Other pins keep their settings, so each register is
    /// read, modified and written back, which needs polling transfers. In
    /// interrupt mode this fails with [`ExpanderError::Parameter`].
    pub fn configure_interrupts(
        &mut self,
        port: Port,
        mask: u8,
        mode: InterruptMode,
    ) -> Result<(), ExpanderError> {
        if self.config.mode != TransferMode::Polling {
            return Err(ExpanderError::Parameter);
        }

        let gpinten = RegisterAddress::new(Register::InterruptEnable, port);
        let intcon = RegisterAddress::new(Register::InterruptControl, port);
        let defval = RegisterAddress::new(Register::DefaultValue, port);

        // GPINTEN goes last so the comparison is in place before the pins are
        // armed, otherwise a spurious interrupt can fire.
        match mode {
            InterruptMode::None => self.update_bits(gpinten, mask, false),
            InterruptMode::ActiveHigh => {
                self.update_bits(intcon, mask, true)?;
                self.update_bits(defval, mask, false)?;
                self.update_bits(gpinten, mask, true)
            }
            InterruptMode::ActiveLow => {
                self.update_bits(intcon, mask, true)?;
                self.update_bits(defval, mask, true)?;
                self.update_bits(gpinten, mask, true)
            }
            InterruptMode::BothEdges => {
                self.update_bits(intcon, mask, false)?;
                self.update_bits(gpinten, mask, true)
            }
        }
    }

    /// Deliver the end of the in-flight transfer (interrupt mode).
    ///
    /// For a write this releases chip-select. For a read the data byte is
    /// clocked in first. The device is idle afterwards in every case,
    /// including a failed transfer.
    pub fn complete(&mut self, event: Completion) -> Result<Transaction, ExpanderError> {
        let state = self.machine.state();
        debug!("expander {}: {:?} while {:?}", self.identity.bits(), event, state);

        match (state, event) {
            (State::Idle, _) => {
                warn!("completion with no transfer in flight");
                Err(ExpanderError::Parameter)
            }
            (_, Completion::Failed(fault)) => {
                self.machine.reset();
                self.chip_select.deselect()?;
                Err(fault.into())
            }
            (State::Writing, Completion::Done) => {
                let released = self.chip_select.deselect();
                let finished = self.machine.finish_write();
                released?;
                finished
            }
            (State::Reading, Completion::Done) => {
                let received = self.receive_byte();
                let released = self.chip_select.deselect();
                let finished = match received {
                    Ok(value) => self.machine.finish_read(value),
                    Err(error) => {
                        self.machine.reset();
                        Err(error)
                    }
                };
                released?;
                finished
            }
        }
    }

    /// Handle a completion posted on the attached [`CompletionSignal`], if any.
    pub fn poll_completion(&mut self) -> Option<Result<Transaction, ExpanderError>> {
        let event = self.completion?.try_take()?;
        Some(self.complete(event))
    }

    /// Wait for the in-flight transfer to be completed through the attached
    /// [`CompletionSignal`].
    ///
    /// Returns `Ok(None)` straight away if the device is already idle.
    pub async fn wait_idle(&mut self) -> Result<Option<Transaction>, ExpanderError> {
        if self.is_idle() {
            return Ok(None);
        }
        let signal = self.completion.ok_or(ExpanderError::Parameter)?;
        let event = signal.wait().await;
        self.complete(event).map(Some)
    }
}

impl<'a, M, T, CS> Expander<'a, M, T, CS>
where
    M: RawMutex,
    T: Transport,
    CS: OutputPin,
{
    fn setup(&mut self, register: RegisterAddress, data: u8) -> Result<(), ExpanderError> {
        self.write_polled(register, data).map_err(|error| {
            warn!("programming {:?} failed: {:?}", register, error);
            ExpanderError::Configuration(register)
        })
    }

    fn update_bits(&mut self, register: RegisterAddress, mask: u8, set: bool) -> Result<(), ExpanderError> {
        let current = self.read_polled(register)?;
        let data = if set { current | mask } else { current & !mask };
        self.write_polled(register, data)
    }

    fn write_polled(&mut self, register: RegisterAddress, data: u8) -> Result<(), ExpanderError> {
        self.machine.begin_write(register, data)?;
        let frame = frame::write_frame(self.control, register, data);
        debug!("expander {} -> {:02x?}", self.identity.bits(), frame);

        let sent = self.polled(|transport, timeout_ms| transport.transmit(&frame, timeout_ms));
        self.settle(sent, |machine, ()| machine.finish_write().map(|_| ()))
    }

    fn write_submitted(&mut self, register: RegisterAddress, data: u8) -> Result<(), ExpanderError> {
        self.machine.begin_write(register, data)?;
        let frame = frame::write_frame(self.control, register, data);
        debug!("expander {} => {:02x?}", self.identity.bits(), frame);

        let submitted = self.submitted(&frame);
        self.settle(submitted, |_, ()| Ok(()))
    }

    fn read_polled(&mut self, register: RegisterAddress) -> Result<u8, ExpanderError> {
        self.machine.begin_read(register)?;
        let frame = frame::read_frame(self.control, register);
        debug!("expander {} -> {:02x?}", self.identity.bits(), frame);

        let received = self.polled(|transport, timeout_ms| {
            transport.transmit(&frame, timeout_ms)?;
            let mut data = [0u8; 1];
            transport.receive(&mut data, timeout_ms)?;
            Ok(data[0])
        });
        self.settle(received, |machine, value| {
            machine.finish_read(value).map(|_| value)
        })
    }

    fn read_submitted(&mut self, register: RegisterAddress) -> Result<(), ExpanderError> {
        self.machine.begin_read(register)?;
        let frame = frame::read_frame(self.control, register);
        debug!("expander {} => {:02x?}", self.identity.bits(), frame);

        let submitted = self.submitted(&frame);
        self.settle(submitted, |_, ()| Ok(()))
    }

    /// Select, run `exchange` on the transport, deselect. Chip-select is
    /// released even when the exchange fails.
    fn polled<R>(
        &mut self,
        exchange: impl FnOnce(&mut T, u32) -> Result<R, TransportFault>,
    ) -> Result<R, ExpanderError> {
        let timeout_ms = self.config.timeout_ms;
        self.chip_select.select()?;
        let result = with_transport(self.transport, |transport| {
            exchange(transport, timeout_ms).map_err(ExpanderError::from)
        });
        let released = self.chip_select.deselect();
        let value = result?;
        released?;
        Ok(value)
    }

    /// Select and submit. Chip-select stays asserted until the completion
    /// unless the submission itself is refused.
    fn submitted(&mut self, frame: &[u8]) -> Result<(), ExpanderError> {
        self.chip_select.select()?;
        let result = with_transport(self.transport, |transport| {
            transport.submit(frame).map_err(ExpanderError::from)
        });
        if result.is_err() {
            self.chip_select.deselect()?;
        }
        result
    }

    fn receive_byte(&mut self) -> Result<u8, ExpanderError> {
        let timeout_ms = self.config.timeout_ms;
        with_transport(self.transport, |transport| {
            let mut data = [0u8; 1];
            transport.receive(&mut data, timeout_ms)?;
            Ok(data[0])
        })
    }

    /// Bring the state machine in line with the outcome of a transfer: finish
    /// on success, back to idle on failure.
    fn settle<R, S>(
        &mut self,
        outcome: Result<R, ExpanderError>,
        finish: impl FnOnce(&mut StateMachine, R) -> Result<S, ExpanderError>,
    ) -> Result<S, ExpanderError> {
        match outcome {
            Ok(value) => finish(&mut self.machine, value),
            Err(error) => {
                warn!("expander {}: transfer failed: {:?}", self.identity.bits(), error);
                self.machine.reset();
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use core::cell::RefCell;

    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embassy_sync::blocking_mutex::Mutex;
    use embassy_sync::signal::Signal;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State as PinState, Transaction as PinTransaction};
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    use crate::transport::SpiBusTransport;

    type MockBus = SharedTransport<NoopRawMutex, SpiBusTransport<SpiMock<u8>>>;

    fn mock_bus(expectations: &[SpiTransaction<u8>]) -> MockBus {
        Mutex::new(RefCell::new(SpiBusTransport::new(SpiMock::new(expectations))))
    }

    fn done(bus: MockBus) {
        let mut spi = bus.into_inner().into_inner().into_inner();
        spi.done();
    }

    fn address(bits: u8) -> HardwareAddress {
        HardwareAddress::new(bits).unwrap()
    }

    #[test]
    fn initialize_enables_hardware_addressing() {
        let bus = mock_bus(&[
            SpiTransaction::write_vec(vec![0b0100_0010, 0x0A, 0b0001_1010]),
            SpiTransaction::flush(),
        ]);
        let cs = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);

        let expander = Expander::initialize(
            address(0b001),
            &bus,
            ChipSelect::new(cs),
            Port::A,
            Config::default(),
        )
        .unwrap();

        assert!(expander.is_idle());
        assert_eq!(expander.write_control_byte(), 0b0100_0010);
        assert_eq!(
            expander.last_write(),
            Some((RegisterAddress::IOCONA, 0b0001_1010))
        );

        expander.release().done();
        done(bus);
    }

    #[test]
    fn initialize_with_interrupt_on_change() {
        let bus = mock_bus(&[
            SpiTransaction::write_vec(vec![0x44, 0x0B, 0x1A]),
            SpiTransaction::flush(),
            SpiTransaction::write_vec(vec![0x44, 0x07, 0x01]),
            SpiTransaction::flush(),
            SpiTransaction::write_vec(vec![0x44, 0x05, 0xFF]),
            SpiTransaction::flush(),
        ]);
        let cs = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);

        // Setup is polled even though the device runs interrupt driven afterwards.
        let expander = Expander::initialize(
            address(0b010),
            &bus,
            ChipSelect::new(cs),
            Port::B,
            Config::interrupt_driven(),
        )
        .unwrap();

        assert!(expander.is_idle());
        assert_eq!(expander.config().mode, TransferMode::Interrupt);

        expander.release().done();
        done(bus);
    }

    #[test]
    fn polled_read_returns_to_idle() {
        let bus = mock_bus(&[
            SpiTransaction::write_vec(vec![0x41, 0x12]),
            SpiTransaction::flush(),
            SpiTransaction::read(0xA5),
            SpiTransaction::flush(),
        ]);
        let cs = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);
        let mut expander = Expander::new(address(0), &bus, ChipSelect::new(cs), Config::default());

        let value = expander.read_port(Port::A).unwrap();

        assert_eq!(value, Progress::Complete(0xA5));
        assert_eq!(expander.state(), State::Idle);
        assert_eq!(expander.last_read(), Some((RegisterAddress::GPIOA, 0xA5)));

        expander.release().done();
        done(bus);
    }

    #[test]
    fn interrupt_write_waits_for_completion() {
        let bus = mock_bus(&[SpiTransaction::write_vec(vec![0x40, 0x14, 0x0F])]);
        let cs = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);
        let config = Config::default().with_mode(TransferMode::Interrupt);
        let mut expander = Expander::new(address(0), &bus, ChipSelect::new(cs), config);

        assert_eq!(
            expander.write_output_latch(Port::A, 0x0F),
            Ok(Progress::InFlight)
        );
        assert_eq!(expander.state(), State::Writing);

        // Nothing reaches the bus while the first write is in flight.
        assert_eq!(
            expander.write_port(Port::A, 0xF0),
            Err(ExpanderError::Busy)
        );
        assert_eq!(expander.read_port(Port::A), Err(ExpanderError::Busy));
        assert_eq!(
            expander.last_write(),
            Some((RegisterAddress::OLATA, 0x0F))
        );

        let finished = expander.complete(Completion::Done).unwrap();
        assert_eq!(
            finished,
            Transaction::Write {
                register: RegisterAddress::OLATA,
                data: 0x0F
            }
        );
        assert!(expander.is_idle());

        expander.release().done();
        done(bus);
    }

    #[test]
    fn interrupt_read_receives_on_completion() {
        let bus = mock_bus(&[
            SpiTransaction::write_vec(vec![0x47, 0x13]),
            SpiTransaction::read(0x3C),
            SpiTransaction::flush(),
        ]);
        let cs = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);
        let config = Config::default().with_mode(TransferMode::Interrupt);
        let mut expander = Expander::new(address(0b011), &bus, ChipSelect::new(cs), config);

        assert_eq!(expander.read_port(Port::B), Ok(Progress::InFlight));
        assert_eq!(expander.state(), State::Reading);

        let finished = expander.complete(Completion::Done).unwrap();
        assert_eq!(
            finished,
            Transaction::Read {
                register: RegisterAddress::GPIOB,
                value: 0x3C
            }
        );
        assert_eq!(expander.last_read(), Some((RegisterAddress::GPIOB, 0x3C)));
        assert!(expander.is_idle());

        expander.release().done();
        done(bus);
    }

    #[test]
    fn failed_completion_still_goes_idle() {
        let bus = mock_bus(&[SpiTransaction::write_vec(vec![0x40, 0x00, 0x00])]);
        let cs = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);
        let config = Config::default().with_mode(TransferMode::Interrupt);
        let mut expander = Expander::new(address(0), &bus, ChipSelect::new(cs), config);

        expander.configure_direction(Port::A, 0x00).unwrap();
        assert_eq!(
            expander.complete(Completion::Failed(TransportFault::Timeout)),
            Err(ExpanderError::Transport(TransportFault::Timeout))
        );
        assert!(expander.is_idle());

        expander.release().done();
        done(bus);
    }

    #[test]
    fn stray_completion_is_rejected() {
        let bus = mock_bus(&[]);
        let cs = PinMock::new(&[]);
        let mut expander = Expander::new(address(0), &bus, ChipSelect::new(cs), Config::default());

        assert_eq!(
            expander.complete(Completion::Done),
            Err(ExpanderError::Parameter)
        );

        expander.release().done();
        done(bus);
    }

    #[test]
    fn read_only_registers_are_not_written() {
        let bus = mock_bus(&[]);
        let cs = PinMock::new(&[]);
        let mut expander = Expander::new(address(0), &bus, ChipSelect::new(cs), Config::default());

        assert_eq!(
            expander.write_register(RegisterAddress::INTCAPB, 0),
            Err(ExpanderError::Parameter)
        );
        assert!(expander.is_idle());
        assert_eq!(expander.last_write(), None);

        expander.release().done();
        done(bus);
    }

    #[test]
    fn control_byte_varies_with_identity() {
        let bus = mock_bus(&[
            SpiTransaction::write_vec(vec![0x42, 0x12, 0x55]),
            SpiTransaction::flush(),
            SpiTransaction::write_vec(vec![0x44, 0x12, 0x55]),
            SpiTransaction::flush(),
        ]);
        let cs_1 = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);
        let cs_2 = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);

        let mut first = Expander::new(address(0b001), &bus, ChipSelect::new(cs_1), Config::default());
        let mut second = Expander::new(address(0b010), &bus, ChipSelect::new(cs_2), Config::default());

        assert_ne!(first.write_control_byte(), second.write_control_byte());
        assert_ne!(first.read_control_byte(), second.read_control_byte());

        first.write_port(Port::A, 0x55).unwrap();
        second.write_port(Port::A, 0x55).unwrap();

        first.release().done();
        second.release().done();
        done(bus);
    }

    #[test]
    fn configure_interrupts_needs_polling() {
        let bus = mock_bus(&[]);
        let cs = PinMock::new(&[]);
        let config = Config::default().with_mode(TransferMode::Interrupt);
        let mut expander = Expander::new(address(0), &bus, ChipSelect::new(cs), config);

        assert_eq!(
            expander.configure_interrupts(Port::A, 0x01, InterruptMode::BothEdges),
            Err(ExpanderError::Parameter)
        );

        expander.release().done();
        done(bus);
    }

    #[async_std::test]
    async fn wait_idle_takes_the_signalled_completion() {
        let bus = mock_bus(&[SpiTransaction::write_vec(vec![0x40, 0x0C, 0xFF])]);
        let cs = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);
        let signal: CompletionSignal<NoopRawMutex> = Signal::new();
        let config = Config::default().with_mode(TransferMode::Interrupt);
        let mut expander =
            Expander::new(address(0), &bus, ChipSelect::new(cs), config).with_completion(&signal);

        assert_eq!(expander.wait_idle().await, Ok(None));

        expander.configure_pull_ups(Port::A, 0xFF).unwrap();
        assert!(expander.poll_completion().is_none());

        // What the transfer-complete interrupt handler does.
        signal.signal(Completion::Done);

        let finished = expander.wait_idle().await.unwrap();
        assert_eq!(
            finished,
            Some(Transaction::Write {
                register: RegisterAddress::GPPUA,
                data: 0xFF
            })
        );
        assert!(expander.is_idle());

        expander.release().done();
        done(bus);
    }
}
