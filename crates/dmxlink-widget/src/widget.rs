use std::time::Instant;

use dmxlink_frame::labels;
use dmxlink_transport::{SerialLink, WidgetPort};
use tracing::{debug, info};

use crate::error::{Result, WidgetError};
use crate::exchange::{Exchange, ExchangeConfig};
use crate::params::{SyncState, WidgetIdentity, WidgetParameters, PARAMS_REPLY_LEN};
use crate::universe::{build_universe, DEFAULT_START_CODE, MAX_SLOTS, MIN_SLOTS};

/// A session with one widget.
///
/// Owns its port exclusively from open until drop. Every operation takes
/// `&mut self`: the protocol has no correlation identifiers, so at most one
/// request may be outstanding on the link at any time, and reply bytes are
/// attributed to requests purely by order. Callers on multiple threads must
/// share the handle behind a `Mutex` (or equivalent); the borrow rules make
/// interleaved exchanges impossible within a single handle.
pub struct DmxWidget<P = SerialLink> {
    exchange: Exchange<P>,
    params: WidgetParameters,
    firmware_version: u16,
    sync: SyncState,
    last_output: Option<Instant>,
}

impl DmxWidget<SerialLink> {
    /// Open a session on the named serial port.
    pub fn open(port_name: &str) -> Result<Self> {
        Self::open_with_config(port_name, ExchangeConfig::default())
    }

    /// Open a session with explicit exchange configuration.
    pub fn open_with_config(port_name: &str, config: ExchangeConfig) -> Result<Self> {
        let port = SerialLink::open(port_name)?;
        info!(port = %port_name, "widget session opened");
        Ok(Self::from_port_with_config(port, config))
    }
}

impl<P: WidgetPort> DmxWidget<P> {
    /// Build a session over an already-open port.
    pub fn from_port(port: P) -> Self {
        Self::from_port_with_config(port, ExchangeConfig::default())
    }

    /// Build a session over an already-open port with explicit configuration.
    pub fn from_port_with_config(port: P, config: ExchangeConfig) -> Self {
        Self {
            exchange: Exchange::with_config(port, config),
            params: WidgetParameters::default(),
            firmware_version: 0,
            sync: SyncState::Unsynchronized,
            last_output: None,
        }
    }

    /// Last-known parameters. Confirmed against the device only when
    /// [`DmxWidget::sync_state`] is [`SyncState::Synchronized`].
    pub fn parameters(&self) -> &WidgetParameters {
        &self.params
    }

    /// Firmware version from the most recent parameter query.
    pub fn firmware_version(&self) -> u16 {
        self.firmware_version
    }

    /// Current synchronization state of the in-memory parameter copy.
    pub fn sync_state(&self) -> SyncState {
        self.sync
    }

    fn fetch_parameters(&mut self) -> Result<(u16, WidgetParameters)> {
        let reply = self.exchange.request(
            labels::GET_PARAMETERS,
            &WidgetParameters::query_payload(),
            PARAMS_REPLY_LEN,
        )?;
        WidgetParameters::parse_reply(&reply)
    }

    /// Query the widget's parameters, refreshing the in-memory copy.
    pub fn get_parameters(&mut self) -> Result<&WidgetParameters> {
        let (firmware, params) = self.fetch_parameters()?;
        self.firmware_version = firmware;
        self.params = params;
        self.sync = SyncState::Synchronized;
        debug!(
            break_time = self.params.break_time,
            mark_after_break = self.params.mark_after_break_time,
            rate = self.params.output_rate,
            firmware,
            "parameters refreshed"
        );
        Ok(&self.params)
    }

    /// Write parameters to the widget, then read them back to confirm.
    ///
    /// The protocol carries no acknowledgement for a parameter set; the
    /// readback is the only confirmation. On mismatch the in-memory copy is
    /// left unchanged and the session drops to Unsynchronized; the caller
    /// retries or abandons. The in-memory copy never silently diverges from
    /// the device.
    pub fn set_parameters(&mut self, new: WidgetParameters) -> Result<()> {
        new.validate()?;
        self.sync = SyncState::Setting;
        match self.set_and_verify(&new) {
            Ok(firmware) => {
                self.firmware_version = firmware;
                self.params = new;
                self.sync = SyncState::Synchronized;
                Ok(())
            }
            Err(err) => {
                self.sync = SyncState::Unsynchronized;
                Err(err)
            }
        }
    }

    fn set_and_verify(&mut self, new: &WidgetParameters) -> Result<u16> {
        self.exchange
            .send(labels::SET_PARAMETERS, &new.set_payload())?;
        let (firmware, echoed) = self.fetch_parameters()?;

        for (field, requested, actual) in [
            ("break time", new.break_time, echoed.break_time),
            (
                "mark-after-break time",
                new.mark_after_break_time,
                echoed.mark_after_break_time,
            ),
            ("output rate", new.output_rate, echoed.output_rate),
        ] {
            if requested != actual {
                return Err(WidgetError::ParameterSync {
                    field,
                    requested,
                    actual,
                });
            }
        }
        Ok(firmware)
    }

    /// Set the break time, keeping every other parameter as-is.
    ///
    /// The wire protocol only carries full parameter records, so the single
    /// field rides along with the current values of the rest.
    pub fn set_break_time(&mut self, break_time: u8) -> Result<()> {
        let mut next = self.params.clone();
        next.break_time = break_time;
        self.set_parameters(next)
    }

    /// Set the mark-after-break time, keeping every other parameter as-is.
    pub fn set_mark_after_break_time(&mut self, mark_after_break_time: u8) -> Result<()> {
        let mut next = self.params.clone();
        next.mark_after_break_time = mark_after_break_time;
        self.set_parameters(next)
    }

    /// Set the output rate, keeping every other parameter as-is.
    pub fn set_output_rate(&mut self, output_rate: u8) -> Result<()> {
        let mut next = self.params.clone();
        next.output_rate = output_rate;
        self.set_parameters(next)
    }

    /// Query the widget's serial number.
    ///
    /// The firmware version is refreshed by parameter queries only, not by
    /// this call; the returned identity carries the last-known firmware.
    pub fn query_identity(&mut self) -> Result<WidgetIdentity> {
        let reply = self.exchange.request(labels::GET_SERIAL, &[], 4)?;
        let serial_number = u32::from_le_bytes([reply[0], reply[1], reply[2], reply[3]]);
        Ok(WidgetIdentity {
            firmware_version: self.firmware_version,
            serial_number,
        })
    }

    /// Present a universe to the widget.
    ///
    /// The widget hardware keeps re-emitting the current frame on the DMX
    /// line at its configured rate once told to start; software's job is to
    /// refresh the frame's *content*, not to busy-loop the link. This is
    /// the protocol's one write-without-read operation: no reply is
    /// solicited or awaited.
    pub fn send_universe(&mut self, start_code: u8, data: &[u8]) -> Result<()> {
        if data.len() < MIN_SLOTS || data.len() > MAX_SLOTS {
            return Err(WidgetError::UniverseSize(data.len()));
        }

        let mut payload = Vec::with_capacity(1 + data.len());
        payload.push(start_code);
        payload.extend_from_slice(data);

        self.exchange.send(labels::OUTPUT_ONLY_DMX, &payload)?;
        self.last_output = Some(Instant::now());
        Ok(())
    }

    /// Output a universe that is zero except at the given 1-based channels.
    ///
    /// Omitted channels are authoritatively zeroed; repeated calls replace
    /// the frame wholesale, they never merge with prior state.
    pub fn set_channels(&mut self, assignments: &[(u16, u8)]) -> Result<()> {
        let slots = build_universe(assignments)?;
        self.send_universe(DEFAULT_START_CODE, &slots)
    }

    /// Stop refreshing output and leave the link idle.
    ///
    /// If less than one output period has elapsed since the last universe
    /// send, the remainder of that period is waited out first so a trailing
    /// frame is not truncated mid-transmission, a bounded sleep of at most
    /// one period. An identity query then serves as an inert reply-bearing
    /// request that leaves the link in a clean request/reply state.
    ///
    /// The universe is not blanked: callers that want fixtures dark send an
    /// all-zero universe before stopping.
    pub fn stop_output(&mut self) -> Result<WidgetIdentity> {
        if let Some(last) = self.last_output.take() {
            let period = self.params.output_period();
            let elapsed = last.elapsed();
            if elapsed < period {
                std::thread::sleep(period - elapsed);
            }
        }
        debug!("output stopped, draining link");
        self.query_identity()
    }

    /// Consume the session and return the underlying port.
    pub fn into_port(self) -> P {
        self.exchange.into_inner()
    }
}

impl<P> std::fmt::Debug for DmxWidget<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DmxWidget")
            .field("sync", &self.sync)
            .field("firmware_version", &self.firmware_version)
            .field("last_output", &self.last_output)
            .finish()
    }
}
