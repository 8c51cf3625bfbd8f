//! Battery pack telemetry
//!
//! The pack's BMS publishes one value per topic under
//! `emkit/<device>/<index>/<field>`. Each field drives one on-screen
//! label: numeric fields get a unit suffix, the two charger state fields
//! are decoded from a single ASCII digit and only redrawn when the digit
//! changes.

use heapless::String;

use crate::broker::Broker;

/// Longest label text in bytes
pub const LABEL_LEN: usize = 24;

/// Label text buffer
pub type LabelText = String<LABEL_LEN>;

/// Font size class of a label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LabelSize {
    Large,
    Mid,
}

/// Color class of a label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tone {
    /// Numeric reading
    Plain,
    /// Charger state, nothing flowing
    Idle,
    /// Charger state, actively charging or discharging
    Active,
}

/// One published telemetry value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryField {
    StateOfCharge,
    PackVoltage,
    PackCurrent,
    CellVoltageMax,
    CellTempMax,
    CellVoltageMin,
    CellTempMin,
    ChargeState,
    DischargeState,
}

impl TelemetryField {
    /// All fields in screen order
    pub const ALL: [TelemetryField; 9] = [
        TelemetryField::StateOfCharge,
        TelemetryField::PackVoltage,
        TelemetryField::PackCurrent,
        TelemetryField::CellVoltageMax,
        TelemetryField::CellTempMax,
        TelemetryField::CellVoltageMin,
        TelemetryField::CellTempMin,
        TelemetryField::ChargeState,
        TelemetryField::DischargeState,
    ];

    /// Position in [`TelemetryField::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Subscription filter
    pub const fn filter(self) -> &'static str {
        match self {
            TelemetryField::StateOfCharge => "emkit/+/+/socofpack",
            TelemetryField::PackVoltage => "emkit/+/+/voltageofpack",
            TelemetryField::PackCurrent => "emkit/+/+/currentofpack",
            TelemetryField::CellVoltageMax => "emkit/+/+/cellvmax",
            TelemetryField::CellTempMax => "emkit/+/+/celltmax",
            TelemetryField::CellVoltageMin => "emkit/+/+/cellvmin",
            TelemetryField::CellTempMin => "emkit/+/+/celltmin",
            TelemetryField::ChargeState => "emkit/+/+/bmschstate",
            TelemetryField::DischargeState => "emkit/+/+/bmsdschstate",
        }
    }

    /// Unit appended to numeric values
    pub const fn unit(self) -> &'static str {
        match self {
            TelemetryField::StateOfCharge => "%",
            TelemetryField::PackVoltage
            | TelemetryField::CellVoltageMax
            | TelemetryField::CellVoltageMin => "V",
            TelemetryField::PackCurrent => "A",
            TelemetryField::CellTempMax | TelemetryField::CellTempMin => "\u{b0}",
            TelemetryField::ChargeState | TelemetryField::DischargeState => "",
        }
    }

    /// Font size class
    pub const fn size(self) -> LabelSize {
        match self {
            TelemetryField::StateOfCharge
            | TelemetryField::PackVoltage
            | TelemetryField::PackCurrent => LabelSize::Large,
            _ => LabelSize::Mid,
        }
    }

    /// Vertical offset of the label center from the screen center, pixels
    pub const fn y_offset(self) -> i16 {
        match self {
            TelemetryField::StateOfCharge => 40,
            TelemetryField::PackVoltage => -40,
            TelemetryField::PackCurrent => 0,
            TelemetryField::CellVoltageMax => -140,
            TelemetryField::CellTempMax => -110,
            TelemetryField::CellVoltageMin => 140,
            TelemetryField::CellTempMin => 110,
            TelemetryField::ChargeState => -80,
            TelemetryField::DischargeState => 77,
        }
    }

    /// Text shown before the first value arrives
    pub const fn placeholder(self) -> &'static str {
        match self.size() {
            LabelSize::Large => "---",
            LabelSize::Mid => "     ",
        }
    }
}

/// Charger state as reported by the BMS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChargeState {
    Disable,
    Waiting,
    Charging,
    Ballancing,
    Charged,
    OverCool,
    OverHeat,
    Unknown,
}

impl ChargeState {
    /// Decode the ASCII digit sent by the BMS
    pub fn from_code(code: u8) -> Self {
        match code {
            b'0' => ChargeState::Disable,
            b'1' => ChargeState::Waiting,
            b'2' => ChargeState::Charging,
            b'3' => ChargeState::Ballancing,
            b'4' => ChargeState::Charged,
            b'5' => ChargeState::OverCool,
            b'6' => ChargeState::OverHeat,
            _ => ChargeState::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChargeState::Disable => "Disable",
            ChargeState::Waiting => "Waiting",
            ChargeState::Charging => "Charging",
            ChargeState::Ballancing => "Ballancing",
            ChargeState::Charged => "Charged",
            ChargeState::OverCool => "OverCool",
            ChargeState::OverHeat => "OverHeat",
            ChargeState::Unknown => "Unknown",
        }
    }

    pub fn is_active(self) -> bool {
        self == ChargeState::Charging
    }
}

/// Discharge switch state as reported by the BMS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DischargeState {
    Disable,
    Waiting,
    Discharging,
    Stopped,
    Discharged,
    OverCool,
    OverHeat,
    Unknown,
}

impl DischargeState {
    /// Decode the ASCII digit sent by the BMS
    pub fn from_code(code: u8) -> Self {
        match code {
            b'0' => DischargeState::Disable,
            b'1' => DischargeState::Waiting,
            b'2' => DischargeState::Discharging,
            b'3' => DischargeState::Stopped,
            b'4' => DischargeState::Discharged,
            b'5' => DischargeState::OverCool,
            b'6' => DischargeState::OverHeat,
            _ => DischargeState::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DischargeState::Disable => "Disable",
            DischargeState::Waiting => "Waiting",
            DischargeState::Discharging => "Discharging",
            DischargeState::Stopped => "Stopped",
            DischargeState::Discharged => "Discharged",
            DischargeState::OverCool => "OverCool",
            DischargeState::OverHeat => "OverHeat",
            DischargeState::Unknown => "Unknown",
        }
    }

    pub fn is_active(self) -> bool {
        self == DischargeState::Discharging
    }
}

/// Current content of one label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub text: LabelText,
    pub tone: Tone,
    /// Changed since the renderer last picked it up
    pub dirty: bool,
}

/// All telemetry labels plus the subscriptions that feed them
pub struct TelemetryBoard {
    broker: Broker<TelemetryField, 9>,
    labels: [Label; 9],
    last_charge: Option<u8>,
    last_discharge: Option<u8>,
}

impl TelemetryBoard {
    /// Subscribe every field and show placeholders
    pub fn new() -> Self {
        let mut broker = Broker::new();
        for field in TelemetryField::ALL {
            let subscribed = broker.subscribe(field.filter(), field);
            debug_assert!(subscribed.is_ok());
        }

        let labels = TelemetryField::ALL.map(|field| Label {
            text: truncated(field.placeholder(), ""),
            tone: Tone::Plain,
            dirty: true,
        });

        Self {
            broker,
            labels,
            last_charge: None,
            last_discharge: None,
        }
    }

    /// Apply a publish; returns how many labels changed
    pub fn publish(&mut self, topic: &str, payload: &[u8]) -> usize {
        let mut changed = 0;
        for field in self.broker.matching(topic) {
            if apply(
                &mut self.labels[field.index()],
                &mut self.last_charge,
                &mut self.last_discharge,
                field,
                payload,
            ) {
                changed += 1;
            }
        }
        changed
    }

    /// Label for `field`
    pub fn label(&self, field: TelemetryField) -> &Label {
        &self.labels[field.index()]
    }

    /// Mark a label as drawn
    pub fn mark_drawn(&mut self, field: TelemetryField) {
        self.labels[field.index()].dirty = false;
    }

    /// Fields changed since they were last drawn
    pub fn dirty_fields(&self) -> impl Iterator<Item = TelemetryField> + '_ {
        TelemetryField::ALL
            .into_iter()
            .filter(move |field| self.labels[field.index()].dirty)
    }
}

impl Default for TelemetryBoard {
    fn default() -> Self {
        Self::new()
    }
}

fn apply(
    label: &mut Label,
    last_charge: &mut Option<u8>,
    last_discharge: &mut Option<u8>,
    field: TelemetryField,
    payload: &[u8],
) -> bool {
    let code = payload.first().copied().unwrap_or(0);
    match field {
        TelemetryField::ChargeState => {
            if *last_charge == Some(code) {
                return false;
            }
            *last_charge = Some(code);
            let state = ChargeState::from_code(code);
            set(label, state.label(), "", state_tone(state.is_active()));
        }
        TelemetryField::DischargeState => {
            if *last_discharge == Some(code) {
                return false;
            }
            *last_discharge = Some(code);
            let state = DischargeState::from_code(code);
            set(label, state.label(), "", state_tone(state.is_active()));
        }
        _ => {
            let Ok(value) = core::str::from_utf8(payload) else {
                return false;
            };
            set(label, value.trim(), field.unit(), Tone::Plain);
        }
    }
    true
}

fn state_tone(active: bool) -> Tone {
    if active {
        Tone::Active
    } else {
        Tone::Idle
    }
}

fn set(label: &mut Label, value: &str, unit: &str, tone: Tone) {
    label.text = truncated(value, unit);
    label.tone = tone;
    label.dirty = true;
}

/// `value` followed by `unit`, cut at a character boundary if too long
fn truncated(value: &str, unit: &str) -> LabelText {
    let mut text = LabelText::new();
    for ch in value.chars().chain(unit.chars()) {
        if text.push(ch).is_err() {
            break;
        }
    }
    text
}
