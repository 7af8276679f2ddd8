//! Parameter introspection for effect controls.
//!
//! Every effect exposes its control record through [`ParameterInfo`]:
//! index-based access plus a [`ParamDescriptor`] per parameter carrying
//! display names, unit, range, default, and a stable string key. The
//! [`ParameterBus`](crate::ParameterBus) captures the ranges at registration
//! time so it can clamp published values before they reach the audio path,
//! and the preset layer uses `string_id` as the persisted key.
//!
//! # Example
//!
//! ```rust
//! use stompbox_core::{ParameterInfo, ParamDescriptor};
//!
//! struct Level {
//!     gain_db: f32,
//! }
//!
//! impl ParameterInfo for Level {
//!     fn param_count(&self) -> usize { 1 }
//!
//!     fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
//!         match index {
//!             0 => Some(ParamDescriptor::gain_db("Level", "Level", -60.0, 12.0, 0.0)
//!                 .with_id("level")),
//!             _ => None,
//!         }
//!     }
//!
//!     fn get_param(&self, index: usize) -> f32 {
//!         if index == 0 { self.gain_db } else { 0.0 }
//!     }
//!
//!     fn set_param(&mut self, index: usize, value: f32) {
//!         if index == 0 { self.gain_db = value.clamp(-60.0, 12.0); }
//!     }
//! }
//!
//! let level = Level { gain_db: 0.0 };
//! assert_eq!(level.find_param_by_name("level"), Some(0));
//! ```

/// Capability flags for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamFlags(u8);

impl ParamFlags {
    /// No flags.
    pub const NONE: Self = Self(0);
    /// May be changed while audio runs.
    pub const AUTOMATABLE: Self = Self(1 << 0);
    /// Takes integer steps only (enumerations such as waveform shape).
    pub const STEPPED: Self = Self(1 << 1);

    /// True if every flag in `other` is set.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of both flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for ParamFlags {
    fn default() -> Self {
        Self::AUTOMATABLE
    }
}

/// Index-based access to an effect's control record.
pub trait ParameterInfo {
    /// Number of parameters.
    fn param_count(&self) -> usize;

    /// Descriptor for `index`, or `None` past the end.
    fn param_info(&self, index: usize) -> Option<ParamDescriptor>;

    /// Current value of `index` in descriptor units. Out-of-range indices
    /// return `0.0`.
    fn get_param(&self, index: usize) -> f32;

    /// Sets `index`, clamping to the descriptor range. Out-of-range indices
    /// are ignored.
    fn set_param(&mut self, index: usize, value: f32);

    /// Finds a parameter by name, short name, or string id (ASCII
    /// case-insensitive).
    fn find_param_by_name(&self, name: &str) -> Option<usize> {
        (0..self.param_count()).find(|&i| {
            self.param_info(i).is_some_and(|desc| {
                desc.name.eq_ignore_ascii_case(name)
                    || desc.short_name.eq_ignore_ascii_case(name)
                    || desc.string_id.eq_ignore_ascii_case(name)
            })
        })
    }
}

/// Metadata for one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full display name, e.g. "Pre-Delay".
    pub name: &'static str,
    /// Short name for small displays, e.g. "PreDly".
    pub short_name: &'static str,
    /// Display unit.
    pub unit: ParamUnit,
    /// Minimum value.
    pub min: f32,
    /// Maximum value.
    pub max: f32,
    /// Value at construction.
    pub default: f32,
    /// Suggested increment for encoders.
    pub step: f32,
    /// Stable key used by presets and the command line.
    pub string_id: &'static str,
    /// Capability flags.
    pub flags: ParamFlags,
}

impl ParamDescriptor {
    /// Generic parameter with an explicit unit and range.
    pub const fn custom(
        name: &'static str,
        short_name: &'static str,
        unit: ParamUnit,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit,
            min,
            max,
            default,
            step: 0.01,
            string_id: "",
            flags: ParamFlags::AUTOMATABLE,
        }
    }

    /// Wet/dry mix, 0-100 %, default 50 %.
    pub const fn mix() -> Self {
        Self::percent("Mix", "Mix", 50.0)
    }

    /// Modulation depth, 0-100 %, default 50 %.
    pub const fn depth() -> Self {
        Self::percent("Depth", "Depth", 50.0)
    }

    /// Feedback amount, 0-95 %, default 50 %.
    pub const fn feedback() -> Self {
        let mut desc = Self::percent("Feedback", "Fdbk", 50.0);
        desc.max = 95.0;
        desc
    }

    /// Percentage parameter, 0-100 %.
    pub const fn percent(name: &'static str, short_name: &'static str, default: f32) -> Self {
        let mut desc = Self::custom(name, short_name, ParamUnit::Percent, 0.0, 100.0, default);
        desc.step = 1.0;
        desc
    }

    /// Time parameter in milliseconds.
    pub const fn time_ms(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        let mut desc = Self::custom(name, short_name, ParamUnit::Milliseconds, min, max, default);
        desc.step = 1.0;
        desc
    }

    /// Gain or level parameter in decibels.
    pub const fn gain_db(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        let mut desc = Self::custom(name, short_name, ParamUnit::Decibels, min, max, default);
        desc.step = 0.5;
        desc
    }

    /// Frequency parameter in Hz.
    pub const fn frequency_hz(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        let mut desc = Self::custom(name, short_name, ParamUnit::Hertz, min, max, default);
        desc.step = 1.0;
        desc
    }

    /// LFO rate in Hz.
    pub const fn rate_hz(min: f32, max: f32, default: f32) -> Self {
        let mut desc = Self::frequency_hz("Rate", "Rate", min, max, default);
        desc.step = 0.05;
        desc
    }

    /// Enumerated parameter taking integer values `0..count`.
    pub const fn choice(
        name: &'static str,
        short_name: &'static str,
        count: u8,
        default: u8,
    ) -> Self {
        let mut desc = Self::custom(
            name,
            short_name,
            ParamUnit::None,
            0.0,
            (count - 1) as f32,
            default as f32,
        );
        desc.step = 1.0;
        desc.flags = ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED);
        desc
    }

    /// Sets the stable key used by presets and the command line.
    pub const fn with_id(mut self, string_id: &'static str) -> Self {
        self.string_id = string_id;
        self
    }

    /// Clamps a value to `[min, max]`.
    ///
    /// ```rust
    /// use stompbox_core::ParamDescriptor;
    ///
    /// let desc = ParamDescriptor::gain_db("Gain", "Gain", -60.0, 12.0, 0.0);
    /// assert_eq!(desc.clamp(-100.0), -60.0);
    /// assert_eq!(desc.clamp(100.0), 12.0);
    /// ```
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Clamps and, for stepped parameters, rounds to the nearest integer.
    #[inline]
    pub fn sanitize(&self, value: f32) -> f32 {
        let clamped = self.clamp(value);
        if self.flags.contains(ParamFlags::STEPPED) {
            libm::roundf(clamped)
        } else {
            clamped
        }
    }

    /// True if `value` lies within `[min, max]`.
    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

}

/// Display unit of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Decibels.
    Decibels,
    /// Hertz.
    Hertz,
    /// Milliseconds.
    Milliseconds,
    /// Percent.
    Percent,
    /// Ratio (n:1).
    Ratio,
    /// Dimensionless.
    None,
}

impl ParamUnit {
    /// Suffix appended when displaying a value.
    ///
    /// ```rust
    /// use stompbox_core::ParamUnit;
    ///
    /// assert_eq!(ParamUnit::Decibels.suffix(), " dB");
    /// assert_eq!(ParamUnit::Ratio.suffix(), ":1");
    /// ```
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Milliseconds => " ms",
            ParamUnit::Percent => "%",
            ParamUnit::Ratio => ":1",
            ParamUnit::None => "",
        }
    }
}
