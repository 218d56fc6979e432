//! Conversion results.

use crate::register::{InputMode, Polarity};

/// Full-scale code count of a 12-bit conversion.
pub const FULL_SCALE: u32 = 4096;

/// One 12-bit conversion result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sample {
    /// Straight binary, `0..=4095`.
    Unsigned(u16),
    /// Two's complement, `-2048..=2047`.
    Signed(i16),
}

impl Default for Sample {
    fn default() -> Self {
        Sample::Unsigned(0)
    }
}

impl Sample {
    /// Decode one result as read from the bus.
    ///
    /// The device frames every result as `1111 D11 D10 D9 D8`, `D7..D0`. Only
    /// bipolar differential conversions are two's complement; single-ended
    /// conversions are always straight binary.
    pub fn decode(bytes: [u8; 2], polarity: Polarity, input: InputMode) -> Self {
        let code = u16::from_be_bytes(bytes) & 0x0FFF;

        match (polarity, input) {
            (Polarity::Bipolar, InputMode::Differential) => {
                // Sign-extend from bit 11.
                Sample::Signed(((code << 4) as i16) >> 4)
            }
            _ => Sample::Unsigned(code),
        }
    }

    /// The 12-bit code as it appeared on the bus.
    pub fn raw(self) -> u16 {
        match self {
            Sample::Unsigned(code) => code,
            Sample::Signed(value) => (value as u16) & 0x0FFF,
        }
    }

    pub fn value(self) -> i32 {
        match self {
            Sample::Unsigned(code) => code as i32,
            Sample::Signed(value) => value as i32,
        }
    }

    /// Convert to millivolts given the reference voltage in millivolts.
    ///
    /// One LSB is `vref / 4096` in both unipolar and bipolar coding.
    pub fn to_millivolts(self, vref_mv: u32) -> f32 {
        self.value() as f32 * vref_mv as f32 / FULL_SCALE as f32
    }
}

/// Results decoded from a raw read buffer, in device order.
#[derive(Debug, Clone)]
pub struct Samples<'a> {
    raw: core::slice::Iter<'a, [u8; 2]>,
    polarity: Polarity,
    input: InputMode,
}

impl<'a> Samples<'a> {
    pub fn new(raw: &'a [[u8; 2]], polarity: Polarity, input: InputMode) -> Self {
        Self {
            raw: raw.iter(),
            polarity,
            input,
        }
    }
}

impl Iterator for Samples<'_> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        self.raw
            .next()
            .map(|&bytes| Sample::decode(bytes, self.polarity, self.input))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.raw.size_hint()
    }
}

impl ExactSizeIterator for Samples<'_> {}

impl From<Sample> for i32 {
    fn from(sample: Sample) -> i32 {
        sample.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unipolar_single_ended() {
        let sample = Sample::decode([0x01, 0xF4], Polarity::Unipolar, InputMode::SingleEnded);

        assert_eq!(sample, Sample::Unsigned(500));
    }

    #[test]
    fn bipolar_differential_is_signed() {
        let sample = Sample::decode([0xFE, 0x0C], Polarity::Bipolar, InputMode::Differential);

        assert_eq!(sample, Sample::Signed(-500));
        assert_eq!(sample.raw(), 0x0E0C);
        assert_eq!(i32::from(sample), -500);
    }

    #[test]
    fn padding_bits_are_masked() {
        let sample = Sample::decode([0xF1, 0xF4], Polarity::Unipolar, InputMode::Differential);

        assert_eq!(sample, Sample::Unsigned(500));
    }

    #[test]
    fn bipolar_single_ended_stays_unsigned() {
        let sample = Sample::decode([0xFF, 0xFF], Polarity::Bipolar, InputMode::SingleEnded);

        assert_eq!(sample, Sample::Unsigned(4095));
    }

    #[test]
    fn signed_extremes() {
        let min = Sample::decode([0xF8, 0x00], Polarity::Bipolar, InputMode::Differential);
        let max = Sample::decode([0xF7, 0xFF], Polarity::Bipolar, InputMode::Differential);

        assert_eq!(min, Sample::Signed(-2048));
        assert_eq!(max, Sample::Signed(2047));
    }

    #[test]
    fn samples_follow_buffer_order() {
        let raw = [[0xF8, 0x00], [0x00, 0x01], [0xF7, 0xFF]];
        let samples = Samples::new(&raw, Polarity::Bipolar, InputMode::Differential);

        assert_eq!(samples.len(), 3);
        assert!(samples.eq([Sample::Signed(-2048), Sample::Signed(1), Sample::Signed(2047)]));
    }

    #[test]
    fn millivolts() {
        assert_eq!(Sample::Unsigned(2048).to_millivolts(4096), 2048.0);
        assert_eq!(Sample::Signed(-1024).to_millivolts(2048), -512.0);
    }
}
