use std::fmt;
use std::marker::PhantomData;

use crate::{Error, Result};

/// A fixed-layout sample with named numeric channels.
///
/// `CHANNELS` lists the channel names in wire order; `channel(i)` reads the
/// value of `CHANNELS[i]` widened to `f64`.
pub trait Record {
    const CHANNELS: &'static [&'static str];

    fn channel(&self, index: usize) -> f64;
}

/// A record that maps one-to-one onto a tuple of signed 16-bit integers.
pub trait FixedRecord: Record + Sized {
    /// `raw.len()` is always `Self::CHANNELS.len()`.
    fn decode(raw: &[i16]) -> Self;
    fn encode(&self, raw: &mut [i16]);
}

/// The ordered set of channels that participate in the triangle area.
///
/// Built by name against `S::CHANNELS`, so a set can only ever be used
/// with the record type it was validated for.
pub struct ChannelSet<S> {
    indices: Vec<usize>,
    _record: PhantomData<fn(&S)>,
}

impl<S: Record> ChannelSet<S> {
    pub fn new<I, N>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let mut indices = Vec::new();
        for name in names {
            let name = name.as_ref();
            let index = S::CHANNELS
                .iter()
                .position(|c| *c == name)
                .ok_or_else(|| Error::InvalidChannel {
                    name: name.to_string(),
                    expected: S::CHANNELS,
                })?;
            if indices.contains(&index) {
                return Err(Error::DuplicateChannel(name.to_string()));
            }
            indices.push(index);
        }

        if indices.is_empty() {
            return Err(Error::EmptyChannelSet);
        }

        Ok(ChannelSet {
            indices,
            _record: PhantomData,
        })
    }

    /// Every channel of `S`, in wire order.
    pub fn all() -> Self {
        ChannelSet {
            indices: (0..S::CHANNELS.len()).collect(),
            _record: PhantomData,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.indices.iter().map(|&i| S::CHANNELS[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub(crate) fn indices(&self) -> &[usize] {
        &self.indices
    }
}

impl<S> Clone for ChannelSet<S> {
    fn clone(&self) -> Self {
        ChannelSet {
            indices: self.indices.clone(),
            _record: PhantomData,
        }
    }
}

impl<S: Record> fmt::Debug for ChannelSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

// ImuSample is one reading of a six-axis inertial measurement unit:
// accelerometer then gyroscope, raw sensor counts.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub struct ImuSample {
    pub ax: i16,
    pub ay: i16,
    pub az: i16,
    pub gx: i16,
    pub gy: i16,
    pub gz: i16,
}

impl Record for ImuSample {
    const CHANNELS: &'static [&'static str] = &["ax", "ay", "az", "gx", "gy", "gz"];

    fn channel(&self, index: usize) -> f64 {
        let v = match index {
            0 => self.ax,
            1 => self.ay,
            2 => self.az,
            3 => self.gx,
            4 => self.gy,
            5 => self.gz,
            _ => unreachable!("ImuSample has six channels, got index {}", index),
        };
        f64::from(v)
    }
}

impl FixedRecord for ImuSample {
    fn decode(raw: &[i16]) -> Self {
        ImuSample {
            ax: raw[0],
            ay: raw[1],
            az: raw[2],
            gx: raw[3],
            gy: raw[4],
            gz: raw[5],
        }
    }

    fn encode(&self, raw: &mut [i16]) {
        raw.copy_from_slice(&[self.ax, self.ay, self.az, self.gx, self.gy, self.gz]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_set_resolves_names_in_order() {
        let set = ChannelSet::<ImuSample>::new(["gz", "ax"]).unwrap();
        assert_eq!(set.indices(), &[5, 0]);
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["gz", "ax"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn channel_set_all() {
        let set = ChannelSet::<ImuSample>::all();
        assert_eq!(
            set.names().collect::<Vec<_>>(),
            vec!["ax", "ay", "az", "gx", "gy", "gz"]
        );
    }

    #[test]
    fn unknown_channel_error() {
        let err = ChannelSet::<ImuSample>::new(["ax", "mx"]).unwrap_err();
        assert!(matches!(err, Error::InvalidChannel { ref name, .. } if name == "mx"));
    }

    #[test]
    fn duplicate_channel_error() {
        let err = ChannelSet::<ImuSample>::new(["ax", "ax"]).unwrap_err();
        assert!(matches!(err, Error::DuplicateChannel(ref name) if name == "ax"));
    }

    #[test]
    fn empty_channel_set_error() {
        let names: [&str; 0] = [];
        assert!(matches!(
            ChannelSet::<ImuSample>::new(names),
            Err(Error::EmptyChannelSet)
        ));
    }

    #[test]
    fn imu_raw_layout() {
        let raw = [1, -2, 3, -4, 5, i16::MIN];
        let s = ImuSample::decode(&raw);
        assert_eq!(s.gz, i16::MIN);
        assert_eq!(s.channel(1), -2.0);

        let mut out = [0i16; 6];
        s.encode(&mut out);
        assert_eq!(out, raw);
    }
}
