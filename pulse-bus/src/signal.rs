//! Raw signals as delivered by the transport.

use crate::path::ObjectPath;
use crate::value::Value;

/// An unparsed signal received from the bus.
///
/// `name` is fully qualified (`org.PulseAudio.Core1.Device.VolumeUpdated`);
/// `path` is the object that emitted the signal.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSignal {
    /// Fully qualified signal name
    pub name: String,
    /// Object that emitted the signal
    pub path: ObjectPath,
    /// Signal arguments in wire order
    pub body: Vec<Value>,
}

impl RawSignal {
    /// Create a new raw signal.
    pub fn new(name: impl Into<String>, path: ObjectPath, body: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            path,
            body,
        }
    }

    /// Signal name with `prefix.` removed, or `None` if it is not in that namespace.
    pub fn member_of(&self, prefix: &str) -> Option<&str> {
        self.name
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('.'))
            .filter(|rest| !rest.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(name: &str) -> RawSignal {
        RawSignal::new(name, ObjectPath::root(), vec![])
    }

    #[test]
    fn test_member_of() {
        let prefix = "org.PulseAudio.Core1";
        assert_eq!(signal("org.PulseAudio.Core1.NewSink").member_of(prefix), Some("NewSink"));
        assert_eq!(
            signal("org.PulseAudio.Core1.Device.VolumeUpdated").member_of(prefix),
            Some("Device.VolumeUpdated")
        );
        assert_eq!(signal("NewSink").member_of(prefix), None);
        assert_eq!(signal("org.PulseAudio.Core1").member_of(prefix), None);
        assert_eq!(signal("org.PulseAudio.Core1.").member_of(prefix), None);
        assert_eq!(signal("org.PulseAudio.Core10.NewSink").member_of(prefix), None);
    }
}
