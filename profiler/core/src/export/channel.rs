use std::sync::mpsc::Sender;
use std::sync::Mutex;

use super::Exporter;
use crate::entry::Entry;
use crate::error::ProfilerError;

/// Send each snapshot through an in-process channel.
#[derive(Debug)]
pub struct ChannelExporter {
    // `Sender` is only `Sync` on newer toolchains.
    sender: Mutex<Sender<Vec<Entry>>>,
}

impl ChannelExporter {
    pub fn new(sender: Sender<Vec<Entry>>) -> Self {
        Self {
            sender: Mutex::new(sender),
        }
    }
}

impl Exporter for ChannelExporter {
    fn export(&self, entries: &[Entry]) -> Result<(), ProfilerError> {
        self.sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .send(entries.to_vec())
            .map_err(|_| ProfilerError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::entry::Timestamp;

    #[test]
    fn test_channel_exporter_sends_copy() {
        let (sender, receiver) = mpsc::channel();
        let exporter = ChannelExporter::new(sender);
        let mut entries = vec![Entry::basic("a", Timestamp(0), Timestamp(1))];

        exporter.export(&entries).unwrap();
        entries.push(Entry::basic("b", Timestamp(1), Timestamp(2)));

        let received = receiver.recv().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].name(), "a");
    }

    #[test]
    fn test_closed_channel_is_an_error() {
        let (sender, receiver) = mpsc::channel();
        drop(receiver);
        let exporter = ChannelExporter::new(sender);
        assert!(matches!(
            exporter.export(&[]),
            Err(ProfilerError::ChannelClosed)
        ));
    }
}
