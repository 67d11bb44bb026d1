use super::Transport;
use std::collections::VecDeque;
use std::io;

/// Scripted in-memory transport
///
/// Replies are queued up front and handed out one per `receive`, whole,
/// regardless of the requested length (the way a line-oriented serial port
/// behaves). Everything passed to `send` is recorded for inspection.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: VecDeque<io::Result<Vec<u8>>>,
    sent: Vec<Vec<u8>>,
}

impl MockTransport {
    /// Empty transport; `receive` times out until replies are queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport preloaded with text replies.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mock = Self::new();
        for reply in replies {
            mock.push_reply(reply.as_ref());
        }
        mock
    }

    /// Queue a reply.
    pub fn push_reply(&mut self, reply: impl AsRef<[u8]>) {
        self.replies.push_back(Ok(reply.as_ref().to_vec()));
    }

    /// Queue a read failure.
    pub fn push_error(&mut self, kind: io::ErrorKind) {
        self.replies
            .push_back(Err(io::Error::new(kind, "scripted transport failure")));
    }

    /// Everything sent so far, one entry per `send`.
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// [`sent`](Self::sent) decoded as text.
    pub fn sent_strings(&self) -> Vec<String> {
        self.sent
            .iter()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .collect()
    }

    /// Number of replies not yet consumed.
    pub fn pending_replies(&self) -> usize {
        self.replies.len()
    }
}

impl Transport for MockTransport {
    fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        self.sent.push(data.to_vec());
        Ok(data.len())
    }

    fn receive(&mut self, _max_len: usize) -> io::Result<Vec<u8>> {
        self.replies.pop_front().unwrap_or_else(|| {
            Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "no scripted reply queued",
            ))
        })
    }
}
