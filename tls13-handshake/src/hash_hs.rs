use crate::crypto::hash;
use crate::error::Error;
use crate::msgs::message::HandshakeMessage;

/// Early stage buffering of handshake payloads.
///
/// Before we know the hash algorithm to use to verify the handshake, we just buffer the messages.
/// The ServerHello fixes the cipher suite, and with it the hash.
pub(crate) struct HandshakeHashBuffer {
    buffer: Vec<u8>,
}

impl HandshakeHashBuffer {
    pub(crate) fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Buffer a handshake message.
    pub(crate) fn add_message(&mut self, m: &HandshakeMessage) {
        self.buffer.extend_from_slice(m.bytes());
    }

    /// Get the hash value if we were to hash `extra` too.
    pub(crate) fn get_hash_given(
        &self,
        provider: &'static dyn hash::Hash,
        extra: &[u8],
    ) -> hash::Output {
        let mut ctx = provider.start();
        ctx.update(&self.buffer);
        ctx.update(extra);
        ctx.fork_finish()
    }

    /// We now know what hash function the verify_data will use.
    ///
    /// Everything buffered so far is the ClientHello; it becomes the first
    /// checkpoint of the running hash.
    pub(crate) fn start_hash(self, provider: &'static dyn hash::Hash) -> HandshakeHash {
        let mut ctx = provider.start();
        ctx.update(&self.buffer);
        let mut checkpoints: [Option<hash::Output>; Checkpoint::COUNT] = Default::default();
        checkpoints[Checkpoint::ClientHello as usize] = Some(ctx.fork_finish());
        HandshakeHash {
            ctx,
            checkpoints,
        }
    }
}

/// Points in the transcript whose hash a later computation needs.
///
/// Each is taken immediately after the named message was added.  The two
/// Finished checkpoints give the asymmetric views the two Finished MACs
/// need: the server's covers everything before it, ours covers the server's.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Checkpoint {
    ClientHello,
    ServerHello,
    EncryptedExtensions,
    Certificate,
    CertificateVerify,
    ServerFinished,
    ClientFinished,
}

impl Checkpoint {
    const COUNT: usize = 7;
}

/// This deals with keeping a running hash of the handshake
/// payloads.  This is computed by buffering initially.  Once
/// we know what hash function we need to use we switch to
/// incremental hashing.
///
/// Snapshots are forks of the running context; nothing is ever rehashed.
pub(crate) struct HandshakeHash {
    ctx: Box<dyn hash::Context>,
    checkpoints: [Option<hash::Output>; Checkpoint::COUNT],
}

impl HandshakeHash {
    /// Hash a handshake message, and remember the hash as of `at`.
    pub(crate) fn add_message(&mut self, m: &HandshakeMessage, at: Checkpoint) -> &mut Self {
        self.ctx.update(m.bytes());
        self.checkpoints[at as usize] = Some(self.ctx.fork_finish());
        self
    }

    /// The transcript hash taken at `at`, if that point was reached.
    pub(crate) fn hash_at(&self, at: Checkpoint) -> Option<&hash::Output> {
        self.checkpoints[at as usize].as_ref()
    }

    /// Like [`Self::hash_at`], for checkpoints the handshake must already have passed.
    pub(crate) fn checkpoint(&self, at: Checkpoint) -> Result<hash::Output, Error> {
        self.hash_at(at)
            .cloned()
            .ok_or_else(|| Error::General(format!("transcript has no {:?} checkpoint", at)))
    }
}
