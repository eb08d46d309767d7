use crate::crypto::SecureRandom;

/// `N` fresh random bytes, for the ClientHello random and session id.
pub(crate) fn random_array<const N: usize>(
    source: &dyn SecureRandom,
) -> Result<[u8; N], GetRandomFailed> {
    let mut out = [0u8; N];
    source.fill(&mut out)?;
    Ok(out)
}

/// The random source could not produce output.
#[derive(Debug)]
pub struct GetRandomFailed;
