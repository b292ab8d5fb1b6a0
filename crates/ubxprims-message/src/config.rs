/// Controls message dispatch behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryConfig {
    /// When true, frames without a registered schema return
    /// `MessageError::UnknownMessage` instead of `Decoded::Unknown`.
    pub fail_on_unknown: bool,
}
