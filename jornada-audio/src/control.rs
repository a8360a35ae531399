/// Runtime control of an output device such as a codec.
pub trait AudioControl {
    /// Error type for control operations.
    type Error;

    /// Power up and apply the current settings.
    fn enable(&mut self) -> Result<(), Self::Error>;

    /// Power down.
    fn disable(&mut self) -> Result<(), Self::Error>;

    /// Set the output volume (0.0 = quietest, 1.0 = full scale).
    fn volume(&mut self, level: f32) -> Result<(), Self::Error>;

    /// Silence or restore the output without touching the volume setting.
    fn mute(&mut self, on: bool) -> Result<(), Self::Error>;
}
