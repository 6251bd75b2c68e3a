//! Common APU components used by the SMP I/O page and the DSP voices

pub mod brr;
pub mod envelope;
pub mod timer;

pub use brr::BrrDecoder;
pub use envelope::{Envelope, EnvelopeMode};
pub use timer::Timer;
