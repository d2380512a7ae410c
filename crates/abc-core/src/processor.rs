//! Multichannel frame processing.
//!
//! A *frame* is one sample per channel. Every spatial processor consumes an
//! input frame of [`input_channels`](FrameProcessor::input_channels) samples
//! and produces an output frame of
//! [`output_channels`](FrameProcessor::output_channels) samples.
//!
//! ## Design Decisions
//!
//! - **Fixed channel counts**: the counts are decided at construction
//!   (ambisonic order, speaker count) and never change while processing.
//! - **Object-safe**: `dyn FrameProcessor` works for runtime-built chains.
//! - **No allocations**: `process_frame` and `process_block` never allocate.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Core trait for all multichannel processors.
///
/// # Example
///
/// ```rust
/// use abc_core::FrameProcessor;
///
/// struct Gain {
///     channels: usize,
///     gain: f32,
/// }
///
/// impl FrameProcessor for Gain {
///     fn input_channels(&self) -> usize { self.channels }
///     fn output_channels(&self) -> usize { self.channels }
///
///     fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
///         for (o, i) in output.iter_mut().zip(input) {
///             *o = i * self.gain;
///         }
///     }
///
///     fn set_sample_rate(&mut self, _sample_rate: f32) {}
///     fn reset(&mut self) {}
/// }
///
/// let mut gain = Gain { channels: 2, gain: 0.5 };
/// let mut out = [0.0; 2];
/// gain.process_frame(&[1.0, -1.0], &mut out);
/// assert_eq!(out, [0.5, -0.5]);
/// ```
pub trait FrameProcessor {
    /// Number of samples expected per input frame.
    fn input_channels(&self) -> usize;

    /// Number of samples produced per output frame.
    fn output_channels(&self) -> usize;

    /// Process one frame.
    ///
    /// `input.len()` must equal [`input_channels`](Self::input_channels) and
    /// `output.len()` must equal [`output_channels`](Self::output_channels).
    fn process_frame(&mut self, input: &[f32], output: &mut [f32]);

    /// Process interleaved frames.
    ///
    /// Default implementation walks the buffers frame by frame.
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        let in_ch = self.input_channels();
        let out_ch = self.output_channels();
        debug_assert_eq!(
            input.len() / in_ch,
            output.len() / out_ch,
            "Input and output buffers must hold the same number of frames"
        );
        for (inp, out) in input.chunks_exact(in_ch).zip(output.chunks_exact_mut(out_ch)) {
            self.process_frame(inp, out);
        }
    }

    /// Update the sample rate.
    ///
    /// Recomputes smoothing coefficients and oscillator increments.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear delay lines, oscillator phases and smoother state.
    fn reset(&mut self);
}

/// Extension trait for chaining frame processors.
pub trait FrameProcessorExt: FrameProcessor + Sized {
    /// Feed this processor's output into `next`.
    ///
    /// # Panics
    ///
    /// Panics if `self.output_channels() != next.input_channels()`.
    fn chain<P: FrameProcessor>(self, next: P) -> Chain<Self, P> {
        Chain::new(self, next)
    }

    /// Feed this processor's output into `next`, or report the mismatch.
    fn try_chain<P: FrameProcessor>(self, next: P) -> Result<Chain<Self, P>, ChannelMismatch> {
        Chain::try_new(self, next)
    }
}

impl<T: FrameProcessor> FrameProcessorExt for T {}

/// Channel counts of two processors that cannot be chained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMismatch {
    /// Channels the consumer expects.
    pub expected: usize,
    /// Channels the producer delivers.
    pub actual: usize,
}

impl core::fmt::Display for ChannelMismatch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "channel mismatch: expected {}, got {}", self.expected, self.actual)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ChannelMismatch {}

/// Two processors in series with an intermediate frame buffer.
#[derive(Debug, Clone)]
pub struct Chain<A, B> {
    first: A,
    second: B,
    scratch: Vec<f32>,
}

impl<A: FrameProcessor, B: FrameProcessor> Chain<A, B> {
    /// Connect `first` to `second`.
    ///
    /// # Panics
    ///
    /// Panics if the channel counts do not match.
    pub fn new(first: A, second: B) -> Self {
        match Self::try_new(first, second) {
            Ok(chain) => chain,
            Err(e) => panic!("Chained processors must agree on channel count: {e}"),
        }
    }

    /// Connect `first` to `second`, failing if the channel counts differ.
    pub fn try_new(first: A, second: B) -> Result<Self, ChannelMismatch> {
        let actual = first.output_channels();
        let expected = second.input_channels();
        if actual != expected {
            return Err(ChannelMismatch { expected, actual });
        }
        Ok(Self {
            first,
            second,
            scratch: vec![0.0; actual],
        })
    }
}

impl<A: FrameProcessor, B: FrameProcessor> FrameProcessor for Chain<A, B> {
    fn input_channels(&self) -> usize {
        self.first.input_channels()
    }

    fn output_channels(&self) -> usize {
        self.second.output_channels()
    }

    #[inline]
    fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
        self.first.process_frame(input, &mut self.scratch);
        self.second.process_frame(&self.scratch, output);
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.first.set_sample_rate(sample_rate);
        self.second.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.first.reset();
        self.second.reset();
        self.scratch.fill(0.0);
    }
}

impl<A, B> Chain<A, B> {
    /// Get a reference to the first processor in the chain.
    pub fn first(&self) -> &A {
        &self.first
    }

    /// Get a mutable reference to the first processor in the chain.
    pub fn first_mut(&mut self) -> &mut A {
        &mut self.first
    }

    /// Get a reference to the second processor in the chain.
    pub fn second(&self) -> &B {
        &self.second
    }

    /// Get a mutable reference to the second processor in the chain.
    pub fn second_mut(&mut self) -> &mut B {
        &mut self.second
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Gain(usize, f32);

    impl FrameProcessor for Gain {
        fn input_channels(&self) -> usize {
            self.0
        }
        fn output_channels(&self) -> usize {
            self.0
        }
        fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
            for (o, i) in output.iter_mut().zip(input) {
                *o = i * self.1;
            }
        }
        fn set_sample_rate(&mut self, _: f32) {}
        fn reset(&mut self) {}
    }

    struct Sum(usize);

    impl FrameProcessor for Sum {
        fn input_channels(&self) -> usize {
            self.0
        }
        fn output_channels(&self) -> usize {
            1
        }
        fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
            output[0] = input.iter().sum();
        }
        fn set_sample_rate(&mut self, _: f32) {}
        fn reset(&mut self) {}
    }

    #[test]
    fn test_chain() {
        let mut chain = Gain(3, 2.0).chain(Sum(3));
        let mut out = [0.0];
        chain.process_frame(&[1.0, 2.0, 3.0], &mut out);
        assert_eq!(out, [12.0]);
        assert_eq!(chain.input_channels(), 3);
        assert_eq!(chain.output_channels(), 1);
    }

    #[test]
    fn test_block_interleaved() {
        let mut sum = Sum(2);
        let input = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut output = [0.0; 3];
        sum.process_block(&input, &mut output);
        assert_eq!(output, [3.0, 7.0, 11.0]);
    }

    #[test]
    fn test_try_chain_reports_mismatch() {
        let err = Gain(4, 1.0).try_chain(Gain(3, 1.0)).unwrap_err();
        assert_eq!(
            err,
            ChannelMismatch {
                expected: 3,
                actual: 4
            }
        );

        let mut chain = Gain(3, 0.5).try_chain(Sum(3)).unwrap();
        let mut out = [0.0];
        chain.process_frame(&[2.0, 2.0, 2.0], &mut out);
        assert_eq!(out, [3.0]);
    }

    #[test]
    #[should_panic(expected = "expected 3, got 2")]
    fn test_chain_mismatch_panics() {
        let _ = Gain(2, 1.0).chain(Sum(3));
    }
}
