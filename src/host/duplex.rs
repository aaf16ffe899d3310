//! Hand-off of captured input to the output callback.
//!
//! The input stream pushes interleaved samples into a lock-free ring; the
//! output callback pulls one block at a time into preallocated scratch.

use rtrb::{Consumer, Producer, RingBuffer};

pub struct InputBridge {
    consumer: Consumer<f32>,
    scratch: Vec<f32>,
}

impl InputBridge {
    /// Returns the producer for the input callback and the bridge for the
    /// output callback. `block_len` bounds a single [`pull`](Self::pull).
    pub fn new(block_len: usize, capacity: usize) -> (Producer<f32>, Self) {
        let (producer, consumer) = RingBuffer::<f32>::new(capacity.max(block_len));
        let bridge = Self {
            consumer,
            scratch: vec![0.0; block_len],
        };
        (producer, bridge)
    }

    /// Take up to `len` captured samples. Anything the input has not
    /// delivered yet reads as silence.
    pub fn pull(&mut self, len: usize) -> &[f32] {
        let len = len.min(self.scratch.len());
        for slot in self.scratch[..len].iter_mut() {
            *slot = self.consumer.pop().unwrap_or(0.0);
        }
        &self.scratch[..len]
    }
}

/// Input-callback side: push what fits, drop the rest.
pub fn push_input(producer: &mut Producer<f32>, data: &[f32]) -> usize {
    let mut dropped = 0;
    for &sample in data {
        if producer.push(sample).is_err() {
            dropped += 1;
        }
    }
    dropped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulls_in_order_and_pads_underruns() {
        let (mut producer, mut bridge) = InputBridge::new(4, 16);
        assert_eq!(push_input(&mut producer, &[1.0, 2.0, 3.0]), 0);

        assert_eq!(bridge.pull(4), &[1.0, 2.0, 3.0, 0.0]);
        assert_eq!(bridge.pull(2), &[0.0, 0.0]);
    }

    #[test]
    fn pull_is_bounded_by_block_len() {
        let (mut producer, mut bridge) = InputBridge::new(2, 8);
        push_input(&mut producer, &[1.0, 2.0, 3.0]);
        assert_eq!(bridge.pull(10), &[1.0, 2.0]);
        assert_eq!(bridge.pull(10), &[3.0, 0.0]);
    }

    #[test]
    fn full_ring_drops_samples() {
        let (mut producer, _bridge) = InputBridge::new(2, 2);
        assert_eq!(push_input(&mut producer, &[1.0, 2.0, 3.0]), 1);
    }
}
