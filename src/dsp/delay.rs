/*
Fractional Delay Line
=====================

A circular buffer with one write cursor. Each processed sample is written at
the cursor, read back `delay` samples in the past, then the cursor moves on
by exactly one slot.

    write_pos ──▶ [ . . . . x . . . . . ]
                          ▲
                 read_pos = write_pos - delay   (wrapped into [0, capacity))

When `delay` is fractional the two neighbouring slots are blended linearly:

    out = buf[i] · (1 - frac) + buf[i + 1] · frac

Slot `i + 1` is the newer of the two, so a growing fractional part shortens
the effective delay. The buffer is sized once, at construction; reads past the
capacity are clamped rather than wrapped twice.
*/

pub struct DelayLine {
    buffer: Box<[f32]>,
    write_pos: usize,
}

impl DelayLine {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(2)].into_boxed_slice(),
            write_pos: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Longest delay that can be read without touching the slot being written.
    pub fn max_delay(&self) -> f32 {
        (self.buffer.len() - 2) as f32
    }

    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Write at the cursor, read `delay_samples` behind it, then advance.
    #[inline]
    pub fn next_sample(&mut self, sample: f32, delay_samples: f32) -> f32 {
        self.buffer[self.write_pos] = sample;
        let delayed = self.read_interpolated(delay_samples);
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
        delayed
    }

    /// Linear-interpolated read relative to the current write cursor.
    #[inline]
    pub fn read_interpolated(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay = if delay_samples.is_finite() {
            delay_samples.clamp(0.0, self.max_delay())
        } else {
            0.0
        };

        let mut read_pos = self.write_pos as f32 - delay;
        if read_pos < 0.0 {
            read_pos += len as f32;
        }

        let base = read_pos.floor();
        let frac = read_pos - base;
        // f32 rounding can land exactly on `len`
        let index = (base as usize) % len;
        let next = (index + 1) % len;

        self.buffer[index] * (1.0 - frac) + self.buffer[next] * frac
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_delay_returns_past_sample() {
        let mut line = DelayLine::new(16);
        let mut outputs = Vec::new();
        for n in 0..12 {
            outputs.push(line.next_sample(n as f32, 4.0));
        }
        // First four reads land on the zeroed buffer
        assert_eq!(&outputs[..4], &[0.0; 4]);
        for n in 4..12 {
            assert_eq!(outputs[n], (n - 4) as f32, "sample {n}");
        }
    }

    #[test]
    fn zero_delay_is_passthrough() {
        let mut line = DelayLine::new(8);
        for n in 0..20 {
            let x = n as f32 * 0.1;
            assert_eq!(line.next_sample(x, 0.0), x);
        }
    }

    #[test]
    fn fractional_delay_interpolates() {
        let mut line = DelayLine::new(32);
        for n in 0..10 {
            line.next_sample(n as f32, 0.0);
        }
        // Last written = 9 at slot 9, cursor now at 10. Write 10, read 2.5 back.
        let out = line.next_sample(10.0, 2.5);
        assert!((out - 7.5).abs() < 1e-5, "expected 7.5, got {out}");
    }

    #[test]
    fn cursor_wraps_and_reads_stay_in_bounds() {
        let mut line = DelayLine::new(8);
        for n in 0..100 {
            let out = line.next_sample(1.0, (n % 13) as f32 * 0.77);
            assert!(out.is_finite());
            assert!(line.write_pos() < line.capacity());
        }

        // Out-of-range requests are clamped, not panics
        assert!(line.read_interpolated(1_000.0).is_finite());
        assert!(line.read_interpolated(-3.0).is_finite());
        assert!(line.read_interpolated(f32::NAN).is_finite());
    }

    #[test]
    fn reset_clears_history() {
        let mut line = DelayLine::new(8);
        for _ in 0..8 {
            line.next_sample(1.0, 0.0);
        }
        line.reset();
        assert_eq!(line.write_pos(), 0);
        assert_eq!(line.read_interpolated(3.0), 0.0);
    }
}
