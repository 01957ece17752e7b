//! Whole-frame post passes, run after compositing and before upload.
use rand::Rng;
use rayon::prelude::*;
use raylib::prelude::Color;

use crate::render::framebuffer::{pack_rgb, unpack_rgb, Framebuffer};

const BAYER_4X4: [[i32; 4]; 4] = [
    [0, 32, 8, 40],
    [48, 16, 56, 24],
    [12, 44, 4, 36],
    [60, 28, 52, 20],
];

/// Chance in ten that a row is displaced.
const ROW_SHIFT_CHANCE: u32 = 2;
const MAX_ROW_SHIFT: i32 = 10;
/// One pixel in this many has its channels jittered.
const JITTER_ONE_IN: u32 = 50;
const JITTER_RANGE: i32 = 50;
const QUANT_STEP: i32 = 32;

/// Scan-line glitch: some rows slide sideways (uncovered pixels keep their old
/// value), then scattered pixels get every channel nudged with wrap-around.
pub fn apply_glitch<R: Rng>(fb: &mut Framebuffer, rng: &mut R) {
    let w = fb.width as usize;
    if w == 0 {
        return;
    }
    for row in fb.color_buffer.chunks_exact_mut(w) {
        if rng.gen_range(0..10) >= ROW_SHIFT_CHANCE {
            continue;
        }
        let shift = rng.gen_range(-MAX_ROW_SHIFT..MAX_ROW_SHIFT);
        let n = shift.unsigned_abs() as usize;
        if n == 0 || n >= w {
            continue;
        }
        if shift > 0 {
            row.copy_within(0..w - n, n);
        } else {
            row.copy_within(n..w, 0);
        }
    }

    for px in fb.color_buffer.iter_mut() {
        if rng.gen_range(0..JITTER_ONE_IN) != 0 {
            continue;
        }
        let c = unpack_rgb(*px);
        let mut jitter = |v: u8| v.wrapping_add(rng.gen_range(-JITTER_RANGE..JITTER_RANGE) as u8);
        let r = jitter(c.r);
        let g = jitter(c.g);
        let b = jitter(c.b);
        *px = pack_rgb(Color::new(r, g, b, 255));
    }
}

#[inline]
fn dither_channel(v: u8, offset: i32) -> u8 {
    let v = v as i32;
    let v = (v + ((v * offset) >> 6)).clamp(0, 255);
    ((v / QUANT_STEP) * QUANT_STEP) as u8
}

/// Ordered 4×4 Bayer dither, then each channel quantized to multiples of 32.
pub fn apply_dither(fb: &mut Framebuffer) {
    let w = fb.width as usize;
    if w == 0 {
        return;
    }
    fb.color_buffer
        .par_chunks_mut(w)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.iter_mut().enumerate() {
                let offset = BAYER_4X4[y & 3][x & 3] - 31;
                let c = unpack_rgb(*px);
                let r = dither_channel(c.r, offset);
                let g = dither_channel(c.g, offset);
                let b = dither_channel(c.b, offset);
                *px = pack_rgb(Color::new(r, g, b, 255));
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn dither_quantizes_every_channel() {
        let mut fb = Framebuffer::new(8, 8);
        for (i, px) in fb.color_buffer.iter_mut().enumerate() {
            *px = pack_rgb(Color::new((i * 3) as u8, (i * 5) as u8, 200, 255));
        }
        apply_dither(&mut fb);
        for px in &fb.color_buffer {
            let c = unpack_rgb(*px);
            assert_eq!(c.r % 32, 0);
            assert_eq!(c.g % 32, 0);
            assert_eq!(c.b % 32, 0);
        }
    }

    #[test]
    fn dither_follows_the_bayer_offsets() {
        // offset -31 at (0,0): 100 + (100*-31 >> 6) = 51 → 32
        assert_eq!(dither_channel(100, -31), 32);
        // offset 29 (Bayer 60): 100 + (2900 >> 6) = 145 → 128
        assert_eq!(dither_channel(100, 29), 128);
        assert_eq!(dither_channel(255, 29), 224);
        assert_eq!(dither_channel(0, 29), 0);
    }

    #[test]
    fn glitch_keeps_uniform_rows_uniform_except_jitter() {
        let mut fb = Framebuffer::new(64, 64);
        let grey = pack_rgb(Color::new(100, 100, 100, 255));
        fb.color_buffer.fill(grey);
        let mut rng = StdRng::seed_from_u64(7);
        apply_glitch(&mut fb, &mut rng);

        let changed = fb.color_buffer.iter().filter(|p| **p != grey).count();
        // Shifts of a flat image are invisible; only jittered pixels differ.
        assert!(changed < fb.color_buffer.len() / 10);
        for px in fb.color_buffer.iter().filter(|p| **p != grey) {
            let c = unpack_rgb(*px);
            for v in [c.r, c.g, c.b] {
                assert!((50..150).contains(&v));
            }
        }
    }

    #[test]
    fn glitch_moves_row_content_sideways() {
        let mut fb = Framebuffer::new(32, 200);
        for row in fb.color_buffer.chunks_exact_mut(32) {
            for (x, px) in row.iter_mut().enumerate() {
                *px = x as u32;
            }
        }
        let mut rng = StdRng::seed_from_u64(42);
        apply_glitch(&mut fb, &mut rng);
        let shifted = fb
            .color_buffer
            .chunks_exact(32)
            .filter(|row| row[16] != 16 && row[15] != 15 && row[17] != 17)
            .count();
        assert!(shifted > 0);
    }
}
